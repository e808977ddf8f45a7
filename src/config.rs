//! Render configuration.
//!
//! [`RenderConfig`] is fixed for the duration of one render. With the
//! `config` feature it can be loaded from YAML; every field is optional there
//! and falls back to [`RenderConfig::default`].

use std::collections::BTreeMap;
use std::path::PathBuf;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Graph direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
pub enum Orientation {
    /// Root at the top.
    #[default]
    TD,
    /// Root at the left.
    LR,
}

impl Orientation {
    /// Graphviz `rankdir` value.
    #[must_use]
    pub fn rankdir(self) -> &'static str {
        match self {
            Self::TD => "TD",
            Self::LR => "LR",
        }
    }

    /// Graphviz `ranksep` value.
    #[must_use]
    pub fn ranksep(self) -> &'static str {
        match self {
            Self::TD => ".2",
            Self::LR => ".22",
        }
    }
}

/// How per-class bars share a histogram bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum HistType {
    /// Class bars side by side within each bin.
    Bar,
    /// Class bars stacked on top of each other.
    #[default]
    BarStacked,
}

/// Options for one render call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct RenderConfig {
    /// Graph direction.
    pub orientation: Orientation,
    /// Digits after the decimal point in split and value labels.
    pub precision: usize,
    /// Embed per-node plots (true) or use plain text/disk nodes (false).
    pub fancy: bool,
    /// Classifier split histogram style.
    pub histtype: HistType,
    /// Label the two edges leaving the root with `<` and `>=`.
    pub show_root_edge_labels: bool,
    /// Label every split edge.
    pub show_edge_labels: bool,
    /// Node ids to highlight when no instance is traced.
    pub highlight_path: Vec<usize>,
    /// Instance to trace down the tree.
    pub instance: Option<Vec<f32>>,
    /// Instance table collapses above this many features in LR orientation.
    pub max_x_features_lr: usize,
    /// Instance table collapses above this many features in TD orientation.
    pub max_x_features_td: usize,
    /// Where node images are written.
    pub artifact_dir: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::TD,
            precision: 2,
            fancy: true,
            histtype: HistType::BarStacked,
            show_root_edge_labels: true,
            show_edge_labels: false,
            highlight_path: Vec::new(),
            instance: None,
            max_x_features_lr: 10,
            max_x_features_td: 20,
            artifact_dir: std::env::temp_dir(),
        }
    }
}

impl RenderConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the graph direction.
    #[must_use]
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the label precision.
    #[must_use]
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Toggle embedded node plots.
    #[must_use]
    pub fn fancy(mut self, fancy: bool) -> Self {
        self.fancy = fancy;
        self
    }

    /// Set the classifier histogram style.
    #[must_use]
    pub fn histtype(mut self, histtype: HistType) -> Self {
        self.histtype = histtype;
        self
    }

    /// Toggle root edge labels.
    #[must_use]
    pub fn show_root_edge_labels(mut self, show: bool) -> Self {
        self.show_root_edge_labels = show;
        self
    }

    /// Toggle labels on every split edge.
    #[must_use]
    pub fn show_edge_labels(mut self, show: bool) -> Self {
        self.show_edge_labels = show;
        self
    }

    /// Highlight these node ids (ignored when an instance is traced).
    #[must_use]
    pub fn highlight_path(mut self, ids: Vec<usize>) -> Self {
        self.highlight_path = ids;
        self
    }

    /// Trace an instance.
    #[must_use]
    pub fn instance(mut self, x: Vec<f32>) -> Self {
        self.instance = Some(x);
        self
    }

    /// Set both instance-table collapse thresholds.
    #[must_use]
    pub fn max_x_features(mut self, lr: usize, td: usize) -> Self {
        self.max_x_features_lr = lr;
        self.max_x_features_td = td;
        self
    }

    /// Write node images under `dir`.
    #[must_use]
    pub fn artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = dir.into();
        self
    }

    /// Instance-table collapse threshold for the configured orientation.
    #[must_use]
    pub fn instance_feature_limit(&self) -> usize {
        match self.orientation {
            Orientation::TD => self.max_x_features_td,
            Orientation::LR => self.max_x_features_lr,
        }
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or
    /// [`Error::ConfigParse`] if it is not a valid configuration.
    #[cfg(feature = "config")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] with the failing line.
    #[cfg(feature = "config")]
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            Error::ConfigParse {
                line,
                message: e.to_string(),
            }
        })
    }

    /// Serializes to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] if serialization fails.
    #[cfg(feature = "config")]
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).map_err(|e| Error::ConfigParse {
            line: 0,
            message: e.to_string(),
        })
    }
}

/// Display names for classifier labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassNames {
    /// Name of label `i` at position `i`.
    List(Vec<String>),
    /// Explicit label to name mapping.
    Map(BTreeMap<i64, String>),
}

impl ClassNames {
    /// Name list indexed by label value.
    pub fn list<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self::List(names.into_iter().map(Into::into).collect())
    }

    /// Display name of `label`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingClassName`] if the label has no name.
    pub fn name(&self, label: i64) -> Result<&str> {
        let name = match self {
            Self::List(names) => usize::try_from(label).ok().and_then(|i| names.get(i)),
            Self::Map(names) => names.get(&label),
        };
        name.map(String::as_str).ok_or(Error::MissingClassName(label))
    }
}

impl<S: Into<String>> FromIterator<(i64, S)> for ClassNames {
    fn from_iter<I: IntoIterator<Item = (i64, S)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = RenderConfig::default();
        assert_eq!(config.precision, 2);
        assert_eq!(config.orientation, Orientation::TD);
        assert!(config.fancy);
        assert!(config.show_root_edge_labels);
        assert!(!config.show_edge_labels);
        assert_eq!(config.histtype, HistType::BarStacked);
        assert!(config.instance.is_none());
        assert_eq!(config.max_x_features_lr, 10);
        assert_eq!(config.max_x_features_td, 20);
        assert_eq!(config.artifact_dir, std::env::temp_dir());
    }

    #[test]
    fn test_builder() {
        let config = RenderConfig::new()
            .orientation(Orientation::LR)
            .precision(4)
            .fancy(false)
            .histtype(HistType::Bar)
            .highlight_path(vec![0, 2])
            .artifact_dir("/tmp/trees");
        assert_eq!(config.orientation, Orientation::LR);
        assert_eq!(config.precision, 4);
        assert!(!config.fancy);
        assert_eq!(config.highlight_path, vec![0, 2]);
        assert_eq!(config.artifact_dir, PathBuf::from("/tmp/trees"));
    }

    #[test]
    fn test_max_x_features_follows_orientation() {
        let config = RenderConfig::new().max_x_features(3, 7);
        assert_eq!(config.instance_feature_limit(), 7);
        assert_eq!(config.orientation(Orientation::LR).instance_feature_limit(), 3);
    }

    #[test]
    fn test_orientation_attributes() {
        assert_eq!(Orientation::TD.rankdir(), "TD");
        assert_eq!(Orientation::LR.rankdir(), "LR");
        assert_eq!(Orientation::TD.ranksep(), ".2");
        assert_eq!(Orientation::LR.ranksep(), ".22");
    }

    #[test]
    fn test_class_names_list() {
        let names = ClassNames::list(["setosa", "versicolor", "virginica"]);
        assert_eq!(names.name(1).unwrap(), "versicolor");
        assert!(matches!(names.name(3), Err(Error::MissingClassName(3))));
        assert!(matches!(names.name(-1), Err(Error::MissingClassName(-1))));
    }

    #[test]
    fn test_class_names_map() {
        let names: ClassNames = [(5, "five"), (9, "nine")].into_iter().collect();
        assert_eq!(names.name(9).unwrap(), "nine");
        assert!(names.name(0).is_err());
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_parse_partial_yaml() {
        let config = RenderConfig::parse("orientation: LR\nprecision: 3\nhisttype: bar\n").unwrap();
        assert_eq!(config.orientation, Orientation::LR);
        assert_eq!(config.precision, 3);
        assert_eq!(config.histtype, HistType::Bar);
        assert!(config.fancy);
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_parse_error_line() {
        let err = RenderConfig::parse("precision: 2\nfancy: [not, a, bool]\n").unwrap_err();
        match err {
            Error::ConfigParse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_yaml_round_trip_and_load() {
        let config = RenderConfig::new().instance(vec![1.0, 2.5]).precision(1);
        let yaml = config.to_yaml().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.yaml");
        std::fs::write(&path, yaml).unwrap();
        assert_eq!(RenderConfig::load(&path).unwrap(), config);
    }
}

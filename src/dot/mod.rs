//! Graphviz DOT assembly.
//!
//! [`TreeViz`] drives one render: it mirrors the model in a [`ShadowTree`],
//! writes one image per node through [`NodeRenderer`], and stitches the
//! images into a DOT document. The document references the images by
//! absolute path and is returned as a `String`; turning it into a picture is
//! left to Graphviz.

mod clusters;
mod nodes;

use std::collections::{BTreeMap, BTreeSet};

use log::info;

use crate::artifact::{Artifact, ArtifactDir};
use crate::config::{ClassNames, RenderConfig};
use crate::data::FeatureMatrix;
use crate::error::{Error, Result};
use crate::highlight::HighlightSet;
use crate::plots::NodeRenderer;
use crate::tree::{ShadowTree, TreeModel};

/// Builder for one tree visualization.
///
/// # Example
///
/// ```rust,ignore
/// use trueno_treeviz::prelude::*;
///
/// let dot = TreeViz::new(&model, &x, &y)
///     .feature_names(["sepal length", "sepal width"])
///     .target_name("species")
///     .class_names(ClassNames::list(["setosa", "versicolor", "virginica"]))
///     .config(RenderConfig::new().orientation(Orientation::LR))
///     .render()?;
/// ```
#[derive(Debug, Clone)]
pub struct TreeViz<'a, M: TreeModel + ?Sized> {
    model: &'a M,
    x_train: &'a FeatureMatrix,
    y_train: &'a [f32],
    feature_names: Vec<String>,
    target_name: String,
    class_names: Option<ClassNames>,
    config: RenderConfig,
}

impl<'a, M: TreeModel + ?Sized> TreeViz<'a, M> {
    /// Visualize `model`, fitted on `x_train` and `y_train`.
    #[must_use]
    pub fn new(model: &'a M, x_train: &'a FeatureMatrix, y_train: &'a [f32]) -> Self {
        Self {
            model,
            x_train,
            y_train,
            feature_names: Vec::new(),
            target_name: String::new(),
            class_names: None,
            config: RenderConfig::default(),
        }
    }

    /// One name per feature column.
    #[must_use]
    pub fn feature_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.feature_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Name of the target variable.
    #[must_use]
    pub fn target_name(mut self, name: impl Into<String>) -> Self {
        self.target_name = name.into();
        self
    }

    /// Display names of the class labels. Required for classifiers.
    #[must_use]
    pub fn class_names(mut self, names: ClassNames) -> Self {
        self.class_names = Some(names);
        self
    }

    /// Render options.
    #[must_use]
    pub fn config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    /// Write the node images and return the DOT document.
    ///
    /// Nothing is written unless the model, data, class count, class names
    /// and instance all validate.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidModel`], [`Error::ShapeMismatch`], [`Error::EmptyData`]
    ///   or [`Error::InvalidTarget`] from building the shadow tree.
    /// - [`Error::UnsupportedClassCount`] for classifiers with more than ten classes.
    /// - [`Error::MissingClassName`] if a classifier label has no display name.
    /// - [`Error::TraceVectorLengthMismatch`] for an instance of the wrong length.
    /// - [`Error::Io`] or [`Error::ArtifactMetadata`] while writing images.
    pub fn render(&self) -> Result<String> {
        let shadow = ShadowTree::new(self.model, self.x_train, self.y_train, &self.feature_names)?;
        let artifacts = ArtifactDir::new(&self.config.artifact_dir)?;
        let renderer = NodeRenderer::new(&shadow, &artifacts, &self.config, &self.target_name)?;
        let class_names = self.resolve_class_names(&shadow)?;
        let highlight = HighlightSet::resolve(&shadow, &self.config)?;

        info!(
            "rendering {} tree: {} internal nodes, {} leaves into {}",
            if shadow.is_classifier() { "classifier" } else { "regressor" },
            shadow.internal().count(),
            shadow.leaves().count(),
            artifacts.path().display()
        );

        let mut images = BTreeMap::new();
        if self.config.fancy {
            for node in shadow.internal() {
                images.insert(node.id(), renderer.split(node, highlight.contains(node.id()))?);
            }
        }
        if shadow.is_classifier() || self.config.fancy {
            for node in shadow.leaves() {
                images.insert(node.id(), renderer.leaf(node)?);
            }
        }
        let legend = renderer.legend()?;

        let graph = Graph {
            shadow: &shadow,
            config: &self.config,
            highlight: &highlight,
            images: &images,
            legend: &legend,
            class_names: &class_names,
            target_name: &self.target_name,
            names: nodes::dot_names(&shadow),
        };
        Ok(graph.document())
    }

    /// Display name of every observed label, in label order.
    fn resolve_class_names(&self, shadow: &ShadowTree<'_, M>) -> Result<BTreeMap<i64, String>> {
        let labels = shadow.unique_target_values();
        match &self.class_names {
            _ if labels.is_empty() => Ok(BTreeMap::new()),
            None => Err(Error::MissingClassName(labels[0])),
            Some(names) => labels
                .iter()
                .map(|&label| Ok((label, names.name(label)?.to_string())))
                .collect(),
        }
    }
}

/// Render `model` in one call.
///
/// Equivalent to the [`TreeViz`] builder with every option supplied.
///
/// # Errors
///
/// See [`TreeViz::render`].
pub fn dtreeviz<M: TreeModel + ?Sized, S: AsRef<str>>(
    model: &M,
    x_train: &FeatureMatrix,
    y_train: &[f32],
    feature_names: &[S],
    target_name: &str,
    class_names: Option<&ClassNames>,
    config: &RenderConfig,
) -> Result<String> {
    let mut viz = TreeViz::new(model, x_train, y_train)
        .feature_names(feature_names.iter().map(|s| s.as_ref().to_string()))
        .target_name(target_name)
        .config(config.clone());
    if let Some(names) = class_names {
        viz = viz.class_names(names.clone());
    }
    viz.render()
}

/// Everything the DOT emitters read, resolved and validated.
struct Graph<'g, 'a, M: TreeModel + ?Sized> {
    shadow: &'g ShadowTree<'a, M>,
    config: &'g RenderConfig,
    highlight: &'g HighlightSet,
    images: &'g BTreeMap<usize, Artifact>,
    legend: &'g [Artifact],
    class_names: &'g BTreeMap<i64, String>,
    target_name: &'g str,
    names: BTreeMap<usize, String>,
}

impl<M: TreeModel + ?Sized> Graph<'_, '_, M> {
    /// DOT id of node `id`.
    fn name(&self, id: usize) -> &str {
        self.names.get(&id).map_or("", String::as_str)
    }

    fn document(&self) -> String {
        let mut out = String::with_capacity(8192);
        out.push_str("digraph G {\n");
        out.push_str("    splines=line;\n");
        out.push_str("    nodesep=0.1;\n");
        out.push_str(&format!("    ranksep={};\n", self.config.orientation.ranksep()));
        out.push_str(&format!("    rankdir={};\n", self.config.orientation.rankdir()));
        out.push_str("    node [margin=\"0.03\" penwidth=\"0.5\" width=.1, height=.1];\n");
        out.push_str("    edge [arrowsize=.4 penwidth=\"0.3\"]\n\n");

        for node in self.shadow.internal() {
            out.push_str(&self.split_node(node));
        }
        for node in self.shadow.internal() {
            out.push_str(&self.split_edges(node));
        }
        for node in self.shadow.leaves() {
            out.push_str(&self.leaf_node(node));
        }
        out.push_str(&self.legend_cluster());
        out.push_str(&self.instance_cluster());
        out.push_str("}\n");
        out
    }
}

/// Escape text for a Graphviz HTML-like label.
pub(crate) fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Distinct ids in `ids`, in first-seen order.
fn dedup_ordered(ids: &[usize]) -> Vec<usize> {
    let mut seen = BTreeSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

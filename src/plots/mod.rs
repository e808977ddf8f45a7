//! Per-node statistical plots.
//!
//! Each plot type is a builder producing an [`SvgEncoder`](crate::output::SvgEncoder).
//! [`NodeRenderer`] holds the state shared by every image of one render
//! (class colors, axis ranges, node heights) and writes the images to disk.

mod axes;
mod class_leaf;
mod class_split;
mod legend;
mod regr_leaf;
mod regr_split;

use std::collections::BTreeMap;

use crate::artifact::{Artifact, ArtifactDir};
use crate::color::{class_palette, Rgba, UNOBSERVED_CLASS_COLOR};
use crate::config::RenderConfig;
use crate::data::{mean, select, value_range};
use crate::error::Result;
use crate::sizing::{bin_count, leaf_disk_size, prop_size};
use crate::tree::{ModelKind, ShadowNode, ShadowTree, TreeModel};

pub(crate) use axes::fixed;
pub use class_leaf::ClassLeafPie;
pub use class_split::{ClassSplitHistogram, CLASS_SPLIT_HEIGHT_RANGE, CLASS_SPLIT_WIDTH};
pub use legend::{LegendSwatch, LEGEND_SWATCH_SIZE};
pub use regr_leaf::{RegrLeafStrip, REGR_LEAF_SIZE};
pub use regr_split::{RegrSplitScatter, REGR_SPLIT_SIZE};

/// Writes the image of every node of one shadow tree.
#[derive(Debug)]
pub struct NodeRenderer<'r, 'a, M: TreeModel + ?Sized> {
    shadow: &'r ShadowTree<'a, M>,
    artifacts: &'r ArtifactDir,
    config: &'r RenderConfig,
    target_name: &'r str,
    class_colors: BTreeMap<i64, Rgba>,
    node_heights: BTreeMap<usize, usize>,
    leaf_counts: Vec<usize>,
    y_range: (f32, f32),
}

impl<'r, 'a, M: TreeModel + ?Sized> NodeRenderer<'r, 'a, M> {
    /// Fix colors, bins and axis ranges for the whole tree.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnsupportedClassCount`] for classifiers outside
    /// the calibrated class counts.
    pub fn new(
        shadow: &'r ShadowTree<'a, M>,
        artifacts: &'r ArtifactDir,
        config: &'r RenderConfig,
        target_name: &'r str,
    ) -> Result<Self> {
        let (class_colors, node_heights) = match shadow.kind() {
            ModelKind::Classifier(info) => {
                let palette = class_palette(info.n_classes())?;
                let nbins = bin_count(config.histtype, info.n_classes())?;
                let colors = info
                    .unique_target_values()
                    .iter()
                    .zip(palette)
                    .map(|(&v, &c)| (v, c))
                    .collect();
                (colors, shadow.split_node_heights(nbins))
            }
            ModelKind::Regressor => (BTreeMap::new(), BTreeMap::new()),
        };

        let y_range = value_range(shadow.y_train()).map_or((0.0, 1.0), |(lo, hi)| (lo * 1.03, hi * 1.03));

        Ok(Self {
            shadow,
            artifacts,
            config,
            target_name,
            class_colors,
            node_heights,
            leaf_counts: shadow.leaf_sample_counts(),
            y_range,
        })
    }

    /// Color of each observed class label.
    #[must_use]
    pub fn class_colors(&self) -> &BTreeMap<i64, Rgba> {
        &self.class_colors
    }

    /// Color of each model value column, looked up through its class label.
    /// Labels absent from the training targets get [`UNOBSERVED_CLASS_COLOR`].
    fn column_colors(&self, classes: &[i64], columns: usize) -> Vec<Rgba> {
        (0..columns)
            .map(|i| {
                let label = classes.get(i).copied().unwrap_or(i as i64);
                self.class_colors.get(&label).copied().unwrap_or(UNOBSERVED_CLASS_COLOR)
            })
            .collect()
    }

    /// Target axis range shared by every regressor plot.
    #[must_use]
    pub fn y_range(&self) -> (f32, f32) {
        self.y_range
    }

    /// Leaf disk diameter in inches.
    #[must_use]
    pub fn leaf_size(&self, node: &ShadowNode) -> f32 {
        leaf_disk_size(node.nsamples(), &self.leaf_counts)
    }

    /// Image of an internal node. `highlighted` nodes also mark the traced
    /// instance's feature value when an instance is configured.
    ///
    /// # Errors
    ///
    /// Returns I/O and metadata errors from writing the image.
    pub fn split(&self, node: &ShadowNode, highlighted: bool) -> Result<Artifact> {
        let (Some(feature), Some(threshold)) = (node.feature(), node.split()) else {
            return self.leaf(node);
        };
        let x = self.shadow.x_train();
        let range = x.column_range(feature).unwrap_or((0.0, 0.0));
        let name = self.shadow.feature_name(feature);
        let instance_value = if highlighted {
            self.config.instance.as_ref().and_then(|inst| inst.get(feature).copied())
        } else {
            None
        };

        let svg = match self.shadow.kind() {
            ModelKind::Classifier(info) => {
                let heights: Vec<f32> = self.node_heights.values().map(|&h| h as f32).collect();
                let own = self.node_heights.get(&node.id()).copied().unwrap_or(0) as f32;
                let mut hist = ClassSplitHistogram::new(name)
                    .range(range.0, range.1)
                    .bins(bin_count(self.config.histtype, info.n_classes())?)
                    .histtype(self.config.histtype)
                    .split(threshold)
                    .precision(self.config.precision)
                    .highlight(instance_value)
                    .height_inches(prop_size(own, &heights, CLASS_SPLIT_HEIGHT_RANGE));
                for (&class, &color) in &self.class_colors {
                    let values = node
                        .samples()
                        .iter()
                        .filter(|&&r| info.label(r) == class)
                        .map(|&r| x.get(r, feature))
                        .collect();
                    hist = hist.class_values(values, color);
                }
                hist.build()?.to_svg()
            }
            ModelKind::Regressor => {
                let y = self.shadow.y_train();
                let (left, right) = self.shadow.split_samples(node).unwrap_or((&[][..], &[][..]));
                let y_label = (node.id() == self.shadow.root().id()).then_some(self.target_name);
                RegrSplitScatter::new(name)
                    .points(&x.column_subset(feature, node.samples()), &select(y, node.samples()))
                    .x_range(range.0, range.1)
                    .y_range(self.y_range.0, self.y_range.1)
                    .split(threshold)
                    .child_means(mean(&select(y, left)), mean(&select(y, right)))
                    .y_label(y_label)
                    .precision(self.config.precision)
                    .highlight(instance_value)
                    .build()?
                    .to_svg()
            }
        };
        self.artifacts.write(self.artifacts.node_path(node.id()), &svg)
    }

    /// Image of a leaf.
    ///
    /// # Errors
    ///
    /// Returns I/O and metadata errors from writing the image, or
    /// [`crate::Error::EmptyData`] for a regressor leaf no training row reaches.
    pub fn leaf(&self, node: &ShadowNode) -> Result<Artifact> {
        let svg = match self.shadow.kind() {
            ModelKind::Classifier(info) => ClassLeafPie::new()
                .counts(node.value(), &self.column_colors(info.classes(), node.value().len()))
                .size_inches(self.leaf_size(node))
                .label(format!("n={}", node.nsamples()))
                .build()?
                .to_svg(),
            ModelKind::Regressor => RegrLeafStrip::new(&select(self.shadow.y_train(), node.samples()))
                .y_range(self.y_range.0, self.y_range.1)
                .target_name(self.target_name)
                .precision(self.config.precision)
                .seed(node.id() as u64)
                .build()?
                .to_svg(),
        };
        self.artifacts.write(self.artifacts.node_path(node.id()), &svg)
    }

    /// One swatch per observed class, in label order. Empty for regressors.
    ///
    /// # Errors
    ///
    /// Returns I/O and metadata errors from writing the images.
    pub fn legend(&self) -> Result<Vec<Artifact>> {
        self.class_colors
            .values()
            .enumerate()
            .map(|(i, &color)| {
                self.artifacts
                    .write(self.artifacts.legend_path(i), &LegendSwatch::new(color).to_svg())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::svg_shape;
    use crate::data::FeatureMatrix;
    use crate::tree::{TreeBuilder, TreeKind};

    fn classifier_fixture() -> (crate::tree::FittedTree, FeatureMatrix, Vec<f32>) {
        let x = FeatureMatrix::from_rows(&[[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]]).unwrap();
        let y = vec![0.0, 0.0, 0.0, 1.0, 1.0, 2.0];
        let mut b = TreeBuilder::new(TreeKind::Classifier { n_classes: 3 }, 1);
        b.add_split(0, 3.5, 1, 2, vec![3.0, 2.0, 1.0]);
        b.add_leaf(vec![3.0, 0.0, 0.0]);
        b.add_leaf(vec![0.0, 2.0, 1.0]);
        (b.build(), x, y)
    }

    #[test]
    fn test_classifier_images() {
        let (model, x, y) = classifier_fixture();
        let shadow = ShadowTree::new(&model, &x, &y, &["f"]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ArtifactDir::new(dir.path()).unwrap();
        let config = RenderConfig::default();
        let renderer = NodeRenderer::new(&shadow, &artifacts, &config, "species").unwrap();

        assert_eq!(renderer.class_colors().len(), 3);
        let split = renderer.split(shadow.root(), false).unwrap();
        assert_eq!(split.path, dir.path().join("node0.svg"));
        assert_eq!(svg_shape(&split.path).unwrap(), (split.width, split.height));

        let leaf = renderer.leaf(shadow.node(2)).unwrap();
        let content = std::fs::read_to_string(leaf.path).unwrap();
        assert_eq!(content.matches("<path").count(), 2);

        let legend = renderer.legend().unwrap();
        assert_eq!(legend.len(), 3);
        assert!(dir.path().join("legend2.svg").exists());
    }

    #[test]
    fn test_leaf_pie_matches_legend_when_a_class_is_unobserved() {
        let x = FeatureMatrix::from_rows(&[[1.0], [2.0], [3.0], [4.0]]).unwrap();
        let y = vec![0.0, 0.0, 2.0, 2.0];
        let mut b = TreeBuilder::new(TreeKind::Classifier { n_classes: 3 }, 1);
        b.add_split(0, 2.5, 1, 2, vec![2.0, 0.0, 2.0]);
        b.add_leaf(vec![2.0, 0.0, 0.0]);
        b.add_leaf(vec![0.0, 0.0, 2.0]);
        let model = b.build();
        let shadow = ShadowTree::new(&model, &x, &y, &["f"]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ArtifactDir::new(dir.path()).unwrap();
        let config = RenderConfig::default();
        let renderer = NodeRenderer::new(&shadow, &artifacts, &config, "t").unwrap();

        let class2 = renderer.class_colors()[&2].to_hex();
        let legend = renderer.legend().unwrap();
        let swatch = std::fs::read_to_string(&legend[1].path).unwrap();
        assert!(swatch.contains(&class2));

        let leaf = renderer.leaf(shadow.node(2)).unwrap();
        let pie = std::fs::read_to_string(&leaf.path).unwrap();
        assert!(pie.contains(&class2), "{pie}");

        let leaf = renderer.leaf(shadow.node(1)).unwrap();
        let pie = std::fs::read_to_string(&leaf.path).unwrap();
        assert!(pie.contains(&renderer.class_colors()[&0].to_hex()));
    }

    #[test]
    fn test_unsupported_class_count() {
        let x = FeatureMatrix::from_rows(&[[1.0]]).unwrap();
        let mut b = TreeBuilder::new(TreeKind::Classifier { n_classes: 11 }, 1);
        b.add_leaf(vec![1.0; 11]);
        let model = b.build();
        let shadow = ShadowTree::new(&model, &x, &[0.0], &["f"]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ArtifactDir::new(dir.path()).unwrap();
        let config = RenderConfig::default();
        assert!(matches!(
            NodeRenderer::new(&shadow, &artifacts, &config, "t"),
            Err(crate::Error::UnsupportedClassCount(11))
        ));
    }

    #[test]
    fn test_regressor_images_and_y_range() {
        let x = FeatureMatrix::from_rows(&[[1.0], [2.0], [3.0], [4.0]]).unwrap();
        let y = [10.0, 12.0, 30.0, 100.0];
        let mut b = TreeBuilder::new(TreeKind::Regressor, 1);
        b.add_split(0, 2.5, 1, 2, vec![38.0]);
        b.add_leaf(vec![11.0]);
        b.add_leaf(vec![65.0]);
        let model = b.build();
        let shadow = ShadowTree::new(&model, &x, &y, &["rm"]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ArtifactDir::new(dir.path()).unwrap();
        let config = RenderConfig::default().instance(vec![3.0]);
        let renderer = NodeRenderer::new(&shadow, &artifacts, &config, "price").unwrap();

        let (lo, hi) = renderer.y_range();
        assert!((lo - 10.3).abs() < 1e-3);
        assert!((hi - 103.0).abs() < 1e-3);

        let split = renderer.split(shadow.root(), true).unwrap();
        let content = std::fs::read_to_string(&split.path).unwrap();
        assert!(content.contains(">price</text>"));
        assert!(content.contains("#D67C03"));

        let leaf = renderer.leaf(shadow.node(1)).unwrap();
        let content = std::fs::read_to_string(&leaf.path).unwrap();
        assert!(content.contains(">price=11.0</text>"));
        assert!(renderer.legend().unwrap().is_empty());
    }
}

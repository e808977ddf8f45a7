//! Shadow tree: a traversal-friendly mirror of a fitted model.
//!
//! Construction validates the model against the training data, routes every
//! training row from the root to its leaf and records which rows reach each
//! node. After that the structure is immutable and every query is a lookup.

use std::collections::BTreeMap;

use log::trace;

use super::model::{TreeKind, TreeModel};
use crate::data::FeatureMatrix;
use crate::error::{Error, Result};
use crate::sizing::histogram_bin;

/// Split or leaf payload of a [`ShadowNode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    /// Internal node testing `x[feature] < threshold`.
    Split {
        /// Feature index tested.
        feature: usize,
        /// Split threshold.
        threshold: f32,
        /// Child id taken when the test holds.
        left: usize,
        /// Child id taken otherwise.
        right: usize,
    },
    /// Terminal node.
    Leaf,
}

/// One node of the shadow tree.
#[derive(Debug, Clone)]
pub struct ShadowNode {
    id: usize,
    kind: NodeKind,
    depth: usize,
    samples: Vec<usize>,
    value: Vec<f32>,
}

impl ShadowNode {
    /// Model node id.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Split or leaf payload.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Distance from the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether this is a terminal node.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    /// Split feature index (internal nodes only).
    #[must_use]
    pub fn feature(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Split { feature, .. } => Some(feature),
            NodeKind::Leaf => None,
        }
    }

    /// Split threshold (internal nodes only).
    #[must_use]
    pub fn split(&self) -> Option<f32> {
        match self.kind {
            NodeKind::Split { threshold, .. } => Some(threshold),
            NodeKind::Leaf => None,
        }
    }

    /// `(left, right)` child ids (internal nodes only).
    #[must_use]
    pub fn children(&self) -> Option<(usize, usize)> {
        match self.kind {
            NodeKind::Split { left, right, .. } => Some((left, right)),
            NodeKind::Leaf => None,
        }
    }

    /// Training row indices reaching this node, ascending.
    #[must_use]
    pub fn samples(&self) -> &[usize] {
        &self.samples
    }

    /// Number of training rows reaching this node.
    #[must_use]
    pub fn nsamples(&self) -> usize {
        self.samples.len()
    }

    /// The model's value for this node: per-class counts or `[mean]`.
    #[must_use]
    pub fn value(&self) -> &[f32] {
        &self.value
    }
}

/// Classifier-specific data, fixed at construction.
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    n_classes: usize,
    classes: Vec<i64>,
    unique_target_values: Vec<i64>,
    labels: Vec<i64>,
}

impl ClassifierInfo {
    /// Number of classes the model declares.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Sorted distinct labels observed in the training targets.
    #[must_use]
    pub fn unique_target_values(&self) -> &[i64] {
        &self.unique_target_values
    }

    /// Class label of each model value column.
    #[must_use]
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Training label of one row.
    #[must_use]
    pub fn label(&self, row: usize) -> i64 {
        self.labels[row]
    }
}

/// Model kind, inspected once at construction.
#[derive(Debug, Clone)]
pub enum ModelKind {
    /// Classification tree.
    Classifier(ClassifierInfo),
    /// Regression tree.
    Regressor,
}

/// What a leaf predicts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prediction {
    /// Predicted class label.
    Class(i64),
    /// Predicted value.
    Value(f32),
}

/// Node ids visited by one input vector, root first, leaf last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionPath {
    nodes: Vec<usize>,
    features_used: Vec<usize>,
}

impl DecisionPath {
    /// Visited node ids in order.
    #[must_use]
    pub fn node_ids(&self) -> &[usize] {
        &self.nodes
    }

    /// The leaf the vector reached.
    #[must_use]
    pub fn leaf(&self) -> usize {
        self.nodes[self.nodes.len() - 1]
    }

    /// Split features tested along the way (one per internal node, may repeat).
    #[must_use]
    pub fn features_used(&self) -> &[usize] {
        &self.features_used
    }

    /// Number of nodes on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a path contains at least the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the path visits `id`.
    #[must_use]
    pub fn contains(&self, id: usize) -> bool {
        self.nodes.contains(&id)
    }
}

/// Immutable traversal structure over a fitted tree and its training data.
#[derive(Debug)]
pub struct ShadowTree<'a, M: TreeModel + ?Sized> {
    model: &'a M,
    x_train: &'a FeatureMatrix,
    y_train: &'a [f32],
    feature_names: Vec<String>,
    kind: ModelKind,
    nodes: Vec<ShadowNode>,
    internal: Vec<usize>,
    leaves: Vec<usize>,
}

impl<'a, M: TreeModel + ?Sized> ShadowTree<'a, M> {
    /// Mirror `model` over its training data.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidModel`] if the model is unfitted or its nodes do not
    ///   form a tree rooted at 0.
    /// - [`Error::ShapeMismatch`] if rows, targets, names or model features disagree.
    /// - [`Error::EmptyData`] if there are no training rows.
    /// - [`Error::InvalidTarget`] if a classifier target is not an integral label.
    pub fn new<S: AsRef<str>>(
        model: &'a M,
        x_train: &'a FeatureMatrix,
        y_train: &'a [f32],
        feature_names: &[S],
    ) -> Result<Self> {
        if !model.is_fitted() {
            return Err(Error::InvalidModel("model has not been fitted".to_string()));
        }
        if y_train.len() != x_train.n_rows() {
            return Err(Error::ShapeMismatch {
                what: "target rows",
                expected: x_train.n_rows(),
                actual: y_train.len(),
            });
        }
        if feature_names.len() != x_train.n_cols() {
            return Err(Error::ShapeMismatch {
                what: "feature names",
                expected: x_train.n_cols(),
                actual: feature_names.len(),
            });
        }
        if model.n_features() != x_train.n_cols() {
            return Err(Error::ShapeMismatch {
                what: "model features",
                expected: x_train.n_cols(),
                actual: model.n_features(),
            });
        }
        if x_train.is_empty() {
            return Err(Error::EmptyData);
        }

        let kind = match model.kind() {
            TreeKind::Regressor => ModelKind::Regressor,
            TreeKind::Classifier { n_classes } => {
                ModelKind::Classifier(classifier_info(model, n_classes, y_train)?)
            }
        };

        let nodes = route_samples(model, x_train)?;
        let internal = nodes.iter().filter(|n| !n.is_leaf()).map(ShadowNode::id).collect();
        let leaves = nodes.iter().filter(|n| n.is_leaf()).map(ShadowNode::id).collect();

        Ok(Self {
            model,
            x_train,
            y_train,
            feature_names: feature_names.iter().map(|s| s.as_ref().to_string()).collect(),
            kind,
            nodes,
            internal,
            leaves,
        })
    }

    /// The wrapped model.
    #[must_use]
    pub fn model(&self) -> &'a M {
        self.model
    }

    /// Training features.
    #[must_use]
    pub fn x_train(&self) -> &'a FeatureMatrix {
        self.x_train
    }

    /// Training targets.
    #[must_use]
    pub fn y_train(&self) -> &'a [f32] {
        self.y_train
    }

    /// Classifier or regressor data.
    #[must_use]
    pub fn kind(&self) -> &ModelKind {
        &self.kind
    }

    /// Whether the model is a classifier.
    #[must_use]
    pub fn is_classifier(&self) -> bool {
        matches!(self.kind, ModelKind::Classifier(_))
    }

    /// Declared class count; 0 for regressors.
    #[must_use]
    pub fn nclasses(&self) -> usize {
        match &self.kind {
            ModelKind::Classifier(info) => info.n_classes,
            ModelKind::Regressor => 0,
        }
    }

    /// Sorted distinct training labels; empty for regressors.
    #[must_use]
    pub fn unique_target_values(&self) -> &[i64] {
        match &self.kind {
            ModelKind::Classifier(info) => &info.unique_target_values,
            ModelKind::Regressor => &[],
        }
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> &ShadowNode {
        &self.nodes[0]
    }

    /// Node by id. Panics if the id is not in the tree.
    #[must_use]
    pub fn node(&self, id: usize) -> &ShadowNode {
        &self.nodes[id]
    }

    /// Node by id, `None` if out of range.
    #[must_use]
    pub fn get(&self, id: usize) -> Option<&ShadowNode> {
        self.nodes.get(id)
    }

    /// Total node count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false once constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Internal nodes in model id order.
    pub fn internal(&self) -> impl Iterator<Item = &ShadowNode> + '_ {
        self.internal.iter().map(move |&id| &self.nodes[id])
    }

    /// Leaves in model id order.
    pub fn leaves(&self) -> impl Iterator<Item = &ShadowNode> + '_ {
        self.leaves.iter().map(move |&id| &self.nodes[id])
    }

    /// Sample count of every leaf, in leaf order.
    #[must_use]
    pub fn leaf_sample_counts(&self) -> Vec<usize> {
        self.leaves().map(ShadowNode::nsamples).collect()
    }

    /// Display name of a feature.
    #[must_use]
    pub fn feature_name(&self, feature: usize) -> &str {
        &self.feature_names[feature]
    }

    /// All feature names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Sample sets of an internal node's two children.
    #[must_use]
    pub fn split_samples(&self, node: &ShadowNode) -> Option<(&[usize], &[usize])> {
        let (left, right) = node.children()?;
        Some((self.nodes[left].samples(), self.nodes[right].samples()))
    }

    /// What a node predicts: arg-max class for classifiers, the node value for regressors.
    #[must_use]
    pub fn prediction(&self, node: &ShadowNode) -> Prediction {
        match &self.kind {
            ModelKind::Classifier(info) => {
                let best = argmax(node.value());
                Prediction::Class(info.classes.get(best).copied().unwrap_or(best as i64))
            }
            ModelKind::Regressor => Prediction::Value(node.value().first().copied().unwrap_or(f32::NAN)),
        }
    }

    /// Run `x` down the tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TraceVectorLengthMismatch`] if `x` does not have one
    /// value per feature.
    pub fn predict(&self, x: &[f32]) -> Result<(Prediction, DecisionPath)> {
        let expected = self.x_train.n_cols();
        if x.len() != expected {
            return Err(Error::TraceVectorLengthMismatch {
                expected,
                actual: x.len(),
            });
        }

        let mut nodes = Vec::new();
        let mut features_used = Vec::new();
        let mut id = 0;
        loop {
            nodes.push(id);
            match self.nodes[id].kind {
                NodeKind::Leaf => break,
                NodeKind::Split { feature, threshold, left, right } => {
                    features_used.push(feature);
                    id = if x[feature] < threshold { left } else { right };
                }
            }
        }
        trace!("instance reached leaf {id} via {nodes:?}");

        let prediction = self.prediction(&self.nodes[id]);
        Ok((prediction, DecisionPath { nodes, features_used }))
    }

    /// Tallest histogram bin of each internal node's samples on its split
    /// feature, binned over the feature's global range with `nbins` bins.
    #[must_use]
    pub fn split_node_heights(&self, nbins: usize) -> BTreeMap<usize, usize> {
        self.internal()
            .map(|node| {
                let Some(feature) = node.feature() else {
                    return (node.id, 0);
                };
                let range = self.x_train.column_range(feature).unwrap_or((0.0, 0.0));
                let mut counts = vec![0usize; nbins.max(1)];
                for &row in node.samples() {
                    counts[histogram_bin(self.x_train.get(row, feature), range, nbins)] += 1;
                }
                (node.id, counts.into_iter().max().unwrap_or(0))
            })
            .collect()
    }
}

fn classifier_info<M: TreeModel + ?Sized>(
    model: &M,
    n_classes: usize,
    y_train: &[f32],
) -> Result<ClassifierInfo> {
    let mut labels = Vec::with_capacity(y_train.len());
    for (index, &value) in y_train.iter().enumerate() {
        if !value.is_finite() || value.fract() != 0.0 {
            return Err(Error::InvalidTarget { index, value });
        }
        labels.push(value as i64);
    }

    let mut unique_target_values = labels.clone();
    unique_target_values.sort_unstable();
    unique_target_values.dedup();

    if unique_target_values.len() > n_classes {
        return Err(Error::InvalidModel(format!(
            "training targets contain {} classes, model declares {n_classes}",
            unique_target_values.len()
        )));
    }

    Ok(ClassifierInfo {
        n_classes,
        classes: model.classes().to_vec(),
        unique_target_values,
        labels,
    })
}

/// Walk the model from the root, checking it is a proper tree, and hand every
/// training row down to its leaf.
fn route_samples<M: TreeModel + ?Sized>(model: &M, x: &FeatureMatrix) -> Result<Vec<ShadowNode>> {
    let count = model.node_count();
    let mut slots: Vec<Option<ShadowNode>> = vec![None; count];
    let mut stack = vec![(0usize, 0usize, (0..x.n_rows()).collect::<Vec<_>>())];

    while let Some((id, depth, samples)) = stack.pop() {
        if id >= count {
            return Err(Error::InvalidModel(format!("child id {id} out of range ({count} nodes)")));
        }
        if slots[id].is_some() {
            return Err(Error::InvalidModel(format!("node {id} is reachable twice")));
        }

        let kind = if model.is_leaf(id) {
            NodeKind::Leaf
        } else {
            let feature = model.split_feature(id);
            if feature >= x.n_cols() {
                return Err(Error::InvalidModel(format!(
                    "node {id} splits on feature {feature}, data has {}",
                    x.n_cols()
                )));
            }
            let threshold = model.split_threshold(id);
            let (left, right) = (model.left_child(id), model.right_child(id));
            let (go_left, go_right): (Vec<usize>, Vec<usize>) =
                samples.iter().partition(|&&r| x.get(r, feature) < threshold);
            stack.push((right, depth + 1, go_right));
            stack.push((left, depth + 1, go_left));
            NodeKind::Split { feature, threshold, left, right }
        };

        slots[id] = Some(ShadowNode {
            id,
            kind,
            depth,
            samples,
            value: model.node_value(id).to_vec(),
        });
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(id, slot)| {
            slot.ok_or_else(|| Error::InvalidModel(format!("node {id} is not reachable from the root")))
        })
        .collect()
}

fn argmax(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(bi, bv), (i, &v)| if v > bv { (i, v) } else { (bi, bv) })
        .0
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::tree::TreeBuilder;
    use proptest::prelude::*;

    /// Median splits on rotating features down to `depth`.
    fn grow(b: &mut TreeBuilder, x: &FeatureMatrix, rows: &[usize], depth: usize, max_depth: usize) -> usize {
        let feature = depth % x.n_cols();
        let mut values: Vec<f32> = rows.iter().map(|&r| x.get(r, feature)).collect();
        values.sort_by(f32::total_cmp);
        let threshold = values.get(values.len() / 2).copied().unwrap_or(0.0);
        if depth >= max_depth || rows.len() < 2 {
            return b.add_leaf(vec![rows.len() as f32]);
        }
        let id = b.add_split(feature, threshold, 0, 0, vec![rows.len() as f32]);
        let (l, r): (Vec<usize>, Vec<usize>) = rows.iter().partition(|&&i| x.get(i, feature) < threshold);
        let left = grow(b, x, &l, depth + 1, max_depth);
        let right = grow(b, x, &r, depth + 1, max_depth);
        b.set_children(id, left, right);
        id
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_every_sample_in_exactly_one_leaf(
            rows in prop::collection::vec(prop::collection::vec(-100.0f32..100.0, 3), 1..60),
            max_depth in 0usize..5,
        ) {
            let x = FeatureMatrix::from_rows(&rows).unwrap();
            let y = vec![0.0; x.n_rows()];
            let mut b = TreeBuilder::new(TreeKind::Regressor, 3);
            let all: Vec<usize> = (0..x.n_rows()).collect();
            grow(&mut b, &x, &all, 0, max_depth);
            let model = b.build();
            let shadow = ShadowTree::new(&model, &x, &y, &["a", "b", "c"]).unwrap();

            prop_assert_eq!(shadow.root().samples(), &all[..]);
            let mut seen = vec![0usize; x.n_rows()];
            for leaf in shadow.leaves() {
                for &s in leaf.samples() {
                    seen[s] += 1;
                }
            }
            prop_assert!(seen.iter().all(|&c| c == 1));

            for node in shadow.internal() {
                let (l, r) = shadow.split_samples(node).unwrap();
                let mut joined: Vec<usize> = l.iter().chain(r).copied().collect();
                joined.sort_unstable();
                prop_assert_eq!(joined, node.samples().to_vec());
            }
        }

        #[test]
        fn prop_path_alternates_internal_then_leaf(
            rows in prop::collection::vec(prop::collection::vec(-10.0f32..10.0, 3), 2..40),
            sample in prop::collection::vec(-12.0f32..12.0, 3),
        ) {
            let x = FeatureMatrix::from_rows(&rows).unwrap();
            let y = vec![1.0; x.n_rows()];
            let mut b = TreeBuilder::new(TreeKind::Regressor, 3);
            let all: Vec<usize> = (0..x.n_rows()).collect();
            grow(&mut b, &x, &all, 0, 3);
            let model = b.build();
            let shadow = ShadowTree::new(&model, &x, &y, &["a", "b", "c"]).unwrap();

            let (_, path) = shadow.predict(&sample).unwrap();
            let ids = path.node_ids();
            prop_assert_eq!(ids[0], 0);
            prop_assert!(shadow.node(path.leaf()).is_leaf());
            for pair in ids.windows(2) {
                let node = shadow.node(pair[0]);
                prop_assert!(!node.is_leaf());
                let (l, r) = node.children().unwrap();
                let expected = if sample[node.feature().unwrap()] < node.split().unwrap() { l } else { r };
                prop_assert_eq!(pair[1], expected);
            }
        }
    }
}

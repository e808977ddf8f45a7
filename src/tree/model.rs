//! Read-only view of a fitted decision tree.
//!
//! The renderer never trains anything. It consumes whatever model library
//! produced the tree through [`TreeModel`], which mirrors the flat per-node
//! arrays most CART implementations expose. [`FittedTree`] is a ready-made
//! structure-of-arrays implementation for callers that convert their own
//! model once.

/// What the model predicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKind {
    /// Predicts one of `n_classes` class labels.
    Classifier {
        /// Number of classes the model was fitted with.
        n_classes: usize,
    },
    /// Predicts a single continuous value.
    Regressor,
}

/// Node-level access to a fitted single-output tree.
///
/// Node ids are `0..node_count()` with the root at 0. Samples go left when
/// `x[split_feature] < split_threshold`.
pub trait TreeModel {
    /// Classifier or regressor.
    fn kind(&self) -> TreeKind;

    /// Number of nodes; 0 means the model was never fitted.
    fn node_count(&self) -> usize;

    /// Number of input features the model was fitted on.
    fn n_features(&self) -> usize;

    /// Whether `node` is terminal.
    fn is_leaf(&self, node: usize) -> bool;

    /// Feature index tested at an internal node.
    fn split_feature(&self, node: usize) -> usize;

    /// Threshold tested at an internal node.
    fn split_threshold(&self, node: usize) -> f32;

    /// Child taken when `x[feature] < threshold`.
    fn left_child(&self, node: usize) -> usize;

    /// Child taken otherwise.
    fn right_child(&self, node: usize) -> usize;

    /// Per-class sample counts (classifier) or `[mean target]` (regressor).
    fn node_value(&self, node: usize) -> &[f32];

    /// Class label of each column in [`TreeModel::node_value`]; empty for regressors.
    fn classes(&self) -> &[i64];

    /// Whether the model carries a tree at all.
    fn is_fitted(&self) -> bool {
        self.node_count() > 0
    }
}

/// Structure-of-arrays tree storage implementing [`TreeModel`].
#[derive(Debug, Clone)]
pub struct FittedTree {
    kind: TreeKind,
    n_features: usize,
    classes: Vec<i64>,
    split_features: Box<[usize]>,
    split_thresholds: Box<[f32]>,
    left_children: Box<[usize]>,
    right_children: Box<[usize]>,
    is_leaf: Box<[bool]>,
    values: Box<[Vec<f32>]>,
}

impl FittedTree {
    /// A model that was constructed but never trained.
    #[must_use]
    pub fn unfitted(kind: TreeKind, n_features: usize) -> Self {
        TreeBuilder::new(kind, n_features).build()
    }

    /// Maximum root-to-leaf depth (root alone is depth 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.is_leaf.is_empty() {
            return 0;
        }
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if !self.is_leaf[node] {
                stack.push((self.left_children[node], depth + 1));
                stack.push((self.right_children[node], depth + 1));
            }
        }
        deepest
    }
}

impl TreeModel for FittedTree {
    fn kind(&self) -> TreeKind {
        self.kind
    }

    fn node_count(&self) -> usize {
        self.is_leaf.len()
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    #[inline]
    fn is_leaf(&self, node: usize) -> bool {
        self.is_leaf[node]
    }

    #[inline]
    fn split_feature(&self, node: usize) -> usize {
        self.split_features[node]
    }

    #[inline]
    fn split_threshold(&self, node: usize) -> f32 {
        self.split_thresholds[node]
    }

    #[inline]
    fn left_child(&self, node: usize) -> usize {
        self.left_children[node]
    }

    #[inline]
    fn right_child(&self, node: usize) -> usize {
        self.right_children[node]
    }

    fn node_value(&self, node: usize) -> &[f32] {
        &self.values[node]
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }
}

/// Incremental constructor for [`FittedTree`].
///
/// Nodes get ids in insertion order. Child ids passed to
/// [`TreeBuilder::add_split`] may refer to nodes added later.
#[derive(Debug)]
pub struct TreeBuilder {
    kind: TreeKind,
    n_features: usize,
    classes: Vec<i64>,
    split_features: Vec<usize>,
    split_thresholds: Vec<f32>,
    left_children: Vec<usize>,
    right_children: Vec<usize>,
    is_leaf: Vec<bool>,
    values: Vec<Vec<f32>>,
}

impl TreeBuilder {
    /// Start an empty tree. Classifier labels default to `0..n_classes`.
    #[must_use]
    pub fn new(kind: TreeKind, n_features: usize) -> Self {
        let classes = match kind {
            TreeKind::Classifier { n_classes } => (0..n_classes as i64).collect(),
            TreeKind::Regressor => Vec::new(),
        };
        Self {
            kind,
            n_features,
            classes,
            split_features: Vec::new(),
            split_thresholds: Vec::new(),
            left_children: Vec::new(),
            right_children: Vec::new(),
            is_leaf: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Override the class label of each value column.
    #[must_use]
    pub fn classes(mut self, classes: Vec<i64>) -> Self {
        self.classes = classes;
        self
    }

    /// Id the next added node will get.
    #[must_use]
    pub fn next_id(&self) -> usize {
        self.is_leaf.len()
    }

    /// Add a split node. Returns the node id.
    pub fn add_split(
        &mut self,
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        value: Vec<f32>,
    ) -> usize {
        let id = self.next_id();
        self.split_features.push(feature);
        self.split_thresholds.push(threshold);
        self.left_children.push(left);
        self.right_children.push(right);
        self.is_leaf.push(false);
        self.values.push(value);
        id
    }

    /// Add a leaf node. Returns the node id.
    pub fn add_leaf(&mut self, value: Vec<f32>) -> usize {
        let id = self.next_id();
        self.split_features.push(0);
        self.split_thresholds.push(0.0);
        self.left_children.push(0);
        self.right_children.push(0);
        self.is_leaf.push(true);
        self.values.push(value);
        id
    }

    /// Rewire the children of an already added split node.
    pub fn set_children(&mut self, node: usize, left: usize, right: usize) {
        self.left_children[node] = left;
        self.right_children[node] = right;
    }

    /// Finish the tree.
    #[must_use]
    pub fn build(self) -> FittedTree {
        FittedTree {
            kind: self.kind,
            n_features: self.n_features,
            classes: self.classes,
            split_features: self.split_features.into_boxed_slice(),
            split_thresholds: self.split_thresholds.into_boxed_slice(),
            left_children: self.left_children.into_boxed_slice(),
            right_children: self.right_children.into_boxed_slice(),
            is_leaf: self.is_leaf.into_boxed_slice(),
            values: self.values.into_boxed_slice(),
        }
    }
}

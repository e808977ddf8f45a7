//! Fitted-tree input contract and the shadow traversal structure built over it.

mod model;
mod shadow;

pub use model::{FittedTree, TreeBuilder, TreeKind, TreeModel};
pub use shadow::{
    ClassifierInfo, DecisionPath, ModelKind, NodeKind, Prediction, ShadowNode, ShadowTree,
};

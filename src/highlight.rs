//! Which nodes and edges are drawn in the highlight color.

use std::collections::BTreeSet;

use crate::config::RenderConfig;
use crate::error::Result;
use crate::tree::{DecisionPath, Prediction, ShadowTree, TreeModel};

/// Highlighted node ids, plus the decision path when an instance is traced.
#[derive(Debug, Clone, Default)]
pub struct HighlightSet {
    ids: BTreeSet<usize>,
    trace: Option<(Prediction, DecisionPath)>,
}

impl HighlightSet {
    /// Resolve the highlight for one render.
    ///
    /// A configured instance wins: exactly its decision path is highlighted
    /// and the explicit id list is ignored. Otherwise the explicit ids are
    /// taken verbatim; they need not form a path.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::TraceVectorLengthMismatch`] if the instance
    /// does not have one value per feature.
    pub fn resolve<M: TreeModel + ?Sized>(shadow: &ShadowTree<'_, M>, config: &RenderConfig) -> Result<Self> {
        match &config.instance {
            Some(x) => {
                let (prediction, path) = shadow.predict(x)?;
                Ok(Self {
                    ids: path.node_ids().iter().copied().collect(),
                    trace: Some((prediction, path)),
                })
            }
            None => Ok(Self {
                ids: config.highlight_path.iter().copied().collect(),
                trace: None,
            }),
        }
    }

    /// Whether node `id` is highlighted.
    #[must_use]
    pub fn contains(&self, id: usize) -> bool {
        self.ids.contains(&id)
    }

    /// Whether nothing is highlighted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Highlighted ids, ascending.
    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.ids.iter().copied()
    }

    /// Prediction and path of the traced instance.
    #[must_use]
    pub fn trace(&self) -> Option<&(Prediction, DecisionPath)> {
        self.trace.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FeatureMatrix;
    use crate::tree::{TreeBuilder, TreeKind};
    use crate::Error;

    fn fixture() -> (crate::tree::FittedTree, FeatureMatrix, Vec<f32>) {
        let x = FeatureMatrix::from_rows(&[[1.0, 0.0], [2.0, 5.0], [3.0, 0.0], [4.0, 5.0]]).unwrap();
        let y = vec![1.0, 2.0, 3.0, 4.0];
        let mut b = TreeBuilder::new(TreeKind::Regressor, 2);
        b.add_split(0, 2.5, 1, 4, vec![2.5]);
        b.add_split(1, 2.5, 2, 3, vec![1.5]);
        b.add_leaf(vec![1.0]);
        b.add_leaf(vec![2.0]);
        b.add_leaf(vec![3.5]);
        (b.build(), x, y)
    }

    #[test]
    fn test_instance_path_overrides_ids() {
        let (model, x, y) = fixture();
        let shadow = ShadowTree::new(&model, &x, &y, &["a", "b"]).unwrap();
        let config = RenderConfig::default().highlight_path(vec![4]).instance(vec![2.0, 5.0]);
        let set = HighlightSet::resolve(&shadow, &config).unwrap();

        assert_eq!(set.ids().collect::<Vec<_>>(), vec![0, 1, 3]);
        assert!(!set.contains(4));
        let (prediction, path) = set.trace().unwrap();
        assert_eq!(*prediction, Prediction::Value(2.0));
        assert_eq!(path.leaf(), 3);
    }

    #[test]
    fn test_explicit_ids_verbatim() {
        let (model, x, y) = fixture();
        let shadow = ShadowTree::new(&model, &x, &y, &["a", "b"]).unwrap();
        let config = RenderConfig::default().highlight_path(vec![2, 4, 99]);
        let set = HighlightSet::resolve(&shadow, &config).unwrap();

        assert!(set.contains(2) && set.contains(4) && set.contains(99));
        assert!(!set.contains(0));
        assert!(set.trace().is_none());
    }

    #[test]
    fn test_empty_by_default() {
        let (model, x, y) = fixture();
        let shadow = ShadowTree::new(&model, &x, &y, &["a", "b"]).unwrap();
        let set = HighlightSet::resolve(&shadow, &RenderConfig::default()).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_bad_instance_length() {
        let (model, x, y) = fixture();
        let shadow = ShadowTree::new(&model, &x, &y, &["a", "b"]).unwrap();
        let config = RenderConfig::default().instance(vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            HighlightSet::resolve(&shadow, &config),
            Err(Error::TraceVectorLengthMismatch { expected: 2, actual: 3 })
        ));
    }
}

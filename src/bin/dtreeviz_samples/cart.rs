//! Minimal CART fitter: Gini impurity for classifiers, squared error for
//! regressors, grown greedily to a maximum depth.

use trueno_treeviz::data::FeatureMatrix;
use trueno_treeviz::tree::{FittedTree, TreeBuilder, TreeKind};

/// Best split found for one node.
#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f32,
    cost: f32,
}

/// Fit a tree of at most `max_depth` splits from root to leaf.
pub(crate) fn fit(x: &FeatureMatrix, y: &[f32], kind: TreeKind, max_depth: usize) -> FittedTree {
    let mut builder = TreeBuilder::new(kind, x.n_cols());
    let rows: Vec<usize> = (0..x.n_rows()).collect();
    grow(&mut builder, x, y, kind, &rows, max_depth);
    builder.build()
}

fn grow(builder: &mut TreeBuilder, x: &FeatureMatrix, y: &[f32], kind: TreeKind, rows: &[usize], depth_left: usize) -> usize {
    let value = node_value(y, rows, kind);
    let split = if depth_left > 0 { best_split(x, y, kind, rows) } else { None };
    let Some(split) = split else {
        return builder.add_leaf(value);
    };

    let id = builder.add_split(split.feature, split.threshold, 0, 0, value);
    let (left, right): (Vec<usize>, Vec<usize>) =
        rows.iter().partition(|&&r| x.get(r, split.feature) < split.threshold);
    let l = grow(builder, x, y, kind, &left, depth_left - 1);
    let r = grow(builder, x, y, kind, &right, depth_left - 1);
    builder.set_children(id, l, r);
    id
}

/// Class counts for classifiers, `[mean]` for regressors.
fn node_value(y: &[f32], rows: &[usize], kind: TreeKind) -> Vec<f32> {
    match kind {
        TreeKind::Classifier { n_classes } => {
            let mut counts = vec![0.0; n_classes];
            for &r in rows {
                if let Some(c) = counts.get_mut(y[r] as usize) {
                    *c += 1.0;
                }
            }
            counts
        }
        TreeKind::Regressor => {
            let sum: f32 = rows.iter().map(|&r| y[r]).sum();
            vec![sum / rows.len().max(1) as f32]
        }
    }
}

fn gini(counts: &[f32], n: f32) -> f32 {
    if n == 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|c| (c / n) * (c / n)).sum::<f32>()
}

/// Weighted impurity of a partition given running statistics of each side.
enum Side {
    Counts(Vec<f32>),
    Moments { sum: f64, sum_sq: f64 },
}

impl Side {
    fn empty(kind: TreeKind) -> Self {
        match kind {
            TreeKind::Classifier { n_classes } => Self::Counts(vec![0.0; n_classes]),
            TreeKind::Regressor => Self::Moments { sum: 0.0, sum_sq: 0.0 },
        }
    }

    fn add(&mut self, y: f32, sign: f32) {
        match self {
            Self::Counts(counts) => {
                if let Some(c) = counts.get_mut(y as usize) {
                    *c += sign;
                }
            }
            Self::Moments { sum, sum_sq } => {
                *sum += f64::from(sign * y);
                *sum_sq += f64::from(sign * y * y);
            }
        }
    }

    /// Impurity times sample count.
    fn cost(&self, n: usize) -> f32 {
        if n == 0 {
            return 0.0;
        }
        match self {
            Self::Counts(counts) => gini(counts, n as f32) * n as f32,
            Self::Moments { sum, sum_sq } => (sum_sq - sum * sum / n as f64).max(0.0) as f32,
        }
    }
}

fn best_split(x: &FeatureMatrix, y: &[f32], kind: TreeKind, rows: &[usize]) -> Option<Split> {
    let mut parent = Side::empty(kind);
    for &r in rows {
        parent.add(y[r], 1.0);
    }
    let parent_cost = parent.cost(rows.len());
    let mut best: Option<Split> = None;

    for feature in 0..x.n_cols() {
        let mut sorted = rows.to_vec();
        sorted.sort_by(|&a, &b| x.get(a, feature).total_cmp(&x.get(b, feature)));

        let mut left = Side::empty(kind);
        let mut right = Side::empty(kind);
        for &r in &sorted {
            right.add(y[r], 1.0);
        }

        for i in 1..sorted.len() {
            let moved = sorted[i - 1];
            left.add(y[moved], 1.0);
            right.add(y[moved], -1.0);

            let (lo, hi) = (x.get(moved, feature), x.get(sorted[i], feature));
            if hi <= lo {
                continue;
            }
            let cost = left.cost(i) + right.cost(sorted.len() - i);
            if cost + 1e-6 < parent_cost && best.map_or(true, |b| cost < b.cost) {
                let mid = lo + (hi - lo) / 2.0;
                let threshold = if mid > lo { mid } else { hi };
                best = Some(Split { feature, threshold, cost });
            }
        }
    }
    best
}

//! Sizing and binning heuristics shared by the node plots.
//!
//! All functions here are pure. Node images are scaled relative to their
//! siblings so that bigger nodes read as bigger at a glance.

use crate::config::HistType;
use crate::error::{Error, Result};

/// Histogram bin count per class count for side-by-side bars.
///
/// Fewer bins as the class count grows keeps the bars legible.
pub const NUM_BINS: [usize; 11] = [0, 0, 10, 9, 8, 6, 6, 6, 5, 5, 5];

/// Largest class count the calibration tables cover.
pub const MAX_CLASSES: usize = NUM_BINS.len() - 1;

/// Rescale `n` linearly from `[min(counts), max(counts)]` into `output_range`.
///
/// Returns `output_range.0` when `counts` is empty or all counts are equal.
#[must_use]
pub fn prop_size(n: f32, counts: &[f32], output_range: (f32, f32)) -> f32 {
    let lo = counts.iter().copied().fold(f32::INFINITY, f32::min);
    let hi = counts.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let span = hi - lo;
    if !span.is_finite() || span <= 0.0 {
        return output_range.0;
    }
    let (out_lo, out_hi) = output_range;
    (n - lo) / span * (out_hi - out_lo) + out_lo
}

/// Histogram bins for a classifier with `n_classes` classes.
///
/// # Errors
///
/// Returns [`Error::UnsupportedClassCount`] above [`MAX_CLASSES`].
pub fn bin_count(hist_type: HistType, n_classes: usize) -> Result<usize> {
    let bins = *NUM_BINS
        .get(n_classes)
        .ok_or(Error::UnsupportedClassCount(n_classes))?;
    Ok(match hist_type {
        HistType::Bar => bins,
        HistType::BarStacked => bins * 2,
    })
}

/// Diameter in inches of a leaf disk holding `n` samples, relative to all
/// leaf sample counts.
#[must_use]
pub fn leaf_disk_size(n: usize, leaf_counts: &[usize]) -> f32 {
    let counts: Vec<f32> = leaf_counts.iter().map(|&c| c as f32).collect();
    prop_size(n as f32, &counts, (1.01, 2.7)).ln().sqrt()
}

/// Bin index of `value` for `nbins` equal-width bins over `range`.
///
/// Values at or beyond the upper edge land in the last bin; a degenerate
/// range puts everything in bin 0.
#[must_use]
pub fn histogram_bin(value: f32, range: (f32, f32), nbins: usize) -> usize {
    let (lo, hi) = range;
    let width = (hi - lo) / nbins as f32;
    if nbins == 0 || width.is_nan() || width <= 0.0 || !value.is_finite() {
        return 0;
    }
    (((value - lo) / width).floor().max(0.0) as usize).min(nbins - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_prop_size_linear() {
        assert_relative_eq!(prop_size(5.0, &[0.0, 10.0], (0.5, 1.5)), 1.0);
        assert_relative_eq!(prop_size(0.0, &[0.0, 10.0], (0.5, 1.5)), 0.5);
        assert_relative_eq!(prop_size(10.0, &[0.0, 10.0], (0.5, 1.5)), 1.5);
    }

    #[test]
    fn test_prop_size_equal_counts() {
        assert_relative_eq!(prop_size(7.0, &[7.0, 7.0, 7.0], (1.01, 2.7)), 1.01);
        assert_relative_eq!(prop_size(3.0, &[], (0.5, 1.5)), 0.5);
    }

    #[test]
    fn test_bin_count_table() {
        assert_eq!(bin_count(HistType::Bar, 2).unwrap(), 10);
        assert_eq!(bin_count(HistType::Bar, 3).unwrap(), 9);
        assert_eq!(bin_count(HistType::Bar, 10).unwrap(), 5);
        assert_eq!(bin_count(HistType::BarStacked, 3).unwrap(), 18);
    }

    #[test]
    fn test_bin_count_stacked_doubles() {
        for k in 0..=MAX_CLASSES {
            assert_eq!(
                bin_count(HistType::BarStacked, k).unwrap(),
                2 * bin_count(HistType::Bar, k).unwrap()
            );
        }
    }

    #[test]
    fn test_bin_count_unsupported() {
        assert!(matches!(
            bin_count(HistType::Bar, 11),
            Err(Error::UnsupportedClassCount(11))
        ));
    }

    #[test]
    fn test_leaf_disk_size() {
        let counts = [10, 50, 100];
        let small = leaf_disk_size(10, &counts);
        let large = leaf_disk_size(100, &counts);
        assert_relative_eq!(small, 1.01f32.ln().sqrt(), epsilon = 1e-5);
        assert_relative_eq!(large, 2.7f32.ln().sqrt(), epsilon = 1e-5);
        assert!(small < leaf_disk_size(50, &counts));
    }

    #[test]
    fn test_histogram_bin_edges() {
        assert_eq!(histogram_bin(0.0, (0.0, 10.0), 5), 0);
        assert_eq!(histogram_bin(1.99, (0.0, 10.0), 5), 0);
        assert_eq!(histogram_bin(2.0, (0.0, 10.0), 5), 1);
        assert_eq!(histogram_bin(10.0, (0.0, 10.0), 5), 4);
        assert_eq!(histogram_bin(3.0, (3.0, 3.0), 5), 0);
        assert_eq!(histogram_bin(3.0, (0.0, 10.0), 0), 0);
    }
}

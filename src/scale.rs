//! Scale functions for data-to-plot mappings.
//!
//! Node plots share axes across the whole tree (global feature ranges, one
//! target range), so a scale is built once per axis and reused.

/// Trait for scale functions that map domain values to range values.
pub trait Scale<D, R> {
    /// Transform a domain value to a range value.
    fn scale(&self, value: D) -> R;

    /// Get the domain extent.
    fn domain(&self) -> (D, D);

    /// Get the range extent.
    fn range(&self) -> (R, R);
}

/// Linear scale for continuous-to-continuous mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_min: f32,
    domain_max: f32,
    range_min: f32,
    range_max: f32,
}

impl LinearScale {
    /// Create a new linear scale.
    ///
    /// A degenerate domain (constant feature, single target value) is widened
    /// by half a unit on each side so every value maps to the middle of the range.
    #[must_use]
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Self {
        let (mut lo, mut hi) = domain;
        if !lo.is_finite() || !hi.is_finite() {
            (lo, hi) = (0.0, 1.0);
        } else if (hi - lo).abs() < f32::EPSILON {
            (lo, hi) = (lo - 0.5, hi + 0.5);
        }
        Self {
            domain_min: lo,
            domain_max: hi,
            range_min: range.0,
            range_max: range.1,
        }
    }

}

impl Scale<f32, f32> for LinearScale {
    fn scale(&self, value: f32) -> f32 {
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    fn domain(&self) -> (f32, f32) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (f32, f32) {
        (self.range_min, self.range_max)
    }
}

//! Jittered target strip for regressor leaves.

use super::axes::{round_label, rounded, PlotArea, LABEL_FONT};
use crate::color::{GREY, SCATTER_COLOR};
use crate::data::mean;
use crate::error::{Error, Result};
use crate::output::{SvgEncoder, TextAnchor, PT_PER_INCH};
use crate::random::SeededRng;
use crate::scale::Scale;

/// Figure size in inches.
pub const REGR_LEAF_SIZE: (f32, f32) = (0.8, 1.2);

const MARKER_AREA: f32 = 5.0;
/// Marker alpha (0.25).
const MARKER_ALPHA: u8 = 64;
const JITTER_MU: f32 = 0.5;
const JITTER_SIGMA: f32 = 0.15;
const MARGIN_LEFT: f32 = 24.0;
const MARGIN_RIGHT: f32 = 2.0;
const MARGIN_TOP: f32 = 4.0;
const CAPTION_HEIGHT: f32 = 24.0;

/// Builder for a regressor leaf image.
#[derive(Debug, Clone)]
pub struct RegrLeafStrip {
    y: Vec<f32>,
    y_range: (f32, f32),
    target_name: String,
    precision: usize,
    seed: u64,
    width: f32,
    height: f32,
}

impl RegrLeafStrip {
    /// Start a strip for the leaf's targets.
    #[must_use]
    pub fn new(y: &[f32]) -> Self {
        Self {
            y: y.to_vec(),
            y_range: (0.0, 1.0),
            target_name: String::new(),
            precision: 2,
            seed: 0,
            width: REGR_LEAF_SIZE.0 * PT_PER_INCH,
            height: REGR_LEAF_SIZE.1 * PT_PER_INCH,
        }
    }

    /// Shared target range (y axis).
    #[must_use]
    pub fn y_range(mut self, min: f32, max: f32) -> Self {
        self.y_range = (min, max);
        self
    }

    /// Name shown in the caption.
    #[must_use]
    pub fn target_name(mut self, name: &str) -> Self {
        self.target_name = name.to_string();
        self
    }

    /// Decimals in the caption mean.
    #[must_use]
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Jitter seed; the node id keeps re-renders identical.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate the strip.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyData`] for a leaf without samples.
    pub fn build(self) -> Result<Self> {
        if self.y.is_empty() {
            return Err(Error::EmptyData);
        }
        Ok(self)
    }

    /// Jittered horizontal positions in `[0, 1]`, one per target.
    #[must_use]
    pub fn jitter(&self) -> Vec<f32> {
        let mut rng = SeededRng::new(self.seed);
        self.y
            .iter()
            .map(|_| rng.normal(JITTER_MU, JITTER_SIGMA).clamp(0.0, 1.0))
            .collect()
    }

    /// Two caption lines: `name=mean` and `n=count`.
    #[must_use]
    pub fn caption(&self) -> (String, String) {
        let m = mean(&self.y).unwrap_or(0.0);
        (
            format!("{}={}", self.target_name, round_label(m, self.precision)),
            format!("n={}", self.y.len()),
        )
    }

    /// Draw the image.
    #[must_use]
    pub fn to_svg(&self) -> SvgEncoder {
        let area = PlotArea {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width: self.width - MARGIN_LEFT - MARGIN_RIGHT,
            height: self.height - MARGIN_TOP,
        };
        let xs = area.x_scale((0.0, 1.0));
        let ys = area.y_scale(self.y_range);
        let mut svg = SvgEncoder::new(self.width, area.bottom() + CAPTION_HEIGHT);

        let r = (MARKER_AREA / std::f32::consts::PI).sqrt();
        let fill = SCATTER_COLOR.with_alpha(MARKER_ALPHA);
        for (&x, &y) in self.jitter().iter().zip(&self.y) {
            svg = svg.circle(xs.scale(x), ys.scale(y), r, fill);
        }

        if let Some(m) = mean(&self.y) {
            svg = svg.dashed_line(area.left, ys.scale(m), area.right(), ys.scale(m), GREY, 1.0);
        }

        svg = area.spines(svg, false);
        let (lo, hi) = self.y_range;
        svg = area.y_ticks(svg, &ys, &[(lo, rounded(lo, 1)), (hi, rounded(hi, 1))]);

        let (line1, line2) = self.caption();
        let cx = area.left + area.width / 2.0;
        svg.text_anchored(cx, area.bottom() + LABEL_FONT + 1.0, &line1, LABEL_FONT, GREY, TextAnchor::Middle)
            .text_anchored(cx, area.bottom() + 2.0 * LABEL_FONT + 3.0, &line2, LABEL_FONT, GREY, TextAnchor::Middle)
    }
}

impl batuta_common::display::WithDimensions for RegrLeafStrip {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width as f32;
        self.height = height as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(seed: u64) -> RegrLeafStrip {
        RegrLeafStrip::new(&[20.0, 22.0, 24.0, 26.0])
            .y_range(5.0, 50.0)
            .target_name("price")
            .seed(seed)
            .build()
            .unwrap()
    }

    #[test]
    fn test_caption() {
        let (l1, l2) = strip(0).caption();
        assert_eq!(l1, "price=23.0");
        assert_eq!(l2, "n=4");
        let svg = strip(0).to_svg().render();
        assert!(svg.contains(">price=23.0</text>"));
        assert!(svg.contains(">n=4</text>"));
    }

    #[test]
    fn test_jitter_is_deterministic_per_seed() {
        assert_eq!(strip(7).jitter(), strip(7).jitter());
        assert_ne!(strip(7).jitter(), strip(8).jitter());
        assert!(strip(3).jitter().iter().all(|x| (0.0..=1.0).contains(x)));
    }

    #[test]
    fn test_markers_and_mean_line() {
        let svg = strip(1).to_svg().render();
        assert_eq!(svg.matches("<circle").count(), 4);
        assert_eq!(svg.matches("stroke-dasharray").count(), 1);
        assert!(svg.contains(r#"fill-opacity="0.251""#));
    }

    #[test]
    fn test_empty_leaf() {
        assert!(matches!(RegrLeafStrip::new(&[]).build(), Err(Error::EmptyData)));
    }

    #[test]
    fn test_jitter_centred() {
        let many = RegrLeafStrip::new(&vec![1.0; 2000]).seed(11);
        let xs = many.jitter();
        let m = xs.iter().sum::<f32>() / xs.len() as f32;
        assert!((m - 0.5).abs() < 0.02);
    }
}

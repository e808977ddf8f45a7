//! Feature-vs-target scatter for regressor split nodes.

use super::axes::{rounded, wedge, PlotArea, LABEL_FONT};
use crate::color::{Rgba, GREY, HIGHLIGHT_COLOR, SCATTER_COLOR, WEDGE_COLOR};
use crate::error::{Error, Result};
use crate::output::{SvgEncoder, TextAnchor, PT_PER_INCH};
use crate::scale::Scale;

/// Figure size in inches.
pub const REGR_SPLIT_SIZE: (f32, f32) = (2.5, 1.1);

/// Marker area in square points.
const MARKER_AREA: f32 = 5.0;
/// Marker alpha (0.4).
const MARKER_ALPHA: u8 = 102;
const MARGIN_LEFT: f32 = 26.0;
const YLABEL_SPACE: f32 = 11.0;
const MARGIN_RIGHT: f32 = 6.0;
const MARGIN_TOP: f32 = 4.0;
const MARGIN_BOTTOM: f32 = 30.0;

/// Builder for a regressor split image.
#[derive(Debug, Clone)]
pub struct RegrSplitScatter {
    feature_name: String,
    x: Vec<f32>,
    y: Vec<f32>,
    x_range: (f32, f32),
    y_range: (f32, f32),
    split: f32,
    left_mean: Option<f32>,
    right_mean: Option<f32>,
    y_label: Option<String>,
    precision: usize,
    highlight: Option<f32>,
    width: f32,
    height: f32,
}

impl RegrSplitScatter {
    /// Start a scatter for `feature_name`.
    #[must_use]
    pub fn new(feature_name: &str) -> Self {
        Self {
            feature_name: feature_name.to_string(),
            x: Vec::new(),
            y: Vec::new(),
            x_range: (0.0, 1.0),
            y_range: (0.0, 1.0),
            split: 0.0,
            left_mean: None,
            right_mean: None,
            y_label: None,
            precision: 2,
            highlight: None,
            width: REGR_SPLIT_SIZE.0 * PT_PER_INCH,
            height: REGR_SPLIT_SIZE.1 * PT_PER_INCH,
        }
    }

    /// Feature values and targets of the node's samples.
    #[must_use]
    pub fn points(mut self, x: &[f32], y: &[f32]) -> Self {
        self.x = x.to_vec();
        self.y = y.to_vec();
        self
    }

    /// Global feature range (x axis).
    #[must_use]
    pub fn x_range(mut self, min: f32, max: f32) -> Self {
        self.x_range = (min, max);
        self
    }

    /// Shared target range (y axis).
    #[must_use]
    pub fn y_range(mut self, min: f32, max: f32) -> Self {
        self.y_range = (min, max);
        self
    }

    /// Split threshold.
    #[must_use]
    pub fn split(mut self, split: f32) -> Self {
        self.split = split;
        self
    }

    /// Mean target of each child; an empty side draws no line.
    #[must_use]
    pub fn child_means(mut self, left: Option<f32>, right: Option<f32>) -> Self {
        self.left_mean = left;
        self.right_mean = right;
        self
    }

    /// Y axis label, shown on the root only.
    #[must_use]
    pub fn y_label(mut self, label: Option<&str>) -> Self {
        self.y_label = label.map(str::to_string);
        self
    }

    /// Decimals in tick labels.
    #[must_use]
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Mark a traced instance's feature value.
    #[must_use]
    pub fn highlight(mut self, value: Option<f32>) -> Self {
        self.highlight = value;
        self
    }

    /// Validate the scatter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if `x` and `y` differ in length.
    pub fn build(self) -> Result<Self> {
        if self.x.len() != self.y.len() {
            return Err(Error::ShapeMismatch {
                what: "scatter points",
                expected: self.x.len(),
                actual: self.y.len(),
            });
        }
        Ok(self)
    }

    /// X tick positions: the range ends, plus the split unless it sits in
    /// the outer tenth on either side.
    #[must_use]
    pub fn x_ticks(&self) -> Vec<f32> {
        let (lo, hi) = self.x_range;
        let r = hi - lo;
        let mut ticks = vec![lo, hi];
        if self.split > lo + 0.1 * r && self.split < hi - 0.1 * r {
            ticks.push(self.split);
        }
        ticks
    }

    fn area(&self) -> PlotArea {
        let left = MARGIN_LEFT + if self.y_label.is_some() { YLABEL_SPACE } else { 0.0 };
        PlotArea {
            left,
            top: MARGIN_TOP,
            width: self.width - left - MARGIN_RIGHT,
            height: self.height - MARGIN_TOP - MARGIN_BOTTOM + 12.0,
        }
    }

    /// Draw the image.
    #[must_use]
    pub fn to_svg(&self) -> SvgEncoder {
        let area = self.area();
        let xs = area.x_scale(self.x_range);
        let ys = area.y_scale(self.y_range);
        let mut svg = SvgEncoder::new(self.width, area.bottom() + MARGIN_BOTTOM);

        let r = (MARKER_AREA / std::f32::consts::PI).sqrt();
        let fill = SCATTER_COLOR.with_alpha(MARKER_ALPHA);
        for (&x, &y) in self.x.iter().zip(&self.y) {
            svg = svg.circle(xs.scale(x), ys.scale(y), r, fill);
        }

        let (x_lo, x_hi) = (xs.scale(self.x_range.0), xs.scale(self.x_range.1));
        let split_x = xs.scale(self.split);
        if let Some(m) = self.left_mean {
            svg = svg.dashed_line(x_lo, ys.scale(m), split_x, ys.scale(m), Rgba::BLACK, 1.0);
        }
        svg = svg.dashed_line(split_x, area.top, split_x, area.bottom(), Rgba::BLACK, 1.0);
        if let Some(m) = self.right_mean {
            svg = svg.dashed_line(split_x, ys.scale(m), x_hi, ys.scale(m), Rgba::BLACK, 1.0);
        }

        svg = area.spines(svg, true);
        let ticks: Vec<(f32, String)> = self
            .x_ticks()
            .into_iter()
            .map(|t| (t, rounded(t, self.precision)))
            .collect();
        svg = area.x_ticks(svg, &xs, &ticks);
        let (y_lo, y_hi) = self.y_range;
        svg = area.y_ticks(svg, &ys, &[(y_lo, rounded(y_lo, 1)), (y_hi, rounded(y_hi, 1))]);

        let half = area.width * 0.018;
        let wedge_h = area.height * 0.1;
        svg = wedge(svg, split_x, area.bottom(), half, wedge_h, WEDGE_COLOR);
        if let Some(v) = self.highlight {
            svg = wedge(svg, xs.scale(v), area.bottom(), half, wedge_h, HIGHLIGHT_COLOR);
        }

        if let Some(label) = &self.y_label {
            svg = svg.text_vertical(LABEL_FONT, area.top + area.height / 2.0, label, LABEL_FONT, GREY);
        }
        svg.text_anchored(
            area.left + area.width / 2.0,
            area.bottom() + MARGIN_BOTTOM - 8.0,
            &self.feature_name,
            LABEL_FONT,
            GREY,
            TextAnchor::Middle,
        )
    }
}

impl batuta_common::display::WithDimensions for RegrSplitScatter {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width as f32;
        self.height = height as f32;
    }
}

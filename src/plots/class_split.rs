//! Per-class histogram of a classifier split node.
//!
//! Bins always span the feature's range over the whole training set, so
//! sibling nodes line up and the split wedge sits at a comparable position.

use super::axes::{round_label, rounded, wedge, PlotArea, LABEL_FONT, TICK_FONT};
use crate::color::{Rgba, GREY, HIGHLIGHT_COLOR, WEDGE_COLOR};
use crate::config::HistType;
use crate::error::{Error, Result};
use crate::output::{SvgEncoder, TextAnchor, PT_PER_INCH};
use crate::scale::Scale;
use crate::sizing::histogram_bin;

/// Figure width in inches.
pub const CLASS_SPLIT_WIDTH: f32 = 3.3;
/// Figure height range in inches; the tallest node gets the upper end.
pub const CLASS_SPLIT_HEIGHT_RANGE: (f32, f32) = (0.5, 1.5);

const MARGIN_LEFT: f32 = 24.0;
const MARGIN_RIGHT: f32 = 8.0;
const MARGIN_TOP: f32 = 4.0;
const MARGIN_BOTTOM: f32 = 32.0;
const BAR_EDGE: f32 = 0.5;

/// One class's samples and bar color.
#[derive(Debug, Clone)]
struct ClassSeries {
    values: Vec<f32>,
    color: Rgba,
}

/// Builder for a classifier split image.
#[derive(Debug, Clone)]
pub struct ClassSplitHistogram {
    feature_name: String,
    range: (f32, f32),
    nbins: usize,
    histtype: HistType,
    series: Vec<ClassSeries>,
    split: f32,
    precision: usize,
    highlight: Option<f32>,
    width: f32,
    height: f32,
}

impl ClassSplitHistogram {
    /// Start a histogram for `feature_name`.
    #[must_use]
    pub fn new(feature_name: &str) -> Self {
        Self {
            feature_name: feature_name.to_string(),
            range: (0.0, 1.0),
            nbins: 10,
            histtype: HistType::default(),
            series: Vec::new(),
            split: 0.0,
            precision: 2,
            highlight: None,
            width: CLASS_SPLIT_WIDTH * PT_PER_INCH,
            height: CLASS_SPLIT_HEIGHT_RANGE.0 * PT_PER_INCH,
        }
    }

    /// Global feature range the bins cover.
    #[must_use]
    pub fn range(mut self, min: f32, max: f32) -> Self {
        self.range = (min, max);
        self
    }

    /// Number of bins.
    #[must_use]
    pub fn bins(mut self, nbins: usize) -> Self {
        self.nbins = nbins;
        self
    }

    /// Stacked or side-by-side bars.
    #[must_use]
    pub fn histtype(mut self, histtype: HistType) -> Self {
        self.histtype = histtype;
        self
    }

    /// Add one class's feature values, drawn in `color`.
    #[must_use]
    pub fn class_values(mut self, values: Vec<f32>, color: Rgba) -> Self {
        self.series.push(ClassSeries { values, color });
        self
    }

    /// Split threshold marked by the wedge.
    #[must_use]
    pub fn split(mut self, split: f32) -> Self {
        self.split = split;
        self
    }

    /// Decimals shown under the wedge.
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

    /// Figure height in inches (width is fixed).
    #[must_use]
    pub fn height_inches(mut self, height: f32) -> Self {
        self.height = height * PT_PER_INCH;
        self
    }

    /// Validate the histogram.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyData`] when no class was added.
    pub fn build(self) -> Result<Self> {
        if self.series.is_empty() {
            return Err(Error::EmptyData);
        }
        Ok(self)
    }

    /// Bin counts, one vector per class.
    #[must_use]
    pub fn counts(&self) -> Vec<Vec<usize>> {
        let nbins = self.nbins.max(1);
        self.series
            .iter()
            .map(|s| {
                let mut counts = vec![0usize; nbins];
                for &v in &s.values {
                    counts[histogram_bin(v, self.range, nbins)] += 1;
                }
                counts
            })
            .collect()
    }

    /// Tallest bar as drawn.
    #[must_use]
    pub fn tallest(&self) -> usize {
        let counts = self.counts();
        let nbins = self.nbins.max(1);
        match self.histtype {
            HistType::BarStacked => (0..nbins)
                .map(|b| counts.iter().map(|c| c[b]).sum::<usize>())
                .max()
                .unwrap_or(0),
            HistType::Bar => counts.iter().flatten().copied().max().unwrap_or(0),
        }
    }

    fn area(&self) -> PlotArea {
        PlotArea {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width: self.width - MARGIN_LEFT - MARGIN_RIGHT,
            height: self.height * 0.7,
        }
    }

    /// Draw the image.
    #[must_use]
    pub fn to_svg(&self) -> SvgEncoder {
        let area = self.area();
        let nbins = self.nbins.max(1);
        let counts = self.counts();
        let ymax = self.tallest().max(1) as f32;
        let xs = area.x_scale(self.range);
        let ys = area.y_scale((0.0, ymax));
        let bin_px = area.width / nbins as f32;

        let mut svg = SvgEncoder::new(self.width, area.bottom() + MARGIN_BOTTOM);

        for bin in 0..nbins {
            let x0 = area.left + bin as f32 * bin_px;
            match self.histtype {
                HistType::BarStacked => {
                    let mut base = 0usize;
                    for (series, c) in self.series.iter().zip(&counts) {
                        let n = c[bin];
                        if n == 0 {
                            continue;
                        }
                        let top = ys.scale((base + n) as f32);
                        let bottom = ys.scale(base as f32);
                        svg = svg.rect_outlined(x0, top, bin_px, bottom - top, series.color, GREY, BAR_EDGE);
                        base += n;
                    }
                }
                HistType::Bar => {
                    let slot = bin_px * 0.8 / self.series.len() as f32;
                    let start = x0 + bin_px * 0.1;
                    for (k, (series, c)) in self.series.iter().zip(&counts).enumerate() {
                        let n = c[bin];
                        if n == 0 {
                            continue;
                        }
                        let top = ys.scale(n as f32);
                        svg = svg.rect_outlined(
                            start + k as f32 * slot,
                            top,
                            slot,
                            area.bottom() - top,
                            series.color,
                            GREY,
                            BAR_EDGE,
                        );
                    }
                }
            }
        }

        svg = area.spines(svg, true);
        let (lo, hi) = self.range;
        svg = area.x_ticks(svg, &xs, &[(lo, rounded(lo, self.precision)), (hi, rounded(hi, self.precision))]);
        svg = area.y_ticks(svg, &ys, &[(0.0, "0".to_string()), (ymax, format!("{}", ymax as usize))]);

        let half = area.width * 0.018;
        let wedge_h = 7.0;
        let split_x = xs.scale(self.split);
        svg = wedge(svg, split_x, area.bottom() + 0.5, half, wedge_h, WEDGE_COLOR);
        svg = svg.text_anchored(
            split_x,
            area.bottom() + wedge_h + TICK_FONT + 1.5,
            &round_label(self.split, self.precision),
            TICK_FONT,
            GREY,
            TextAnchor::Middle,
        );
        if let Some(v) = self.highlight {
            svg = wedge(svg, xs.scale(v), area.bottom() + 0.5, half, wedge_h, HIGHLIGHT_COLOR);
        }

        svg.text_anchored(
            area.left + area.width / 2.0,
            area.bottom() + MARGIN_BOTTOM - 3.0,
            &self.feature_name,
            LABEL_FONT,
            GREY,
            TextAnchor::Middle,
        )
    }
}

impl batuta_common::display::WithDimensions for ClassSplitHistogram {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width as f32;
        self.height = height as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::YELLOW;

    fn two_class() -> ClassSplitHistogram {
        ClassSplitHistogram::new("petal width")
            .range(0.0, 10.0)
            .bins(5)
            .class_values(vec![0.5, 1.0, 1.5, 3.0], YELLOW)
            .class_values(vec![1.0, 9.0, 9.5], GREY)
            .split(2.45)
            .build()
            .unwrap()
    }

    #[test]
    fn test_counts_over_global_range() {
        let h = two_class();
        assert_eq!(h.counts(), vec![vec![3, 1, 0, 0, 0], vec![1, 0, 0, 0, 2]]);
    }

    #[test]
    fn test_tallest_depends_on_histtype() {
        assert_eq!(two_class().tallest(), 4);
        assert_eq!(two_class().histtype(HistType::Bar).tallest(), 3);
    }

    #[test]
    fn test_empty_is_error() {
        assert!(matches!(
            ClassSplitHistogram::new("x").build(),
            Err(Error::EmptyData)
        ));
    }

    #[test]
    fn test_svg_has_bars_wedge_and_label() {
        let svg = two_class().precision(1).to_svg().render();
        // four non-empty stacked segments
        assert_eq!(svg.matches("<rect").count(), 4);
        assert_eq!(svg.matches("<polygon").count(), 1);
        assert!(svg.contains(">2.5</text>"));
        let svg = two_class().split(3.0).to_svg().render();
        assert!(svg.contains(">3.0</text>"));
        assert!(svg.contains(">petal width</text>"));
        assert!(!svg.contains("#D67C03"));
    }

    #[test]
    fn test_highlight_adds_second_wedge() {
        let svg = two_class().highlight(Some(7.0)).to_svg().render();
        assert_eq!(svg.matches("<polygon").count(), 2);
        assert!(svg.contains("#D67C03"));
    }

    #[test]
    fn test_taller_nodes_get_taller_images() {
        let short = two_class().height_inches(0.5).to_svg();
        let tall = two_class().height_inches(1.5).to_svg();
        assert!(tall.height() > short.height());
        assert!((short.width() - 3.3 * 72.0).abs() < 1e-3);
    }

    #[test]
    fn test_with_dimensions() {
        use batuta_common::display::WithDimensions;
        let mut h = two_class();
        h.set_dimensions(300, 100);
        assert!((h.to_svg().width() - 300.0).abs() < f32::EPSILON);
    }
}

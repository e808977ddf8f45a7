//! Plot frame, spines, ticks and split wedges shared by the node plots.

use crate::color::{Rgba, GREY};
use crate::output::{SvgEncoder, TextAnchor};
use crate::scale::{LinearScale, Scale};

/// Tick label font size (pt).
pub(crate) const TICK_FONT: f32 = 8.0;
/// Axis label font size (pt).
pub(crate) const LABEL_FONT: f32 = 9.0;
/// Spine and tick stroke width (pt).
pub(crate) const SPINE_WIDTH: f32 = 0.3;
const TICK_LEN: f32 = 2.5;

/// Data rectangle inside an image, in points from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PlotArea {
    pub(crate) left: f32,
    pub(crate) top: f32,
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl PlotArea {
    pub(crate) fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub(crate) fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Horizontal scale from `domain` onto the area.
    pub(crate) fn x_scale(&self, domain: (f32, f32)) -> LinearScale {
        LinearScale::new(domain, (self.left, self.right()))
    }

    /// Vertical scale from `domain` onto the area, larger values higher up.
    pub(crate) fn y_scale(&self, domain: (f32, f32)) -> LinearScale {
        LinearScale::new(domain, (self.bottom(), self.top))
    }

    /// Left and bottom spines.
    pub(crate) fn spines(&self, svg: SvgEncoder, bottom: bool) -> SvgEncoder {
        let svg = svg.line(self.left, self.top, self.left, self.bottom(), GREY, SPINE_WIDTH);
        if bottom {
            svg.line(self.left, self.bottom(), self.right(), self.bottom(), GREY, SPINE_WIDTH)
        } else {
            svg
        }
    }

    /// Ticks and labels under the bottom spine.
    pub(crate) fn x_ticks(&self, mut svg: SvgEncoder, scale: &LinearScale, ticks: &[(f32, String)]) -> SvgEncoder {
        let y = self.bottom();
        for (value, label) in ticks {
            let x = scale.scale(*value);
            let anchor = if (x - self.left).abs() < 1.0 {
                TextAnchor::Start
            } else if (x - self.right()).abs() < 1.0 {
                TextAnchor::End
            } else {
                TextAnchor::Middle
            };
            svg = svg
                .line(x, y, x, y + TICK_LEN, GREY, SPINE_WIDTH)
                .text_anchored(x, y + TICK_LEN + TICK_FONT, label, TICK_FONT, GREY, anchor);
        }
        svg
    }

    /// Ticks and labels left of the left spine.
    pub(crate) fn y_ticks(&self, mut svg: SvgEncoder, scale: &LinearScale, ticks: &[(f32, String)]) -> SvgEncoder {
        let x = self.left;
        for (value, label) in ticks {
            let y = scale.scale(*value);
            svg = svg.line(x - TICK_LEN, y, x, y, GREY, SPINE_WIDTH).text_anchored(
                x - TICK_LEN - 1.0,
                y + TICK_FONT * 0.35,
                label,
                TICK_FONT,
                GREY,
                TextAnchor::End,
            );
        }
        svg
    }
}

/// Triangle pointing up at `(x, tip_y)` with its base `height` below.
pub(crate) fn wedge(svg: SvgEncoder, x: f32, tip_y: f32, half_width: f32, height: f32, color: Rgba) -> SvgEncoder {
    svg.polygon(
        &[(x, tip_y), (x - half_width, tip_y + height), (x + half_width, tip_y + height)],
        color,
        None,
        0.0,
    )
}

/// `v` with exactly `precision` decimals.
pub(crate) fn fixed(v: f32, precision: usize) -> String {
    format!("{v:.precision$}")
}

/// `v` rounded to `precision` decimals, trailing zeros dropped.
pub(crate) fn rounded(v: f32, precision: usize) -> String {
    let s = fixed(v, precision);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    };
    if s == "-0" {
        "0".to_string()
    } else {
        s
    }
}

/// Annotation text for `v` rounded to `precision` decimals: trailing zeros
/// dropped but at least one decimal kept (`23.0`, `2.5`, `0.13`).
pub(crate) fn round_label(v: f32, precision: usize) -> String {
    let s = rounded(v, precision);
    if s.contains('.') || !v.is_finite() {
        s
    } else {
        format!("{s}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> PlotArea {
        PlotArea {
            left: 20.0,
            top: 4.0,
            width: 100.0,
            height: 50.0,
        }
    }

    #[test]
    fn test_area_edges_and_scales() {
        let a = area();
        assert!((a.right() - 120.0).abs() < f32::EPSILON);
        assert!((a.bottom() - 54.0).abs() < f32::EPSILON);
        assert!((a.x_scale((0.0, 10.0)).scale(5.0) - 70.0).abs() < 1e-4);
        assert!((a.y_scale((0.0, 10.0)).scale(10.0) - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_ticks_draw_labels() {
        let a = area();
        let scale = a.x_scale((1.0, 7.0));
        let svg = a
            .x_ticks(SvgEncoder::new(140.0, 80.0), &scale, &[(1.0, "1".into()), (7.0, "7".into())])
            .render();
        assert!(svg.contains(r#"text-anchor="start""#));
        assert!(svg.contains(r#"text-anchor="end""#));
        assert_eq!(svg.matches("<line").count(), 2);
    }

    #[test]
    fn test_wedge_points() {
        let svg = wedge(SvgEncoder::new(10.0, 10.0), 5.0, 2.0, 1.0, 3.0, GREY).render();
        assert!(svg.contains(r#"points="5,2 4,5 6,5""#));
    }

    #[test]
    fn test_number_formats() {
        assert_eq!(fixed(2.45, 2), "2.45");
        assert_eq!(fixed(3.0, 2), "3.00");
        assert_eq!(rounded(3.0, 2), "3");
        assert_eq!(rounded(2.5, 2), "2.5");
        assert_eq!(rounded(12.0, 0), "12");
        assert_eq!(rounded(-0.001, 1), "0");
    }

    #[test]
    fn test_round_label_keeps_one_decimal() {
        assert_eq!(round_label(23.0, 2), "23.0");
        assert_eq!(round_label(23.456, 2), "23.46");
        assert_eq!(round_label(2.45, 1), "2.5");
        assert_eq!(round_label(12.4, 0), "12.0");
        assert_eq!(round_label(-0.001, 1), "0.0");
    }
}

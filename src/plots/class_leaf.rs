//! Class-distribution pie for classifier leaves.

use std::f32::consts::TAU;
use std::fmt::Write as _;

use super::axes::LABEL_FONT;
use crate::color::{Rgba, GREY};
use crate::error::{Error, Result};
use crate::output::{num, SvgEncoder, TextAnchor, PT_PER_INCH};

const EDGE_WIDTH: f32 = 0.5;
const CAPTION_HEIGHT: f32 = 12.0;
const MIN_WIDTH: f32 = 24.0;

/// Builder for a classifier leaf image.
#[derive(Debug, Clone)]
pub struct ClassLeafPie {
    counts: Vec<f32>,
    colors: Vec<Rgba>,
    diameter: f32,
    label: Option<String>,
}

impl Default for ClassLeafPie {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassLeafPie {
    /// Create an empty pie.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counts: Vec::new(),
            colors: Vec::new(),
            diameter: PT_PER_INCH / 2.0,
            label: None,
        }
    }

    /// Per-class counts and the color of each class column.
    #[must_use]
    pub fn counts(mut self, counts: &[f32], colors: &[Rgba]) -> Self {
        self.counts = counts.to_vec();
        self.colors = colors.to_vec();
        self
    }

    /// Disk diameter in inches.
    #[must_use]
    pub fn size_inches(mut self, size: f32) -> Self {
        self.diameter = size * PT_PER_INCH;
        self
    }

    /// Caption under the disk.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Validate the pie.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyData`] without counts and
    /// [`Error::ShapeMismatch`] if there are fewer colors than counts.
    pub fn build(self) -> Result<Self> {
        if self.counts.is_empty() {
            return Err(Error::EmptyData);
        }
        if self.colors.len() < self.counts.len() {
            return Err(Error::ShapeMismatch {
                what: "pie colors",
                expected: self.counts.len(),
                actual: self.colors.len(),
            });
        }
        Ok(self)
    }

    /// `(count, color)` of every class actually present.
    fn slices(&self) -> Vec<(f32, Rgba)> {
        self.counts
            .iter()
            .zip(&self.colors)
            .filter(|(c, _)| **c > 0.0)
            .map(|(&c, &color)| (c, color))
            .collect()
    }

    /// Draw the image.
    #[must_use]
    pub fn to_svg(&self) -> SvgEncoder {
        let d = self.diameter;
        let width = d.max(MIN_WIDTH);
        let height = d + if self.label.is_some() { CAPTION_HEIGHT } else { 0.0 };
        let (cx, cy, r) = (width / 2.0, d / 2.0, d / 2.0 - EDGE_WIDTH);

        let mut svg = SvgEncoder::new(width, height);
        let slices = self.slices();
        let total: f32 = slices.iter().map(|(c, _)| c).sum();

        match slices.as_slice() {
            [] => svg = svg.circle_outlined(cx, cy, r, Rgba::WHITE, GREY, EDGE_WIDTH),
            [(_, color)] => svg = svg.circle_outlined(cx, cy, r, *color, GREY, EDGE_WIDTH),
            _ => {
                // counter-clockwise from three o'clock
                let mut angle = 0.0f32;
                for (count, color) in &slices {
                    let sweep = count / total * TAU;
                    let d = arc_path(cx, cy, r, angle, angle + sweep);
                    svg = svg.path(&d, Some(*color), Some(GREY), EDGE_WIDTH);
                    angle += sweep;
                }
            }
        }

        if let Some(label) = &self.label {
            svg = svg.text_anchored(cx, d + LABEL_FONT + 1.0, label, LABEL_FONT, GREY, TextAnchor::Middle);
        }
        svg
    }
}

/// Closed wedge from `start` to `end` radians, measured counter-clockwise.
fn arc_path(cx: f32, cy: f32, r: f32, start: f32, end: f32) -> String {
    let point = |a: f32| (cx + r * a.cos(), cy - r * a.sin());
    let (x0, y0) = point(start);
    let (x1, y1) = point(end);
    let large = i32::from(end - start > std::f32::consts::PI);
    let mut d = String::new();
    let _ = write!(
        d,
        "M {} {} L {} {} A {} {} 0 {large} 0 {} {} Z",
        num(cx),
        num(cy),
        num(x0),
        num(y0),
        num(r),
        num(r),
        num(x1),
        num(y1)
    );
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{class_palette, YELLOW};

    #[test]
    fn test_single_class_is_a_disk() {
        let palette = class_palette(3).unwrap();
        let svg = ClassLeafPie::new()
            .counts(&[0.0, 12.0, 0.0], palette)
            .size_inches(0.5)
            .label("n=12")
            .build()
            .unwrap()
            .to_svg()
            .render();

        assert_eq!(svg.matches("<circle").count(), 1);
        assert_eq!(svg.matches("<path").count(), 0);
        assert!(svg.contains(&palette[1].to_hex()));
        assert!(svg.contains(">n=12</text>"));
    }

    #[test]
    fn test_wedge_per_present_class() {
        let palette = class_palette(3).unwrap();
        let svg = ClassLeafPie::new()
            .counts(&[5.0, 0.0, 15.0], palette)
            .build()
            .unwrap()
            .to_svg()
            .render();

        assert_eq!(svg.matches("<path").count(), 2);
        assert!(!svg.contains(&palette[1].to_hex()));
    }

    #[test]
    fn test_large_arc_flag() {
        let d = arc_path(10.0, 10.0, 5.0, 0.0, 4.0);
        assert!(d.contains(" 0 1 0 "));
        let d = arc_path(10.0, 10.0, 5.0, 0.0, 1.0);
        assert!(d.contains(" 0 0 0 "));
    }

    #[test]
    fn test_size_and_caption_space() {
        let pie = ClassLeafPie::new()
            .counts(&[1.0, 1.0], &[YELLOW, GREY])
            .size_inches(1.0)
            .label("n=2")
            .build()
            .unwrap()
            .to_svg();
        assert!((pie.width() - 72.0).abs() < 1e-3);
        assert!((pie.height() - 84.0).abs() < 1e-3);
    }

    #[test]
    fn test_build_checks_colors() {
        assert!(matches!(ClassLeafPie::new().build(), Err(Error::EmptyData)));
        assert!(matches!(
            ClassLeafPie::new().counts(&[1.0, 2.0], &[YELLOW]).build(),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}

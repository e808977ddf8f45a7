//! SVG output encoder.
//!
//! Vector-only, sized in points so Graphviz picks up the physical size from
//! the header. The first line is always the `<svg ...>` element carrying
//! `width="Wpt" height="Hpt"`; [`crate::artifact::svg_shape`] relies on it.

use crate::color::Rgba;
use crate::error::Result;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Points per inch.
pub const PT_PER_INCH: f32 = 72.0;

/// SVG encoder for vector node plots.
#[derive(Debug, Clone)]
pub struct SvgEncoder {
    /// Width in points
    width: f32,
    /// Height in points
    height: f32,
    /// SVG elements
    elements: Vec<SvgElement>,
}

/// One drawn element. Field names match SVG attribute names.
#[derive(Debug, Clone)]
enum SvgElement {
    /// Rectangle
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Rgba,
        stroke: Option<Rgba>,
        stroke_width: f32,
    },
    /// Circle
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
        fill: Rgba,
        stroke: Option<Rgba>,
        stroke_width: f32,
    },
    /// Line, optionally dashed
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: Rgba,
        stroke_width: f32,
        dashed: bool,
    },
    /// Closed filled polygon
    Polygon {
        points: Vec<(f32, f32)>,
        fill: Rgba,
        stroke: Option<Rgba>,
        stroke_width: f32,
    },
    /// Path (SVG path data)
    Path {
        d: String,
        fill: Option<Rgba>,
        stroke: Option<Rgba>,
        stroke_width: f32,
    },
    /// Text
    Text {
        x: f32,
        y: f32,
        text: String,
        font_size: f32,
        fill: Rgba,
        anchor: TextAnchor,
        vertical: bool,
    },
}

/// Text anchor position for SVG text alignment.
#[derive(Debug, Clone, Copy, Default)]
#[allow(missing_docs)]
pub enum TextAnchor {
    /// Align text start at position (left-aligned for LTR)
    #[default]
    Start,
    /// Center text at position
    Middle,
    /// Align text end at position (right-aligned for LTR)
    End,
}

impl SvgEncoder {
    /// Create an encoder `width` x `height` points.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
        }
    }

    /// Width in points.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Height in points.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Add a rectangle with stroke.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn rect_outlined(
        mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Rgba,
        stroke: Rgba,
        stroke_width: f32,
    ) -> Self {
        self.elements.push(SvgElement::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke: Some(stroke),
            stroke_width,
        });
        self
    }

    /// Add a circle.
    #[must_use]
    pub fn circle(mut self, cx: f32, cy: f32, r: f32, fill: Rgba) -> Self {
        self.elements.push(SvgElement::Circle {
            cx,
            cy,
            r,
            fill,
            stroke: None,
            stroke_width: 1.0,
        });
        self
    }

    /// Add a circle with stroke.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn circle_outlined(
        mut self,
        cx: f32,
        cy: f32,
        r: f32,
        fill: Rgba,
        stroke: Rgba,
        stroke_width: f32,
    ) -> Self {
        self.elements.push(SvgElement::Circle {
            cx,
            cy,
            r,
            fill,
            stroke: Some(stroke),
            stroke_width,
        });
        self
    }

    /// Add a solid line.
    #[must_use]
    pub fn line(
        mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: Rgba,
        stroke_width: f32,
    ) -> Self {
        self.elements.push(SvgElement::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
            stroke_width,
            dashed: false,
        });
        self
    }

    /// Add a dashed line.
    #[must_use]
    pub fn dashed_line(
        mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: Rgba,
        stroke_width: f32,
    ) -> Self {
        self.elements.push(SvgElement::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
            stroke_width,
            dashed: true,
        });
        self
    }

    /// Add a filled polygon.
    #[must_use]
    pub fn polygon(
        mut self,
        points: &[(f32, f32)],
        fill: Rgba,
        stroke: Option<Rgba>,
        stroke_width: f32,
    ) -> Self {
        self.elements.push(SvgElement::Polygon {
            points: points.to_vec(),
            fill,
            stroke,
            stroke_width,
        });
        self
    }

    /// Add an SVG path.
    #[must_use]
    pub fn path(
        mut self,
        d: &str,
        fill: Option<Rgba>,
        stroke: Option<Rgba>,
        stroke_width: f32,
    ) -> Self {
        self.elements.push(SvgElement::Path {
            d: d.to_string(),
            fill,
            stroke,
            stroke_width,
        });
        self
    }

    /// Add text with anchor.
    #[must_use]
    pub fn text_anchored(
        mut self,
        x: f32,
        y: f32,
        text: &str,
        font_size: f32,
        fill: Rgba,
        anchor: TextAnchor,
    ) -> Self {
        self.elements.push(SvgElement::Text {
            x,
            y,
            text: text.to_string(),
            font_size,
            fill,
            anchor,
            vertical: false,
        });
        self
    }

    /// Add centered text reading bottom to top (axis labels).
    #[must_use]
    pub fn text_vertical(mut self, x: f32, y: f32, text: &str, font_size: f32, fill: Rgba) -> Self {
        self.elements.push(SvgElement::Text {
            x,
            y,
            text: text.to_string(),
            font_size,
            fill,
            anchor: TextAnchor::Middle,
            vertical: true,
        });
        self
    }

    /// Render to SVG string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(4096);
        let (w, h) = (num(self.width), num(self.height));

        // Header must stay on the first line
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{w}pt" height="{h}pt" viewBox="0 0 {w} {h}">"#
        );

        for element in &self.elements {
            let _ = writeln!(svg, "  {}", element_to_svg(element));
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Write to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if file writing fails.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.render().as_bytes())?;
        Ok(())
    }
}

/// Compact number: at most two decimals, trailing zeros dropped.
pub(crate) fn num(v: f32) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// ` fill="#RRGGBB"` plus `fill-opacity` when translucent.
fn paint(attr: &str, color: Rgba) -> String {
    if color.a == 255 {
        format!(r#" {attr}="{}""#, color.to_hex())
    } else {
        format!(
            r#" {attr}="{}" {attr}-opacity="{:.3}""#,
            color.to_hex(),
            color.opacity()
        )
    }
}

fn stroke_attr(stroke: Option<Rgba>, stroke_width: f32) -> String {
    stroke
        .map(|s| format!(r#"{} stroke-width="{}""#, paint("stroke", s), num(stroke_width)))
        .unwrap_or_default()
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Convert an SVG element to its string representation.
fn element_to_svg(element: &SvgElement) -> String {
    match element {
        SvgElement::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
            stroke_width,
        } => format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}"{}{}/>"#,
            num(*x),
            num(*y),
            num(*width),
            num(*height),
            paint("fill", *fill),
            stroke_attr(*stroke, *stroke_width)
        ),
        SvgElement::Circle {
            cx,
            cy,
            r,
            fill,
            stroke,
            stroke_width,
        } => format!(
            r#"<circle cx="{}" cy="{}" r="{}"{}{}/>"#,
            num(*cx),
            num(*cy),
            num(*r),
            paint("fill", *fill),
            stroke_attr(*stroke, *stroke_width)
        ),
        SvgElement::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
            stroke_width,
            dashed,
        } => {
            let dash = if *dashed {
                r#" stroke-dasharray="3.7,1.6""#
            } else {
                ""
            };
            format!(
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}"{}{dash}/>"#,
                num(*x1),
                num(*y1),
                num(*x2),
                num(*y2),
                stroke_attr(Some(*stroke), *stroke_width)
            )
        }
        SvgElement::Polygon {
            points,
            fill,
            stroke,
            stroke_width,
        } => {
            let points_str: String = points
                .iter()
                .map(|(x, y)| format!("{},{}", num(*x), num(*y)))
                .collect::<Vec<_>>()
                .join(" ");
            format!(
                r#"<polygon points="{points_str}"{}{}/>"#,
                paint("fill", *fill),
                stroke_attr(*stroke, *stroke_width)
            )
        }
        SvgElement::Path {
            d,
            fill,
            stroke,
            stroke_width,
        } => {
            let fill_attr = fill.map_or_else(|| r#" fill="none""#.to_string(), |f| paint("fill", f));
            format!(
                r#"<path d="{d}"{fill_attr}{}/>"#,
                stroke_attr(*stroke, *stroke_width)
            )
        }
        SvgElement::Text {
            x,
            y,
            text,
            font_size,
            fill,
            anchor,
            vertical,
        } => {
            let anchor_str = match anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
                TextAnchor::End => "end",
            };
            let (x, y) = (num(*x), num(*y));
            let rotate = if *vertical {
                format!(r#" transform="rotate(-90 {x} {y})""#)
            } else {
                String::new()
            };
            format!(
                r#"<text x="{x}" y="{y}" font-size="{}"{} text-anchor="{anchor_str}" font-family="Arial, Helvetica, sans-serif"{rotate}>{}</text>"#,
                num(*font_size),
                paint("fill", *fill),
                escape_xml(text)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{GREY, HIGHLIGHT_COLOR, SCATTER_COLOR};

    #[test]
    fn test_header_is_first_line_in_points() {
        let svg = SvgEncoder::new(237.6, 72.0).render();
        let first = svg.lines().next().unwrap();

        assert!(first.starts_with("<svg "));
        assert!(first.contains(r#"width="237.6pt""#));
        assert!(first.contains(r#"height="72pt""#));
        assert!(first.contains(r#"viewBox="0 0 237.6 72""#));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_svg_rect() {
        let svg = SvgEncoder::new(100.0, 100.0)
            .rect_outlined(10.0, 20.0, 30.0, 40.5, HIGHLIGHT_COLOR, GREY, 0.5)
            .render();

        assert!(svg.contains(r##"<rect x="10" y="20" width="30" height="40.5" fill="#D67C03""##));
        assert!(svg.contains(r##"stroke="#444443" stroke-width="0.5""##));
    }

    #[test]
    fn test_translucent_circle() {
        let svg = SvgEncoder::new(100.0, 100.0)
            .circle(50.0, 50.0, 1.25, SCATTER_COLOR.with_alpha(102))
            .render();

        assert!(svg.contains(r#"r="1.25""#));
        assert!(svg.contains(r##"fill="#225EA8" fill-opacity="0.400""##));
    }

    #[test]
    fn test_dashed_line() {
        let svg = SvgEncoder::new(100.0, 100.0)
            .dashed_line(0.0, 5.0, 100.0, 5.0, Rgba::BLACK, 1.0)
            .line(0.0, 0.0, 1.0, 1.0, Rgba::BLACK, 1.0)
            .render();

        assert_eq!(svg.matches("stroke-dasharray").count(), 1);
    }

    #[test]
    fn test_polygon() {
        let svg = SvgEncoder::new(100.0, 100.0)
            .polygon(&[(0.0, 0.0), (5.5, 10.0), (11.0, 0.0)], GREY, None, 0.0)
            .render();

        assert!(svg.contains(r##"<polygon points="0,0 5.5,10 11,0" fill="#444443"/>"##));
    }

    #[test]
    fn test_path_without_fill() {
        let svg = SvgEncoder::new(10.0, 10.0)
            .path("M 1 1 L 9 9", None, Some(Rgba::BLACK), 2.0)
            .render();
        assert!(svg.contains(r##"<path d="M 1 1 L 9 9" fill="none" stroke="#000000" stroke-width="2"/>"##));
    }

    #[test]
    fn test_text_escaping() {
        let svg = SvgEncoder::new(100.0, 100.0)
            .text_anchored(10.0, 50.0, "x<y & \"z\"", 8.0, GREY, TextAnchor::Middle)
            .render();

        assert!(svg.contains("x&lt;y &amp; &quot;z&quot;"));
        assert!(svg.contains(r#"text-anchor="middle""#));
    }

    #[test]
    fn test_vertical_text() {
        let svg = SvgEncoder::new(100.0, 100.0)
            .text_vertical(6.0, 40.0, "price", 9.0, GREY)
            .render();
        assert!(svg.contains(r#"transform="rotate(-90 6 40)""#));
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(10.0), "10");
        assert_eq!(num(0.126), "0.13");
        assert_eq!(num(-0.001), "0");
        assert_eq!(num(3.10), "3.1");
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.svg");
        SvgEncoder::new(20.0, 10.0)
            .circle(5.0, 5.0, 2.0, GREY)
            .write_to_file(&path)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<svg "));
    }
}

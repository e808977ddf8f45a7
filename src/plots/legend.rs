//! Class color swatch for the legend table.

use crate::color::Rgba;
use crate::output::{SvgEncoder, PT_PER_INCH};

/// Swatch size in inches.
pub const LEGEND_SWATCH_SIZE: (f32, f32) = (0.65, 0.5);

/// Matplotlib's `grey`.
const EDGE: Rgba = Rgba::rgb(128, 128, 128);
const EDGE_WIDTH: f32 = 1.2;

/// A filled box in one class color.
#[derive(Debug, Clone, Copy)]
pub struct LegendSwatch {
    color: Rgba,
}

impl LegendSwatch {
    /// Swatch in `color`.
    #[must_use]
    pub fn new(color: Rgba) -> Self {
        Self { color }
    }

    /// Draw the image.
    #[must_use]
    pub fn to_svg(&self) -> SvgEncoder {
        let (w, h) = (LEGEND_SWATCH_SIZE.0 * PT_PER_INCH, LEGEND_SWATCH_SIZE.1 * PT_PER_INCH);
        let inset = EDGE_WIDTH / 2.0;
        SvgEncoder::new(w, h).rect_outlined(
            inset,
            inset,
            w - EDGE_WIDTH,
            h - EDGE_WIDTH,
            self.color,
            EDGE,
            EDGE_WIDTH,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::YELLOW;

    #[test]
    fn test_swatch() {
        let svg = LegendSwatch::new(YELLOW).to_svg();
        assert!((svg.width() - 46.8).abs() < 1e-3);
        assert!((svg.height() - 36.0).abs() < 1e-3);
        let text = svg.render();
        assert!(text.contains(r##"fill="#FEFECD""##));
        assert!(text.contains(r##"stroke="#808080" stroke-width="1.2""##));
    }
}

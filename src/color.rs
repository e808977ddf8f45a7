//! Color types and the class palette calibration table.
//!
//! Class colors come from a color-blind friendly table indexed by class
//! count. The mapping from class value to color is fixed for a whole render
//! so the same class has the same color in every node image and the legend.

use crate::error::{Error, Result};

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 = fully opaque).
    pub a: u8,
}

impl Rgba {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 255).
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Create a color with modified alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Alpha as a 0.0-1.0 opacity.
    #[must_use]
    pub fn opacity(self) -> f32 {
        f32::from(self.a) / 255.0
    }

    /// `#RRGGBB` form, ignoring alpha. Used for both SVG and DOT attributes.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

const fn hex_digit(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => panic!("invalid hex digit in color constant"),
    }
}

/// Compile-time `#RRGGBB` parser for the constant tables below.
const fn hex(s: &str) -> Rgba {
    let b = s.as_bytes();
    assert!(b.len() == 7 && b[0] == b'#', "color constant must be #RRGGBB");
    Rgba::rgb(
        hex_digit(b[1]) * 16 + hex_digit(b[2]),
        hex_digit(b[3]) * 16 + hex_digit(b[4]),
        hex_digit(b[5]) * 16 + hex_digit(b[6]),
    )
}

/// Plain-mode regressor leaf fill.
pub const YELLOW: Rgba = hex("#fefecd");
/// Text, axis and neutral edge color.
pub const GREY: Rgba = hex("#444443");
/// Split-threshold wedge color.
pub const WEDGE_COLOR: Rgba = GREY;
/// Color of everything on the highlighted path.
pub const HIGHLIGHT_COLOR: Rgba = hex("#D67C03");
/// Scatter point color for regressor plots.
pub const SCATTER_COLOR: Rgba = hex("#225ea8");
/// Pie slice color of a class the training targets never contain.
pub const UNOBSERVED_CLASS_COLOR: Rgba = hex("#e0e0e0");

/// Color-blind friendly class palettes, indexed by class count.
///
/// Entries 0 and 1 are empty: a tree needs at least two classes to be
/// colored by class.
pub const CLASS_PALETTES: [&[Rgba]; 11] = [
    &[],
    &[],
    &[hex("#fefecd"), hex("#a1dab4")],
    &[hex("#fefecd"), hex("#D9E6F5"), hex("#a1dab4")],
    &[hex("#fefecd"), hex("#D9E6F5"), hex("#a1dab4"), hex("#fee090")],
    &[hex("#fefecd"), hex("#D9E6F5"), hex("#a1dab4"), hex("#41b6c4"), hex("#fee090")],
    &[
        hex("#fefecd"),
        hex("#c7e9b4"),
        hex("#41b6c4"),
        hex("#2c7fb8"),
        hex("#fee090"),
        hex("#f46d43"),
    ],
    &[
        hex("#fefecd"),
        hex("#c7e9b4"),
        hex("#7fcdbb"),
        hex("#41b6c4"),
        hex("#225ea8"),
        hex("#fdae61"),
        hex("#f46d43"),
    ],
    &[
        hex("#fefecd"),
        hex("#edf8b1"),
        hex("#c7e9b4"),
        hex("#7fcdbb"),
        hex("#1d91c0"),
        hex("#225ea8"),
        hex("#fdae61"),
        hex("#f46d43"),
    ],
    &[
        hex("#fefecd"),
        hex("#c7e9b4"),
        hex("#41b6c4"),
        hex("#74add1"),
        hex("#4575b4"),
        hex("#313695"),
        hex("#fee090"),
        hex("#fdae61"),
        hex("#f46d43"),
    ],
    &[
        hex("#fefecd"),
        hex("#c7e9b4"),
        hex("#41b6c4"),
        hex("#74add1"),
        hex("#4575b4"),
        hex("#313695"),
        hex("#fee090"),
        hex("#fdae61"),
        hex("#f46d43"),
        hex("#d73027"),
    ],
];

/// Palette for a classifier with `n_classes` classes.
///
/// # Errors
///
/// Returns [`Error::UnsupportedClassCount`] outside `2..=10`.
pub fn class_palette(n_classes: usize) -> Result<&'static [Rgba]> {
    match CLASS_PALETTES.get(n_classes) {
        Some(palette) if !palette.is_empty() => Ok(palette),
        _ => Err(Error::UnsupportedClassCount(n_classes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_constants() {
        assert_eq!(Rgba::BLACK, Rgba::rgb(0, 0, 0));
        assert_eq!(Rgba::WHITE, Rgba::rgb(255, 255, 255));
    }

    #[test]
    fn test_hex_constants() {
        assert_eq!(GREY, Rgba::rgb(0x44, 0x44, 0x43));
        assert_eq!(HIGHLIGHT_COLOR, Rgba::rgb(214, 124, 3));
        assert_eq!(YELLOW, Rgba::rgb(254, 254, 205));
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(HIGHLIGHT_COLOR.to_hex(), "#D67C03");
        assert_eq!(GREY.to_hex(), "#444443");
    }

    #[test]
    fn test_lowercase_constant_parses() {
        assert_eq!(SCATTER_COLOR, Rgba::rgb(0x22, 0x5e, 0xa8));
        assert_eq!(UNOBSERVED_CLASS_COLOR.to_hex(), "#E0E0E0");
    }

    #[test]
    fn test_opacity() {
        assert!((SCATTER_COLOR.with_alpha(102).opacity() - 0.4).abs() < 0.01);
        assert!((Rgba::BLACK.opacity() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_palette_sizes_match_class_count() {
        for (n, palette) in CLASS_PALETTES.iter().enumerate().skip(2) {
            assert_eq!(palette.len(), n);
        }
    }

    #[test]
    fn test_class_palette_range() {
        assert!(class_palette(2).is_ok());
        assert!(class_palette(10).is_ok());
        assert!(matches!(class_palette(11), Err(Error::UnsupportedClassCount(11))));
        assert!(matches!(class_palette(1), Err(Error::UnsupportedClassCount(1))));
        assert!(matches!(class_palette(0), Err(Error::UnsupportedClassCount(0))));
    }

    #[test]
    fn test_palette_first_color_is_yellow() {
        for palette in CLASS_PALETTES.iter().skip(2) {
            assert_eq!(palette[0], YELLOW);
        }
    }
}

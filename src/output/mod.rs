//! Output encoders.

mod svg;

pub(crate) use svg::num;
pub use svg::{SvgEncoder, TextAnchor, PT_PER_INCH};

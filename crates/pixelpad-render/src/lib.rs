//! PixelPad Render Library
//!
//! A CPU implementation of the PixelPad rendering engine contract.
//! Scenes are painted with `vello_cpu`; glyph outlines come from `ab_glyph`
//! using faces registered in a [`FontBook`], which bundles DejaVu Sans as
//! its default fallback.

pub mod fonts;
mod raster;
mod software;

pub use fonts::{FaceStyle, FontBook, FontError, load_font};
pub use software::{SoftwareEngine, encode_png};

//! PixelPad Application
//!
//! Headless driver for the PixelPad editor: replays scripts of editor
//! intents and file steps, and writes raster and document exports.

mod app;
pub mod file_ops;
pub mod fonts;
pub mod script;

pub use app::{App, RunSummary};
pub use fonts::{FontSpec, build_font_book, check_unique};
pub use script::{FileStep, Script, Step};

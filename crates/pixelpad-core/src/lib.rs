//! PixelPad Core Library
//!
//! Scene model, editing modes, styling and the export pipeline for the
//! PixelPad canvas editor. Rendering is delegated to a [`RenderEngine`].

pub mod config;
pub mod decode;
pub mod editor;
pub mod engine;
pub mod export;
pub mod input;
pub mod scene;
pub mod shapes;
pub mod style;
pub mod tools;

pub use config::{ConfigError, EditorConfig};
pub use decode::{DecodeError, DecodedImage, DefaultDecoder, ImageDecoder};
pub use editor::{Editor, EditorError, EditorResult, EditorState};
pub use engine::{EngineError, EngineResult, RasterFormat, RenderEngine, SurfaceHandle};
pub use export::{
    DOCUMENT_FILE_NAME, DocumentAssembler, DocumentError, Orientation, PdfAssembler,
    RASTER_FILE_NAME, RasterExport,
};
pub use input::{EditorIntent, PointerEvent};
pub use scene::Scene;
pub use shapes::{Color, FontFamily, ObjectId, SceneObject};
pub use style::{BrushConfig, StyleKind, TextDefaults};
pub use tools::Mode;

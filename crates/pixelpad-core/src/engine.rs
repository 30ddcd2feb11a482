//! Contract with the rendering engine that paints the scene.
//!
//! The editor keeps the [`Scene`](crate::scene::Scene) as the source of
//! truth and mirrors every mutation into the engine through this trait.
//! Engines own drawing, compositing and raster snapshots.

use crate::shapes::{Color, ObjectId, SceneObject, Stroke};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unknown surface: {0:?}")]
    UnknownSurface(SurfaceHandle),
    #[error("Invalid surface size: {0}x{1}")]
    InvalidSize(f64, f64),
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Opaque handle to a drawing surface created by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Encodings a raster snapshot can be requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterFormat {
    /// Lossless PNG, 8-bit RGBA.
    #[default]
    Png,
}

impl RasterFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            RasterFormat::Png => "image/png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            RasterFormat::Png => "png",
        }
    }
}

/// Trait for rendering backends.
///
/// Calls referring to a surface that was never created or has been disposed
/// fail with [`EngineError::UnknownSurface`].
pub trait RenderEngine {
    /// Create a surface of `size` logical pixels, cleared to `background`.
    fn create_surface(&mut self, size: Size, background: Color) -> EngineResult<SurfaceHandle>;

    /// Add an object on top of the surface's paint order.
    fn add_object(&mut self, surface: SurfaceHandle, object: &SceneObject) -> EngineResult<()>;

    /// Replace the engine's copy of an object after a mutation.
    fn update_object(&mut self, surface: SurfaceHandle, object: &SceneObject) -> EngineResult<()>;

    /// Remove an object.
    fn remove_object(&mut self, surface: SurfaceHandle, id: ObjectId) -> EngineResult<()>;

    /// Get the engine's active selection.
    fn active_selection(&self, surface: SurfaceHandle) -> EngineResult<Option<ObjectId>>;

    /// Set (or clear) the active selection.
    fn set_active_selection(
        &mut self,
        surface: SurfaceHandle,
        id: Option<ObjectId>,
    ) -> EngineResult<()>;

    /// Show (or clear) the stroke currently being drawn.
    fn set_live_stroke(&mut self, surface: SurfaceHandle, stroke: Option<&Stroke>)
    -> EngineResult<()>;

    /// Schedule a repaint of the surface.
    fn request_repaint(&mut self, surface: SurfaceHandle) -> EngineResult<()>;

    /// Rasterize the whole surface at `multiplier` × its logical size.
    ///
    /// The snapshot contains objects and the live stroke, never selection
    /// chrome.
    fn snapshot_raster(
        &mut self,
        surface: SurfaceHandle,
        multiplier: u32,
        format: RasterFormat,
    ) -> EngineResult<Vec<u8>>;

    /// Release the surface and everything attached to it.
    fn dispose(&mut self, surface: SurfaceHandle) -> EngineResult<()>;
}

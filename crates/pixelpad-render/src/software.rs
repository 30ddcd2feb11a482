//! CPU implementation of the rendering engine contract.

use crate::fonts::FontBook;
use crate::raster::{Painter, image_source};
use image::RgbaImage;
use kurbo::Size;
use pixelpad_core::engine::{EngineError, EngineResult, RasterFormat, RenderEngine, SurfaceHandle};
use pixelpad_core::shapes::{Color, ObjectId, ObjectTrait, SceneObject, Stroke};
use std::collections::HashMap;
use vello_cpu::ImageSource;

/// Color of the selection outline in preview frames.
const SELECTION_COLOR: Color = Color::rgb(59, 130, 246);

/// Largest supported device dimension.
const MAX_DIMENSION: f64 = 16384.0;

struct Surface {
    size: Size,
    background: Color,
    /// Objects in paint order (back to front).
    objects: Vec<SceneObject>,
    selection: Option<ObjectId>,
    live_stroke: Option<Stroke>,
    /// Uploaded bitmaps of the image objects on this surface.
    images: HashMap<ObjectId, ImageSource>,
    /// Last repainted preview, including selection chrome.
    frame: Option<RgbaImage>,
    dirty: bool,
}

impl Surface {
    fn new(size: Size, background: Color) -> Self {
        Self {
            size,
            background,
            objects: Vec::new(),
            selection: None,
            live_stroke: None,
            images: HashMap::new(),
            frame: None,
            dirty: true,
        }
    }

    fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id() == id)
    }

    /// Upload an image object's bitmap once, keyed by object id.
    fn cache_image(&mut self, object: &SceneObject) {
        let SceneObject::Image(image) = object else {
            return;
        };
        if self.images.contains_key(&image.id()) {
            return;
        }
        if let Some(source) = image_source(image) {
            self.images.insert(image.id(), source);
        }
    }

    /// Paint objects and the live stroke at `scale`, without chrome.
    fn paint(&self, scale: f64, fonts: &FontBook) -> EngineResult<Painter> {
        let width = (self.size.width * scale).round();
        let height = (self.size.height * scale).round();
        if width < 1.0 || height < 1.0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(EngineError::InvalidSize(width, height));
        }

        let mut painter = Painter::new(width as u16, height as u16, scale, self.background);
        for object in &self.objects {
            painter.draw_object(object, fonts, &self.images);
        }
        if let Some(stroke) = &self.live_stroke {
            painter.draw_stroke(stroke);
        }
        Ok(painter)
    }
}

/// Software rasterizer holding any number of surfaces.
///
/// Each surface keeps its own copy of the scene objects it is sent; the
/// bitmaps inside images are shared, not copied.
#[derive(Default)]
pub struct SoftwareEngine {
    surfaces: HashMap<SurfaceHandle, Surface>,
    next_handle: u64,
    fonts: FontBook,
}

impl SoftwareEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine that draws text with `fonts`.
    pub fn with_fonts(fonts: FontBook) -> Self {
        Self {
            fonts,
            ..Self::default()
        }
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    /// The most recent preview frame, if the surface has been repainted.
    pub fn frame(&self, surface: SurfaceHandle) -> Option<&RgbaImage> {
        self.surfaces.get(&surface)?.frame.as_ref()
    }

    #[cfg(test)]
    fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    #[cfg(test)]
    fn cached_images(&self, surface: SurfaceHandle) -> EngineResult<usize> {
        Ok(self.surface(surface)?.images.len())
    }

    /// Ids on a surface in paint order.
    pub fn object_ids(&self, surface: SurfaceHandle) -> EngineResult<Vec<ObjectId>> {
        Ok(self.surface(surface)?.objects.iter().map(SceneObject::id).collect())
    }

    fn surface(&self, handle: SurfaceHandle) -> EngineResult<&Surface> {
        self.surfaces
            .get(&handle)
            .ok_or(EngineError::UnknownSurface(handle))
    }

    fn surface_mut(&mut self, handle: SurfaceHandle) -> EngineResult<&mut Surface> {
        self.surfaces
            .get_mut(&handle)
            .ok_or(EngineError::UnknownSurface(handle))
    }
}

impl RenderEngine for SoftwareEngine {
    fn create_surface(&mut self, size: Size, background: Color) -> EngineResult<SurfaceHandle> {
        if !(size.width >= 1.0 && size.height >= 1.0)
            || size.width > MAX_DIMENSION
            || size.height > MAX_DIMENSION
        {
            return Err(EngineError::InvalidSize(size.width, size.height));
        }
        self.next_handle += 1;
        let handle = SurfaceHandle(self.next_handle);
        self.surfaces.insert(handle, Surface::new(size, background));
        log::debug!(
            "Created surface {:?} ({}x{})",
            handle,
            size.width,
            size.height
        );
        Ok(handle)
    }

    fn add_object(&mut self, surface: SurfaceHandle, object: &SceneObject) -> EngineResult<()> {
        let surface = self.surface_mut(surface)?;
        // Re-adding an object moves it to the top.
        if let Some(index) = surface.index_of(object.id()) {
            surface.objects.remove(index);
        }
        surface.objects.push(object.clone());
        surface.cache_image(object);
        surface.dirty = true;
        Ok(())
    }

    fn update_object(&mut self, surface: SurfaceHandle, object: &SceneObject) -> EngineResult<()> {
        let surface = self.surface_mut(surface)?;
        match surface.index_of(object.id()) {
            Some(index) => surface.objects[index] = object.clone(),
            None => {
                log::warn!("update_object: unknown object {}, adding", object.id());
                surface.objects.push(object.clone());
            }
        }
        surface.cache_image(object);
        surface.dirty = true;
        Ok(())
    }

    fn remove_object(&mut self, surface: SurfaceHandle, id: ObjectId) -> EngineResult<()> {
        let surface = self.surface_mut(surface)?;
        if let Some(index) = surface.index_of(id) {
            surface.objects.remove(index);
            surface.dirty = true;
        }
        surface.images.remove(&id);
        if surface.selection == Some(id) {
            surface.selection = None;
        }
        Ok(())
    }

    fn active_selection(&self, surface: SurfaceHandle) -> EngineResult<Option<ObjectId>> {
        Ok(self.surface(surface)?.selection)
    }

    fn set_active_selection(
        &mut self,
        surface: SurfaceHandle,
        id: Option<ObjectId>,
    ) -> EngineResult<()> {
        let surface = self.surface_mut(surface)?;
        if surface.selection != id {
            surface.selection = id;
            surface.dirty = true;
        }
        Ok(())
    }

    fn set_live_stroke(
        &mut self,
        surface: SurfaceHandle,
        stroke: Option<&Stroke>,
    ) -> EngineResult<()> {
        let surface = self.surface_mut(surface)?;
        surface.live_stroke = stroke.cloned();
        surface.dirty = true;
        Ok(())
    }

    fn request_repaint(&mut self, handle: SurfaceHandle) -> EngineResult<()> {
        let surface = self.surface(handle)?;
        if !surface.dirty && surface.frame.is_some() {
            return Ok(());
        }

        let mut painter = surface.paint(1.0, &self.fonts)?;
        if let Some(selected) = surface
            .selection
            .and_then(|id| surface.objects.iter().find(|o| o.id() == id))
        {
            painter.outline(selected.bounds().inflate(2.0, 2.0), SELECTION_COLOR);
        }
        let frame = painter.finish();

        let surface = self.surface_mut(handle)?;
        surface.frame = Some(frame);
        surface.dirty = false;
        Ok(())
    }

    fn snapshot_raster(
        &mut self,
        handle: SurfaceHandle,
        multiplier: u32,
        format: RasterFormat,
    ) -> EngineResult<Vec<u8>> {
        let surface = self.surface(handle)?;
        if multiplier == 0 {
            return Err(EngineError::InvalidSize(0.0, 0.0));
        }
        let painter = surface.paint(multiplier as f64, &self.fonts)?;
        let (width, height) = (painter.width(), painter.height());
        let bytes = match format {
            RasterFormat::Png => encode_png(painter.finish().as_raw(), width, height)?,
        };
        log::debug!(
            "Snapshot {:?}: {}x{} {} ({} bytes)",
            handle,
            width,
            height,
            format.extension(),
            bytes.len()
        );
        Ok(bytes)
    }

    fn dispose(&mut self, surface: SurfaceHandle) -> EngineResult<()> {
        self.surfaces
            .remove(&surface)
            .map(|_| log::debug!("Disposed surface {surface:?}"))
            .ok_or(EngineError::UnknownSurface(surface))
    }
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> EngineResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| EngineError::Encode(format!("PNG header: {e}")))?;
        writer
            .write_image_data(rgba_data)
            .map_err(|e| EngineError::Encode(format!("PNG data: {e}")))?;
    }
    Ok(png_data)
}

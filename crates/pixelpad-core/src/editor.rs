//! The editor: scene, modes and styling wired to a rendering engine.
//!
//! [`Editor`] owns the [`Scene`] and mirrors every mutation into its
//! [`RenderEngine`]. The scene is authoritative; engine failures during a
//! mutation are logged and never roll the scene back.

use crate::config::EditorConfig;
use crate::decode::{DecodeError, DefaultDecoder, ImageDecoder};
use crate::engine::{EngineError, EngineResult, RasterFormat, RenderEngine, SurfaceHandle};
use crate::export::{DocumentAssembler, DocumentError, PdfAssembler, RasterExport, assemble_document};
use crate::input::{EditorIntent, PointerEvent};
use crate::scene::Scene;
use crate::shapes::{Color, FontFamily, Image, ObjectId, SceneObject, Stroke, TextBox};
use crate::style::{BrushConfig, StyleKind, TextDefaults};
use crate::tools::{Mode, ModeController, StrokeTool, Transition};
use kurbo::Point;
use thiserror::Error;

/// Distance in logical pixels within which a pointer hits an object.
const HIT_TOLERANCE: f64 = 2.0;

/// Editor errors.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Image import failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("Rendering engine unavailable")]
    EngineUnavailable,
    #[error("Engine error: {0}")]
    Engine(EngineError),
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
    #[error("Invalid font size: {0}")]
    InvalidFontSize(u32),
}

impl From<EngineError> for EditorError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownSurface(_) => EditorError::EngineUnavailable,
            other => EditorError::Engine(other),
        }
    }
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Mode, brush and text defaults.
#[derive(Debug, Clone)]
pub struct EditorState {
    modes: ModeController,
    brush: BrushConfig,
    text_defaults: TextDefaults,
}

impl EditorState {
    fn new(config: &EditorConfig) -> Self {
        Self {
            modes: ModeController::new(config.canvas.background),
            brush: config.brush.initial(),
            text_defaults: config.text.defaults,
        }
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn brush(&self) -> &BrushConfig {
        &self.brush
    }

    pub fn text_defaults(&self) -> &TextDefaults {
        &self.text_defaults
    }

    /// The live stroke tool, present while drawing or erasing.
    pub fn stroke_tool(&self) -> Option<&StrokeTool> {
        self.modes.tool()
    }
}

/// An object being dragged in Select mode.
#[derive(Debug, Clone, Copy)]
struct Drag {
    id: ObjectId,
    last: Point,
}

fn log_engine(result: EngineResult<()>, action: &str) {
    if let Err(e) = result {
        log::error!("Engine failed to {action}: {e}");
    }
}

/// A single-canvas editor bound to a rendering engine.
pub struct Editor<E: RenderEngine> {
    config: EditorConfig,
    engine: E,
    decoder: DefaultDecoder,
    surface: SurfaceHandle,
    released: bool,
    scene: Scene,
    state: EditorState,
    drag: Option<Drag>,
}

impl<E: RenderEngine> Editor<E> {
    /// Create an editor and its drawing surface.
    ///
    /// Out-of-range config values are clamped first, as when loading a file.
    pub fn new(mut config: EditorConfig, mut engine: E) -> EditorResult<Self> {
        config.validate_and_clamp();
        let surface = engine.create_surface(config.canvas.size(), config.canvas.background)?;
        log::info!(
            "Editor created: {}x{} canvas, background {}",
            config.canvas.width,
            config.canvas.height,
            config.canvas.background
        );
        Ok(Self {
            state: EditorState::new(&config),
            config,
            engine,
            decoder: DefaultDecoder,
            surface,
            released: false,
            scene: Scene::new(),
            drag: None,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn brush(&self) -> &BrushConfig {
        &self.state.brush
    }

    pub fn text_defaults(&self) -> &TextDefaults {
        &self.state.text_defaults
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn selection(&self) -> Option<ObjectId> {
        self.scene.selection()
    }

    /// The stroke currently being drawn, as it would be committed now.
    pub fn live_stroke(&self) -> Option<Stroke> {
        self.state.modes.tool().and_then(StrokeTool::preview)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn surface(&self) -> SurfaceHandle {
        self.surface
    }

    // --- Modes ---

    /// Toggle freehand drawing.
    pub fn enter_freehand_draw(&mut self) {
        let transition = self.state.modes.enter_freehand_draw(&self.state.brush);
        self.on_transition(transition);
    }

    /// Toggle erasing.
    pub fn enter_erase(&mut self) {
        let transition = self.state.modes.enter_erase(&self.state.brush);
        self.on_transition(transition);
    }

    fn set_mode(&mut self, mode: Mode) {
        let transition = self.state.modes.set_mode(mode, &self.state.brush);
        self.on_transition(transition);
    }

    fn on_transition(&mut self, transition: Transition) {
        if !transition.is_change() {
            return;
        }
        log::info!(
            "Mode {} -> {}",
            transition.from.name(),
            transition.to.name()
        );

        // Any gesture in flight belonged to the old mode.
        self.drag = None;
        log_engine(
            self.engine.set_live_stroke(self.surface, None),
            "clear live stroke",
        );

        match transition.to {
            Mode::FreehandDraw => self.set_all_interactive(false),
            Mode::Select => self.set_all_interactive(true),
            Mode::Erase => {}
        }
        self.repaint();
    }

    fn set_all_interactive(&mut self, interactive: bool) {
        let surface = self.surface;
        let engine = &mut self.engine;
        self.scene.for_each_mut(|object| {
            if object.as_stroke().is_some() || object.is_selectable() == interactive {
                return;
            }
            object.set_interactive(interactive);
            log_engine(engine.update_object(surface, object), "update object");
        });
    }

    // --- Scene operations ---

    /// Add a text box with the configured content at the configured
    /// position, and select it.
    pub fn add_text(&mut self) -> ObjectId {
        let position = self.config.text.position;
        let content = self.config.text.content.clone();
        self.add_text_at(position, content)
    }

    /// Add a text box styled from the text defaults, and select it.
    ///
    /// Switches back to Select mode first so the new box is editable.
    pub fn add_text_at(&mut self, position: Point, content: impl Into<String>) -> ObjectId {
        self.set_mode(Mode::Select);

        let defaults = self.state.text_defaults;
        let text = TextBox::new(position, content)
            .with_font_family(defaults.font_family)
            .with_font_size(defaults.font_size)
            .with_fill(Color::BLACK);
        let object = SceneObject::from(text);
        log_engine(self.engine.add_object(self.surface, &object), "add text");

        let id = self.scene.add(object);
        self.scene.select(id);
        log_engine(
            self.engine.set_active_selection(self.surface, Some(id)),
            "select text",
        );
        log::debug!("Added text box {id}");
        self.repaint();
        id
    }

    /// Remove the selected object. No-op without a selection.
    pub fn delete_selected(&mut self) -> Option<SceneObject> {
        let Some(removed) = self.scene.delete_selected() else {
            log::debug!("delete_selected: nothing selected");
            return None;
        };
        let id = removed.id();
        if self.drag.is_some_and(|drag| drag.id == id) {
            self.drag = None;
        }
        log_engine(self.engine.remove_object(self.surface, id), "remove object");
        log_engine(
            self.engine.set_active_selection(self.surface, None),
            "clear selection",
        );
        log::debug!("Deleted {} {id}", removed.kind().name());
        self.repaint();
        Some(removed)
    }

    /// Flip bold, italic or underline on the selected text box.
    pub fn update_style(&mut self, kind: StyleKind) {
        let Some(text) = self.scene.selected_text_mut() else {
            log::debug!("update_style({kind:?}): selection is not text");
            return;
        };
        kind.toggle(text);
        self.mirror_selected("update style");
    }

    /// Set the font size for new text and for the selected text box.
    ///
    /// Zero is rejected; sizes above the configured maximum are clamped.
    pub fn change_font_size(&mut self, size: u32) -> EditorResult<()> {
        if size == 0 {
            log::warn!("Rejected font size 0");
            return Err(EditorError::InvalidFontSize(size));
        }
        let clamped = self.config.text.clamp_font_size(size);
        if clamped != size {
            log::warn!("Font size {size} clamped to {clamped}");
        }
        let size = clamped;
        self.state.text_defaults.font_size = size;
        if let Some(text) = self.scene.selected_text_mut() {
            text.font_size = size;
            self.mirror_selected("resize text");
        }
        Ok(())
    }

    /// Set the font family for new text and for the selected text box.
    pub fn change_font_family(&mut self, family: FontFamily) {
        self.state.text_defaults.font_family = family;
        if let Some(text) = self.scene.selected_text_mut() {
            text.font_family = family;
            self.mirror_selected("change font");
        }
    }

    /// Replace the content of the selected text box.
    pub fn set_selected_text(&mut self, content: impl Into<String>) {
        let Some(text) = self.scene.selected_text_mut() else {
            log::debug!("set_selected_text: selection is not text");
            return;
        };
        text.content = content.into();
        self.mirror_selected("edit text");
    }

    /// Set the brush color. Applies to the live tool only while drawing.
    pub fn change_brush_color(&mut self, color: Color) {
        self.state.brush.color = color;
        self.state.modes.apply_brush_color(color);
        self.refresh_live_stroke();
    }

    /// Set the brush width, clamped to the configured range.
    pub fn change_brush_width(&mut self, width: f64) {
        let clamped = self.config.brush.clamp_width(width);
        if (clamped - width).abs() > f64::EPSILON {
            log::warn!("Brush width {width} clamped to {clamped}");
        }
        self.state.brush.width = clamped;
        self.state.modes.apply_brush_width(clamped);
        self.refresh_live_stroke();
    }

    /// Decode an image file and place it on top of the scene.
    ///
    /// On failure the scene is untouched. The selection never changes.
    pub fn import_image(&mut self, bytes: &[u8]) -> EditorResult<ObjectId> {
        let decoded = self.decoder.decode(bytes).map_err(|e| {
            log::warn!("Image import rejected: {e}");
            e
        })?;

        let placement = self.config.image;
        let image = Image::new(placement.position, decoded.bitmap, decoded.format)
            .with_scale(placement.scale_x, placement.scale_y);
        let mut object = SceneObject::from(image);
        if self.mode() == Mode::FreehandDraw {
            object.set_interactive(false);
        }
        log_engine(self.engine.add_object(self.surface, &object), "add image");

        let id = self.scene.add(object);
        log::info!("Imported {} image {id}", decoded.format.mime_type());
        self.repaint();
        Ok(id)
    }

    // --- Pointer input ---

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position } => self.pointer_down(position),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position } => self.pointer_up(position),
        }
    }

    /// Select mode: pick the topmost evented object and start dragging it.
    /// Drawing modes: start a stroke.
    pub fn pointer_down(&mut self, point: Point) {
        if self.mode().is_drawing() {
            if let Some(tool) = self.state.modes.tool_mut() {
                tool.begin(point);
            }
            self.refresh_live_stroke();
            return;
        }

        let hit = self
            .scene
            .topmost_at(point, HIT_TOLERANCE)
            .filter(|&id| self.scene.select(id));
        match hit {
            Some(id) => {
                if let Some(text) = self.scene.selected_text() {
                    self.state.text_defaults.sync_from(text);
                }
                self.drag = Some(Drag { id, last: point });
            }
            None => {
                self.scene.clear_selection();
                self.drag = None;
            }
        }
        log_engine(
            self.engine.set_active_selection(self.surface, hit),
            "set selection",
        );
        self.repaint();
    }

    pub fn pointer_move(&mut self, point: Point) {
        if self.mode().is_drawing() {
            if let Some(tool) = self.state.modes.tool_mut() {
                tool.update(point);
            }
            self.refresh_live_stroke();
            return;
        }
        self.drag_to(point);
    }

    /// Drawing modes commit the stroke; Select mode ends the drag.
    pub fn pointer_up(&mut self, point: Point) {
        if !self.mode().is_drawing() {
            self.drag_to(point);
            self.drag = None;
            return;
        }

        let stroke = self.state.modes.tool_mut().and_then(|tool| {
            tool.update(point);
            tool.end()
        });
        log_engine(
            self.engine.set_live_stroke(self.surface, None),
            "clear live stroke",
        );
        if let Some(stroke) = stroke {
            let object = SceneObject::from(stroke);
            log_engine(self.engine.add_object(self.surface, &object), "add stroke");
            let id = self.scene.add(object);
            log::debug!("Committed stroke {id}");
        }
        self.repaint();
    }

    fn drag_to(&mut self, point: Point) {
        let Some(drag) = &mut self.drag else {
            return;
        };
        let delta = point - drag.last;
        drag.last = point;
        let id = drag.id;
        if delta.hypot2() == 0.0 {
            return;
        }
        let Some(object) = self.scene.get_mut(id) else {
            return;
        };
        if object.translate(delta) {
            log_engine(self.engine.update_object(self.surface, object), "move object");
            self.repaint();
        }
    }

    // --- Intents ---

    /// Dispatch a UI intent to the matching operation.
    pub fn apply(&mut self, intent: EditorIntent) -> EditorResult<()> {
        log::debug!("Intent: {intent:?}");
        match intent {
            EditorIntent::EnterFreehandDraw => self.enter_freehand_draw(),
            EditorIntent::EnterErase => self.enter_erase(),
            EditorIntent::AddText { content, position } => {
                let position = position.unwrap_or(self.config.text.position);
                let content = content.unwrap_or_else(|| self.config.text.content.clone());
                self.add_text_at(position, content);
            }
            EditorIntent::DeleteSelected => {
                self.delete_selected();
            }
            EditorIntent::UpdateStyle { kind } => self.update_style(kind),
            EditorIntent::ChangeFontSize { size } => self.change_font_size(size)?,
            EditorIntent::ChangeFontFamily { family } => self.change_font_family(family),
            EditorIntent::ChangeBrushColor { color } => self.change_brush_color(color),
            EditorIntent::ChangeBrushWidth { width } => self.change_brush_width(width),
            EditorIntent::SetSelectedText { content } => self.set_selected_text(content),
            EditorIntent::Pointer(event) => self.handle_pointer(event),
        }
        Ok(())
    }

    // --- Export ---

    /// Snapshot the canvas at the configured multiplier as PNG.
    pub fn export_raster(&mut self) -> EditorResult<RasterExport> {
        if self.released {
            return Err(EditorError::EngineUnavailable);
        }
        let multiplier = self.config.export.multiplier;
        let format = RasterFormat::Png;
        let bytes = self
            .engine
            .snapshot_raster(self.surface, multiplier, format)
            .map_err(|e| {
                log::error!("Snapshot failed: {e}");
                EditorError::from(e)
            })?;
        log::info!(
            "Exported {} raster ({} bytes, x{multiplier})",
            format.extension(),
            bytes.len()
        );
        Ok(RasterExport {
            bytes,
            format,
            width: self.config.canvas.width,
            height: self.config.canvas.height,
            multiplier,
        })
    }

    /// Export a single-page PDF filled with the raster snapshot.
    pub fn export_document(&mut self) -> EditorResult<Vec<u8>> {
        self.export_document_with(&mut PdfAssembler::new())
    }

    /// Export through a custom document assembler.
    pub fn export_document_with(
        &mut self,
        assembler: &mut dyn DocumentAssembler,
    ) -> EditorResult<Vec<u8>> {
        let raster = self.export_raster()?;
        let bytes = assemble_document(&raster, assembler)?;
        log::info!("Exported document ({} bytes)", bytes.len());
        Ok(bytes)
    }

    // --- Lifecycle ---

    /// Release the engine surface. Dropping the editor does the same.
    pub fn dispose(mut self) -> EditorResult<()> {
        self.release().map_err(EditorError::from)
    }

    fn release(&mut self) -> EngineResult<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.drag = None;
        log::info!("Disposing editor surface {:?}", self.surface);
        self.engine.dispose(self.surface)
    }

    fn mirror_selected(&mut self, action: &str) {
        if let Some(object) = self.scene.selected() {
            log_engine(self.engine.update_object(self.surface, object), action);
        }
        self.repaint();
    }

    fn refresh_live_stroke(&mut self) {
        let preview = self.live_stroke();
        if preview.is_none() && !self.mode().is_drawing() {
            return;
        }
        log_engine(
            self.engine.set_live_stroke(self.surface, preview.as_ref()),
            "update live stroke",
        );
        self.repaint();
    }

    fn repaint(&mut self) {
        log_engine(self.engine.request_repaint(self.surface), "repaint");
    }
}

impl<E: RenderEngine> Drop for Editor<E> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::error!("Engine failed to dispose surface: {e}");
        }
    }
}

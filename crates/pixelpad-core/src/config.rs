//! Editor configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! {
//!   "canvas": { "width": 1024, "height": 768, "background": "#fffff0" },
//!   "brush": { "max_width": 40 }
//! }
//! ```

use crate::shapes::Color;
use crate::style::{BrushConfig, TextDefaults};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Canvas surface settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Fill color of the surface, also painted by the eraser.
    pub background: Color,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: Color::WHITE,
        }
    }
}

impl CanvasConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }
}

/// Brush defaults and the allowed width range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    pub color: Color,
    pub width: f64,
    pub min_width: f64,
    pub max_width: f64,
}

impl Default for BrushSettings {
    fn default() -> Self {
        let brush = BrushConfig::default();
        Self {
            color: brush.color,
            width: brush.width,
            min_width: 1.0,
            max_width: 30.0,
        }
    }
}

impl BrushSettings {
    pub fn initial(&self) -> BrushConfig {
        BrushConfig {
            color: self.color,
            width: self.clamp_width(self.width),
        }
    }

    /// Clamp a width into the allowed range.
    pub fn clamp_width(&self, width: f64) -> f64 {
        width.clamp(self.min_width, self.max_width)
    }
}

/// Defaults for newly added text boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSettings {
    pub defaults: TextDefaults,
    pub content: String,
    pub position: Point,
    /// Largest font size accepted, in pixels.
    pub max_font_size: u32,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            defaults: TextDefaults::default(),
            content: crate::shapes::TextBox::DEFAULT_CONTENT.to_string(),
            position: Point::new(100.0, 100.0),
            max_font_size: 512,
        }
    }
}

impl TextSettings {
    /// Clamp a font size to at most `max_font_size`.
    pub fn clamp_font_size(&self, size: u32) -> u32 {
        size.min(self.max_font_size)
    }
}

/// Placement of imported images.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    pub position: Point,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            position: Point::new(150.0, 150.0),
            scale_x: 0.5,
            scale_y: 0.5,
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Supersampling multiplier for raster snapshots.
    pub multiplier: u32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self { multiplier: 2 }
    }
}

/// Root configuration for an editor instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas: CanvasConfig,
    pub brush: BrushSettings,
    pub text: TextSettings,
    pub image: ImageSettings,
    pub export: ExportSettings,
}

impl EditorConfig {
    /// Parse from JSON and clamp out-of-range values.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        config.validate_and_clamp();
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace or clamp values the editor cannot work with, logging each fix.
    pub fn validate_and_clamp(&mut self) {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            log::warn!(
                "Invalid canvas size {}x{}, using 800x600",
                self.canvas.width,
                self.canvas.height
            );
            self.canvas.width = 800;
            self.canvas.height = 600;
        }

        if !(self.brush.min_width > 0.0
            && self.brush.min_width <= self.brush.max_width
            && self.brush.max_width.is_finite())
        {
            log::warn!(
                "Invalid brush width range {:.1}-{:.1}, using 1.0-30.0",
                self.brush.min_width,
                self.brush.max_width
            );
            self.brush.min_width = 1.0;
            self.brush.max_width = 30.0;
        }

        if !(self.brush.min_width..=self.brush.max_width).contains(&self.brush.width) {
            log::warn!("Invalid brush width {:.1}, clamping", self.brush.width);
            self.brush.width = self.brush.clamp_width(self.brush.width);
        }

        if self.text.max_font_size == 0 {
            log::warn!("Invalid max font size 0, using 512");
            self.text.max_font_size = 512;
        }

        if self.text.defaults.font_size == 0 {
            log::warn!("Invalid default font size 0, using 20");
            self.text.defaults.font_size = 20;
        }

        let size = self.text.defaults.font_size;
        if size > self.text.max_font_size {
            log::warn!("Default font size {size} clamped to {}", self.text.max_font_size);
            self.text.defaults.font_size = self.text.clamp_font_size(size);
        }

        if self.export.multiplier == 0 {
            log::warn!("Invalid export multiplier 0, using 1");
            self.export.multiplier = 1;
        }
    }
}

//! Brush configuration and text styling defaults.

use crate::shapes::{Color, FontFamily, TextBox};
use serde::{Deserialize, Serialize};

/// Style record consumed by freehand and erase strokes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    pub color: Color,
    pub width: f64,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 5.0,
        }
    }
}

/// Defaults applied to newly created text, mirrored from the selected text
/// box whenever one is activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDefaults {
    pub font_family: FontFamily,
    pub font_size: u32,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            font_family: FontFamily::Arial,
            font_size: 20,
        }
    }
}

impl TextDefaults {
    /// Copy family and size from an existing text box.
    pub fn sync_from(&mut self, text: &TextBox) {
        self.font_family = text.font_family;
        self.font_size = text.font_size;
    }
}

/// Boolean text attributes that toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleKind {
    Bold,
    Italic,
    Underline,
}

impl StyleKind {
    /// Flip the attribute on `text`. Returns the new value.
    pub fn toggle(self, text: &mut TextBox) -> bool {
        let flag = match self {
            StyleKind::Bold => &mut text.bold,
            StyleKind::Italic => &mut text.italic,
            StyleKind::Underline => &mut text.underline,
        };
        *flag = !*flag;
        *flag
    }
}

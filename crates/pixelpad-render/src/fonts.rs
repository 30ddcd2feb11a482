//! Font registry for text rasterization.

use ab_glyph::FontArc;
use pixelpad_core::shapes::FontFamily;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// DejaVu Sans, used when nothing better is registered.
static DEFAULT_FACE: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Font loading errors.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid font data: {0}")]
    Invalid(String),
}

/// Weight and slant of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FaceStyle {
    pub bold: bool,
    pub italic: bool,
}

impl FaceStyle {
    pub const REGULAR: FaceStyle = FaceStyle {
        bold: false,
        italic: false,
    };

    pub fn new(bold: bool, italic: bool) -> Self {
        Self { bold, italic }
    }
}

/// A face picked for a request, and which styles it lacks.
#[derive(Clone)]
pub struct ResolvedFace<'a> {
    pub font: &'a FontArc,
    /// Bold was requested but the face is not bold.
    pub synthetic_bold: bool,
    /// Italic was requested but the face is not italic.
    pub synthetic_italic: bool,
}

/// Faces keyed by family and style.
///
/// Lookup falls back to the family's regular face, then to the fallback face
/// (the bundled DejaVu Sans unless replaced), then to any registered face.
#[derive(Clone)]
pub struct FontBook {
    faces: HashMap<(FontFamily, FaceStyle), FontArc>,
    fallback: Option<FontArc>,
}

impl Default for FontBook {
    fn default() -> Self {
        let fallback = match FontArc::try_from_slice(DEFAULT_FACE) {
            Ok(font) => Some(font),
            Err(e) => {
                log::error!("Bundled font is unreadable: {e}");
                None
            }
        };
        Self {
            faces: HashMap::new(),
            fallback,
        }
    }
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// A book with no faces at all, so text paints without glyphs.
    #[cfg(test)]
    pub(crate) fn without_fallback() -> Self {
        Self {
            faces: HashMap::new(),
            fallback: None,
        }
    }

    /// Register a face for a family and style.
    pub fn register(&mut self, family: FontFamily, style: FaceStyle, font: FontArc) {
        log::debug!(
            "Registered font {} (bold={}, italic={})",
            family,
            style.bold,
            style.italic
        );
        self.faces.insert((family, style), font);
    }

    /// Load a TrueType/OpenType file and register it.
    pub fn register_file(
        &mut self,
        family: FontFamily,
        style: FaceStyle,
        path: &Path,
    ) -> Result<(), FontError> {
        let font = load_font(path)?;
        self.register(family, style, font);
        Ok(())
    }

    /// Face used when a family has nothing registered.
    pub fn set_fallback(&mut self, font: FontArc) {
        self.fallback = Some(font);
    }

    /// Pick the best face for `family` in `style`.
    pub fn resolve(&self, family: FontFamily, style: FaceStyle) -> Option<ResolvedFace<'_>> {
        if let Some(font) = self.faces.get(&(family, style)) {
            return Some(ResolvedFace {
                font,
                synthetic_bold: false,
                synthetic_italic: false,
            });
        }

        // Drop one attribute at a time before giving up on the family.
        let partial = [
            FaceStyle::new(style.bold, false),
            FaceStyle::new(false, style.italic),
            FaceStyle::REGULAR,
        ];
        for candidate in partial {
            if let Some(font) = self.faces.get(&(family, candidate)) {
                return Some(ResolvedFace {
                    font,
                    synthetic_bold: style.bold && !candidate.bold,
                    synthetic_italic: style.italic && !candidate.italic,
                });
            }
        }

        let font = self.fallback.as_ref().or_else(|| {
            // deterministic pick among whatever is registered
            FontFamily::all()
                .iter()
                .find_map(|f| self.faces.get(&(*f, FaceStyle::REGULAR)))
                .or_else(|| self.faces.values().next())
        })?;
        Some(ResolvedFace {
            font,
            synthetic_bold: style.bold,
            synthetic_italic: style.italic,
        })
    }
}

/// Read a font file.
pub fn load_font(path: &Path) -> Result<FontArc, FontError> {
    let data = std::fs::read(path)?;
    FontArc::try_from_vec(data).map_err(|e| FontError::Invalid(format!("{}: {e}", path.display())))
}

//! `--font` arguments.

use anyhow::{Context, Result, bail};
use pixelpad_core::FontFamily;
use pixelpad_render::{FaceStyle, FontBook, load_font};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// `FAMILY[:STYLE]=PATH`, where STYLE is `regular`, `bold`, `italic` or
/// `bold-italic`.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: FontFamily,
    pub style: FaceStyle,
    pub path: PathBuf,
}

impl FromStr for FontSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (face, path) = s
            .split_once('=')
            .ok_or_else(|| format!("expected FAMILY[:STYLE]=PATH, got '{s}'"))?;
        let (family, style) = match face.rsplit_once(':') {
            Some((family, style)) => (family, style),
            None => (face, "regular"),
        };
        let style = match style.trim().to_lowercase().as_str() {
            "regular" => FaceStyle::REGULAR,
            "bold" => FaceStyle::new(true, false),
            "italic" => FaceStyle::new(false, true),
            "bold-italic" | "bolditalic" => FaceStyle::new(true, true),
            other => return Err(format!("unknown font style '{other}'")),
        };
        if path.is_empty() {
            return Err("empty font path".to_string());
        }
        Ok(Self {
            family: family.trim().parse()?,
            style,
            path: PathBuf::from(path),
        })
    }
}

/// Load every requested face into a book. Without a `fallback` path the
/// bundled face stays the fallback.
pub fn build_font_book(specs: &[FontSpec], fallback: Option<&Path>) -> Result<FontBook> {
    let mut book = FontBook::new();
    for spec in specs {
        book.register_file(spec.family, spec.style, &spec.path)
            .with_context(|| format!("failed to load font {}", spec.path.display()))?;
    }
    if let Some(path) = fallback {
        let font = load_font(path)
            .with_context(|| format!("failed to load fallback font {}", path.display()))?;
        book.set_fallback(font);
    }
    if specs.is_empty() && fallback.is_none() {
        log::info!("No fonts given; text uses the bundled DejaVu Sans");
    }
    Ok(book)
}

/// Reject duplicate family/style pairs, which would silently shadow.
pub fn check_unique(specs: &[FontSpec]) -> Result<()> {
    for (i, spec) in specs.iter().enumerate() {
        if specs[..i]
            .iter()
            .any(|s| s.family == spec.family && s.style == spec.style)
        {
            bail!("font {} given twice for the same style", spec.family);
        }
    }
    Ok(())
}

//! Editable text box.

use super::{Color, ObjectId, ObjectTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Font family options offered by the text palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    #[serde(rename = "Arial")]
    Arial,
    #[serde(rename = "Courier New")]
    CourierNew,
    #[serde(rename = "Georgia")]
    Georgia,
    #[serde(rename = "Times New Roman")]
    TimesNewRoman,
    #[serde(rename = "Verdana")]
    Verdana,
}

impl FontFamily {
    /// Get the font family name as shown in the palette.
    pub fn name(&self) -> &'static str {
        match self {
            FontFamily::Arial => "Arial",
            FontFamily::CourierNew => "Courier New",
            FontFamily::Georgia => "Georgia",
            FontFamily::TimesNewRoman => "Times New Roman",
            FontFamily::Verdana => "Verdana",
        }
    }

    /// Get all available font families.
    pub fn all() -> &'static [FontFamily] {
        &[
            FontFamily::Arial,
            FontFamily::CourierNew,
            FontFamily::Georgia,
            FontFamily::TimesNewRoman,
            FontFamily::Verdana,
        ]
    }

    /// Average glyph advance as a fraction of the font size.
    fn width_factor(&self) -> f64 {
        match self {
            FontFamily::Arial => 0.52,
            FontFamily::CourierNew => 0.60,
            FontFamily::Georgia => 0.55,
            FontFamily::TimesNewRoman => 0.48,
            FontFamily::Verdana => 0.58,
        }
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FontFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FontFamily::all()
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown font family: {}", s))
    }
}

/// A text box.
#[derive(Debug, Clone)]
pub struct TextBox {
    pub(crate) id: ObjectId,
    /// Position (top-left corner of the box).
    pub position: Point,
    /// The text content.
    pub content: String,
    /// Font family.
    pub font_family: FontFamily,
    /// Font size in pixels, always positive.
    pub font_size: u32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Glyph fill color.
    pub fill: Color,
    pub(crate) selectable: bool,
    pub(crate) evented: bool,
}

impl TextBox {
    /// Placeholder content for freshly added text.
    pub const DEFAULT_CONTENT: &'static str = "Edit me!";
    /// Line height as a multiple of the font size.
    pub const LINE_HEIGHT: f64 = 1.2;
    /// Narrowest a text box may be, so empty text stays clickable.
    pub const MIN_WIDTH: f64 = 20.0;

    /// Create a new text box with default styling.
    pub fn new(position: Point, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            content: content.into(),
            font_family: FontFamily::default(),
            font_size: 20,
            bold: false,
            italic: false,
            underline: false,
            fill: Color::BLACK,
            selectable: true,
            evented: true,
        }
    }

    /// Set the font size.
    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = size.max(1);
        self
    }

    /// Set the font family.
    pub fn with_font_family(mut self, family: FontFamily) -> Self {
        self.font_family = family;
        self
    }

    /// Set the fill color.
    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    /// Get the text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Visual lines. Only `\n` breaks a line, so a trailing newline starts
    /// an empty one.
    pub fn lines(&self) -> std::str::Split<'_, char> {
        self.content.split('\n')
    }

    pub fn line_count(&self) -> usize {
        self.lines().count()
    }

    /// Approximate width based on the longest line and font metrics.
    fn approximate_width(&self) -> f64 {
        let max_line_len = self
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);

        let mut factor = self.font_family.width_factor();
        if self.bold {
            factor += 0.05;
        }
        max_line_len as f64 * self.font_size as f64 * factor
    }

    fn approximate_height(&self) -> f64 {
        self.line_count() as f64 * self.font_size as f64 * Self::LINE_HEIGHT
    }
}

impl ObjectTrait for TextBox {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn position(&self) -> Point {
        self.position
    }

    fn bounds(&self) -> Rect {
        let width = self.approximate_width().max(Self::MIN_WIDTH);
        let height = self.approximate_height();
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + width,
            self.position.y + height,
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_creation() {
        let text = TextBox::new(Point::new(100.0, 100.0), TextBox::DEFAULT_CONTENT);
        assert_eq!(text.content(), "Edit me!");
        assert_eq!(text.font_size, 20);
        assert_eq!(text.font_family, FontFamily::Arial);
        assert_eq!(text.fill, Color::BLACK);
        assert!(!text.bold && !text.italic && !text.underline);
    }

    #[test]
    fn test_font_size_never_zero() {
        let text = TextBox::new(Point::ZERO, "x").with_font_size(0);
        assert_eq!(text.font_size, 1);
    }

    #[test]
    fn test_hit_test() {
        let text = TextBox::new(Point::new(100.0, 100.0), "Hello World");
        let center = text.bounds().center();
        assert!(text.hit_test(center, 0.0));
        assert!(!text.hit_test(Point::new(0.0, 0.0), 0.0));
    }

    #[test]
    fn test_empty_text_keeps_min_width() {
        let text = TextBox::new(Point::ZERO, "");
        let bounds = text.bounds();
        assert!((bounds.width() - TextBox::MIN_WIDTH).abs() < f64::EPSILON);
        assert!((bounds.height() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_multiline_height() {
        let text = TextBox::new(Point::ZERO, "one\ntwo\n");
        assert_eq!(text.line_count(), 3);
    }

    #[test]
    fn test_carriage_return_is_not_a_break() {
        let text = TextBox::new(Point::ZERO, "ab\r\ncd");
        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["ab\r", "cd"]);
        assert_eq!(text.line_count(), 2);

        // the '\r' is laid out like any other character
        let plain = TextBox::new(Point::ZERO, "ab\ncd");
        assert!(text.bounds().width() > plain.bounds().width());
    }

    #[test]
    fn test_font_family_parse() {
        assert_eq!("courier new".parse::<FontFamily>(), Ok(FontFamily::CourierNew));
        assert_eq!("Verdana".parse::<FontFamily>(), Ok(FontFamily::Verdana));
        assert!("Comic Sans".parse::<FontFamily>().is_err());
        let json = serde_json::to_string(&FontFamily::TimesNewRoman).unwrap();
        assert_eq!(json, "\"Times New Roman\"");
    }
}

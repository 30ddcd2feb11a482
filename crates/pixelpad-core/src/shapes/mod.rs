//! Drawable objects placed on the canvas.

mod image;
mod stroke;
mod text;

pub use image::{Image, ImageFormat};
pub use stroke::Stroke;
pub use text::{FontFamily, TextBox};

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for scene objects.
pub type ObjectId = Uuid;

/// RGBA8 color. Serialized as a `#rrggbb` / `#rrggbbaa` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Error returned when a color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid color: {0}")]
pub struct ParseColorError(pub String);

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Result<Self, ParseColorError> {
        let err = || ParseColorError(hex.to_string());
        let digits = hex.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return Err(err());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| err());

        match digits.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in digits.chars().enumerate() {
                    let v = c.to_digit(16).ok_or_else(err)? as u8;
                    out[i] = v * 17;
                }
                Ok(Self::rgb(out[0], out[1], out[2]))
            }
            6 => Ok(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            8 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                channel(&digits[6..8])?,
            )),
            _ => Err(err()),
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
///
/// A single point degenerates to point distance.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Common behaviour of every object kind.
pub trait ObjectTrait {
    /// Get the unique identifier.
    fn id(&self) -> ObjectId;

    /// Top-left position in canvas coordinates.
    fn position(&self) -> Point;

    /// Get the bounding box in canvas coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in canvas coordinates) hits this object.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;
}

/// Discriminant of [`SceneObject`], handy for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Stroke,
    TextBox,
    Image,
}

impl ObjectKind {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Stroke => "stroke",
            ObjectKind::TextBox => "textbox",
            ObjectKind::Image => "image",
        }
    }
}

/// Every object that can live in a scene.
#[derive(Debug, Clone)]
pub enum SceneObject {
    Stroke(Stroke),
    TextBox(TextBox),
    Image(Image),
}

impl SceneObject {
    pub fn id(&self) -> ObjectId {
        match self {
            SceneObject::Stroke(s) => s.id(),
            SceneObject::TextBox(t) => t.id(),
            SceneObject::Image(i) => i.id(),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            SceneObject::Stroke(_) => ObjectKind::Stroke,
            SceneObject::TextBox(_) => ObjectKind::TextBox,
            SceneObject::Image(_) => ObjectKind::Image,
        }
    }

    pub fn position(&self) -> Point {
        match self {
            SceneObject::Stroke(s) => s.position(),
            SceneObject::TextBox(t) => t.position(),
            SceneObject::Image(i) => i.position(),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            SceneObject::Stroke(s) => s.bounds(),
            SceneObject::TextBox(t) => t.bounds(),
            SceneObject::Image(i) => i.bounds(),
        }
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            SceneObject::Stroke(s) => s.hit_test(point, tolerance),
            SceneObject::TextBox(t) => t.hit_test(point, tolerance),
            SceneObject::Image(i) => i.hit_test(point, tolerance),
        }
    }

    /// Whether the object may become the active selection.
    ///
    /// Strokes are paint-only and never selectable.
    pub fn is_selectable(&self) -> bool {
        match self {
            SceneObject::Stroke(_) => false,
            SceneObject::TextBox(t) => t.selectable,
            SceneObject::Image(i) => i.selectable,
        }
    }

    /// Whether pointer events may target the object at all.
    pub fn is_evented(&self) -> bool {
        match self {
            SceneObject::Stroke(_) => false,
            SceneObject::TextBox(t) => t.evented,
            SceneObject::Image(i) => i.evented,
        }
    }

    /// Set both the selectable and evented flags. Ignored for strokes.
    pub fn set_interactive(&mut self, interactive: bool) {
        match self {
            SceneObject::Stroke(_) => {}
            SceneObject::TextBox(t) => {
                t.selectable = interactive;
                t.evented = interactive;
            }
            SceneObject::Image(i) => {
                i.selectable = interactive;
                i.evented = interactive;
            }
        }
    }

    /// Move the object by `delta`. Strokes are immutable and refuse.
    pub fn translate(&mut self, delta: Vec2) -> bool {
        match self {
            SceneObject::Stroke(_) => false,
            SceneObject::TextBox(t) => {
                t.position += delta;
                true
            }
            SceneObject::Image(i) => {
                i.position += delta;
                true
            }
        }
    }

    pub fn as_text(&self) -> Option<&TextBox> {
        match self {
            SceneObject::TextBox(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextBox> {
        match self {
            SceneObject::TextBox(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_stroke(&self) -> Option<&Stroke> {
        match self {
            SceneObject::Stroke(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Image> {
        match self {
            SceneObject::Image(i) => Some(i),
            _ => None,
        }
    }
}

impl From<Stroke> for SceneObject {
    fn from(stroke: Stroke) -> Self {
        SceneObject::Stroke(stroke)
    }
}

impl From<TextBox> for SceneObject {
    fn from(text: TextBox) -> Self {
        SceneObject::TextBox(text)
    }
}

impl From<Image> for SceneObject {
    fn from(image: Image) -> Self {
        SceneObject::Image(image)
    }
}

//! Image object for placing decoded raster images.

use super::{ObjectId, ObjectTrait};
use image::RgbaImage;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Encoding the image was uploaded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
    Bmp,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            "gif" => Some(ImageFormat::Gif),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        if data.starts_with(b"GIF8") {
            return Some(ImageFormat::Gif);
        }

        if data.starts_with(b"BM") {
            return Some(ImageFormat::Bmp);
        }

        None
    }
}

/// A placed raster image.
///
/// The bitmap is shared, so cloning an `Image` (for instance to hand it to
/// the rendering engine) does not copy pixels.
#[derive(Debug, Clone)]
pub struct Image {
    pub(crate) id: ObjectId,
    /// Top-left corner position.
    pub position: Point,
    /// Horizontal scale applied to the bitmap.
    pub scale_x: f64,
    /// Vertical scale applied to the bitmap.
    pub scale_y: f64,
    /// Encoding the bitmap was decoded from.
    pub format: ImageFormat,
    bitmap: Arc<RgbaImage>,
    pub(crate) selectable: bool,
    pub(crate) evented: bool,
}

impl Image {
    /// Create an image at `position` with unit scale.
    pub fn new(position: Point, bitmap: Arc<RgbaImage>, format: ImageFormat) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            scale_x: 1.0,
            scale_y: 1.0,
            format,
            bitmap,
            selectable: true,
            evented: true,
        }
    }

    /// Set independent horizontal and vertical scale.
    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    pub fn bitmap(&self) -> &Arc<RgbaImage> {
        &self.bitmap
    }

    /// Original bitmap width in pixels.
    pub fn source_width(&self) -> u32 {
        self.bitmap.width()
    }

    /// Original bitmap height in pixels.
    pub fn source_height(&self) -> u32 {
        self.bitmap.height()
    }

    /// Displayed width (bitmap width × horizontal scale).
    pub fn display_width(&self) -> f64 {
        self.source_width() as f64 * self.scale_x
    }

    /// Displayed height (bitmap height × vertical scale).
    pub fn display_height(&self) -> f64 {
        self.source_height() as f64 * self.scale_y
    }
}

impl ObjectTrait for Image {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn position(&self) -> Point {
        self.position
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.display_width(),
            self.position.y + self.display_height(),
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap(w: u32, h: u32) -> Arc<RgbaImage> {
        Arc::new(RgbaImage::new(w, h))
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ImageFormat::from_extension("png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("webp"), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::from_extension("tiff"), None);

        let png_magic = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(ImageFormat::from_magic_bytes(&png_magic), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::from_magic_bytes(b"nope"), None);
        assert_eq!(ImageFormat::from_magic_bytes(b"BM"), None);
    }

    #[test]
    fn test_scaled_bounds() {
        let img = Image::new(Point::new(150.0, 150.0), bitmap(200, 100), ImageFormat::Png)
            .with_scale(0.5, 0.5);
        let bounds = img.bounds();
        assert!((bounds.x0 - 150.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 150.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 250.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_independent_scale() {
        let img = Image::new(Point::ZERO, bitmap(10, 10), ImageFormat::Png).with_scale(2.0, 0.5);
        assert!((img.display_width() - 20.0).abs() < f64::EPSILON);
        assert!((img.display_height() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clone_shares_bitmap() {
        let img = Image::new(Point::ZERO, bitmap(4, 4), ImageFormat::Png);
        let copy = img.clone();
        assert!(Arc::ptr_eq(img.bitmap(), copy.bitmap()));
        assert_eq!(img.id(), copy.id());
    }
}

//! Decoding uploaded image files into placeable bitmaps.

use crate::shapes::ImageFormat;
use image::RgbaImage;
use std::sync::Arc;
use thiserror::Error;

/// Decode errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("No image data")]
    Empty,
    #[error("Unsupported image format")]
    UnsupportedFormat,
    #[error("Malformed {format:?} data: {message}")]
    Malformed { format: ImageFormat, message: String },
}

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// A decoded bitmap and the encoding it came from.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub bitmap: Arc<RgbaImage>,
    pub format: ImageFormat,
}

/// Turns raw file bytes into a bitmap.
pub trait ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> DecodeResult<DecodedImage>;
}

/// Decoder backed by the `image` crate.
///
/// Accepts PNG, JPEG, WebP, GIF (first frame) and BMP.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDecoder;

impl DefaultDecoder {
    fn format_of(format: image::ImageFormat) -> Option<ImageFormat> {
        match format {
            image::ImageFormat::Png => Some(ImageFormat::Png),
            image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
            image::ImageFormat::WebP => Some(ImageFormat::WebP),
            image::ImageFormat::Gif => Some(ImageFormat::Gif),
            image::ImageFormat::Bmp => Some(ImageFormat::Bmp),
            _ => None,
        }
    }
}

impl ImageDecoder for DefaultDecoder {
    fn decode(&self, bytes: &[u8]) -> DecodeResult<DecodedImage> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }

        let guessed = image::guess_format(bytes).map_err(|_| DecodeError::UnsupportedFormat)?;
        let format = Self::format_of(guessed).ok_or(DecodeError::UnsupportedFormat)?;

        let decoded = image::load_from_memory_with_format(bytes, guessed).map_err(|e| {
            DecodeError::Malformed {
                format,
                message: e.to_string(),
            }
        })?;

        let bitmap = decoded.to_rgba8();
        if bitmap.width() == 0 || bitmap.height() == 0 {
            return Err(DecodeError::Malformed {
                format,
                message: "zero-sized image".to_string(),
            });
        }

        log::debug!(
            "Decoded {} image {}x{}",
            format.mime_type(),
            bitmap.width(),
            bitmap.height()
        );

        Ok(DecodedImage {
            bitmap: Arc::new(bitmap),
            format,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::io::Cursor;

    /// Encode a solid-color PNG for tests.
    pub(crate) fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(rgba));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let bytes = png_bytes(8, 4, [255, 0, 0, 255]);
        let decoded = DefaultDecoder.decode(&bytes).unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
        assert_eq!(decoded.bitmap.dimensions(), (8, 4));
        assert_eq!(decoded.bitmap.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_decode_empty() {
        assert!(matches!(DefaultDecoder.decode(&[]), Err(DecodeError::Empty)));
    }

    #[test]
    fn test_decode_garbage() {
        let result = DefaultDecoder.decode(b"definitely not an image");
        assert!(matches!(result, Err(DecodeError::UnsupportedFormat)));
    }

    #[test]
    fn test_decode_truncated_png() {
        let mut bytes = png_bytes(16, 16, [0, 0, 0, 255]);
        bytes.truncate(bytes.len() / 2);
        let result = DefaultDecoder.decode(&bytes);
        assert!(matches!(
            result,
            Err(DecodeError::Malformed {
                format: ImageFormat::Png,
                ..
            })
        ));
    }
}

//! Export pipeline: raster snapshots and single-page document assembly.

use crate::engine::RasterFormat;
use flate2::{Compression, write::ZlibEncoder};
use kurbo::Rect;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use std::io::Write;
use thiserror::Error;

/// Default file name for raster exports.
pub const RASTER_FILE_NAME: &str = "canvas.png";
/// Default file name for document exports.
pub const DOCUMENT_FILE_NAME: &str = "canvas.pdf";

/// Document assembly errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("No document started")]
    NoPage,
    #[error("Raster could not be decoded: {0}")]
    Raster(String),
    #[error("Compression failed: {0}")]
    Compress(#[from] std::io::Error),
    #[error("PDF write failed: {0}")]
    Pdf(String),
}

/// Result type for document assembly.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// An encoded raster snapshot of the canvas.
#[derive(Debug, Clone)]
pub struct RasterExport {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    pub format: RasterFormat,
    /// Logical canvas width.
    pub width: u32,
    /// Logical canvas height.
    pub height: u32,
    /// Supersampling multiplier the snapshot was taken at.
    pub multiplier: u32,
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Landscape iff wider than tall.
    pub fn for_size(width: f64, height: f64) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// Builds a paged document out of raster images.
pub trait DocumentAssembler {
    /// Start a new single-page document, discarding any previous one.
    fn new_document(&mut self, width: f64, height: f64, orientation: Orientation);

    /// Place an encoded PNG so that it fills `(x, y, w, h)` in page units,
    /// measured from the top-left corner.
    fn place_image(&mut self, raster: &[u8], x: f64, y: f64, w: f64, h: f64)
    -> DocumentResult<()>;

    /// Finish the document and return its bytes.
    fn serialize(&mut self) -> DocumentResult<Vec<u8>>;
}

/// Build a page exactly the logical size of `raster` and fill it with the
/// snapshot.
pub fn assemble_document(
    raster: &RasterExport,
    assembler: &mut dyn DocumentAssembler,
) -> DocumentResult<Vec<u8>> {
    let width = raster.width as f64;
    let height = raster.height as f64;
    assembler.new_document(width, height, Orientation::for_size(width, height));
    assembler.place_image(&raster.bytes, 0.0, 0.0, width, height)?;
    assembler.serialize()
}

#[derive(Debug, Clone, Copy)]
struct PageSetup {
    width: f64,
    height: f64,
}

#[derive(Debug, Clone)]
struct Placement {
    name: String,
    object: lopdf::ObjectId,
    rect: Rect,
}

/// PDF 1.5 assembler built on `lopdf`.
///
/// One page unit is one logical pixel.
pub struct PdfAssembler {
    doc: Document,
    page: Option<PageSetup>,
    placements: Vec<Placement>,
}

impl Default for PdfAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfAssembler {
    pub fn new() -> Self {
        Self {
            doc: Document::with_version("1.5"),
            page: None,
            placements: Vec::new(),
        }
    }

    fn image_stream(width: u32, height: u32, color_space: &str, data: &[u8]) -> DocumentResult<Stream> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        let compressed = encoder.finish()?;

        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };
        Ok(Stream::new(dict, compressed))
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

impl DocumentAssembler for PdfAssembler {
    fn new_document(&mut self, width: f64, height: f64, orientation: Orientation) {
        let (width, height) = match orientation {
            Orientation::Landscape if width < height => (height, width),
            Orientation::Portrait if width > height => (height, width),
            _ => (width, height),
        };
        self.doc = Document::with_version("1.5");
        self.page = Some(PageSetup { width, height });
        self.placements.clear();
    }

    fn place_image(
        &mut self,
        raster: &[u8],
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    ) -> DocumentResult<()> {
        if self.page.is_none() {
            return Err(DocumentError::NoPage);
        }

        let decoded = image::load_from_memory_with_format(raster, image::ImageFormat::Png)
            .map_err(|e| DocumentError::Raster(e.to_string()))?
            .to_rgba8();
        let (px_w, px_h) = decoded.dimensions();

        let mut rgb = Vec::with_capacity((px_w * px_h * 3) as usize);
        let mut alpha = Vec::with_capacity((px_w * px_h) as usize);
        for pixel in decoded.pixels() {
            rgb.extend_from_slice(&pixel.0[..3]);
            alpha.push(pixel.0[3]);
        }

        let mut stream = Self::image_stream(px_w, px_h, "DeviceRGB", &rgb)?;
        if alpha.iter().any(|a| *a != u8::MAX) {
            let mask = Self::image_stream(px_w, px_h, "DeviceGray", &alpha)?;
            let mask_id = self.doc.add_object(mask);
            stream.dict.set("SMask", Object::Reference(mask_id));
        }
        let object = self.doc.add_object(stream);

        let name = format!("Im{}", self.placements.len());
        self.placements.push(Placement {
            name,
            object,
            rect: Rect::new(x, y, x + w, y + h),
        });
        Ok(())
    }

    fn serialize(&mut self) -> DocumentResult<Vec<u8>> {
        let page = self.page.take().ok_or(DocumentError::NoPage)?;
        let placements = std::mem::take(&mut self.placements);
        let mut doc = std::mem::replace(&mut self.doc, Document::with_version("1.5"));

        let pages_id = doc.new_object_id();

        let mut xobjects = Dictionary::new();
        let mut operations = Vec::new();
        for placement in &placements {
            xobjects.set(placement.name.clone(), Object::Reference(placement.object));
            // PDF y grows upward from the bottom edge
            let rect = placement.rect;
            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new(
                "cm",
                vec![
                    real(rect.width()),
                    0.into(),
                    0.into(),
                    real(rect.height()),
                    real(rect.x0),
                    real(page.height - rect.y1),
                ],
            ));
            operations.push(Operation::new(
                "Do",
                vec![Object::Name(placement.name.clone().into_bytes())],
            ));
            operations.push(Operation::new("Q", vec![]));
        }

        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| DocumentError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let resources_id = doc.add_object(dictionary! {
            "XObject" => xobjects,
        });
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), real(page.width), real(page.height)],
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out)
            .map_err(|e| DocumentError::Pdf(e.to_string()))?;

        log::debug!(
            "Assembled PDF {}x{} with {} image(s), {} bytes",
            page.width,
            page.height,
            placements.len(),
            out.len()
        );
        Ok(out)
    }
}

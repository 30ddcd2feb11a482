//! Scene painting on top of the `vello_cpu` rasterizer.
//!
//! Geometry is built in logical canvas units and drawn under a base
//! transform that scales to device pixels, so the same scene paints at 1x
//! for preview and at the export multiplier for snapshots. Everything
//! outside the pixmap is culled before it reaches the rasterizer.

use crate::fonts::{FaceStyle, FontBook};
use ab_glyph::{Font, OutlineCurve, PxScale, ScaleFont, point};
use image::RgbaImage;
use kurbo::{Affine, BezPath, Cap, Circle, Join, Point, Rect, Shape};
use peniko::{Blob, ImageAlphaType, ImageBrush, ImageData, ImageQuality, ImageSampler};
use pixelpad_core::shapes::{Color, Image, ObjectId, ObjectTrait, SceneObject, Stroke, TextBox};
use std::collections::HashMap;
use std::sync::Arc;
use vello_cpu::{ImageSource, RenderContext};

/// Horizontal shear applied for synthetic italics.
const ITALIC_SHEAR: f64 = 0.2;

/// Flattening tolerance for dots, in logical units.
const TOLERANCE: f64 = 0.1;

fn paint_color(color: Color) -> peniko::Color {
    peniko::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

/// Upload an image's bitmap for sampling.
///
/// Returns `None` for bitmaps the rasterizer cannot address.
pub fn image_source(image: &Image) -> Option<ImageSource> {
    let bitmap = image.bitmap();
    let (width, height) = bitmap.dimensions();
    if width > u16::MAX as u32 || height > u16::MAX as u32 {
        log::warn!(
            "Image {} is {}x{}, too large to paint",
            image.id(),
            width,
            height
        );
        return None;
    }
    let data = ImageData {
        data: Blob::new(Arc::new(bitmap.as_raw().clone())),
        format: peniko::ImageFormat::Rgba8,
        alpha_type: ImageAlphaType::Alpha,
        width,
        height,
    };
    Some(ImageSource::from_peniko_image_data(&data))
}

/// Append a glyph outline placed at `origin` (on the baseline).
///
/// Font units are y-up; `shear` slants the glyph around the baseline.
fn append_outline(
    path: &mut BezPath,
    curves: &[OutlineCurve],
    origin: Point,
    scale: ab_glyph::PxScaleFactor,
    shear: f64,
) {
    let map = |p: ab_glyph::Point| {
        let rise = p.y as f64 * scale.vertical as f64;
        Point::new(
            origin.x + p.x as f64 * scale.horizontal as f64 + rise * shear,
            origin.y - rise,
        )
    };

    let mut last: Option<Point> = None;
    for curve in curves {
        let start = match curve {
            OutlineCurve::Line(p0, _)
            | OutlineCurve::Quad(p0, _, _)
            | OutlineCurve::Cubic(p0, _, _, _) => map(*p0),
        };
        if last != Some(start) {
            if last.is_some() {
                path.close_path();
            }
            path.move_to(start);
        }
        let end = match curve {
            OutlineCurve::Line(_, p1) => {
                let p1 = map(*p1);
                path.line_to(p1);
                p1
            }
            OutlineCurve::Quad(_, c, p2) => {
                let p2 = map(*p2);
                path.quad_to(map(*c), p2);
                p2
            }
            OutlineCurve::Cubic(_, c0, c1, p3) => {
                let p3 = map(*p3);
                path.curve_to(map(*c0), map(*c1), p3);
                p3
            }
        };
        last = Some(end);
    }
    if last.is_some() {
        path.close_path();
    }
}

/// Paints scene objects into a device-sized render context.
pub struct Painter {
    ctx: RenderContext,
    base: Affine,
    scale: f64,
    /// Visible area in logical units.
    clip: Rect,
}

impl Painter {
    /// A painter of `width × height` device pixels cleared to `background`.
    pub fn new(width: u16, height: u16, scale: f64, background: Color) -> Self {
        let mut ctx = RenderContext::new(width, height);
        ctx.set_paint(paint_color(background));
        ctx.fill_rect(&Rect::new(0.0, 0.0, width as f64, height as f64));

        let base = Affine::scale(scale);
        ctx.set_transform(base);
        Self {
            ctx,
            base,
            scale,
            clip: Rect::new(0.0, 0.0, width as f64 / scale, height as f64 / scale),
        }
    }

    pub fn width(&self) -> u32 {
        self.ctx.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.ctx.height() as u32
    }

    /// Rasterize everything drawn so far.
    pub fn finish(mut self) -> RgbaImage {
        let (width, height) = (self.ctx.width(), self.ctx.height());
        self.ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        self.ctx.render_to_pixmap(&mut pixmap);
        let data: Vec<u8> = pixmap
            .take_unpremultiplied()
            .into_iter()
            .flat_map(|p| [p.r, p.g, p.b, p.a])
            .collect();
        RgbaImage::from_raw(width as u32, height as u32, data)
            .unwrap_or_else(|| RgbaImage::new(width as u32, height as u32))
    }

    pub fn draw_object(
        &mut self,
        object: &SceneObject,
        fonts: &FontBook,
        images: &HashMap<ObjectId, ImageSource>,
    ) {
        match object {
            SceneObject::Stroke(stroke) => self.draw_stroke(stroke),
            SceneObject::TextBox(text) => self.draw_text(text, fonts),
            SceneObject::Image(image) => match images.get(&image.id()) {
                Some(source) => self.draw_image(image, source.clone()),
                None => {
                    if let Some(source) = image_source(image) {
                        self.draw_image(image, source);
                    }
                }
            },
        }
    }

    /// Polyline with round caps and joins. A single point paints a dot.
    pub fn draw_stroke(&mut self, stroke: &Stroke) {
        if stroke.is_empty() || !stroke.bounds().overlaps(self.clip) {
            return;
        }
        self.ctx.set_transform(self.base);
        self.ctx.set_paint(paint_color(stroke.color()));

        if let [center] = stroke.points() {
            let dot = Circle::new(*center, stroke.width() / 2.0).to_path(TOLERANCE);
            self.ctx.fill_path(&dot);
            return;
        }
        self.ctx.set_stroke(
            kurbo::Stroke::new(stroke.width())
                .with_caps(Cap::Round)
                .with_join(Join::Round),
        );
        self.ctx.stroke_path(&stroke.to_path());
    }

    /// Bitmap scaled into its display rect, nearest-neighbour sampled.
    pub fn draw_image(&mut self, image: &Image, source: ImageSource) {
        if image.scale_x <= 0.0 || image.scale_y <= 0.0 || !image.bounds().overlaps(self.clip) {
            return;
        }
        let (width, height) = (image.source_width() as f64, image.source_height() as f64);
        self.ctx.set_transform(
            self.base
                * Affine::translate(image.position.to_vec2())
                * Affine::scale_non_uniform(image.scale_x, image.scale_y),
        );
        self.ctx.set_paint(ImageBrush {
            image: source,
            sampler: ImageSampler::new().with_quality(ImageQuality::Low),
        });
        self.ctx.fill_rect(&Rect::new(0.0, 0.0, width, height));
        self.ctx.set_transform(self.base);
    }

    /// Text laid out line by line from the box's top-left corner.
    ///
    /// Glyphs come from `fonts`; missing weights and slants are synthesized.
    /// Without any usable face only the underline is drawn.
    pub fn draw_text(&mut self, text: &TextBox, fonts: &FontBook) {
        let size = text.font_size as f64;
        let line_height = size * TextBox::LINE_HEIGHT;
        let origin = text.position;
        let face = fonts.resolve(text.font_family, FaceStyle::new(text.bold, text.italic));
        if face.is_none() {
            log::debug!("No font for {}, glyphs skipped", text.font_family);
        }

        self.ctx.set_transform(self.base);
        self.ctx.set_paint(paint_color(text.fill));
        let px_scale = PxScale::from(size as f32);
        let shear = if face.as_ref().is_some_and(|f| f.synthetic_italic) {
            ITALIC_SHEAR
        } else {
            0.0
        };
        let clip = self.clip;

        for (index, line) in text.lines().enumerate() {
            let top = origin.y + index as f64 * line_height;
            if top > clip.y1 {
                break;
            }
            if top + line_height < clip.y0 {
                continue;
            }

            let Some(face) = &face else {
                if text.underline {
                    let right = origin.x + text.bounds().width();
                    self.underline(origin.x, right, top + size, size);
                }
                continue;
            };

            let scaled = face.font.as_scaled(px_scale);
            let factor = scaled.scale_factor();
            let baseline = top + scaled.ascent() as f64;
            let mut pen_x = origin.x;
            let mut path = BezPath::new();
            let mut previous = None;
            for ch in line.chars() {
                if pen_x > clip.x1 {
                    break;
                }
                let id = face.font.glyph_id(ch);
                if let Some(prev) = previous {
                    pen_x += scaled.kern(prev, id) as f64;
                }
                if let Some(outline) = face.font.outline(id) {
                    let px = outline.px_bounds(factor, point(pen_x as f32, baseline as f32));
                    let lean = size * shear;
                    let bounds = Rect::new(
                        px.min.x as f64 - lean,
                        px.min.y as f64,
                        px.max.x as f64 + lean,
                        px.max.y as f64,
                    );
                    if bounds.overlaps(clip) {
                        append_outline(
                            &mut path,
                            &outline.curves,
                            Point::new(pen_x, baseline),
                            factor,
                            shear,
                        );
                    }
                }
                pen_x += scaled.h_advance(id) as f64;
                previous = Some(id);
            }

            if !path.is_empty() {
                self.ctx.fill_path(&path);
                if face.synthetic_bold {
                    self.ctx.set_stroke(
                        kurbo::Stroke::new((size / 24.0).max(1.0)).with_join(Join::Round),
                    );
                    self.ctx.stroke_path(&path);
                }
            }

            if text.underline {
                let under = baseline - scaled.descent() as f64 * 0.5;
                self.underline(origin.x, pen_x, under, size);
            }
        }
    }

    fn underline(&mut self, x0: f64, x1: f64, y: f64, size: f64) {
        let thickness = (size / 15.0).max(1.0).round();
        let visible = Rect::new(x0, y, x1, y + thickness).intersect(self.clip);
        if !visible.is_zero_area() {
            self.ctx.fill_rect(&visible);
        }
    }

    /// One-device-pixel outline just inside `rect`, used for selection chrome.
    pub fn outline(&mut self, rect: Rect, color: Color) {
        if !rect.overlaps(self.clip) {
            return;
        }
        let width = 1.0 / self.scale;
        self.ctx.set_transform(self.base);
        self.ctx.set_paint(paint_color(color));
        self.ctx
            .set_stroke(kurbo::Stroke::new(width).with_join(Join::Miter));
        self.ctx.stroke_rect(&rect.inset(-width / 2.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn assert_near(image: &RgbaImage, x: u32, y: u32, expected: [u8; 4]) {
        let actual = image.get_pixel(x, y).0;
        let close = actual
            .iter()
            .zip(expected)
            .all(|(a, e)| (*a as i16 - e as i16).abs() <= 2);
        assert!(close, "pixel ({x}, {y}) is {actual:?}, expected {expected:?}");
    }

    fn inked(image: &RgbaImage) -> usize {
        image.pixels().filter(|p| p.0[0] < 128).count()
    }

    #[test]
    fn test_stroke_pixels() {
        let mut painter = Painter::new(40, 40, 1.0, Color::WHITE);
        let stroke = Stroke::from_points(
            vec![Point::new(5.0, 20.0), Point::new(35.0, 20.0)],
            Color::rgb(255, 0, 0),
            6.0,
        );
        painter.draw_stroke(&stroke);
        let image = painter.finish();
        assert_near(&image, 20, 20, [255, 0, 0, 255]);
        assert_near(&image, 20, 18, [255, 0, 0, 255]);
        assert_near(&image, 20, 30, [255, 255, 255, 255]);
        assert_near(&image, 1, 20, [255, 255, 255, 255]);
    }

    #[test]
    fn test_stroke_scaled() {
        let mut painter = Painter::new(80, 80, 2.0, Color::WHITE);
        let stroke = Stroke::from_points(vec![Point::new(20.0, 20.0)], Color::BLACK, 4.0);
        painter.draw_stroke(&stroke);
        let image = painter.finish();
        // dot of radius 4 device pixels around (40, 40)
        assert_near(&image, 40, 40, [0, 0, 0, 255]);
        assert_near(&image, 42, 40, [0, 0, 0, 255]);
        assert_near(&image, 50, 40, [255, 255, 255, 255]);
    }

    #[test]
    fn test_stroke_clipped_to_pixmap() {
        let mut painter = Painter::new(10, 10, 1.0, Color::WHITE);
        let stroke = Stroke::from_points(
            vec![Point::new(-50.0, 5.0), Point::new(50.0, 5.0)],
            Color::BLACK,
            2.0,
        );
        painter.draw_stroke(&stroke);
        let image = painter.finish();
        assert_near(&image, 0, 5, [0, 0, 0, 255]);
        assert_near(&image, 9, 5, [0, 0, 0, 255]);
    }

    #[test]
    fn test_image_scaled_placement() {
        let mut bitmap = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
        bitmap.put_pixel(0, 0, Rgba([0, 255, 0, 255]));
        let image = Image::new(
            Point::new(10.0, 10.0),
            Arc::new(bitmap),
            pixelpad_core::shapes::ImageFormat::Png,
        )
        .with_scale(0.5, 0.5);
        let source = image_source(&image).unwrap();

        // logical rect (10,10)-(12,12) is device (20,20)-(24,24), outside the pixmap
        let mut painter = Painter::new(20, 20, 2.0, Color::WHITE);
        painter.draw_image(&image, source.clone());
        assert_near(&painter.finish(), 19, 19, [255, 255, 255, 255]);

        let mut painter = Painter::new(40, 40, 2.0, Color::WHITE);
        painter.draw_image(&image, source);
        let out = painter.finish();
        assert_near(&out, 20, 20, [0, 255, 0, 255]);
        assert_near(&out, 23, 23, [0, 0, 255, 255]);
        assert_near(&out, 24, 24, [255, 255, 255, 255]);
    }

    #[test]
    fn test_outline() {
        let mut painter = Painter::new(20, 20, 1.0, Color::WHITE);
        painter.outline(Rect::new(5.0, 5.0, 15.0, 15.0), Color::BLACK);
        let image = painter.finish();
        assert_near(&image, 5, 10, [0, 0, 0, 255]);
        assert_near(&image, 14, 10, [0, 0, 0, 255]);
        assert_near(&image, 10, 10, [255, 255, 255, 255]);
        assert_near(&image, 4, 10, [255, 255, 255, 255]);
    }

    #[test]
    fn test_text_underline_without_fonts() {
        let mut painter = Painter::new(200, 60, 1.0, Color::WHITE);
        let mut text = TextBox::new(Point::new(10.0, 10.0), "Edit me!");
        text.underline = true;
        painter.draw_text(&text, &FontBook::without_fallback());
        let image = painter.finish();
        // underline sits one font size below the top
        assert_near(&image, 15, 30, [0, 0, 0, 255]);
        assert_near(&image, 15, 15, [255, 255, 255, 255]);
    }

    #[test]
    fn test_text_glyphs() {
        let text = TextBox::new(Point::new(0.0, 0.0), "MMMM").with_font_size(40);
        let mut painter = Painter::new(200, 60, 1.0, Color::WHITE);
        painter.draw_text(&text, &FontBook::new());
        let image = painter.finish();
        assert!(inked(&image) > 100);
        // left stem of the first M
        assert_near(&image, 4, 20, [0, 0, 0, 255]);
    }

    #[test]
    fn test_synthetic_bold_inks_more() {
        let plain = TextBox::new(Point::new(0.0, 0.0), "iii").with_font_size(40);
        let mut bold = plain.clone();
        bold.bold = true;

        let mut painter = Painter::new(100, 60, 1.0, Color::WHITE);
        painter.draw_text(&plain, &FontBook::new());
        let thin = inked(&painter.finish());

        let mut painter = Painter::new(100, 60, 1.0, Color::WHITE);
        painter.draw_text(&bold, &FontBook::new());
        assert!(inked(&painter.finish()) > thin);
    }

    #[test]
    fn test_huge_text_is_clipped() {
        let size = 50_000u32;
        let fonts = FontBook::new();
        let face = fonts
            .resolve(pixelpad_core::shapes::FontFamily::Arial, FaceStyle::REGULAR)
            .unwrap();
        let scaled = face.font.as_scaled(PxScale::from(size as f32));
        let under = scaled.ascent() as f64 - scaled.descent() as f64 * 0.5;

        // place the underline's top edge at device row 20
        let mut text = TextBox::new(Point::new(-10.0, 20.0 - under), "Wide\nlines\nhere")
            .with_font_size(size);
        text.underline = true;
        let mut painter = Painter::new(64, 64, 1.0, Color::WHITE);
        painter.draw_text(&text, &fonts);
        let image = painter.finish();
        assert_eq!(image.dimensions(), (64, 64));
        assert_near(&image, 30, 40, [0, 0, 0, 255]);
    }

    #[test]
    fn test_offscreen_text_paints_nothing() {
        let mut text = TextBox::new(Point::new(500.0, 500.0), "far away");
        text.underline = true;
        let mut painter = Painter::new(32, 32, 1.0, Color::WHITE);
        painter.draw_text(&text, &FontBook::new());
        assert_eq!(inked(&painter.finish()), 0);
    }
}

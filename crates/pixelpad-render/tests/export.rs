//! Export round-trip through the software engine.

use kurbo::Point;
use lopdf::{Document, Object};
use pixelpad_core::{Color, EditorConfig, Editor, StyleKind};
use pixelpad_render::SoftwareEngine;

fn number(obj: &Object) -> f64 {
    match obj {
        Object::Integer(i) => *i as f64,
        Object::Real(r) => *r as f64,
        other => panic!("not a number: {other:?}"),
    }
}

fn editor_with_content() -> Editor<SoftwareEngine> {
    let mut editor = Editor::new(EditorConfig::default(), SoftwareEngine::new()).unwrap();
    editor.add_text();
    editor.update_style(StyleKind::Underline);

    editor.change_brush_color(Color::rgb(220, 30, 30));
    editor.enter_freehand_draw();
    editor.pointer_down(Point::new(200.0, 300.0));
    editor.pointer_move(Point::new(400.0, 350.0));
    editor.pointer_up(Point::new(600.0, 300.0));
    editor.enter_freehand_draw();
    editor
}

#[test]
fn test_document_embeds_identical_raster() {
    let mut editor = editor_with_content();

    let raster = editor.export_raster().unwrap();
    assert_eq!((raster.width, raster.height, raster.multiplier), (800, 600, 2));
    let direct = image::load_from_memory(&raster.bytes).unwrap().to_rgba8();
    assert_eq!(direct.dimensions(), (1600, 1200));

    let pdf = editor.export_document().unwrap();
    let doc = Document::load_mem(&pdf).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);

    let page_id = *pages.values().next().unwrap();
    let page = doc.get_dictionary(page_id).unwrap();
    let media_box: Vec<f64> = page
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(number)
        .collect();
    assert_eq!(media_box, vec![0.0, 0.0, 800.0, 600.0]);

    let images: Vec<_> = doc
        .objects
        .values()
        .filter_map(|obj| obj.as_stream().ok())
        .filter(|s| matches!(s.dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Image"))
        .collect();
    assert_eq!(images.len(), 1);
    let stream = images[0];
    assert_eq!(number(stream.dict.get(b"Width").unwrap()), 1600.0);
    assert_eq!(number(stream.dict.get(b"Height").unwrap()), 1200.0);

    let embedded = stream.decompressed_content().unwrap();
    let expected: Vec<u8> = direct
        .pixels()
        .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
        .collect();
    assert_eq!(embedded.len(), expected.len());
    assert!(embedded == expected, "embedded raster differs from direct export");
}

#[test]
fn test_raster_contains_ink_not_selection() {
    let mut editor = editor_with_content();
    assert!(editor.selection().is_some());

    let raster = editor.export_raster().unwrap();
    let image = image::load_from_memory(&raster.bytes).unwrap().to_rgba8();

    // stroke start, at 2x
    assert_eq!(image.get_pixel(400, 600).0, [220, 30, 30, 255]);
    // selection outline would sit 2 logical px left of the text box
    assert_eq!(image.get_pixel(196, 220).0, [255, 255, 255, 255]);
}

#[test]
fn test_export_is_repeatable_and_pure() {
    let mut editor = editor_with_content();
    let count = editor.scene().len();
    let first = editor.export_raster().unwrap();
    let second = editor.export_raster().unwrap();
    assert_eq!(first.bytes, second.bytes);
    assert_eq!(editor.scene().len(), count);
}

#[test]
fn test_huge_font_size_exports() {
    let mut editor = Editor::new(EditorConfig::default(), SoftwareEngine::new()).unwrap();
    editor.add_text();
    editor.update_style(StyleKind::Underline);
    editor.change_font_size(1_000_000).unwrap();
    let size = editor.scene().selected_text().unwrap().font_size;
    assert_eq!(size, EditorConfig::default().text.max_font_size);

    let raster = editor.export_raster().unwrap();
    let image = image::load_from_memory(&raster.bytes).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (1600, 1200));
    // glyphs start at the text box's corner, (100, 100) logical
    assert!(image.pixels().any(|p| p.0 == [0, 0, 0, 255]));
    assert_eq!(image.get_pixel(10, 10).0, [255, 255, 255, 255]);
}

#[test]
fn test_default_text_has_glyphs() {
    let mut editor = Editor::new(EditorConfig::default(), SoftwareEngine::new()).unwrap();
    editor.add_text();
    let raster = editor.export_raster().unwrap();
    let image = image::load_from_memory(&raster.bytes).unwrap().to_rgba8();
    // "Edit me!" at (100, 100), 20px, painted at 2x
    let inked = (200..400)
        .flat_map(|x| (200..250).map(move |y| (x, y)))
        .filter(|&(x, y)| image.get_pixel(x, y).0[0] < 128)
        .count();
    assert!(inked > 200, "only {inked} dark pixels");
}

#[test]
fn test_erase_paints_background() {
    let mut editor = Editor::new(EditorConfig::default(), SoftwareEngine::new()).unwrap();
    editor.enter_freehand_draw();
    editor.pointer_down(Point::new(100.0, 100.0));
    editor.pointer_up(Point::new(300.0, 100.0));
    editor.enter_erase();
    editor.change_brush_width(20.0);
    editor.pointer_down(Point::new(200.0, 100.0));
    editor.pointer_up(Point::new(200.0, 100.0));

    let raster = editor.export_raster().unwrap();
    let image = image::load_from_memory(&raster.bytes).unwrap().to_rgba8();
    assert_eq!(image.get_pixel(400, 200).0, [255, 255, 255, 255]);
    assert_eq!(image.get_pixel(240, 200).0, [0, 0, 0, 255]);
    // erasing paints over; both strokes remain in the scene
    assert_eq!(editor.scene().len(), 2);
}

use super::*;
use crate::text::wrap::wrap_text;

fn local_font() -> Option<FontFace> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/fonts/Inter-Regular.ttf");
    FontFace::load(&path).ok()
}

#[test]
fn empty_font_bytes_are_rejected() {
    assert!(FontFace::from_bytes("empty", Vec::new()).is_err());
}

#[test]
fn missing_font_file_is_an_error() {
    let err = FontFace::load(std::path::Path::new("/definitely/not/here.ttf")).unwrap_err();
    assert!(err.to_string().contains("read font"));
}

#[test]
fn font_book_falls_back_between_weights() {
    let book = FontBook::default();
    assert!(book.is_empty());
    assert!(book.face(true).is_none());

    let face = FontFace::from_bytes("fake", vec![0u8; 4]).unwrap();
    let book = FontBook {
        regular: Some(face),
        bold: None,
    };
    assert_eq!(book.face(true).unwrap().key(), "fake");
    assert_eq!(book.face(false).unwrap().key(), "fake");
}

#[test]
fn brush_from_color() {
    let b = TextBrush::from(Color::rgb8(1, 2, 3));
    assert_eq!((b.r, b.g, b.b, b.a), (1, 2, 3, 255));
}

#[test]
fn invalid_size_is_rejected() {
    let face = FontFace::from_bytes("fake", vec![0u8; 4]).unwrap();
    let mut engine = TextLayoutEngine::new();
    assert!(engine.measure("x", &face, 0.0, 0.0).is_err());
    assert!(engine.measurer(&face, f64::NAN).is_err());
}

#[test]
fn measure_with_local_font_if_present() {
    let Some(face) = local_font() else {
        return;
    };
    let mut engine = TextLayoutEngine::new();
    let short = engine.measure("Hi", &face, 32.0, 0.0).unwrap();
    let long = engine.measure("Hello there", &face, 32.0, 0.0).unwrap();
    assert!(short > 0.0);
    assert!(long > short);

    let layout = engine
        .layout_line("hello", &face, 48.0, 0.0, TextBrush::default())
        .unwrap();
    assert!(layout.lines().next().is_some());
}

#[test]
fn parley_wrap_respects_width_if_font_present() {
    let Some(face) = local_font() else {
        return;
    };
    let mut engine = TextLayoutEngine::new();
    let mut m = engine.measurer(&face, 52.0).unwrap();
    let out = wrap_text("Morning loop around the lake and back", 80.0, 250.0, 400.0, &mut m);
    assert!(out.lines.len() > 1);
    for line in &out.lines {
        assert!(line.width <= 400.0 + 1e-6);
    }
}

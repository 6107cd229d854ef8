use super::*;

fn fixture_font() -> Arc<Vec<u8>> {
    Arc::new(std::fs::read("tests/data/fonts/DejaVuSansMono.ttf").unwrap())
}

#[test]
fn garbage_bytes_register_no_family() {
    let err = TextEngine::new(Arc::new(vec![0u8; 64])).err().unwrap();
    assert!(err.to_string().contains("font"));
}

#[test]
fn brush_from_color() {
    let b = TextBrush::from(Rgba8::rgba(1, 2, 3, 4));
    assert_eq!(
        b,
        TextBrush {
            r: 1,
            g: 2,
            b: 3,
            a: 4
        }
    );
}

#[test]
fn layout_measures_with_fixture_font() {
    let mut engine = TextEngine::new(fixture_font()).unwrap();
    let block = engine.layout("12 km", 14.0, Rgba8::WHITE).unwrap();
    assert!(block.width() > 0.0);
    assert!(block.height() > 0.0);
    assert!(engine.layout("x", 0.0, Rgba8::WHITE).is_err());

    let wider = engine.layout("12 km", 28.0, Rgba8::WHITE).unwrap();
    assert!(wider.width() > block.width());
}

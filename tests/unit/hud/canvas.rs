use super::*;

fn alpha_at(frame: &FrameRGBA, x: u32, y: u32) -> u8 {
    frame.data[((y * frame.width + x) * 4 + 3) as usize]
}

fn rgba_at(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

fn drawn_columns(frame: &FrameRGBA) -> Option<(u32, u32)> {
    let cols: Vec<u32> = (0..frame.width)
        .filter(|&x| (0..frame.height).any(|y| alpha_at(frame, x, y) > 0))
        .collect();
    Some((*cols.first()?, *cols.last()?))
}

fn drawn_rows(frame: &FrameRGBA) -> Option<(u32, u32)> {
    let rows: Vec<u32> = (0..frame.height)
        .filter(|&y| (0..frame.width).any(|x| alpha_at(frame, x, y) > 0))
        .collect();
    Some((*rows.first()?, *rows.last()?))
}

#[test]
fn untouched_surface_is_transparent() {
    let mut text = TextEngine::new().unwrap();
    let canvas = HudCanvas::new(FrameSize::new(8, 4).unwrap(), &mut text).unwrap();
    let frame = canvas.finish().unwrap();
    assert!(frame.premultiplied);
    assert_eq!(frame.data.len(), 8 * 4 * 4);
    assert!(frame.data.iter().all(|&b| b == 0));
}

#[test]
fn filled_rect_is_opaque_inside_and_clear_outside() {
    let mut text = TextEngine::new().unwrap();
    let mut canvas = HudCanvas::new(FrameSize::new(10, 10).unwrap(), &mut text).unwrap();
    canvas.fill_rect(Rect::new(2.0, 2.0, 6.0, 6.0), Rgb8::new(30, 60, 90));
    let frame = canvas.finish().unwrap();
    assert_eq!(rgba_at(&frame, 3, 3), [30, 60, 90, 255]);
    assert_eq!(alpha_at(&frame, 0, 0), 0);
    assert_eq!(alpha_at(&frame, 8, 8), 0);
}

#[test]
fn text_sits_on_its_baseline_and_reports_width() {
    let mut text = TextEngine::new().unwrap();
    let expected = text.measure("H1", 12.0);
    let mut canvas = HudCanvas::new(FrameSize::new(64, 32).unwrap(), &mut text).unwrap();
    let w = canvas.text(Point::new(4.0, 24.0), 12.0, "H1", Rgb8::gray(255));
    assert_eq!(w, expected);
    assert_eq!(canvas.text_width("H1", 12.0), w);
    let frame = canvas.finish().unwrap();

    let (top, bottom) = drawn_rows(&frame).unwrap();
    // capitals span roughly `height` pixels above the baseline
    assert!((10..=14).contains(&top), "top row {top}");
    assert!((22..=24).contains(&bottom), "bottom row {bottom}");
    let (left, right) = drawn_columns(&frame).unwrap();
    assert!(left >= 4);
    assert!(f64::from(right) <= 4.0 + w + 1.0);
}

#[test]
fn lowercase_and_symbols_are_drawn() {
    for label in ["bpm", "km/h", "°", "~"] {
        let mut text = TextEngine::new().unwrap();
        let mut canvas = HudCanvas::new(FrameSize::new(80, 30).unwrap(), &mut text).unwrap();
        canvas.text(Point::new(2.0, 22.0), 12.0, label, Rgb8::gray(200));
        let frame = canvas.finish().unwrap();
        assert!(drawn_rows(&frame).is_some(), "{label} drew nothing");
    }
}

#[test]
fn empty_or_flat_text_draws_nothing() {
    let mut text = TextEngine::new().unwrap();
    let mut canvas = HudCanvas::new(FrameSize::new(40, 20).unwrap(), &mut text).unwrap();
    let (origin, white) = (Point::new(2.0, 14.0), Rgb8::gray(255));
    assert_eq!(canvas.text(origin, 12.0, "", white), 0.0);
    assert_eq!(canvas.text(origin, 0.0, "AB", white), 0.0);
    assert_eq!(canvas.text(origin, f64::NAN, "AB", white), 0.0);
    let frame = canvas.finish().unwrap();
    assert!(frame.data.iter().all(|&b| b == 0));
}

#[test]
fn degenerate_stroke_width_draws_nothing() {
    let mut text = TextEngine::new().unwrap();
    let mut canvas = HudCanvas::new(FrameSize::new(20, 20).unwrap(), &mut text).unwrap();
    let (a, b) = (Point::new(2.0, 10.0), Point::new(18.0, 10.0));
    canvas.line(a, b, 0.0, Rgb8::gray(255));
    canvas.line(a, b, f64::NAN, Rgb8::gray(255));
    let frame = canvas.finish().unwrap();
    assert!(frame.data.iter().all(|&b| b == 0));
}

#[test]
fn oversized_surface_is_rejected() {
    let mut text = TextEngine::new().unwrap();
    let err = HudCanvas::new(FrameSize::new(70_000, 10).unwrap(), &mut text).unwrap_err();
    assert!(matches!(err, HudError::InvalidConfiguration(_)));
}

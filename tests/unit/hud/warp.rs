use super::*;
use crate::hud::cache::WarpKey;

fn buffer(size: FrameSize, fill: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
    let mut out = Vec::with_capacity(size.area() * 4);
    for y in 0..size.height {
        for x in 0..size.width {
            out.extend_from_slice(&fill(x, y));
        }
    }
    out
}

fn block(size: FrameSize) -> Vec<u8> {
    buffer(size, |x, y| {
        if (8..24).contains(&x) && (10..14).contains(&y) {
            [200, 100, 50, 255]
        } else {
            [0; 4]
        }
    })
}

#[test]
fn content_bounds_are_tight() {
    let size = FrameSize::new(32, 24).unwrap();
    assert_eq!(
        content_bounds(&block(size), size),
        Some(PixelBounds {
            x0: 8,
            y0: 10,
            x1: 24,
            y1: 14
        })
    );
    assert_eq!(content_bounds(&vec![0; size.area() * 4], size), None);
}

#[test]
fn expand_rows_clips_to_height() {
    let b = PixelBounds {
        x0: 1,
        y0: 2,
        x1: 5,
        y1: 20,
    };
    assert_eq!(
        b.expand_rows(4, 22),
        PixelBounds {
            x0: 1,
            y0: 0,
            x1: 5,
            y1: 22
        }
    );
    assert_eq!(displacement_margin(0.03, 1000), 34);
}

#[test]
fn zero_strength_is_identity() {
    let size = FrameSize::new(16, 12).unwrap();
    let src = buffer(size, |x, y| [x as u8 * 10, y as u8 * 10, 7, 255]);
    let map = WarpMap::new(WarpKey::new(size, 0.0));
    let out = remap_rows(&src, size, &map, PixelBounds::full(size)).unwrap();
    assert_eq!(out, src);
}

#[test]
fn center_column_does_not_move() {
    let size = FrameSize::new(32, 24).unwrap();
    let src = block(size);
    let map = WarpMap::new(WarpKey::new(size, 0.1));
    let out = warp_overlay(&src, size, &map, false).unwrap();
    let col = |buf: &[u8], y: u32| buf[((y * 32 + 16) * 4 + 3) as usize];
    for y in 0..24 {
        assert_eq!(col(&out, y), col(&src, y));
    }
    assert_ne!(out, src);
}

#[test]
fn roi_matches_full_frame_remap() {
    let size = FrameSize::new(40, 30).unwrap();
    let src = buffer(size, |x, y| {
        if ((3..37).contains(&x) && (4..9).contains(&y)) || ((20..30).contains(&x) && y == 25) {
            [250, 250, 250, 255]
        } else {
            [0; 4]
        }
    });
    let map = WarpMap::new(WarpKey::new(size, 0.08));
    assert_eq!(
        warp_overlay(&src, size, &map, true).unwrap(),
        warp_overlay(&src, size, &map, false).unwrap()
    );
}

#[test]
fn blank_overlay_passes_through() {
    let size = FrameSize::new(8, 8).unwrap();
    let src = vec![0; size.area() * 4];
    let map = WarpMap::new(WarpKey::new(size, 0.05));
    assert_eq!(warp_overlay(&src, size, &map, true).unwrap(), src);
}

#[test]
fn mismatched_inputs_are_warp_errors() {
    let size = FrameSize::new(8, 8).unwrap();
    let map = WarpMap::new(WarpKey::new(FrameSize::new(9, 8).unwrap(), 0.05));
    let src = vec![0; size.area() * 4];
    assert!(matches!(
        remap_rows(&src, size, &map, PixelBounds::full(size)).unwrap_err(),
        HudError::Warp(_)
    ));

    let map = WarpMap::new(WarpKey::new(size, 0.05));
    assert!(matches!(
        remap_rows(&src[..10], size, &map, PixelBounds::full(size)).unwrap_err(),
        HudError::Warp(_)
    ));
    let outside = PixelBounds {
        x0: 0,
        y0: 0,
        x1: 9,
        y1: 8,
    };
    assert!(matches!(
        remap_rows(&src, size, &map, outside).unwrap_err(),
        HudError::Warp(_)
    ));
}

use super::*;
use crate::foundation::core::Rgb8;
use crate::hud::cache::WarpKey;
use crate::track::store::TrackRecord;

fn ride() -> Track {
    let recs = (0..80)
        .map(|i| {
            TrackRecord::new(i as f64, 45.0 + i as f64 * 1e-4, 7.0 + i as f64 * 2e-5)
                .with_elevation(200.0 + (i as f64 * 0.2).sin() * 15.0)
                .with_heart_rate(120 + (i % 40) as u16)
                .with_cadence(85)
        })
        .collect();
    Track::from_records(recs).unwrap()
}

fn snap(track: &Track, index: usize) -> Snapshot {
    let p = &track.points()[index];
    Snapshot {
        lat: p.lat,
        lon: p.lon,
        elevation: p.elevation,
        heart_rate: p.heart_rate,
        cadence: p.cadence,
        speed_kmh: 28.0,
        grade_percent: 2.5,
        power_watts: 190.0,
        cumulative_distance_m: p.cumulative_distance_m,
        progress_percent: 40.0,
        source_index: index,
        heading_degrees: track.heading_at(index),
    }
}

fn config(f: impl FnOnce(&mut HudConfig)) -> Arc<HudConfig> {
    let mut cfg = HudConfig::default();
    f(&mut cfg);
    Arc::new(cfg)
}

#[test]
fn overlay_matches_frame_size_and_has_content() {
    let track = ride();
    let mut hud = HudCompositor::new(config(|_| {})).unwrap();
    let size = FrameSize::new(640, 360).unwrap();
    let overlay = hud.render(size, &snap(&track, 30), &track, 2.0).unwrap();
    assert_eq!(overlay.size, size);
    assert_eq!(overlay.alpha.len(), size.area());
    assert_eq!(overlay.color.len(), size.area() * 3);
    assert!(overlay.coverage() > 0);
    assert!(overlay.alpha.iter().all(|a| (0.0..=1.0).contains(a)));
    // the overlay center is never covered by a widget
    assert_eq!(overlay.alpha_at(320, 180), 0.0);
}

#[test]
fn native_scale_equals_direct_render() {
    let track = ride();
    let cfg = config(|c| {
        c.effects.downscale = 1.0;
        c.effects.curve_strength = 0.0;
        c.effects.update_rate_hz = None;
    });
    let size = FrameSize::new(480, 270).unwrap();
    let s = snap(&track, 20);

    let overlay = HudCompositor::new(Arc::clone(&cfg))
        .unwrap()
        .render(size, &s, &track, 1.0)
        .unwrap();

    let layout = HudLayout::compute(size, 1.0, &cfg.layout);
    let mut text = TextEngine::new().unwrap();
    let mut canvas = HudCanvas::new(size, &mut text).unwrap();
    draw_hud(&mut canvas, &layout, &s, &track, 1.0, &cfg);
    let layer = canvas.finish().unwrap();
    let field = crate::hud::cache::DistanceField::new(size);
    let masked = apply_mask(&layer, &field, &FadeParams::from_config(&cfg)).unwrap();
    assert_eq!(*overlay, HudOverlay::from_rgba(size, &masked.rgba));
}

#[test]
fn throttle_reuses_recent_overlay() {
    let track = ride();
    let mut hud = HudCompositor::new(config(|c| c.effects.update_rate_hz = Some(10.0))).unwrap();
    let size = FrameSize::new(320, 180).unwrap();
    let first = hud.render(size, &snap(&track, 10), &track, 1.0).unwrap();
    let again = hud.render(size, &snap(&track, 11), &track, 1.05).unwrap();
    assert!(Arc::ptr_eq(&first, &again));

    let later = hud.render(size, &snap(&track, 12), &track, 1.1).unwrap();
    assert!(!Arc::ptr_eq(&first, &later));

    // going back in time always redraws
    let back = hud.render(size, &snap(&track, 12), &track, 0.5).unwrap();
    assert!(!Arc::ptr_eq(&later, &back));
}

#[test]
fn resize_invalidates_throttle() {
    let track = ride();
    let mut hud = HudCompositor::new(config(|c| c.effects.update_rate_hz = Some(1.0))).unwrap();
    let (small, large) = (
        FrameSize::new(320, 180).unwrap(),
        FrameSize::new(400, 220).unwrap(),
    );
    let a = hud.render(small, &snap(&track, 10), &track, 1.0).unwrap();
    let b = hud.render(large, &snap(&track, 10), &track, 1.01).unwrap();
    assert_eq!(b.size, large);
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn no_throttle_without_update_rate() {
    let track = ride();
    let mut hud = HudCompositor::new(config(|c| c.effects.update_rate_hz = None)).unwrap();
    let size = FrameSize::new(320, 180).unwrap();
    let a = hud.render(size, &snap(&track, 10), &track, 1.0).unwrap();
    let b = hud.render(size, &snap(&track, 10), &track, 1.0).unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(*a, *b);
}

#[test]
fn caches_fill_per_render_size_and_clear() {
    let track = ride();
    let mut hud = HudCompositor::new(config(|c| {
        c.effects.update_rate_hz = None;
        c.effects.downscale = 0.5;
    }))
    .unwrap();
    let size = FrameSize::new(400, 200).unwrap();
    hud.render(size, &snap(&track, 5), &track, 0.0).unwrap();
    let render_size = FrameSize::new(200, 100).unwrap();
    assert!(hud.caches().distance.contains(&render_size));
    assert_eq!(hud.caches().warp.len(), 1);

    hud.clear_caches();
    assert!(hud.caches().distance.is_empty());
    assert!(hud.caches().warp.is_empty());
}

#[test]
fn fast_mode_skips_warp_cache() {
    let track = ride();
    let mut hud = HudCompositor::new(config(|c| c.effects.fast_mode = true)).unwrap();
    let size = FrameSize::new(320, 180).unwrap();
    hud.render(size, &snap(&track, 5), &track, 0.0).unwrap();
    assert!(hud.caches().warp.is_empty());
    assert_eq!(hud.caches().distance.len(), 1);
}

#[test]
fn everything_disabled_gives_transparent_overlay() {
    let track = ride();
    let mut hud = HudCompositor::new(config(|c| {
        let w = &mut c.widgets;
        w.altitude = false;
        w.distance = false;
        w.gradient = false;
        w.speed = false;
        w.heart_rate = false;
        w.power = false;
        w.cadence = false;
        w.elevation_profile = false;
        w.route_map = false;
        w.progress_bar = false;
    }))
    .unwrap();
    let size = FrameSize::new(200, 120).unwrap();
    let overlay = hud.render(size, &snap(&track, 5), &track, 0.0).unwrap();
    assert_eq!(*overlay, HudOverlay::transparent(size));
}

#[test]
fn composite_blends_by_alpha() {
    let size = FrameSize::new(3, 1).unwrap();
    let mut frame = FrameRGBA::solid(size, Rgb8::new(100, 100, 100));
    let overlay = HudOverlay {
        size,
        color: vec![200, 0, 50, 200, 0, 50, 200, 0, 50],
        alpha: vec![0.0, 0.5, 1.0],
    };
    composite_onto(&mut frame, &overlay).unwrap();
    assert_eq!(
        frame.data,
        vec![100, 100, 100, 255, 150, 50, 75, 255, 200, 0, 50, 255]
    );
}

#[test]
fn composite_rejects_size_mismatch() {
    let mut frame = FrameRGBA::solid(FrameSize::new(4, 4).unwrap(), Rgb8::gray(0));
    let overlay = HudOverlay::transparent(FrameSize::new(2, 2).unwrap());
    assert!(matches!(
        composite_onto(&mut frame, &overlay).unwrap_err(),
        HudError::InvalidConfiguration(_)
    ));
}

#[test]
fn zero_update_rate_is_rejected() {
    let err = HudCompositor::new(config(|c| c.effects.update_rate_hz = Some(0.0))).unwrap_err();
    assert!(matches!(err, HudError::InvalidConfiguration(_)));
}

#[test]
fn caches_are_sized_from_effects() {
    let hud = HudCompositor::new(config(|c| {
        c.effects.grid_cache_capacity = 2;
        c.effects.warp_cache_capacity = 7;
    }))
    .unwrap();
    assert_eq!(hud.caches().distance.capacity(), 2);
    assert_eq!(hud.caches().warp.capacity(), 7);
}

#[test]
fn failed_warp_keeps_unwarped_pixels() {
    let size = FrameSize::new(6, 4).unwrap();
    let rgba: Vec<u8> = (0..size.area() * 4).map(|i| (i % 251) as u8).collect();
    let masked = MaskedOverlay {
        size,
        rgba: rgba.clone(),
        drawn: size.area(),
    };
    // a map built for another size cannot remap this overlay
    let map = WarpMap::new(WarpKey::new(FrameSize::new(8, 8).unwrap(), 0.05));
    assert_eq!(warp_or_unwarped(masked, &map, false), rgba);
}

#[test]
fn matching_warp_map_is_applied() {
    let size = FrameSize::new(32, 16).unwrap();
    let mut rgba = vec![0u8; size.area() * 4];
    for px in rgba.chunks_exact_mut(4).take(32 * 2) {
        px.copy_from_slice(&[200, 200, 200, 255]);
    }
    let masked = MaskedOverlay {
        size,
        rgba: rgba.clone(),
        drawn: 64,
    };
    let map = WarpMap::new(WarpKey::new(size, 0.2));
    assert_ne!(warp_or_unwarped(masked, &map, false), rgba);
}

#[test]
fn overlay_splits_color_from_alpha() {
    let size = FrameSize::new(2, 1).unwrap();
    let overlay = HudOverlay::from_rgba(size, &[10, 20, 30, 255, 0, 0, 0, 0]);
    assert_eq!(overlay.color_at(0, 0), [10, 20, 30]);
    assert_eq!(overlay.alpha_at(0, 0), 1.0);
    assert_eq!(overlay.color_at(1, 0), [0, 0, 0]);
    assert_eq!(overlay.alpha_at(1, 0), 0.0);
    assert_eq!(overlay.coverage(), 1);
}

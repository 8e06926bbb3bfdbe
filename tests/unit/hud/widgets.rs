use super::*;
use crate::foundation::core::{FrameRGBA, FrameSize};
use crate::hud::text::TextEngine;
use crate::track::store::TrackRecord;

fn drawn(frame: &FrameRGBA) -> usize {
    frame.data.chunks_exact(4).filter(|px| px[3] > 0).count()
}

fn drawn_in(frame: &FrameRGBA, r: Rect) -> usize {
    let mut n = 0;
    for y in r.y0 as u32..r.y1 as u32 {
        for x in r.x0 as u32..r.x1 as u32 {
            if frame.data[((y * frame.width + x) * 4 + 3) as usize] > 0 {
                n += 1;
            }
        }
    }
    n
}

fn climbing_track(n: usize) -> Track {
    let recs = (0..n)
        .map(|i| {
            TrackRecord::new(i as f64, 45.0 + i as f64 * 1e-4, 7.0)
                .with_elevation(300.0 + i as f64 * 0.8)
                .with_heart_rate(140)
        })
        .collect();
    Track::from_records_with(recs, |_, _| 10.0).unwrap()
}

fn snap_at(track: &Track, index: usize) -> Snapshot {
    let p = &track.points()[index];
    Snapshot {
        lat: p.lat,
        lon: p.lon,
        elevation: p.elevation,
        heart_rate: p.heart_rate,
        cadence: None,
        speed_kmh: 36.0,
        grade_percent: 8.0,
        power_watts: 250.0,
        cumulative_distance_m: p.cumulative_distance_m,
        progress_percent: 50.0,
        source_index: index,
        heading_degrees: track.heading_at(index),
    }
}

#[test]
fn grade_color_ramps_between_anchors() {
    let style = StyleConfig::default();
    assert_eq!(grade_color(0.0, &style), style.ele_low);
    assert_eq!(grade_color(2.9, &style), style.ele_low);
    assert_eq!(grade_color(3.0, &style), style.ele_low);
    assert_eq!(grade_color(8.0, &style), style.ele_mid);
    assert_eq!(grade_color(15.0, &style), style.ele_high);
    assert_eq!(grade_color(40.0, &style), style.ele_high);
    assert_eq!(
        grade_color(5.5, &style),
        style.ele_low.lerp(style.ele_mid, 0.5)
    );
}

#[test]
fn heart_beat_stays_within_bounds_and_defaults_to_resting_rate() {
    for i in 0..40 {
        let t = f64::from(i) * 0.05;
        let s = heart_beat_size(t, Some(150));
        assert!((9.0..=11.0).contains(&s), "size {s} at {t}");
    }
    assert_eq!(heart_beat_size(0.0, None), heart_beat_size(0.0, Some(70)));
    assert_eq!(
        heart_beat_size(1.3, Some(0)),
        heart_beat_size(1.3, Some(70))
    );
}

#[test]
fn every_icon_draws_something() {
    let icons = [
        WidgetIcon::Mountain,
        WidgetIcon::Route,
        WidgetIcon::Speedometer,
        WidgetIcon::Gradient,
        WidgetIcon::Heart,
        WidgetIcon::Cadence,
        WidgetIcon::Power,
        WidgetIcon::Clock,
        WidgetIcon::Elevation,
        WidgetIcon::Compass,
    ];
    for icon in icons {
        for value in [None, Some(-6.0), Some(350.0)] {
            let mut text = TextEngine::new().unwrap();
            let mut canvas = HudCanvas::new(FrameSize::new(40, 40).unwrap(), &mut text).unwrap();
            icon.draw(
                &mut canvas,
                Point::new(20.0, 20.0),
                10.0,
                Rgb8::gray(255),
                value,
            );
            let frame = canvas.finish().unwrap();
            assert!(drawn(&frame) > 0, "{icon:?} with {value:?} drew nothing");
        }
    }
}

#[test]
fn power_bolt_grows_with_watts() {
    let area = |w: f64| {
        let mut text = TextEngine::new().unwrap();
        let mut canvas = HudCanvas::new(FrameSize::new(60, 60).unwrap(), &mut text).unwrap();
        WidgetIcon::Power.draw(
            &mut canvas,
            Point::new(30.0, 30.0),
            12.0,
            Rgb8::gray(200),
            Some(w),
        );
        drawn(&canvas.finish().unwrap())
    };
    assert!(area(300.0) > area(0.0));
}

#[test]
fn value_panel_stays_inside_its_rect() {
    let cfg = HudConfig::default();
    let rect = Rect::new(10.0, 10.0, 231.0, 72.0);
    let mut text = TextEngine::new().unwrap();
    let mut canvas = HudCanvas::new(FrameSize::new(260, 100).unwrap(), &mut text).unwrap();
    draw_value_panel(
        &mut canvas,
        rect,
        "SPEED",
        Some(36.0),
        Quantity::Speed,
        UnitSystem::Metric,
        WidgetIcon::Speedometer,
        cfg.style.speed,
        &cfg,
    );
    let frame = canvas.finish().unwrap();
    let total = drawn(&frame);
    assert!(total > 0);
    assert_eq!(drawn_in(&frame, rect), total);
}

#[test]
fn heart_panel_shows_zone_pill_only_with_a_zone() {
    let mut cfg = HudConfig::default();
    cfg.style.panel_background = false;
    let zones = HrZones::for_age(cfg.rider.age);
    let rect = Rect::new(0.0, 0.0, 221.0, 62.0);
    let render = |hr: Option<u16>| {
        let mut text = TextEngine::new().unwrap();
        let mut canvas = HudCanvas::new(FrameSize::new(221, 62).unwrap(), &mut text).unwrap();
        draw_heart_panel(&mut canvas, rect, hr, &zones, 0.0, &cfg);
        canvas.finish().unwrap()
    };
    let with_zone = render(Some(150));
    let without = render(None);
    assert!(drawn(&with_zone) > 0);
    // zone pill only appears when a zone is known
    let pill = Rect::new(157.0, 6.0, 215.0, 22.0);
    assert!(drawn_in(&with_zone, pill) > drawn_in(&without, pill));
}

#[test]
fn elevation_profile_needs_enough_points() {
    let cfg = HudConfig::default();
    let rect = Rect::new(0.0, 0.0, 300.0, 200.0);
    let header = Rect::new(0.0, 0.0, 300.0, 30.0);
    let graph = Rect::new(15.0, 35.0, 285.0, 175.0);

    let short = climbing_track(5);
    let mut text = TextEngine::new().unwrap();
    let mut canvas = HudCanvas::new(FrameSize::new(300, 200).unwrap(), &mut text).unwrap();
    let mut style_cfg = cfg;
    style_cfg.style.panel_background = false;
    draw_elevation_profile(&mut canvas, rect, &snap_at(&short, 2), &short, &style_cfg);
    let frame = canvas.finish().unwrap();
    assert!(drawn_in(&frame, header) > 0);
    assert_eq!(drawn_in(&frame, graph), 0);

    let long = climbing_track(60);
    let mut text = TextEngine::new().unwrap();
    let mut canvas = HudCanvas::new(FrameSize::new(300, 200).unwrap(), &mut text).unwrap();
    draw_elevation_profile(&mut canvas, rect, &snap_at(&long, 30), &long, &style_cfg);
    let frame = canvas.finish().unwrap();
    assert!(drawn_in(&frame, graph) > 100);
}

#[test]
fn route_map_draws_path_around_center() {
    let mut cfg = HudConfig::default();
    cfg.style.panel_background = false;
    let track = climbing_track(40);
    let rect = Rect::new(0.0, 0.0, 217.0, 217.0);
    let mut text = TextEngine::new().unwrap();
    let mut canvas = HudCanvas::new(FrameSize::new(217, 217).unwrap(), &mut text).unwrap();
    draw_route_map(&mut canvas, rect, &snap_at(&track, 20), &track, &cfg);
    let frame = canvas.finish().unwrap();
    // heading north means the upcoming path runs straight up from the arrow
    let ahead = Rect::new(104.0, 30.0, 114.0, 90.0);
    assert!(drawn_in(&frame, ahead) > 0);
}

#[test]
fn progress_fill_is_skipped_when_too_short() {
    let style = StyleConfig {
        panel_background: false,
        ..StyleConfig::default()
    };
    let rect = Rect::new(100.0, 40.0, 400.0, 50.0);
    let track_area = Rect::new(102.0, 42.0, 398.0, 48.0);
    let render = |p: f64| {
        let mut text = TextEngine::new().unwrap();
        let mut canvas = HudCanvas::new(FrameSize::new(500, 80).unwrap(), &mut text).unwrap();
        draw_progress_bar(&mut canvas, rect, p, 65.0, &style);
        canvas.finish().unwrap()
    };
    assert_eq!(drawn_in(&render(1.0), track_area), 0);
    let half = drawn_in(&render(50.0), track_area);
    let full = drawn_in(&render(100.0), track_area);
    assert!(half > 0);
    assert!(full > half);
}

#[test]
fn fast_mode_skips_bottom_boxes() {
    let track = climbing_track(60);
    let snap = snap_at(&track, 30);
    let size = FrameSize::new(640, 360).unwrap();
    let layout = HudLayout::compute(size, 1.0, &HudConfig::default().layout);
    let render = |fast: bool| {
        let mut cfg = HudConfig::default();
        cfg.effects.fast_mode = fast;
        let mut text = TextEngine::new().unwrap();
        let mut canvas = HudCanvas::new(size, &mut text).unwrap();
        draw_hud(&mut canvas, &layout, &snap, &track, 3.0, &cfg);
        canvas.finish().unwrap()
    };
    let map = layout.map_rect();
    assert!(drawn_in(&render(false), map) > 0);
    assert_eq!(drawn_in(&render(true), map), 0);
}

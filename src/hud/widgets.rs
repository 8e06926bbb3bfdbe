//! Widget renderers drawing into a [`HudCanvas`].
//!
//! Every icon shares one contract, [`WidgetIcon::draw`]: canvas, center, size, color and an
//! optional live value (speed for the needle, grade for the slope, watts for the bolt).

use std::f64::consts::{PI, TAU};

use crate::config::{HudConfig, StyleConfig, UnitSystem};
use crate::foundation::core::{Point, Rect, Rgb8};
use crate::hud::canvas::HudCanvas;
use crate::hud::layout::{HudLayout, PanelKind, place_panels};
use crate::telemetry::engine::ElevationWindow;
use crate::telemetry::snapshot::Snapshot;
use crate::track::store::Track;
use crate::track::zones::HrZones;
use crate::units::{Quantity, format_clock};

const HEADER_TEXT_H: f64 = 9.0;
const SMALL_TEXT_H: f64 = 8.0;
const HEART_SCALE_MIN: f64 = 9.0;
const HEART_SCALE_MAX: f64 = 11.0;
const RESTING_HR: f64 = 70.0;
const PROGRESS_MIN_FILL: f64 = 6.0;
const NO_ZONE: Rgb8 = Rgb8::gray(128);
const NORTH: Rgb8 = Rgb8::new(255, 100, 100);

/// Icon shapes used by panels and box headers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WidgetIcon {
    /// Peaks with a snow line.
    Mountain,
    /// Wavy route with a start dot.
    Route,
    /// Half-dial speedometer; the needle follows the value in km/h (0 to 70).
    Speedometer,
    /// Road segment tilted by the sign of the grade value.
    Gradient,
    /// Filled heart.
    Heart,
    /// Chainring with six teeth.
    Cadence,
    /// Lightning bolt that grows with the power value and glows above 200 W.
    Power,
    /// Clock face.
    Clock,
    /// Small elevation polyline.
    Elevation,
    /// Compass rose with north marker.
    Compass,
}

impl WidgetIcon {
    /// Draw the icon centered at `c`, roughly `2 * size` across.
    pub fn draw(
        self,
        canvas: &mut HudCanvas<'_>,
        c: Point,
        size: f64,
        color: Rgb8,
        value: Option<f64>,
    ) {
        let s = size.max(1.0);
        match self {
            Self::Mountain => {
                let pts = [
                    Point::new(c.x - s, c.y + s / 2.0),
                    Point::new(c.x - s / 3.0, c.y - s / 2.0),
                    Point::new(c.x, c.y),
                    Point::new(c.x + s / 3.0, c.y - s * 0.75),
                    Point::new(c.x + s, c.y + s / 2.0),
                ];
                canvas.stroke_polyline(&pts, 2.0, color, false);
                let peak = pts[3];
                canvas.line(
                    Point::new(peak.x - 3.0, peak.y + 3.0),
                    Point::new(peak.x + 5.0, peak.y + 6.0),
                    2.0,
                    color,
                );
            }
            Self::Route => {
                let pts: Vec<Point> = (0..10)
                    .map(|i| {
                        let fi = f64::from(i);
                        Point::new(
                            c.x - s + fi * s * 2.0 / 9.0,
                            c.y + (fi * 0.8).sin() * s / 3.0,
                        )
                    })
                    .collect();
                canvas.stroke_polyline(&pts, 2.0, color, false);
                canvas.fill_circle(Point::new(c.x - s, c.y), 3.0, color);
            }
            Self::Speedometer => {
                let hub = Point::new(c.x, c.y + 2.0);
                let (rx, ry) = (s, (s - 2.0).max(1.0));
                let arc: Vec<Point> = (0..=24)
                    .map(|i| {
                        let a = PI + PI * f64::from(i) / 24.0;
                        Point::new(hub.x + a.cos() * rx, hub.y + a.sin() * ry)
                    })
                    .collect();
                canvas.stroke_polyline(&arc, 2.0, color, false);
                let speed = value.unwrap_or(0.0).clamp(0.0, 70.0);
                let angle = (225.0 + 90.0 * speed / 70.0_f64).to_radians();
                let tip = Point::new(
                    hub.x + angle.cos() * (s - 4.0),
                    hub.y + angle.sin() * (s - 4.0),
                );
                canvas.line(hub, tip, 2.0, color);
                canvas.fill_circle(hub, 3.0, color);
            }
            Self::Gradient => {
                let grade = value.unwrap_or(0.0);
                if grade.abs() < 1.0 {
                    for (dy, w) in [(0.0, 3.0), (-2.0, 1.0), (2.0, 1.0)] {
                        canvas.line(
                            Point::new(c.x - s, c.y + dy),
                            Point::new(c.x + s, c.y + dy),
                            w,
                            color,
                        );
                    }
                } else {
                    // climbing rises to the right, descending falls
                    let dir = if grade > 0.0 { -1.0 } else { 1.0 };
                    let left = Point::new(c.x - s, c.y - dir * s / 2.0);
                    let right = Point::new(c.x + s, c.y + dir * s / 2.0);
                    canvas.line(left, right, 3.0, color);
                    canvas.line(
                        Point::new(left.x, left.y - 2.0 * -dir),
                        Point::new(right.x, right.y - 2.0 * -dir),
                        1.0,
                        color,
                    );
                    let tip_y = c.y + dir * (s / 2.0 - 2.0);
                    let base_y = tip_y - dir * 4.0;
                    canvas.fill_polygon(
                        &[
                            Point::new(c.x + s / 2.0, tip_y),
                            Point::new(c.x + s / 2.0 - 4.0, base_y),
                            Point::new(c.x + s / 2.0 + 4.0, base_y),
                        ],
                        color,
                    );
                }
            }
            Self::Heart => {
                let pts: Vec<Point> = (0..50)
                    .map(|i| {
                        let t = TAU * f64::from(i) / 49.0;
                        let px = 16.0 * t.sin().powi(3);
                        let py = -(13.0 * t.cos()
                            - 5.0 * (2.0 * t).cos()
                            - 2.0 * (3.0 * t).cos()
                            - (4.0 * t).cos());
                        Point::new(c.x + px * s / 18.0, c.y + py * s / 18.0 - 2.0)
                    })
                    .collect();
                canvas.fill_polygon(&pts, color);
            }
            Self::Cadence => {
                canvas.stroke_circle(c, s, 2.0, color);
                canvas.stroke_circle(c, s / 3.0, 2.0, color);
                for i in 0..6 {
                    let a = f64::from(i * 60).to_radians();
                    let (cos, sin) = (a.cos(), a.sin());
                    canvas.line(
                        Point::new(c.x + cos * (s - 2.0), c.y + sin * (s - 2.0)),
                        Point::new(c.x + cos * (s + 4.0), c.y + sin * (s + 4.0)),
                        2.0,
                        color,
                    );
                }
            }
            Self::Power => {
                let watts = value.unwrap_or(0.0).max(0.0);
                let scaled = s * (1.0 + (watts / 1000.0).min(0.3));
                if watts > 200.0 {
                    canvas.fill_polygon(&bolt(c, scaled + 2.0), color.scale(0.3));
                }
                canvas.fill_polygon(&bolt(c, scaled), color);
            }
            Self::Clock => {
                canvas.stroke_circle(c, s, 2.0, color);
                canvas.line(c, Point::new(c.x, c.y - s + 3.0), 2.0, color);
                canvas.line(c, Point::new(c.x + s / 2.0, c.y + 2.0), 2.0, color);
            }
            Self::Elevation => {
                let pts = [
                    Point::new(c.x - s, c.y + s / 2.0),
                    Point::new(c.x - s / 2.0, c.y),
                    Point::new(c.x, c.y + s / 3.0),
                    Point::new(c.x + s / 2.0, c.y - s / 2.0),
                    Point::new(c.x + s, c.y - s / 3.0),
                ];
                canvas.stroke_polyline(&pts, 2.0, color, false);
            }
            Self::Compass => {
                canvas.stroke_circle(c, s, 2.0, color);
                canvas.fill_polygon(
                    &[
                        Point::new(c.x, c.y - s + 2.0),
                        Point::new(c.x - 3.0, c.y),
                        Point::new(c.x + 3.0, c.y),
                    ],
                    color,
                );
                canvas.line(c, Point::new(c.x, c.y + s - 2.0), 1.0, color);
            }
        }
    }
}

fn bolt(c: Point, s: f64) -> [Point; 6] {
    [
        Point::new(c.x - s / 3.0, c.y - s),
        Point::new(c.x + s / 4.0, c.y - s / 4.0),
        Point::new(c.x - s / 4.0, c.y - s / 4.0),
        Point::new(c.x + s / 3.0, c.y + s),
        Point::new(c.x - s / 4.0, c.y + s / 4.0),
        Point::new(c.x + s / 4.0, c.y + s / 4.0),
    ]
}

/// Upward-pointing position arrow rotated by `heading_deg`, outlined in white.
pub fn draw_cyclist_arrow(
    canvas: &mut HudCanvas<'_>,
    c: Point,
    heading_deg: f64,
    size: f64,
    color: Rgb8,
) {
    let a = (-heading_deg).to_radians();
    let (cos, sin) = (a.cos(), a.sin());
    let pts: Vec<Point> = [
        (0.0, -size),
        (-size / 2.0, size / 2.0),
        (0.0, size / 4.0),
        (size / 2.0, size / 2.0),
    ]
    .iter()
    .map(|&(x, y)| Point::new(c.x + x * cos - y * sin, c.y + x * sin + y * cos))
    .collect();
    canvas.fill_polygon(&pts, color);
    canvas.stroke_polyline(&pts, 1.0, Rgb8::gray(255), true);
}

/// Profile color for an absolute grade: low below 3 %, blending to mid at 8 %, to high at
/// 15 %, high above.
pub fn grade_color(grade_abs: f64, style: &StyleConfig) -> Rgb8 {
    if grade_abs < 3.0 {
        style.ele_low
    } else if grade_abs < 8.0 {
        style.ele_low.lerp(style.ele_mid, (grade_abs - 3.0) / 5.0)
    } else if grade_abs < 15.0 {
        style.ele_mid.lerp(style.ele_high, (grade_abs - 8.0) / 7.0)
    } else {
        style.ele_high
    }
}

/// Heart size for the beat animation at wall time `t`.
pub fn heart_beat_size(t: f64, heart_rate: Option<u16>) -> f64 {
    let hr = heart_rate
        .filter(|&v| v > 0)
        .map_or(RESTING_HR, f64::from);
    let phase = (t * hr / 60.0 * TAU).rem_euclid(TAU);
    let step = ((HEART_SCALE_MAX - HEART_SCALE_MIN) * (1.0 + phase.sin()) / 2.0).trunc();
    HEART_SCALE_MIN + step
}

fn panel_background(canvas: &mut HudCanvas<'_>, rect: Rect, alpha: f64, style: &StyleConfig) {
    if style.panel_background {
        canvas.fill_rect(rect, style.glass.scale(alpha));
    }
}

struct PanelMetrics {
    margin: f64,
    icon_box: f64,
    text_x: f64,
    title_h: f64,
    value_h: f64,
}

impl PanelMetrics {
    fn new(rect: Rect) -> Self {
        let h = rect.height();
        let margin = (h * 0.12).trunc().max(6.0);
        let icon_box = (h - 2.0 * margin).max(12.0);
        Self {
            margin,
            icon_box,
            text_x: rect.x0 + margin + icon_box + (h * 0.08).trunc().max(8.0),
            title_h: (h * 0.16).max(7.0),
            value_h: (h * 0.3).max(10.0),
        }
    }
}

/// Standard panel: icon on the left, title above, value with unit below.
#[allow(clippy::too_many_arguments)]
pub fn draw_value_panel(
    canvas: &mut HudCanvas<'_>,
    rect: Rect,
    title: &str,
    value: Option<f64>,
    quantity: Quantity,
    units: UnitSystem,
    icon: WidgetIcon,
    icon_color: Rgb8,
    cfg: &HudConfig,
) {
    let style = &cfg.style;
    panel_background(canvas, rect, style.panel_bg_alpha, style);

    let h = rect.height();
    let m = PanelMetrics::new(rect);
    let icon_center = Point::new(
        rect.x0 + m.margin + m.icon_box / 2.0,
        rect.y0 + m.margin + m.icon_box / 2.0,
    );
    let icon_size = (m.icon_box * cfg.layout.icon_size_ratio).trunc();
    icon.draw(canvas, icon_center, icon_size, icon_color, value);

    let title_y = rect.y0 + (h * 0.28).trunc().max(16.0);
    let value_y = rect.y1 - (h * 0.16).trunc().max(8.0);
    canvas.text(
        Point::new(m.text_x, title_y),
        m.title_h,
        title,
        style.text_main,
    );

    let shown = units.format(quantity, value);
    let vw = canvas.text(
        Point::new(m.text_x, value_y),
        m.value_h,
        &shown,
        style.text_main,
    );
    let unit_x = m.text_x + vw + (h * 0.03).trunc().max(4.0);
    canvas.text(
        Point::new(unit_x, value_y),
        m.title_h,
        units.spec(quantity).label,
        style.text_sub,
    );
}

/// Heart-rate panel: beating heart in the zone color, bpm value, zone pill and a five
/// segment zone bar.
pub fn draw_heart_panel(
    canvas: &mut HudCanvas<'_>,
    rect: Rect,
    heart_rate: Option<u16>,
    zones: &HrZones,
    wall_time_s: f64,
    cfg: &HudConfig,
) {
    let style = &cfg.style;
    panel_background(canvas, rect, style.panel_bg_alpha, style);

    let h = rect.height();
    let w = rect.width();
    let m = PanelMetrics::new(rect);
    let zone = zones.classify(heart_rate);
    let zone_color = zone.map_or(NO_ZONE, |z| style.zones[usize::from(z.number - 1)]);

    let heart_center = Point::new(rect.x0 + m.margin + m.icon_box / 2.0, rect.y0 + h / 2.0);
    WidgetIcon::Heart.draw(
        canvas,
        heart_center,
        heart_beat_size(wall_time_s, heart_rate),
        zone_color,
        heart_rate.map(f64::from),
    );

    let title_y = rect.y0 + (h * 0.25).trunc().max(14.0);
    let value_y = rect.y1 - (h * 0.35).trunc().max(20.0);
    canvas.text(
        Point::new(m.text_x, title_y),
        m.title_h,
        "HEART RATE",
        style.text_main,
    );
    let shown = match heart_rate {
        Some(v) if v > 0 => v.to_string(),
        _ => "--".to_owned(),
    };
    let vw = canvas.text(
        Point::new(m.text_x, value_y),
        m.value_h,
        &shown,
        style.text_main,
    );
    canvas.text(
        Point::new(m.text_x + vw + (h * 0.03).trunc().max(4.0), value_y),
        m.title_h,
        "bpm",
        style.text_sub,
    );

    if let Some(z) = zone {
        let (pill_w, pill_h) = (58.0, 16.0);
        let px = rect.x1 - pill_w - 6.0;
        let py = rect.y0 + 6.0;
        let r = pill_h / 2.0;
        canvas.fill_circle(Point::new(px + r, py + r), r, zone_color);
        canvas.fill_rect(
            Rect::new(px + r, py, px + pill_w - r, py + pill_h),
            zone_color,
        );
        canvas.fill_circle(Point::new(px + pill_w - r, py + r), r, zone_color);
        let name_w = canvas.text_width(z.name, SMALL_TEXT_H);
        canvas.text(
            Point::new(px + ((pill_w - name_w) / 2.0).max(2.0), py + 12.0),
            SMALL_TEXT_H,
            z.name,
            Rgb8::gray(255),
        );
    }

    let bar_y = rect.y1 - (h * 0.15).trunc().max(8.0);
    let bar_w = w - 2.0 * m.margin;
    let bar_h = (h * 0.06).trunc().max(3.0);
    let seg_w = (bar_w / 5.0).trunc();
    for (i, color) in style.zones.iter().enumerate() {
        let active = zone.is_some_and(|z| usize::from(z.number) == i + 1);
        let x = rect.x0 + m.margin + i as f64 * seg_w;
        canvas.fill_rect(
            Rect::new(x, bar_y, x + seg_w - 2.0, bar_y + bar_h),
            if active { *color } else { style.zone_inactive },
        );
    }
}

fn box_header(
    canvas: &mut HudCanvas<'_>,
    rect: Rect,
    icon: WidgetIcon,
    color: Rgb8,
    title: &str,
    style: &StyleConfig,
) {
    icon.draw(
        canvas,
        Point::new(rect.x0 + 18.0, rect.y0 + 16.0),
        7.0,
        color,
        None,
    );
    canvas.text(
        Point::new(rect.x0 + 32.0, rect.y0 + 20.0),
        HEADER_TEXT_H,
        title,
        style.text_main,
    );
}

/// Elevation profile of the waypoints around the current position, colored by local grade,
/// with a position marker, min/max labels and route progress.
pub fn draw_elevation_profile(
    canvas: &mut HudCanvas<'_>,
    rect: Rect,
    snap: &Snapshot,
    track: &Track,
    cfg: &HudConfig,
) {
    let style = &cfg.style;
    let units = cfg.units;
    panel_background(canvas, rect, style.panel_bg_alpha_large, style);
    box_header(
        canvas,
        rect,
        WidgetIcon::Elevation,
        style.altitude,
        "ELEVATION",
        style,
    );

    let gx = rect.x0 + 15.0;
    let gy = rect.y0 + 35.0;
    let gw = rect.width() - 30.0;
    let gh = rect.height() - 60.0;

    let win = ElevationWindow::around(track, snap.source_index, cfg.layout.profile_display_range);
    if win.len() < cfg.layout.profile_min_points.max(2) || gw <= 0.0 || gh <= 0.0 {
        return;
    }
    let lo = win.min_m - 5.0;
    let hi = win.max_m + 5.0;
    let span = if hi > lo { hi - lo } else { 1.0 };
    let vscale = cfg.layout.profile_vertical_scale;
    let pts = track.points();
    let last = (win.len() - 1) as f64;

    let mut graph = Vec::with_capacity(win.len());
    let mut colors = Vec::with_capacity(win.len());
    for (i, idx) in (win.start..win.end).enumerate() {
        let p = &pts[idx];
        let x = gx + (i as f64 / last * gw).trunc();
        let norm = (p.elevation - lo) / span;
        let scaled = 0.5 + (norm - 0.5) * vscale;
        let y = gy + gh - (scaled * gh).trunc();
        graph.push(Point::new(x, y));

        let grade = if idx > 0 && p.segment_distance_m > 1.0 {
            (p.elevation - pts[idx - 1].elevation).abs() / p.segment_distance_m * 100.0
        } else {
            0.0
        };
        colors.push(grade_color(grade, style));
    }

    if graph.len() > 2 {
        let mut area = graph.clone();
        if let (Some(first), Some(end)) = (graph.first(), graph.last()) {
            area.push(Point::new(end.x, gy + gh));
            area.push(Point::new(first.x, gy + gh));
        }
        canvas.fill_polygon(&area, style.profile_fill);
        for (seg, color) in graph.windows(2).zip(&colors) {
            canvas.line(seg[0], seg[1], 2.0, *color);
        }
    }

    if let Some(&cur) = snap
        .source_index
        .checked_sub(win.start)
        .and_then(|rel| graph.get(rel))
    {
        canvas.line(
            Point::new(cur.x, gy),
            Point::new(cur.x, gy + gh),
            1.0,
            Rgb8::gray(70),
        );
        canvas.fill_circle(cur, 6.0, style.accent);
        canvas.stroke_circle(cur, 6.0, 1.0, Rgb8::gray(255));
        let label = format!(
            "{}{}",
            units.format(Quantity::Altitude, Some(snap.elevation)),
            units.spec(Quantity::Altitude).label
        );
        canvas.text(
            Point::new(cur.x - 15.0, cur.y - 10.0),
            SMALL_TEXT_H,
            &label,
            style.text_main,
        );
    }

    let unit = units.spec(Quantity::Altitude).label;
    let max_label = format!("{}{unit}", units.format(Quantity::Altitude, Some(hi)));
    let min_label = format!("{}{unit}", units.format(Quantity::Altitude, Some(lo)));
    for (label, y) in [(max_label, gy + 12.0), (min_label, gy + gh - 2.0)] {
        let lw = canvas.text_width(&label, SMALL_TEXT_H);
        canvas.text(
            Point::new(rect.x1 - 8.0 - lw, y),
            SMALL_TEXT_H,
            &label,
            style.text_sub,
        );
    }

    let pct = format!("{:.1}%", snap.progress_percent);
    let pct_w = canvas.text_width(&pct, HEADER_TEXT_H);
    canvas.text(
        Point::new(
            rect.x0 + ((rect.width() - pct_w) / 2.0).trunc(),
            rect.y1 - 8.0,
        ),
        HEADER_TEXT_H,
        &pct,
        style.accent,
    );
}

/// Route map centered on the rider and rotated so the direction of travel points up.
pub fn draw_route_map(
    canvas: &mut HudCanvas<'_>,
    rect: Rect,
    snap: &Snapshot,
    track: &Track,
    cfg: &HudConfig,
) {
    let style = &cfg.style;
    panel_background(canvas, rect, style.panel_bg_alpha_large, style);
    box_header(
        canvas,
        rect,
        WidgetIcon::Compass,
        style.accent,
        "ROUTE MAP",
        style,
    );

    let size = rect.width();
    let center = Point::new(
        rect.x0 + (size / 2.0).trunc(),
        rect.y0 + (size / 2.0).trunc() + 10.0,
    );
    let radius = (size / 2.0).trunc() - 20.0;
    let rot = (-snap.heading_degrees).to_radians();
    let (cos, sin) = (rot.cos(), rot.sin());
    let zoom = cfg.layout.map_zoom;
    let range = cfg.layout.map_display_range;

    let pts = track.points();
    let start = snap.source_index.saturating_sub(range);
    let end = snap.source_index.saturating_add(range).min(pts.len());
    let mut past = Vec::new();
    let mut future = Vec::new();
    for (i, p) in pts.iter().enumerate().take(end).skip(start) {
        let dx = (p.lon - snap.lon) * zoom;
        let dy = (snap.lat - p.lat) * zoom * 1.4;
        let q = Point::new(
            center.x + (dx * cos - dy * sin).trunc(),
            center.y + (dx * sin + dy * cos).trunc(),
        );
        if q.distance(center) < radius {
            if i < snap.source_index {
                past.push(q);
            } else {
                future.push(q);
            }
        }
    }

    canvas.stroke_polyline(&past, 3.0, style.map_path, false);
    canvas.stroke_polyline(&future, 4.0, style.map_path_front, false);
    canvas.stroke_polyline(&future, 2.0, style.accent, false);

    draw_cyclist_arrow(canvas, center, 0.0, 14.0, style.accent);

    let compass = Point::new(rect.x1 - 25.0, rect.y1 - 25.0);
    canvas.fill_circle(compass, 12.0, Rgb8::gray(40));
    canvas.stroke_circle(compass, 12.0, 1.0, Rgb8::gray(70));
    let needle = Point::new(compass.x + rot.sin() * 8.0, compass.y - rot.cos() * 8.0);
    canvas.line(compass, needle, 2.0, NORTH);
    canvas.text(
        Point::new(needle.x - 4.0, needle.y - 3.0),
        SMALL_TEXT_H,
        "N",
        NORTH,
    );
}

/// Progress bar with elapsed `MM:SS` above it and the percentage to its right.
pub fn draw_progress_bar(
    canvas: &mut HudCanvas<'_>,
    rect: Rect,
    progress_percent: f64,
    wall_time_s: f64,
    style: &StyleConfig,
) {
    let (x, y, w, h) = (rect.x0, rect.y0, rect.width(), rect.height());
    panel_background(
        canvas,
        Rect::new(x, y - 5.0, x + w, y + h + 5.0),
        style.panel_bg_alpha * 0.5,
        style,
    );

    let fill = ((w - 4.0) * progress_percent.clamp(0.0, 100.0) / 100.0).trunc();
    if fill > PROGRESS_MIN_FILL {
        canvas.fill_rect(
            Rect::new(x + 2.0, y + 2.0, x + 2.0 + fill, y + h - 2.0),
            style.accent,
        );
    }

    let mid = x + (w / 2.0).trunc();
    WidgetIcon::Clock.draw(
        canvas,
        Point::new(mid - 45.0, y - 18.0),
        7.0,
        style.text_sub,
        None,
    );
    canvas.text(
        Point::new(mid - 30.0, y - 13.0),
        HEADER_TEXT_H + 1.0,
        &format_clock(wall_time_s),
        style.text_main,
    );
    canvas.text(
        Point::new(x + w + 8.0, y + h - 1.0),
        HEADER_TEXT_H,
        &format!("{progress_percent:.1}%"),
        style.text_sub,
    );
}

/// Draw every enabled widget for `snap` into `canvas`.
///
/// Bottom boxes are skipped in fast mode.
pub fn draw_hud(
    canvas: &mut HudCanvas<'_>,
    layout: &HudLayout,
    snap: &Snapshot,
    track: &Track,
    wall_time_s: f64,
    cfg: &HudConfig,
) {
    let style = &cfg.style;
    let units = cfg.units;
    let zones = HrZones::for_age(cfg.rider.age);
    let panels = place_panels(layout, &cfg.widgets, snap);
    tracing::trace!(
        panels = panels.len(),
        index = snap.source_index,
        "drawing hud"
    );

    for (kind, rect) in panels {
        match kind {
            PanelKind::Altitude => draw_value_panel(
                canvas,
                rect,
                "ALTITUDE",
                Some(snap.elevation),
                Quantity::Altitude,
                units,
                WidgetIcon::Mountain,
                style.altitude,
                cfg,
            ),
            PanelKind::Distance => draw_value_panel(
                canvas,
                rect,
                "DISTANCE",
                Some(snap.cumulative_distance_m),
                Quantity::Distance,
                units,
                WidgetIcon::Route,
                style.distance,
                cfg,
            ),
            PanelKind::Gradient => draw_value_panel(
                canvas,
                rect,
                "GRADIENT",
                Some(snap.grade_percent),
                Quantity::Gradient,
                units,
                WidgetIcon::Gradient,
                grade_color(snap.grade_percent.abs(), style),
                cfg,
            ),
            PanelKind::Speed => draw_value_panel(
                canvas,
                rect,
                "SPEED",
                Some(snap.speed_kmh),
                Quantity::Speed,
                units,
                WidgetIcon::Speedometer,
                style.speed,
                cfg,
            ),
            PanelKind::HeartRate => {
                draw_heart_panel(canvas, rect, snap.heart_rate, &zones, wall_time_s, cfg)
            }
            PanelKind::Power => draw_value_panel(
                canvas,
                rect,
                "POWER",
                Some(snap.power_watts),
                Quantity::Power,
                units,
                WidgetIcon::Power,
                style.power,
                cfg,
            ),
            PanelKind::Cadence => draw_value_panel(
                canvas,
                rect,
                "CADENCE",
                snap.cadence.map(f64::from),
                Quantity::Cadence,
                units,
                WidgetIcon::Cadence,
                style.cadence,
                cfg,
            ),
        }
    }

    if !cfg.effects.fast_mode {
        if cfg.widgets.elevation_profile {
            draw_elevation_profile(canvas, layout.profile_rect(), snap, track, cfg);
        }
        if cfg.widgets.route_map {
            draw_route_map(canvas, layout.map_rect(), snap, track, cfg);
        }
    }
    if cfg.widgets.progress_bar {
        draw_progress_bar(
            canvas,
            layout.progress_rect(),
            snap.progress_percent,
            wall_time_s,
            style,
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/hud/widgets.rs"]
mod tests;

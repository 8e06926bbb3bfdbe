use crate::config::{LayoutConfig, WidgetToggles};
use crate::foundation::core::{FrameSize, Rect};
use crate::telemetry::snapshot::Snapshot;

/// Rows in the left column.
pub const LEFT_ROWS: usize = 3;
/// Rows in the right column.
pub const RIGHT_ROWS: usize = 4;

/// Single-value panels that stack in the side columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PanelKind {
    /// Elevation (left).
    Altitude,
    /// Cumulative distance (left).
    Distance,
    /// Grade (left).
    Gradient,
    /// Speed (right).
    Speed,
    /// Heart rate with zone indicator (right).
    HeartRate,
    /// Power estimate (right).
    Power,
    /// Cadence (right).
    Cadence,
}

/// Pixel geometry of every HUD element at the render resolution.
///
/// All sizes are integers, computed as `max(trunc(dim * ratio * scale), trunc(min * scale))`
/// so small frames fall back to a floor instead of collapsing.
#[derive(Clone, Debug, PartialEq)]
pub struct HudLayout {
    /// Render resolution the geometry is for.
    pub render_size: FrameSize,
    /// Widget scale after clamping to `[0.4, 1.2]`.
    pub widget_scale: f64,
    /// Side panel width.
    pub panel_w: i64,
    /// Side panel height.
    pub panel_h: i64,
    /// Edge padding.
    pub padding: i64,
    /// Gap between stacked rows.
    pub gap: i64,
    /// Side of the bottom boxes.
    pub box_size: i64,
    /// Progress bar width.
    pub bar_w: i64,
    /// Progress bar height.
    pub bar_h: i64,
    /// Vertical shift applied to every element.
    pub vshift: i64,
    /// Extra top offset of the side columns.
    pub top_offset: i64,
    /// Downscale factor the layout was computed under.
    pub hud_scale: f64,
}

fn scaled_floor(dim: u32, ratio: f64, min: f64, scale: f64) -> i64 {
    ((f64::from(dim) * ratio * scale) as i64).max((min * scale) as i64)
}

impl HudLayout {
    /// Geometry for an overlay rendered at `render_size`, itself `hud_scale` times native.
    pub fn compute(render_size: FrameSize, hud_scale: f64, cfg: &LayoutConfig) -> Self {
        let ws = cfg.widget_scale.clamp(0.4, 1.2);
        let (w, h) = (render_size.width, render_size.height);
        Self {
            render_size,
            widget_scale: ws,
            panel_w: scaled_floor(w, cfg.widget_width_ratio, cfg.widget_min_width, ws),
            panel_h: scaled_floor(h, cfg.widget_height_ratio, cfg.widget_min_height, ws),
            padding: scaled_floor(w, cfg.padding_ratio, cfg.padding_min, ws),
            gap: scaled_floor(h, cfg.gap_ratio, cfg.gap_min, ws),
            box_size: scaled_floor(
                render_size.min_side(),
                cfg.box_size_ratio,
                cfg.box_size_min,
                ws,
            ),
            bar_w: (f64::from(w) * cfg.progress_bar_width_ratio * ws) as i64,
            bar_h: cfg.progress_bar_height as i64,
            vshift: (f64::from(h) * cfg.vertical_shift_ratio) as i64,
            top_offset: (cfg.top_offset_px * hud_scale) as i64,
            hud_scale,
        }
    }

    fn width(&self) -> i64 {
        i64::from(self.render_size.width)
    }

    fn height(&self) -> i64 {
        i64::from(self.render_size.height)
    }

    /// Top edge of the first row in both side columns.
    pub fn column_top(&self) -> i64 {
        self.padding + self.vshift + self.top_offset
    }

    fn row_y(&self, row: usize) -> i64 {
        self.column_top() + (self.panel_h + self.gap) * row as i64
    }

    /// Panel rectangle for `row` of the left column.
    pub fn left_slot(&self, row: usize) -> Rect {
        rect(self.padding, self.row_y(row), self.panel_w, self.panel_h)
    }

    /// Panel rectangle for `row` of the right column.
    pub fn right_slot(&self, row: usize) -> Rect {
        let x = self.width() - self.padding - self.panel_w;
        rect(x, self.row_y(row), self.panel_w, self.panel_h)
    }

    fn bottom_y(&self) -> i64 {
        let header = (40.0 * self.widget_scale) as i64;
        self.height() - self.padding - self.box_size - header + self.vshift
    }

    /// Elevation profile box, bottom left; up to 1.5x wider than tall when space allows.
    pub fn profile_rect(&self) -> Rect {
        let desired = (self.box_size as f64 * 1.5) as i64;
        let available = self.box_size.max(
            self.width() - 3 * self.padding - self.box_size - (20.0 * self.widget_scale) as i64,
        );
        rect(
            self.padding,
            self.bottom_y(),
            desired.min(available),
            self.box_size,
        )
    }

    /// Route map box, bottom right.
    pub fn map_rect(&self) -> Rect {
        let x = self.width() - self.padding - self.box_size;
        rect(x, self.bottom_y(), self.box_size, self.box_size)
    }

    /// Progress bar track, bottom center.
    pub fn progress_rect(&self) -> Rect {
        let x = (self.width() - self.bar_w).div_euclid(2);
        let y = self.height() - (35.0 * self.hud_scale) as i64 + self.vshift;
        rect(x, y, self.bar_w, self.bar_h)
    }
}

fn rect(x: i64, y: i64, w: i64, h: i64) -> Rect {
    Rect::new(x as f64, y as f64, (x + w) as f64, (y + h) as f64)
}

/// Enabled left-column panels in display order.
pub fn left_column(widgets: &WidgetToggles) -> Vec<PanelKind> {
    [
        (widgets.altitude, PanelKind::Altitude),
        (widgets.distance, PanelKind::Distance),
        (widgets.gradient, PanelKind::Gradient),
    ]
    .into_iter()
    .filter_map(|(on, k)| on.then_some(k))
    .take(LEFT_ROWS)
    .collect()
}

/// Enabled right-column panels that have a value in `snap`, in display order.
///
/// Absent heart rate or cadence is dropped before rows are assigned, so later panels move
/// up instead of leaving a hole.
pub fn right_column(widgets: &WidgetToggles, snap: &Snapshot) -> Vec<PanelKind> {
    [
        (widgets.speed, PanelKind::Speed),
        (
            widgets.heart_rate && snap.heart_rate.is_some(),
            PanelKind::HeartRate,
        ),
        (widgets.power, PanelKind::Power),
        (
            widgets.cadence && snap.cadence.is_some(),
            PanelKind::Cadence,
        ),
    ]
    .into_iter()
    .filter_map(|(on, k)| on.then_some(k))
    .take(RIGHT_ROWS)
    .collect()
}

/// Every side panel with its rectangle.
pub fn place_panels(
    layout: &HudLayout,
    widgets: &WidgetToggles,
    snap: &Snapshot,
) -> Vec<(PanelKind, Rect)> {
    let left = left_column(widgets)
        .into_iter()
        .enumerate()
        .map(|(row, k)| (k, layout.left_slot(row)));
    let right = right_column(widgets, snap)
        .into_iter()
        .enumerate()
        .map(|(row, k)| (k, layout.right_slot(row)));
    left.chain(right).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/hud/layout.rs"]
mod tests;

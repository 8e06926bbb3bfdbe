use std::sync::Arc;

use crate::config::{HudConfig, PowerConfig};
use crate::foundation::error::{HudError, HudResult};
use crate::foundation::math::lerp;
use crate::telemetry::power::{PowerSmoother, instantaneous_power};
use crate::telemetry::snapshot::Snapshot;
use crate::track::store::{Track, Waypoint};

/// Segments shorter than this (meters) report zero grade.
const MIN_GRADE_DISTANCE_M: f64 = 5.0;

/// Elevation extent of a waypoint window around a position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElevationWindow {
    /// First waypoint index (inclusive).
    pub start: usize,
    /// Last waypoint index (exclusive).
    pub end: usize,
    /// Lowest elevation in the window, or 0 when empty.
    pub min_m: f64,
    /// Highest elevation in the window, or 0 when empty.
    pub max_m: f64,
}

impl ElevationWindow {
    /// Window of `range` waypoints centered on `index`, clipped to the track.
    pub fn around(track: &Track, index: usize, range: usize) -> Self {
        let pts = track.points();
        let half = range / 2;
        let start = index.saturating_sub(half);
        let end = index.saturating_add(half).min(pts.len());
        if start >= end {
            return Self {
                start,
                end: start,
                min_m: 0.0,
                max_m: 0.0,
            };
        }
        let (min_m, max_m) = pts[start..end]
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.elevation), hi.max(p.elevation))
            });
        Self {
            start,
            end,
            min_m,
            max_m,
        }
    }

    /// Number of waypoints in the window.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the window holds no waypoints.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Maps video time to telemetry snapshots over one shared [`Track`].
///
/// Each instance owns its own power history, so frames must be queried in order on one
/// instance for the smoothing to be meaningful. Parallel renderers create one per worker.
#[derive(Clone, Debug)]
pub struct Interpolator {
    track: Arc<Track>,
    time_offset_s: f64,
    rider_mass_kg: f64,
    bike_mass_kg: f64,
    power: PowerConfig,
    smoother: PowerSmoother,
}

impl Interpolator {
    /// Engine over `track` with rider, power and time-offset settings from `cfg`.
    ///
    /// Fails when `cfg` does not pass [`HudConfig::validate`].
    pub fn new(track: Arc<Track>, cfg: &HudConfig) -> HudResult<Self> {
        cfg.validate()?;
        Ok(Self {
            track,
            time_offset_s: cfg.time_offset_s,
            rider_mass_kg: cfg.rider.rider_mass_kg,
            bike_mass_kg: cfg.rider.bike_mass_kg,
            power: cfg.power.clone(),
            smoother: PowerSmoother::new(&cfg.power),
        })
    }

    /// The shared track.
    pub fn track(&self) -> &Arc<Track> {
        &self.track
    }

    /// Power samples currently in the smoothing window, oldest first.
    pub fn power_history(&self) -> impl Iterator<Item = f64> + '_ {
        self.smoother.history()
    }

    /// Snapshot for `query_time_s` seconds of video.
    ///
    /// Outside the track's time span the first or last waypoint is returned at rest without
    /// touching the power history. Inside it, every call appends one sample to the history.
    pub fn snapshot_at(&mut self, query_time_s: f64) -> HudResult<Snapshot> {
        let track = Arc::clone(&self.track);
        let pts = track.points();
        let target = track.start_time_s() + query_time_s + self.time_offset_s;
        if !target.is_finite() {
            return Err(HudError::DegenerateSegment { target_s: target });
        }

        if target <= track.first().time_s {
            return Ok(Snapshot::at_rest(track.first(), 0, 0.0));
        }
        if target >= track.last().time_s {
            return Ok(Snapshot::at_rest(track.last(), pts.len() - 1, 100.0));
        }

        let i = bracket(pts, target).ok_or(HudError::DegenerateSegment { target_s: target })?;
        let (p1, p2) = (&pts[i], &pts[i + 1]);
        let dt = p2.time_s - p1.time_s;
        let ratio = (target - p1.time_s) / dt;

        let seg = p2.segment_distance_m;
        let speed_kmh = seg / dt * 3.6;
        let grade_percent = if seg > MIN_GRADE_DISTANCE_M {
            (p2.elevation - p1.elevation) / seg * 100.0
        } else {
            0.0
        };
        let cumulative_distance_m = p1.cumulative_distance_m + seg * ratio;
        let total = track.total_distance_m();
        let progress_percent = if total > 0.0 {
            cumulative_distance_m / total * 100.0
        } else {
            0.0
        };

        let raw = instantaneous_power(
            speed_kmh,
            grade_percent,
            self.rider_mass_kg,
            self.bike_mass_kg,
            &self.power,
        );
        let power_watts = self.smoother.smooth(raw);

        Ok(Snapshot {
            lat: lerp(p1.lat, p2.lat, ratio),
            lon: lerp(p1.lon, p2.lon, ratio),
            elevation: lerp(p1.elevation, p2.elevation, ratio),
            heart_rate: blend_optional(p1.heart_rate, p2.heart_rate, ratio),
            cadence: blend_optional(p1.cadence, p2.cadence, ratio),
            speed_kmh,
            grade_percent,
            power_watts,
            cumulative_distance_m,
            progress_percent,
            source_index: i,
            heading_degrees: track.heading_at(i),
        })
    }

    /// Waypoints `[index - range/2, index + range/2)` clipped to the track, with their
    /// elevation extent.
    pub fn elevation_window(&self, index: usize, range: usize) -> ElevationWindow {
        ElevationWindow::around(&self.track, index, range)
    }
}

/// Index `i` of the first pair with `t[i] <= target <= t[i + 1]` and positive duration.
fn bracket(pts: &[Waypoint], target: f64) -> Option<usize> {
    let j = pts.partition_point(|p| p.time_s < target);
    if j >= 1 && j < pts.len() && pts[j].time_s > pts[j - 1].time_s {
        return Some(j - 1);
    }
    // Zero-duration pair at the bracket: scan forward for the next usable one.
    let from = j.saturating_sub(1);
    (from..pts.len().saturating_sub(1)).find(|&k| {
        let (a, b) = (pts[k].time_s, pts[k + 1].time_s);
        a <= target && target <= b && b > a
    })
}

fn blend_optional(a: Option<u16>, b: Option<u16>, ratio: f64) -> Option<u16> {
    match (a, b) {
        (Some(a), Some(b)) => {
            let v = lerp(f64::from(a), f64::from(b), ratio).round();
            Some(v.clamp(0.0, f64::from(u16::MAX)) as u16)
        }
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/telemetry/engine.rs"]
mod tests;

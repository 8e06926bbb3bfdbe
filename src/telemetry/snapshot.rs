use crate::track::store::Waypoint;

/// Derived metrics for one instant of the ride.
///
/// Produced fresh by [`Interpolator::snapshot_at`](crate::Interpolator::snapshot_at) and
/// never mutated.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Snapshot {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Elevation in meters.
    pub elevation: f64,
    /// Heart rate in bpm, absent when neither bracketing waypoint has one.
    pub heart_rate: Option<u16>,
    /// Cadence in rpm, absent when neither bracketing waypoint has one.
    pub cadence: Option<u16>,
    /// Ground speed in km/h.
    pub speed_kmh: f64,
    /// Grade in percent.
    pub grade_percent: f64,
    /// Smoothed power estimate in watts.
    pub power_watts: f64,
    /// Distance along the route in meters.
    pub cumulative_distance_m: f64,
    /// Route completion, 0 to 100.
    pub progress_percent: f64,
    /// Index of the waypoint at or before this instant.
    pub source_index: usize,
    /// Direction of travel in degrees.
    pub heading_degrees: f64,
}

impl Snapshot {
    /// Static copy of a waypoint with every motion-derived metric zeroed.
    pub(crate) fn at_rest(p: &Waypoint, index: usize, progress_percent: f64) -> Self {
        Self {
            lat: p.lat,
            lon: p.lon,
            elevation: p.elevation,
            heart_rate: p.heart_rate,
            cadence: p.cadence,
            speed_kmh: 0.0,
            grade_percent: 0.0,
            power_watts: 0.0,
            cumulative_distance_m: p.cumulative_distance_m,
            progress_percent,
            source_index: index,
            heading_degrees: 0.0,
        }
    }
}

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use geo::{Distance, Geodesic, Point};

use crate::foundation::error::{HudError, HudResult};

/// One timestamped GPS sample with derived distances.
///
/// Distances are computed once when the [`Track`] is built and never recomputed per query.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Waypoint {
    /// Absolute time in seconds (Unix epoch for RFC 3339 sources).
    pub time_s: f64,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Elevation in meters.
    pub elevation: f64,
    /// Heart rate in bpm, when recorded.
    pub heart_rate: Option<u16>,
    /// Cadence in rpm, when recorded.
    pub cadence: Option<u16>,
    /// Distance from the first waypoint along the route, in meters.
    pub cumulative_distance_m: f64,
    /// Distance from the previous waypoint, in meters. Zero for the first waypoint.
    pub segment_distance_m: f64,
}

/// Timestamp of a [`TrackRecord`]: either plain seconds or an RFC 3339 string.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum RecordTime {
    /// Seconds on any monotonic axis.
    Seconds(f64),
    /// RFC 3339 / ISO 8601 date-time with offset, e.g. `2024-05-01T08:30:00Z`.
    Rfc3339(String),
}

impl RecordTime {
    fn to_seconds(&self) -> HudResult<f64> {
        match self {
            Self::Seconds(s) if s.is_finite() => Ok(*s),
            Self::Seconds(s) => Err(HudError::malformed(format!("non-finite record time {s}"))),
            Self::Rfc3339(raw) => {
                let dt = chrono::DateTime::parse_from_rfc3339(raw.trim())
                    .map_err(|e| HudError::malformed(format!("bad timestamp '{raw}': {e}")))?;
                let micros = dt.timestamp_micros();
                Ok(micros as f64 / 1_000_000.0)
            }
        }
    }
}

impl From<f64> for RecordTime {
    fn from(s: f64) -> Self {
        Self::Seconds(s)
    }
}

/// One raw sample as handed over by a track parser, before distances are known.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackRecord {
    /// Sample time.
    pub time: RecordTime,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Elevation in meters; missing means sea level.
    #[serde(default, alias = "ele")]
    pub elevation: Option<f64>,
    /// Heart rate in bpm.
    #[serde(default, alias = "hr")]
    pub heart_rate: Option<u16>,
    /// Cadence in rpm.
    #[serde(default, alias = "cad")]
    pub cadence: Option<u16>,
}

impl TrackRecord {
    /// Minimal record with position and time only.
    pub fn new(time: impl Into<RecordTime>, lat: f64, lon: f64) -> Self {
        Self {
            time: time.into(),
            lat,
            lon,
            elevation: None,
            heart_rate: None,
            cadence: None,
        }
    }

    /// Set the elevation.
    pub fn with_elevation(mut self, m: f64) -> Self {
        self.elevation = Some(m);
        self
    }

    /// Set the heart rate.
    pub fn with_heart_rate(mut self, bpm: u16) -> Self {
        self.heart_rate = Some(bpm);
        self
    }

    /// Set the cadence.
    pub fn with_cadence(mut self, rpm: u16) -> Self {
        self.cadence = Some(rpm);
        self
    }
}

/// Geodesic (WGS84 ellipsoid) distance between two `(lat, lon)` pairs, in meters.
pub fn geodesic_distance_m(a: (f64, f64), b: (f64, f64)) -> f64 {
    Geodesic::distance(Point::new(a.1, a.0), Point::new(b.1, b.0))
}

/// Ordered, read-only sequence of waypoints.
///
/// Invariants: at least one waypoint, times non-decreasing, cumulative distance
/// non-decreasing, first segment distance zero.
#[derive(Clone, Debug)]
pub struct Track {
    points: Vec<Waypoint>,
}

impl Track {
    /// Build a track from raw records using geodesic segment distances.
    #[tracing::instrument(skip(records), fields(n = records.len()))]
    pub fn from_records(records: Vec<TrackRecord>) -> HudResult<Self> {
        Self::from_records_with(records, geodesic_distance_m)
    }

    /// Build a track with a caller-supplied `(lat, lon)` distance function.
    ///
    /// The function is called exactly once per consecutive pair.
    pub fn from_records_with<F>(records: Vec<TrackRecord>, mut distance: F) -> HudResult<Self>
    where
        F: FnMut((f64, f64), (f64, f64)) -> f64,
    {
        if records.is_empty() {
            return Err(HudError::EmptyTrack);
        }

        let mut points: Vec<Waypoint> = Vec::with_capacity(records.len());
        let mut total = 0.0;
        for (i, rec) in records.into_iter().enumerate() {
            let time_s = rec.time.to_seconds()?;
            check_coordinate(i, rec.lat, rec.lon)?;
            let elevation = rec.elevation.unwrap_or(0.0);
            if !elevation.is_finite() {
                return Err(HudError::malformed(format!(
                    "record {i}: non-finite elevation"
                )));
            }

            let segment = match points.last() {
                Some(prev) => {
                    if time_s < prev.time_s {
                        return Err(HudError::malformed(format!(
                            "record {i}: time {time_s} precedes previous time {}",
                            prev.time_s
                        )));
                    }
                    let d = distance((prev.lat, prev.lon), (rec.lat, rec.lon));
                    if !d.is_finite() || d < 0.0 {
                        return Err(HudError::malformed(format!(
                            "record {i}: invalid segment distance {d}"
                        )));
                    }
                    d
                }
                None => 0.0,
            };
            total += segment;

            points.push(Waypoint {
                time_s,
                lat: rec.lat,
                lon: rec.lon,
                elevation,
                heart_rate: rec.heart_rate,
                cadence: rec.cadence,
                cumulative_distance_m: total,
                segment_distance_m: segment,
            });
        }

        tracing::debug!(waypoints = points.len(), total_m = total, "track loaded");
        Ok(Self { points })
    }

    /// Parse a JSON array of [`TrackRecord`]s.
    pub fn from_reader<R: std::io::Read>(r: R) -> HudResult<Self> {
        let records: Vec<TrackRecord> = serde_json::from_reader(r)
            .map_err(|e| HudError::malformed(format!("parse track JSON: {e}")))?;
        Self::from_records(records)
    }

    /// Load a JSON track file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> HudResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            HudError::malformed(format!("open track '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// All waypoints in time order.
    pub fn points(&self) -> &[Waypoint] {
        &self.points
    }

    /// Number of waypoints (always at least one).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; an empty track cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Waypoint at `i`, if any.
    pub fn get(&self, i: usize) -> Option<&Waypoint> {
        self.points.get(i)
    }

    /// First waypoint.
    pub fn first(&self) -> &Waypoint {
        &self.points[0]
    }

    /// Last waypoint.
    pub fn last(&self) -> &Waypoint {
        &self.points[self.points.len() - 1]
    }

    /// Time of the first waypoint.
    pub fn start_time_s(&self) -> f64 {
        self.first().time_s
    }

    /// Time span from first to last waypoint.
    pub fn duration_s(&self) -> f64 {
        self.last().time_s - self.first().time_s
    }

    /// Total route length in meters.
    pub fn total_distance_m(&self) -> f64 {
        self.last().cumulative_distance_m
    }

    /// Direction of travel around waypoint `i` in degrees, from its neighbours.
    ///
    /// `atan2(dlon, dlat)` of `points[i + 1] - points[i - 1]`; zero at either end.
    pub fn heading_at(&self, i: usize) -> f64 {
        if i == 0 || i + 1 >= self.points.len() {
            return 0.0;
        }
        let a = &self.points[i - 1];
        let b = &self.points[i + 1];
        (b.lon - a.lon).atan2(b.lat - a.lat).to_degrees()
    }
}

fn check_coordinate(i: usize, lat: f64, lon: f64) -> HudResult<()> {
    if !(lat.is_finite() && (-90.0..=90.0).contains(&lat)) {
        return Err(HudError::malformed(format!(
            "record {i}: latitude {lat} out of range"
        )));
    }
    if !(lon.is_finite() && (-180.0..=180.0).contains(&lon)) {
        return Err(HudError::malformed(format!(
            "record {i}: longitude {lon} out of range"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/track/store.rs"]
mod tests;

use crate::config::UnitSystem;

/// Physical quantities that the HUD displays with a unit label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// Cumulative distance, stored in meters.
    Distance,
    /// Elevation, stored in meters.
    Altitude,
    /// Speed, stored in km/h.
    Speed,
    /// Grade, stored in percent.
    Gradient,
    /// Cadence, stored in rpm.
    Cadence,
    /// Power, stored in watts.
    Power,
}

/// Conversion factor and label for one quantity in one unit system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSpec {
    /// Multiplier applied to the stored value after base normalization.
    pub factor: f64,
    /// Short label drawn next to the value.
    pub label: &'static str,
}

const KM_TO_MI: f64 = 0.621_371;
const M_TO_FT: f64 = 3.280_84;

impl UnitSystem {
    /// Lookup table entry for `q`.
    pub fn spec(self, q: Quantity) -> UnitSpec {
        use Quantity::*;
        use UnitSystem::*;
        let (factor, label) = match (self, q) {
            (Metric, Distance) => (1.0, "km"),
            (Imperial, Distance) => (KM_TO_MI, "mi"),
            (Metric, Altitude) => (1.0, "m"),
            (Imperial, Altitude) => (M_TO_FT, "ft"),
            (Metric, Speed) => (1.0, "km/h"),
            (Imperial, Speed) => (KM_TO_MI, "mph"),
            (_, Gradient) => (1.0, "%"),
            (_, Cadence) => (1.0, "rpm"),
            (_, Power) => (1.0, "W"),
        };
        UnitSpec { factor, label }
    }

    /// Convert a stored value into display units. Distances are stored in meters
    /// and shown in kilometers or miles.
    pub fn convert(self, q: Quantity, stored: f64) -> f64 {
        let base = match q {
            Quantity::Distance => stored / 1000.0,
            _ => stored,
        };
        base * self.spec(q).factor
    }

    /// Display text for an optional stored value: altitude as a truncated integer,
    /// everything else with one decimal, `--` when absent.
    pub fn format(self, q: Quantity, stored: Option<f64>) -> String {
        let Some(v) = stored.filter(|v| v.is_finite()) else {
            return "--".to_owned();
        };
        let shown = self.convert(q, v);
        match q {
            Quantity::Altitude => format!("{}", shown.trunc() as i64),
            _ => format!("{shown:.1}"),
        }
    }
}

/// `MM:SS` rendering of elapsed seconds. Negative input is shown as zero.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

use std::collections::VecDeque;

use crate::config::PowerConfig;

const GRAVITY: f64 = 9.81;

/// Estimated pedal power in watts for steady riding at `speed_kmh` on `grade_percent`.
///
/// Sums gravity, rolling and aerodynamic resistance, multiplies by ground speed and divides
/// by drivetrain efficiency. Never negative; zero when not moving.
pub fn instantaneous_power(
    speed_kmh: f64,
    grade_percent: f64,
    rider_mass_kg: f64,
    bike_mass_kg: f64,
    cfg: &PowerConfig,
) -> f64 {
    if speed_kmh.is_nan() || speed_kmh <= 0.0 {
        return 0.0;
    }
    let speed_ms = speed_kmh / 3.6;
    let mass = rider_mass_kg + bike_mass_kg;
    let slope = (grade_percent / 100.0).atan();

    let gravity = mass * GRAVITY * slope.sin();
    let rolling = mass * GRAVITY * slope.cos() * cfg.rolling_coefficient;
    let air = speed_ms + cfg.wind_speed_ms;
    let aero = 0.5 * cfg.air_density * cfg.drag_area * air * air;

    let wheel = (gravity + rolling + aero) * speed_ms;
    (wheel / cfg.drivetrain_efficiency).max(0.0)
}

/// Moving-average filter over the most recent clamped power samples.
#[derive(Clone, Debug)]
pub struct PowerSmoother {
    history: VecDeque<f64>,
    window: usize,
    min: f64,
    max: f64,
}

impl PowerSmoother {
    /// New filter with window and clamps taken from `cfg`. A zero window behaves as one.
    pub fn new(cfg: &PowerConfig) -> Self {
        let window = cfg.smoothing_window.max(1);
        Self {
            history: VecDeque::with_capacity(window),
            window,
            min: cfg.min_power,
            max: cfg.max_power,
        }
    }

    /// Clamp `raw`, append it, drop samples beyond the window and return the mean.
    pub fn smooth(&mut self, raw: f64) -> f64 {
        let v = if raw.is_nan() {
            self.min
        } else {
            raw.clamp(self.min, self.max)
        };
        self.history.push_back(v);
        while self.history.len() > self.window {
            self.history.pop_front();
        }
        self.history.iter().sum::<f64>() / self.history.len() as f64
    }

    /// Samples currently in the window, oldest first.
    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied()
    }

    /// Forget all samples.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/telemetry/power.rs"]
mod tests;

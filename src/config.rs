use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::core::Rgb8;
use crate::foundation::error::{HudError, HudResult};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Immutable configuration bundle for the interpolation engine and the HUD compositor.
///
/// Loaded once at startup (see [`HudConfig::from_path`]) and validated with
/// [`HudConfig::validate`] before any frame is rendered. Components receive it by reference
/// and never mutate it.
pub struct HudConfig {
    /// Seconds added to every video query time before looking up the track.
    pub time_offset_s: f64,
    /// Rider description used by the power model and heart-rate zones.
    pub rider: RiderConfig,
    /// Physics and smoothing parameters of the power estimate.
    pub power: PowerConfig,
    /// Per-widget enable flags.
    pub widgets: WidgetToggles,
    /// Display unit system.
    pub units: UnitSystem,
    /// Layout ratios and pixel floors.
    pub layout: LayoutConfig,
    /// Alpha, warp, downscale and caching parameters.
    pub effects: EffectsConfig,
    /// Colors and panel opacities.
    pub style: StyleConfig,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Rider and bike description.
pub struct RiderConfig {
    /// Rider mass in kilograms.
    pub rider_mass_kg: f64,
    /// Bike mass in kilograms.
    pub bike_mass_kg: f64,
    /// Rider age in years; maximum heart rate is estimated as `220 - age`.
    pub age: u32,
}

impl Default for RiderConfig {
    fn default() -> Self {
        Self {
            rider_mass_kg: 75.0,
            bike_mass_kg: 10.0,
            age: 35,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Coefficients for the instantaneous power model and its moving-average filter.
pub struct PowerConfig {
    /// Drag area `CdA` in square meters.
    pub drag_area: f64,
    /// Rolling resistance coefficient `Crr`.
    pub rolling_coefficient: f64,
    /// Fraction of pedal power reaching the wheel, in `(0, 1]`.
    pub drivetrain_efficiency: f64,
    /// Air density in kg/m^3.
    pub air_density: f64,
    /// Head-wind speed in m/s (added to ground speed for drag).
    pub wind_speed_ms: f64,
    /// Number of samples in the moving average.
    pub smoothing_window: usize,
    /// Lower clamp applied before smoothing (watts).
    pub min_power: f64,
    /// Upper clamp applied before smoothing (watts).
    pub max_power: f64,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            drag_area: 0.35,
            rolling_coefficient: 0.004,
            drivetrain_efficiency: 0.97,
            air_density: 1.225,
            wind_speed_ms: 0.0,
            smoothing_window: 5,
            min_power: 0.0,
            max_power: 1500.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Which widgets the HUD draws.
pub struct WidgetToggles {
    /// Altitude panel (left column).
    pub altitude: bool,
    /// Cumulative distance panel (left column).
    pub distance: bool,
    /// Grade panel (left column).
    pub gradient: bool,
    /// Speed panel (right column).
    pub speed: bool,
    /// Heart-rate panel with zone indicator (right column).
    pub heart_rate: bool,
    /// Power panel (right column).
    pub power: bool,
    /// Cadence panel (right column).
    pub cadence: bool,
    /// Elevation profile box (bottom left).
    pub elevation_profile: bool,
    /// Rotating route map box (bottom right).
    pub route_map: bool,
    /// Progress bar (bottom center).
    pub progress_bar: bool,
}

impl Default for WidgetToggles {
    fn default() -> Self {
        Self {
            altitude: true,
            distance: true,
            gradient: true,
            speed: true,
            heart_rate: true,
            power: true,
            cadence: true,
            elevation_profile: true,
            route_map: true,
            progress_bar: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Display unit system.
pub enum UnitSystem {
    /// Kilometers, meters, km/h.
    #[default]
    Metric,
    /// Miles, feet, mph.
    Imperial,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Widget geometry as ratios of the (downscaled) overlay size with pixel floors.
pub struct LayoutConfig {
    /// Panel width as a fraction of overlay width.
    pub widget_width_ratio: f64,
    /// Panel height as a fraction of overlay height.
    pub widget_height_ratio: f64,
    /// Minimum panel width in pixels.
    pub widget_min_width: f64,
    /// Minimum panel height in pixels.
    pub widget_min_height: f64,
    /// Bottom box side as a fraction of the smaller overlay side.
    pub box_size_ratio: f64,
    /// Minimum bottom box side in pixels.
    pub box_size_min: f64,
    /// Edge padding as a fraction of overlay width.
    pub padding_ratio: f64,
    /// Minimum edge padding in pixels.
    pub padding_min: f64,
    /// Row gap as a fraction of overlay height.
    pub gap_ratio: f64,
    /// Minimum row gap in pixels.
    pub gap_min: f64,
    /// Global widget scale, clamped to `[0.4, 1.2]`.
    pub widget_scale: f64,
    /// Vertical shift of all widgets as a fraction of overlay height (positive is down).
    pub vertical_shift_ratio: f64,
    /// Extra top offset for the side columns, in native-resolution pixels.
    pub top_offset_px: f64,
    /// Progress bar width as a fraction of overlay width.
    pub progress_bar_width_ratio: f64,
    /// Progress bar height in pixels.
    pub progress_bar_height: f64,
    /// Waypoints shown around the current position in the elevation profile.
    pub profile_display_range: usize,
    /// Minimum number of waypoints required to draw the profile.
    pub profile_min_points: usize,
    /// Vertical amplitude factor of the profile around its mid line.
    pub profile_vertical_scale: f64,
    /// Waypoints shown before and after the current position on the route map.
    pub map_display_range: usize,
    /// Degrees-to-pixels zoom of the route map.
    pub map_zoom: f64,
    /// Icon size as a fraction of the panel icon box.
    pub icon_size_ratio: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            widget_width_ratio: 0.16,
            widget_height_ratio: 0.08,
            widget_min_width: 160.0,
            widget_min_height: 44.0,
            box_size_ratio: 0.28,
            box_size_min: 160.0,
            padding_ratio: 0.03,
            padding_min: 8.0,
            gap_ratio: 0.01,
            gap_min: 6.0,
            widget_scale: 0.8,
            vertical_shift_ratio: -0.02,
            top_offset_px: 55.0,
            progress_bar_width_ratio: 0.35,
            progress_bar_height: 6.0,
            profile_display_range: 200,
            profile_min_points: 10,
            profile_vertical_scale: 0.6,
            map_display_range: 200,
            map_zoom: 80_000.0,
            icon_size_ratio: 1.0 / 3.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Compositing parameters: alpha classification, radial fade, warp, downscale and caches.
pub struct EffectsConfig {
    /// Parabolic warp strength `k`; `0` disables the warp.
    pub curve_strength: f64,
    /// How strongly panel backgrounds fade toward the overlay center.
    pub fade_strength: f64,
    /// Luminance below which a drawn pixel counts as panel background.
    pub bg_luminance_threshold: f32,
    /// Render scale relative to native resolution, clamped to `[0.25, 1.0]`.
    pub downscale: f64,
    /// Maximum overlay recompute rate; `None` recomputes every frame.
    pub update_rate_hz: Option<f64>,
    /// Disable the warp and the bottom widgets.
    pub fast_mode: bool,
    /// Warp only the bounding box of drawn content.
    pub roi_remap: bool,
    /// Capacity of the distance-field cache.
    pub grid_cache_capacity: usize,
    /// Capacity of the warp-map cache.
    pub warp_cache_capacity: usize,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            curve_strength: 0.03,
            fade_strength: 0.9,
            bg_luminance_threshold: 90.0,
            downscale: 0.9,
            update_rate_hz: Some(15.0),
            fast_mode: false,
            roi_remap: true,
            grid_cache_capacity: 4,
            warp_cache_capacity: 4,
        }
    }
}

impl EffectsConfig {
    /// Downscale factor clamped into its supported range.
    pub fn effective_downscale(&self) -> f64 {
        self.downscale.clamp(0.25, 1.0)
    }

    /// Whether the spatial warp runs at all.
    pub fn warp_enabled(&self) -> bool {
        !self.fast_mode && self.curve_strength > 0.0
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Palette and panel opacities.
pub struct StyleConfig {
    /// Draw glass panel backgrounds behind widgets.
    pub panel_background: bool,
    /// Opacity of small panel backgrounds.
    pub panel_bg_alpha: f64,
    /// Opacity of the large bottom boxes.
    pub panel_bg_alpha_large: f64,
    /// Panel background color.
    pub glass: Rgb8,
    /// Main text color.
    pub text_main: Rgb8,
    /// Secondary text color (units, labels).
    pub text_sub: Rgb8,
    /// Accent color (progress, markers).
    pub accent: Rgb8,
    /// Altitude icon color.
    pub altitude: Rgb8,
    /// Distance icon color.
    pub distance: Rgb8,
    /// Speed icon color.
    pub speed: Rgb8,
    /// Cadence icon color.
    pub cadence: Rgb8,
    /// Power icon color.
    pub power: Rgb8,
    /// Route already ridden.
    pub map_path: Rgb8,
    /// Route ahead.
    pub map_path_front: Rgb8,
    /// Low-grade profile color (< 3 %).
    pub ele_low: Rgb8,
    /// Mid-grade profile color (8 %).
    pub ele_mid: Rgb8,
    /// Steep profile color (>= 15 %).
    pub ele_high: Rgb8,
    /// Heart-rate zone colors, zone 1 first.
    pub zones: [Rgb8; 5],
    /// Inactive zone-bar segment color.
    pub zone_inactive: Rgb8,
    /// Profile area fill color.
    pub profile_fill: Rgb8,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            panel_background: true,
            panel_bg_alpha: 0.7,
            panel_bg_alpha_large: 0.75,
            glass: Rgb8::gray(30),
            text_main: Rgb8::gray(255),
            text_sub: Rgb8::gray(160),
            accent: Rgb8::new(255, 200, 0),
            altitude: Rgb8::new(255, 180, 100),
            distance: Rgb8::new(50, 180, 255),
            speed: Rgb8::new(80, 255, 80),
            cadence: Rgb8::new(100, 150, 255),
            power: Rgb8::new(255, 0, 255),
            map_path: Rgb8::gray(120),
            map_path_front: Rgb8::gray(200),
            ele_low: Rgb8::new(80, 200, 80),
            ele_mid: Rgb8::new(255, 220, 80),
            ele_high: Rgb8::new(255, 80, 80),
            zones: [
                Rgb8::new(100, 150, 200),
                Rgb8::new(100, 200, 100),
                Rgb8::new(220, 220, 50),
                Rgb8::new(255, 150, 50),
                Rgb8::new(255, 50, 50),
            ],
            zone_inactive: Rgb8::gray(60),
            profile_fill: Rgb8::gray(40),
        }
    }
}

impl StyleConfig {
    /// Base alpha for background-classified pixels before the radial fade.
    pub fn base_bg_alpha(&self) -> f64 {
        self.panel_bg_alpha.max(self.panel_bg_alpha_large)
    }
}

impl HudConfig {
    /// Parse a configuration from a JSON reader. Missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> HudResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| HudError::invalid_config(format!("parse config JSON: {e}")))
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> HudResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            HudError::invalid_config(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Fail fast on values no component can work with.
    pub fn validate(&self) -> HudResult<()> {
        finite_at_least("time_offset_s", self.time_offset_s, 0.0)?;

        positive("rider.rider_mass_kg", self.rider.rider_mass_kg)?;
        positive("rider.bike_mass_kg", self.rider.bike_mass_kg)?;
        if self.rider.age >= 220 {
            return Err(HudError::invalid_config(format!(
                "rider.age must be < 220, got {}",
                self.rider.age
            )));
        }

        let p = &self.power;
        finite_at_least("power.drag_area", p.drag_area, 0.0)?;
        finite_at_least("power.rolling_coefficient", p.rolling_coefficient, 0.0)?;
        finite_at_least("power.air_density", p.air_density, 0.0)?;
        if !p.wind_speed_ms.is_finite() {
            return Err(HudError::invalid_config(
                "power.wind_speed_ms must be finite",
            ));
        }
        if !(p.drivetrain_efficiency > 0.0 && p.drivetrain_efficiency <= 1.0) {
            return Err(HudError::invalid_config(format!(
                "power.drivetrain_efficiency must be in (0, 1], got {}",
                p.drivetrain_efficiency
            )));
        }
        if p.smoothing_window == 0 {
            return Err(HudError::invalid_config(
                "power.smoothing_window must be >= 1",
            ));
        }
        if !(p.min_power.is_finite() && p.max_power.is_finite() && p.min_power <= p.max_power) {
            return Err(HudError::invalid_config(format!(
                "power clamps must satisfy min_power <= max_power, got [{}, {}]",
                p.min_power, p.max_power
            )));
        }

        let l = &self.layout;
        for (name, v) in [
            ("layout.widget_width_ratio", l.widget_width_ratio),
            ("layout.widget_height_ratio", l.widget_height_ratio),
            ("layout.box_size_ratio", l.box_size_ratio),
            ("layout.padding_ratio", l.padding_ratio),
            ("layout.gap_ratio", l.gap_ratio),
            ("layout.widget_min_width", l.widget_min_width),
            ("layout.widget_min_height", l.widget_min_height),
            ("layout.box_size_min", l.box_size_min),
            ("layout.padding_min", l.padding_min),
            ("layout.gap_min", l.gap_min),
            (
                "layout.progress_bar_width_ratio",
                l.progress_bar_width_ratio,
            ),
            ("layout.progress_bar_height", l.progress_bar_height),
            ("layout.top_offset_px", l.top_offset_px),
            ("layout.map_zoom", l.map_zoom),
            ("layout.icon_size_ratio", l.icon_size_ratio),
        ] {
            finite_at_least(name, v, 0.0)?;
        }
        positive("layout.widget_scale", l.widget_scale)?;
        positive("layout.profile_vertical_scale", l.profile_vertical_scale)?;
        if !l.vertical_shift_ratio.is_finite() {
            return Err(HudError::invalid_config(
                "layout.vertical_shift_ratio must be finite",
            ));
        }

        let e = &self.effects;
        unit_interval("effects.curve_strength", e.curve_strength)?;
        finite_at_least("effects.fade_strength", e.fade_strength, 0.0)?;
        if !e.bg_luminance_threshold.is_finite() {
            return Err(HudError::invalid_config(
                "effects.bg_luminance_threshold must be finite",
            ));
        }
        positive("effects.downscale", e.downscale)?;
        if let Some(rate) = e.update_rate_hz {
            positive("effects.update_rate_hz", rate)?;
        }

        unit_interval("style.panel_bg_alpha", self.style.panel_bg_alpha)?;
        unit_interval(
            "style.panel_bg_alpha_large",
            self.style.panel_bg_alpha_large,
        )?;
        Ok(())
    }
}

fn positive(name: &str, v: f64) -> HudResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(HudError::invalid_config(format!(
            "{name} must be > 0, got {v}"
        )))
    }
}

fn finite_at_least(name: &str, v: f64, min: f64) -> HudResult<()> {
    if v.is_finite() && v >= min {
        Ok(())
    } else {
        Err(HudError::invalid_config(format!(
            "{name} must be >= {min}, got {v}"
        )))
    }
}

fn unit_interval(name: &str, v: f64) -> HudResult<()> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(HudError::invalid_config(format!(
            "{name} must be in [0, 1], got {v}"
        )))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;

use super::*;

#[test]
fn defaults_validate() {
    HudConfig::default().validate().unwrap();
}

#[test]
fn empty_json_yields_defaults() {
    let cfg = HudConfig::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(cfg, HudConfig::default());
    assert_eq!(cfg.power.smoothing_window, 5);
    assert_eq!(cfg.effects.grid_cache_capacity, 4);
    assert_eq!(cfg.units, UnitSystem::Metric);
}

#[test]
fn partial_json_overrides_only_named_fields() {
    let json = r#"{"time_offset_s": 430, "units": "imperial", "effects": {"fast_mode": true}}"#;
    let cfg = HudConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.time_offset_s, 430.0);
    assert_eq!(cfg.units, UnitSystem::Imperial);
    assert!(cfg.effects.fast_mode);
    assert_eq!(cfg.effects.curve_strength, 0.03);
    assert!(!cfg.effects.warp_enabled());
}

#[test]
fn negative_offset_is_rejected() {
    let cfg = HudConfig {
        time_offset_s: -1.0,
        ..HudConfig::default()
    };
    let err = cfg.validate().unwrap_err();
    assert!(matches!(err, HudError::InvalidConfiguration(_)));
    assert!(err.to_string().contains("time_offset_s"));
}

#[test]
fn non_positive_mass_is_rejected() {
    let mut cfg = HudConfig::default();
    cfg.rider.rider_mass_kg = 0.0;
    assert!(cfg.validate().is_err());

    let mut cfg = HudConfig::default();
    cfg.rider.bike_mass_kg = -3.0;
    assert!(cfg.validate().is_err());
}

#[test]
fn out_of_range_opacity_and_curve_are_rejected() {
    let mut cfg = HudConfig::default();
    cfg.style.panel_bg_alpha = 1.5;
    assert!(cfg.validate().is_err());

    let mut cfg = HudConfig::default();
    cfg.effects.curve_strength = 1.2;
    assert!(cfg.validate().is_err());

    let mut cfg = HudConfig::default();
    cfg.effects.curve_strength = f64::NAN;
    assert!(cfg.validate().is_err());
}

#[test]
fn power_window_and_clamps_are_checked() {
    let mut cfg = HudConfig::default();
    cfg.power.smoothing_window = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = HudConfig::default();
    cfg.power.min_power = 2000.0;
    assert!(cfg.validate().is_err());

    let mut cfg = HudConfig::default();
    cfg.power.drivetrain_efficiency = 0.0;
    assert!(cfg.validate().is_err());
}

#[test]
fn update_rate_must_be_positive_when_set() {
    let mut cfg = HudConfig::default();
    cfg.effects.update_rate_hz = Some(0.0);
    assert!(cfg.validate().is_err());
    cfg.effects.update_rate_hz = None;
    cfg.validate().unwrap();
}

#[test]
fn downscale_is_clamped_not_rejected() {
    let mut cfg = HudConfig::default();
    cfg.effects.downscale = 0.1;
    cfg.validate().unwrap();
    assert_eq!(cfg.effects.effective_downscale(), 0.25);
    cfg.effects.downscale = 3.0;
    assert_eq!(cfg.effects.effective_downscale(), 1.0);
}

#[test]
fn base_bg_alpha_is_larger_of_two() {
    let style = StyleConfig::default();
    assert_eq!(style.base_bg_alpha(), 0.75);
}

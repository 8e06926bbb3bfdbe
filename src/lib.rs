//! telemetry-hud overlays GPS ride telemetry onto action-camera video.
//!
//! Two contracts carry the crate:
//!
//! - [`Interpolator::snapshot_at`] maps a video timestamp to a [`Snapshot`] of position,
//!   elevation, speed, grade, estimated power and heading.
//! - [`HudCompositor::render`] draws every enabled widget for a snapshot into one overlay,
//!   classifies its alpha, fades panel backgrounds toward the center, optionally bends it with
//!   a parabolic warp and returns a [`HudOverlay`] at the frame's native size.
//!
//! [`FramePipeline`] strings both together per frame; [`render_overlays`] does it for a batch
//! of frame times, optionally in parallel.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod config;
pub(crate) mod hud;
pub(crate) mod pipeline;
pub(crate) mod telemetry;
pub(crate) mod track;
pub(crate) mod units;

pub use crate::foundation::core::{FrameRGBA, FrameSize, Point, Rect, Rgb8, Vec2};
pub use crate::foundation::error::{HudError, HudResult};
pub use crate::foundation::math::luminance;

pub use crate::config::{
    EffectsConfig, HudConfig, LayoutConfig, PowerConfig, RiderConfig, StyleConfig, UnitSystem,
    WidgetToggles,
};
pub use crate::units::{Quantity, UnitSpec, format_clock};

pub use crate::track::store::{RecordTime, Track, TrackRecord, Waypoint, geodesic_distance_m};
pub use crate::track::zones::{HrZone, HrZones};

pub use crate::telemetry::engine::{ElevationWindow, Interpolator};
pub use crate::telemetry::power::{PowerSmoother, instantaneous_power};
pub use crate::telemetry::snapshot::Snapshot;

pub use crate::hud::cache::{
    CURVE_KEY_DECIMALS, DistanceField, HudCaches, ResolutionCache, WarpKey, WarpMap,
};
pub use crate::hud::canvas::HudCanvas;
pub use crate::hud::compositor::{HudCompositor, HudOverlay, composite_onto};
pub use crate::hud::layout::{
    HudLayout, LEFT_ROWS, PanelKind, RIGHT_ROWS, left_column, place_panels, right_column,
};
pub use crate::hud::mask::{FadeParams, MaskedOverlay, apply_mask};
pub use crate::hud::text::TextEngine;
pub use crate::hud::warp::{
    PixelBounds, content_bounds, displacement_margin, remap_rows, warp_overlay,
};
pub use crate::hud::widgets::{
    WidgetIcon, draw_cyclist_arrow, draw_elevation_profile, draw_heart_panel, draw_hud,
    draw_progress_bar, draw_route_map, draw_value_panel, grade_color, heart_beat_size,
};

pub use crate::pipeline::{FramePipeline, RenderThreading, RenderedOverlay, render_overlays};

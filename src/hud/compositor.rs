use std::sync::Arc;

use rayon::prelude::*;

use crate::config::HudConfig;
use crate::foundation::core::{FrameRGBA, FrameSize};
use crate::foundation::error::{HudError, HudResult};
use crate::hud::cache::{HudCaches, WarpMap};
use crate::hud::canvas::HudCanvas;
use crate::hud::layout::HudLayout;
use crate::hud::mask::{FadeParams, MaskedOverlay, apply_mask};
use crate::hud::text::TextEngine;
use crate::hud::warp::warp_overlay;
use crate::hud::widgets::draw_hud;
use crate::telemetry::snapshot::Snapshot;
use crate::track::store::Track;

/// HUD layer at native frame resolution, ready to blend.
#[derive(Clone, Debug, PartialEq)]
pub struct HudOverlay {
    /// Overlay dimensions (the target frame's).
    pub size: FrameSize,
    /// Straight RGB8 color, row-major.
    pub color: Vec<u8>,
    /// Per-pixel opacity in `[0, 1]`, row-major.
    pub alpha: Vec<f32>,
}

impl HudOverlay {
    /// Fully transparent overlay.
    pub fn transparent(size: FrameSize) -> Self {
        Self {
            size,
            color: vec![0; size.area() * 3],
            alpha: vec![0.0; size.area()],
        }
    }

    fn from_rgba(size: FrameSize, rgba: &[u8]) -> Self {
        let mut color = Vec::with_capacity(size.area() * 3);
        let mut alpha = Vec::with_capacity(size.area());
        for px in rgba.chunks_exact(4) {
            color.extend_from_slice(&px[..3]);
            alpha.push(f32::from(px[3]) / 255.0);
        }
        Self { size, color, alpha }
    }

    /// Opacity at `(x, y)`.
    pub fn alpha_at(&self, x: u32, y: u32) -> f32 {
        self.alpha[(y as usize) * (self.size.width as usize) + x as usize]
    }

    /// Color at `(x, y)`.
    pub fn color_at(&self, x: u32, y: u32) -> [u8; 3] {
        let i = ((y as usize) * (self.size.width as usize) + x as usize) * 3;
        [self.color[i], self.color[i + 1], self.color[i + 2]]
    }

    /// Number of pixels with non-zero opacity.
    pub fn coverage(&self) -> usize {
        self.alpha.iter().filter(|&&a| a > 0.0).count()
    }
}

#[derive(Debug)]
struct LastOverlay {
    wall_time_s: f64,
    overlay: Arc<HudOverlay>,
}

/// Renders HUD overlays for one stream of frames.
///
/// Owns its resolution caches, text engine and the update-rate throttle, so each worker
/// rendering frames concurrently needs its own instance.
#[derive(Debug)]
pub struct HudCompositor {
    cfg: Arc<HudConfig>,
    caches: HudCaches,
    text: TextEngine,
    last: Option<LastOverlay>,
}

impl HudCompositor {
    /// Validate `cfg` and build a compositor with empty caches sized from `cfg.effects`.
    pub fn new(cfg: Arc<HudConfig>) -> HudResult<Self> {
        cfg.validate()?;
        let caches = HudCaches::new(
            cfg.effects.grid_cache_capacity,
            cfg.effects.warp_cache_capacity,
        );
        Ok(Self {
            cfg,
            caches,
            text: TextEngine::new()?,
            last: None,
        })
    }

    /// Configuration this compositor renders with.
    pub fn config(&self) -> &HudConfig {
        &self.cfg
    }

    /// Resolution caches, for inspection.
    pub fn caches(&self) -> &HudCaches {
        &self.caches
    }

    /// Drop cached grids, warp maps and the throttled overlay.
    pub fn clear_caches(&mut self) {
        self.caches.clear();
        self.last = None;
    }

    /// Overlay for a `frame_size` frame showing `snap` at `wall_time_s` seconds of video.
    ///
    /// When an update rate is configured and the previous overlay for the same size is younger
    /// than one update period, that overlay is returned again without redrawing.
    #[tracing::instrument(
        level = "debug",
        skip(self, snap, track),
        fields(index = snap.source_index)
    )]
    pub fn render(
        &mut self,
        frame_size: FrameSize,
        snap: &Snapshot,
        track: &Track,
        wall_time_s: f64,
    ) -> HudResult<Arc<HudOverlay>> {
        if let Some(reused) = self.throttled(frame_size, wall_time_s) {
            return Ok(reused);
        }

        let overlay = Arc::new(self.render_fresh(frame_size, snap, track, wall_time_s)?);
        self.last = Some(LastOverlay {
            wall_time_s,
            overlay: Arc::clone(&overlay),
        });
        Ok(overlay)
    }

    fn throttled(&mut self, frame_size: FrameSize, wall_time_s: f64) -> Option<Arc<HudOverlay>> {
        let rate = self.cfg.effects.update_rate_hz?;
        let last = self.last.as_ref()?;
        if last.overlay.size == frame_size {
            let age = wall_time_s - last.wall_time_s;
            return (age >= 0.0 && age < 1.0 / rate).then(|| Arc::clone(&last.overlay));
        }
        tracing::debug!(
            width = frame_size.width,
            height = frame_size.height,
            "frame size changed, dropping throttled overlay"
        );
        self.last = None;
        None
    }

    fn render_fresh(
        &mut self,
        frame_size: FrameSize,
        snap: &Snapshot,
        track: &Track,
        wall_time_s: f64,
    ) -> HudResult<HudOverlay> {
        let cfg = Arc::clone(&self.cfg);
        let scale = cfg.effects.effective_downscale();
        let render_size = if scale < 1.0 {
            frame_size.scaled(scale)
        } else {
            frame_size
        };

        let layout = HudLayout::compute(render_size, scale, &cfg.layout);
        let mut canvas = HudCanvas::new(render_size, &mut self.text)?;
        draw_hud(&mut canvas, &layout, snap, track, wall_time_s, &cfg);
        let layer = canvas.finish()?;

        let field = self.caches.distance_field(render_size);
        let masked = apply_mask(&layer, &field, &FadeParams::from_config(&cfg))?;
        if masked.is_blank() {
            return Ok(HudOverlay::transparent(frame_size));
        }

        let rgba = if cfg.effects.warp_enabled() {
            let map = self
                .caches
                .warp_map(masked.size, cfg.effects.curve_strength);
            warp_or_unwarped(masked, &map, cfg.effects.roi_remap)
        } else {
            masked.rgba
        };

        let rgba = if render_size == frame_size {
            rgba
        } else {
            upscale(rgba, render_size, frame_size)?
        };
        Ok(HudOverlay::from_rgba(frame_size, &rgba))
    }
}

/// Warped pixels of `masked`, or its unwarped pixels when the warp fails.
fn warp_or_unwarped(masked: MaskedOverlay, map: &WarpMap, roi_only: bool) -> Vec<u8> {
    match warp_overlay(&masked.rgba, masked.size, map, roi_only) {
        Ok(rgba) => rgba,
        Err(err) => {
            tracing::warn!(error = %err, "warp failed, using unwarped overlay");
            masked.rgba
        }
    }
}

fn upscale(rgba: Vec<u8>, from: FrameSize, to: FrameSize) -> HudResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(from.width, from.height, rgba).ok_or_else(|| {
        HudError::invalid_config(format!(
            "overlay buffer does not match {}x{}",
            from.width, from.height
        ))
    })?;
    let resized = image::imageops::resize(
        &img,
        to.width,
        to.height,
        image::imageops::FilterType::Triangle,
    );
    Ok(resized.into_raw())
}

/// Blend `overlay` onto the RGB channels of `frame`: `frame * (1 - a) + hud * a`, rounded.
///
/// The frame's alpha channel is left untouched.
pub fn composite_onto(frame: &mut FrameRGBA, overlay: &HudOverlay) -> HudResult<()> {
    if frame.size() != overlay.size {
        return Err(HudError::invalid_config(format!(
            "overlay is {}x{}, frame is {}x{}",
            overlay.size.width, overlay.size.height, frame.width, frame.height
        )));
    }
    let w = frame.width as usize;
    frame
        .data
        .par_chunks_mut(w * 4)
        .zip(overlay.color.par_chunks(w * 3))
        .zip(overlay.alpha.par_chunks(w))
        .for_each(|((dst, hud), alpha)| {
            for ((px, c), &a) in dst.chunks_exact_mut(4).zip(hud.chunks_exact(3)).zip(alpha) {
                if a <= 0.0 {
                    continue;
                }
                let a = a.min(1.0);
                for (d, &h) in px[..3].iter_mut().zip(c) {
                    let v = f32::from(*d) * (1.0 - a) + f32::from(h) * a;
                    *d = v.round().clamp(0.0, 255.0) as u8;
                }
            }
        });
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/hud/compositor.rs"]
mod tests;

use std::sync::Arc;

use rayon::prelude::*;

use crate::config::HudConfig;
use crate::foundation::core::{FrameRGBA, FrameSize};
use crate::foundation::error::{HudError, HudResult};
use crate::hud::compositor::{HudCompositor, HudOverlay, composite_onto};
use crate::telemetry::engine::Interpolator;
use crate::telemetry::snapshot::Snapshot;
use crate::track::store::Track;

/// Interpolate + render a HUD for one stream of video frames.
///
/// Pipeline per frame:
/// 1. [`Interpolator::snapshot_at`](crate::Interpolator::snapshot_at)
/// 2. [`HudCompositor::render`](crate::HudCompositor::render)
/// 3. optionally [`composite_onto`](crate::composite_onto) the source frame
///
/// Frames should be fed in increasing time order: power smoothing and the overlay throttle
/// both carry state from one frame to the next.
#[derive(Debug)]
pub struct FramePipeline {
    engine: Interpolator,
    compositor: HudCompositor,
}

impl FramePipeline {
    /// Validate `cfg` and build a pipeline over `track`.
    pub fn new(track: Arc<Track>, cfg: Arc<HudConfig>) -> HudResult<Self> {
        Ok(Self {
            engine: Interpolator::new(track, &cfg)?,
            compositor: HudCompositor::new(cfg)?,
        })
    }

    /// Telemetry at `video_time_s` without rendering.
    pub fn snapshot_at(&mut self, video_time_s: f64) -> HudResult<Snapshot> {
        self.engine.snapshot_at(video_time_s)
    }

    /// Snapshot and overlay for a `frame_size` frame at `video_time_s`.
    pub fn render(
        &mut self,
        frame_size: FrameSize,
        video_time_s: f64,
    ) -> HudResult<(Snapshot, Arc<HudOverlay>)> {
        let snap = self.engine.snapshot_at(video_time_s)?;
        let overlay =
            self.compositor
                .render(frame_size, &snap, self.engine.track(), video_time_s)?;
        Ok((snap, overlay))
    }

    /// Render the HUD for `video_time_s` and blend it into `frame` in place.
    pub fn render_onto(&mut self, frame: &mut FrameRGBA, video_time_s: f64) -> HudResult<Snapshot> {
        let (snap, overlay) = self.render(frame.size(), video_time_s)?;
        composite_onto(frame, &overlay)?;
        Ok(snap)
    }

    /// The compositor, for cache inspection or clearing.
    pub fn compositor_mut(&mut self) -> &mut HudCompositor {
        &mut self.compositor
    }
}

/// How [`render_overlays`] spreads work across threads.
#[derive(Clone, Debug)]
pub struct RenderThreading {
    /// Render chunks on a rayon pool instead of the calling thread.
    pub parallel: bool,
    /// Consecutive frames per chunk; `0` is treated as `1`.
    pub chunk_size: usize,
    /// Worker count; `None` lets rayon decide.
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

/// One rendered frame of [`render_overlays`].
#[derive(Clone, Debug)]
pub struct RenderedOverlay {
    /// Video time the frame was rendered for.
    pub video_time_s: f64,
    /// Telemetry shown.
    pub snapshot: Snapshot,
    /// The overlay.
    pub overlay: Arc<HudOverlay>,
}

/// Render overlays for every time in `times`, preserving order.
///
/// In parallel mode each chunk gets its own [`FramePipeline`], so power smoothing and the
/// throttle restart at every chunk boundary.
#[tracing::instrument(skip(track, cfg, times), fields(frames = times.len()))]
pub fn render_overlays(
    track: Arc<Track>,
    cfg: Arc<HudConfig>,
    frame_size: FrameSize,
    times: &[f64],
    threading: &RenderThreading,
) -> HudResult<Vec<RenderedOverlay>> {
    if times.is_empty() {
        return Ok(Vec::new());
    }
    cfg.validate()?;
    let chunk_size = threading.chunk_size.max(1);

    if !threading.parallel {
        let mut pipeline = FramePipeline::new(track, cfg)?;
        return render_chunk(&mut pipeline, frame_size, times);
    }

    let pool = build_thread_pool(threading.threads)?;
    let chunks = pool.install(|| {
        times
            .par_chunks(chunk_size)
            .map(|chunk| {
                let mut pipeline = FramePipeline::new(Arc::clone(&track), Arc::clone(&cfg))?;
                render_chunk(&mut pipeline, frame_size, chunk)
            })
            .collect::<Vec<_>>()
    });

    let mut out = Vec::with_capacity(times.len());
    for chunk in chunks {
        out.extend(chunk?);
    }
    tracing::debug!(
        frames = out.len(),
        chunk_size,
        "parallel overlay render done"
    );
    Ok(out)
}

fn render_chunk(
    pipeline: &mut FramePipeline,
    frame_size: FrameSize,
    times: &[f64],
) -> HudResult<Vec<RenderedOverlay>> {
    times
        .iter()
        .map(|&t| {
            let (snapshot, overlay) = pipeline.render(frame_size, t)?;
            Ok(RenderedOverlay {
                video_time_s: t,
                snapshot,
                overlay,
            })
        })
        .collect()
}

fn build_thread_pool(threads: Option<usize>) -> HudResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(HudError::invalid_config(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| HudError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;

use rayon::prelude::*;

use crate::config::HudConfig;
use crate::foundation::core::{FrameRGBA, FrameSize};
use crate::foundation::error::{HudError, HudResult};
use crate::foundation::math::{luminance, unpremul};
use crate::hud::cache::DistanceField;

/// Parameters of the background/content alpha classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeParams {
    /// Luminance at or above which a drawn pixel is content.
    pub threshold: f32,
    /// Background alpha at the overlay corners.
    pub base_alpha: f64,
    /// Fraction of `base_alpha` removed at the overlay center.
    pub fade_strength: f64,
}

impl FadeParams {
    /// Parameters taken from the effects and style sections of `cfg`.
    pub fn from_config(cfg: &HudConfig) -> Self {
        Self {
            threshold: cfg.effects.bg_luminance_threshold,
            base_alpha: cfg.style.base_bg_alpha(),
            fade_strength: cfg.effects.fade_strength,
        }
    }

    /// Alpha of a background pixel at normalized center distance `nd`.
    pub fn background_alpha(&self, nd: f32) -> f64 {
        let fade = 1.0 - self.fade_strength * (1.0 - f64::from(nd));
        (self.base_alpha * fade).clamp(0.0, 1.0)
    }
}

/// Straight-alpha RGBA8 overlay after classification.
///
/// Never-drawn pixels are all zero, content pixels carry alpha 255 and background pixels
/// carry their faded alpha, truncated to 8 bits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskedOverlay {
    /// Overlay dimensions.
    pub size: FrameSize,
    /// Straight RGBA8 pixels, row-major.
    pub rgba: Vec<u8>,
    /// Number of pixels any widget touched.
    pub drawn: usize,
}

impl MaskedOverlay {
    /// Fully transparent overlay of `size`.
    pub fn transparent(size: FrameSize) -> Self {
        Self {
            size,
            rgba: vec![0; size.area() * 4],
            drawn: 0,
        }
    }

    /// Whether no widget touched any pixel.
    pub fn is_blank(&self) -> bool {
        self.drawn == 0
    }
}

/// Replace the coverage alpha of a rendered widget layer with the HUD mask.
///
/// A pixel counts as drawn when its rendered alpha is non-zero. Its luminance is taken from
/// the un-premultiplied color, so anti-aliased edges classify like the shape they belong to.
pub fn apply_mask(
    frame: &FrameRGBA,
    field: &DistanceField,
    params: &FadeParams,
) -> HudResult<MaskedOverlay> {
    let size = frame.size();
    if field.size != size {
        return Err(HudError::invalid_config(format!(
            "distance field is {}x{}, overlay is {}x{}",
            field.size.width, field.size.height, size.width, size.height
        )));
    }
    if frame.data.len() != size.area() * 4 {
        return Err(HudError::invalid_config(format!(
            "overlay buffer holds {} bytes, expected {}",
            frame.data.len(),
            size.area() * 4
        )));
    }

    let row_bytes = size.width as usize * 4;
    let mut rgba = vec![0u8; frame.data.len()];
    let premultiplied = frame.premultiplied;

    let drawn: usize = rgba
        .par_chunks_mut(row_bytes)
        .zip(frame.data.par_chunks(row_bytes))
        .zip(field.values().par_chunks(size.width as usize))
        .map(|((dst, src), nd)| {
            let mut count = 0usize;
            for ((d, s), &nd) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)).zip(nd) {
                let a = s[3];
                if a == 0 {
                    continue;
                }
                count += 1;
                let (r, g, b) = if premultiplied {
                    (unpremul(s[0], a), unpremul(s[1], a), unpremul(s[2], a))
                } else {
                    (s[0], s[1], s[2])
                };
                let alpha = if luminance(r, g, b) >= params.threshold {
                    1.0
                } else {
                    params.background_alpha(nd)
                };
                d[0] = r;
                d[1] = g;
                d[2] = b;
                d[3] = (alpha * 255.0) as u8;
            }
            count
        })
        .sum();

    if drawn == 0 {
        return Ok(MaskedOverlay::transparent(size));
    }
    Ok(MaskedOverlay { size, rgba, drawn })
}

#[cfg(test)]
#[path = "../../tests/unit/hud/mask.rs"]
mod tests;

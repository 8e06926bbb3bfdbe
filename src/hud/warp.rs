use rayon::prelude::*;

use crate::foundation::core::FrameSize;
use crate::foundation::error::{HudError, HudResult};
use crate::hud::cache::WarpMap;

/// Inclusive-exclusive pixel bounds `[x0, x1) x [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBounds {
    /// Left column.
    pub x0: u32,
    /// Top row.
    pub y0: u32,
    /// One past the right column.
    pub x1: u32,
    /// One past the bottom row.
    pub y1: u32,
}

impl PixelBounds {
    /// Bounds covering a whole frame.
    pub fn full(size: FrameSize) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: size.width,
            y1: size.height,
        }
    }

    /// Grow vertically by `margin` rows, clipped to `height`.
    pub fn expand_rows(self, margin: u32, height: u32) -> Self {
        Self {
            y0: self.y0.saturating_sub(margin),
            y1: self.y1.saturating_add(margin).min(height),
            ..self
        }
    }
}

/// Tight bounds of the pixels with non-zero alpha, or `None` when all are transparent.
pub fn content_bounds(rgba: &[u8], size: FrameSize) -> Option<PixelBounds> {
    let w = size.width as usize;
    let mut bounds: Option<PixelBounds> = None;
    for (y, row) in rgba.chunks_exact(w * 4).enumerate() {
        let mut cols = row
            .chunks_exact(4)
            .enumerate()
            .filter(|(_, px)| px[3] != 0)
            .map(|(x, _)| x as u32);
        let Some(first) = cols.next() else {
            continue;
        };
        let last = cols.next_back().unwrap_or(first);
        let y = y as u32;
        bounds = Some(match bounds {
            None => PixelBounds {
                x0: first,
                y0: y,
                x1: last + 1,
                y1: y + 1,
            },
            Some(b) => PixelBounds {
                x0: b.x0.min(first),
                y0: b.y0,
                x1: b.x1.max(last + 1),
                y1: y + 1,
            },
        });
    }
    bounds
}

/// Rows of safety margin around the content box for a warp of strength `k` at `height`.
pub fn displacement_margin(k: f64, height: u32) -> u32 {
    (k.abs() * f64::from(height)) as u32 + 4
}

/// Apply the parabolic warp to a straight RGBA8 buffer.
///
/// Destination pixels inside `bounds` sample the source at `(x, map.source_y(x, y))` with
/// linear interpolation between the two nearest rows. Pixels outside `bounds` are left
/// transparent, so `bounds` must cover every pixel the warp can move content into.
pub fn remap_rows(
    rgba: &[u8],
    size: FrameSize,
    map: &WarpMap,
    bounds: PixelBounds,
) -> HudResult<Vec<u8>> {
    if map.size != size {
        return Err(HudError::warp(format!(
            "warp map is {}x{}, overlay is {}x{}",
            map.size.width, map.size.height, size.width, size.height
        )));
    }
    if rgba.len() != size.area() * 4 {
        return Err(HudError::warp(format!(
            "overlay buffer holds {} bytes, expected {}",
            rgba.len(),
            size.area() * 4
        )));
    }
    if bounds.x0 > bounds.x1
        || bounds.y0 > bounds.y1
        || bounds.x1 > size.width
        || bounds.y1 > size.height
    {
        return Err(HudError::warp(format!(
            "remap bounds {bounds:?} outside overlay"
        )));
    }

    let w = size.width as usize;
    let last_row = size.height as usize - 1;
    let rows = map.rows();
    let mut out = vec![0u8; rgba.len()];
    let (x0, x1) = (bounds.x0 as usize, bounds.x1 as usize);

    out.par_chunks_mut(w * 4)
        .enumerate()
        .skip(bounds.y0 as usize)
        .take((bounds.y1 - bounds.y0) as usize)
        .for_each(|(y, dst)| {
            let map_row = &rows[y * w..(y + 1) * w];
            for x in x0..x1 {
                let sy = f64::from(map_row[x]);
                let top = (sy.floor().max(0.0) as usize).min(last_row);
                let bottom = (top + 1).min(last_row);
                let t = sy - top as f64;
                let a = &rgba[(top * w + x) * 4..][..4];
                let b = &rgba[(bottom * w + x) * 4..][..4];
                for (d, (&ca, &cb)) in dst[x * 4..x * 4 + 4].iter_mut().zip(a.iter().zip(b)) {
                    let v = f64::from(ca) * (1.0 - t) + f64::from(cb) * t;
                    *d = v.round().clamp(0.0, 255.0) as u8;
                }
            }
        });
    Ok(out)
}

/// Warp `rgba`, limiting work to the content box plus its displacement margin when
/// `roi_only` is set. A buffer with no content comes back unchanged.
pub fn warp_overlay(
    rgba: &[u8],
    size: FrameSize,
    map: &WarpMap,
    roi_only: bool,
) -> HudResult<Vec<u8>> {
    let bounds = if roi_only {
        match content_bounds(rgba, size) {
            Some(b) => {
                let margin = displacement_margin(map.curve_strength, size.height);
                b.expand_rows(margin, size.height)
            }
            None => return Ok(rgba.to_vec()),
        }
    } else {
        PixelBounds::full(size)
    };
    remap_rows(rgba, size, map, bounds)
}

#[cfg(test)]
#[path = "../../tests/unit/hud/warp.rs"]
mod tests;

use crate::foundation::error::{HudError, HudResult};

pub use kurbo::{Point, Rect, Vec2};

/// Pixel dimensions of a frame or overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FrameSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameSize {
    /// Create a validated size with both dimensions non-zero.
    pub fn new(width: u32, height: u32) -> HudResult<Self> {
        if width == 0 || height == 0 {
            return Err(HudError::invalid_config(format!(
                "frame size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Number of pixels.
    pub fn area(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Scale both dimensions by `s`, truncating and flooring at one pixel.
    pub fn scaled(self, s: f64) -> Self {
        Self {
            width: ((f64::from(self.width) * s) as u32).max(1),
            height: ((f64::from(self.height) * s) as u32).max(1),
        }
    }

    /// Smaller of the two dimensions.
    pub fn min_side(self) -> u32 {
        self.width.min(self.height)
    }
}

/// Straight (non-premultiplied) RGB8 color. Serialized as `[r, g, b]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Construct from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Uniform gray.
    pub const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Channel-wise linear blend, truncating toward zero.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let mix = |a: u8, b: u8| -> u8 {
            let v = f64::from(a) + t * (f64::from(b) - f64::from(a));
            v.clamp(0.0, 255.0) as u8
        };
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    /// Multiply every channel by `f`, truncating.
    pub fn scale(self, f: f64) -> Self {
        let s = |c: u8| (f64::from(c) * f).clamp(0.0, 255.0) as u8;
        Self {
            r: s(self.r),
            g: s(self.g),
            b: s(self.b),
        }
    }

    /// Rec. 709 luminance of this color.
    pub fn luminance(self) -> f32 {
        crate::foundation::math::luminance(self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from(v: [u8; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Rgb8> for [u8; 3] {
    fn from(c: Rgb8) -> Self {
        [c.r, c.g, c.b]
    }
}

/// A video frame as tightly packed RGBA8 pixels, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Opaque frame filled with one color.
    pub fn solid(size: FrameSize, color: Rgb8) -> Self {
        let data = [color.r, color.g, color.b, 255].repeat(size.area());
        Self {
            width: size.width,
            height: size.height,
            data,
            premultiplied: false,
        }
    }

    /// Wrap existing straight RGBA8 bytes, checking the length.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> HudResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| HudError::malformed("frame buffer size overflow"))?;
        if data.len() != expected {
            return Err(HudError::malformed(format!(
                "frame buffer has {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            premultiplied: false,
        })
    }

    /// Frame dimensions.
    pub fn size(&self) -> FrameSize {
        FrameSize {
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

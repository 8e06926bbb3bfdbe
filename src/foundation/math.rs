/// Rec. 709 luminance of a straight RGB triple.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f32 {
    0.2126 * f32::from(r) + 0.7152 * f32::from(g) + 0.0722 * f32::from(b)
}

#[inline]
pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Quantize a float to `decimals` places as an integer, for use in hash keys.
pub(crate) fn round_key(v: f64, decimals: u32) -> i64 {
    let scale = 10f64.powi(decimals as i32);
    (v * scale).round() as i64
}

/// Undo premultiplication of one channel.
pub(crate) fn unpremul(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    if a == 255 {
        return c;
    }
    ((u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8
}

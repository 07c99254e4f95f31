//! Interpolation helpers for slide offsets

#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Interpolate a row or column count
#[inline]
pub fn lerp_u16(from: u16, to: u16, t: f64) -> u16 {
    lerp(from as f64, to as f64, t).round() as u16
}

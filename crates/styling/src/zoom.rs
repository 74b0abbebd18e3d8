//! Zoom-dependent size scaling for rendered features.

/// Zoom range over which sizes interpolate.
pub const MIN_ZOOM: f64 = 8.0;
pub const MAX_ZOOM: f64 = 18.0;

/// Multiplier range applied to a base size.
pub const MIN_SCALE: f64 = 0.3;
pub const MAX_SCALE: f64 = 1.5;

/// Rendered size for a base size at the current viewport zoom.
///
/// The zoom is clamped into `[MIN_ZOOM, MAX_ZOOM]` and mapped linearly onto
/// `[MIN_SCALE, MAX_SCALE]`; the result is rounded to whole pixels. Monotonic
/// non-decreasing in zoom by construction.
pub fn scale(zoom: f64, base_size: u32) -> u32 {
    let t = ((zoom - MIN_ZOOM) / (MAX_ZOOM - MIN_ZOOM)).clamp(0.0, 1.0);
    let multiplier = MIN_SCALE + t * (MAX_SCALE - MIN_SCALE);
    (base_size as f64 * multiplier).round() as u32
}

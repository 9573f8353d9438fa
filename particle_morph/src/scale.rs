//! Interaction factor → visual scale.

/// Scale when the hands are fully closed / pinched.
pub const MIN_SCALE: f32 = 0.2;
/// Scale at the neutral factor 0.5.
pub const NEUTRAL_SCALE: f32 = 1.0;
/// Scale when the hands are fully open / spread.
pub const MAX_SCALE: f32 = 3.0;

/// Map a smoothed interaction factor in `[0, 1]` to the target scale.
///
/// Piecewise linear and continuous at 0.5: the closed half shrinks the
/// cloud to 0.2×, the open half grows it to 3×.  Out-of-range input is
/// clamped first, so the function is total.
pub fn map_scale(factor: f32) -> f32 {
    let f = if factor.is_nan() { 0.5 } else { factor.clamp(0.0, 1.0) };
    if f < 0.5 {
        MIN_SCALE + (f / 0.5) * (NEUTRAL_SCALE - MIN_SCALE)
    } else {
        NEUTRAL_SCALE + ((f - 0.5) / 0.5) * (MAX_SCALE - NEUTRAL_SCALE)
    }
}

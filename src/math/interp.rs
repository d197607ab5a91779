//! Scalar interpolation helpers shared by the height field stages

/// Clamp to `[0, 1]`.
#[inline]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Position of `v` between `a` and `b`, clamped to `[0, 1]`.
///
/// `a` may be greater than `b`, which inverts the ramp. Returns 0 when `a == b`.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    clamp01((v - a) / (b - a))
}

/// Cubic Hermite interpolation from `from` to `to` at `t` (clamped).
#[inline]
pub fn smoothstep(from: f32, to: f32, t: f32) -> f32 {
    let t = clamp01(t);
    let s = t * t * (3.0 - 2.0 * t);
    from + (to - from) * s
}

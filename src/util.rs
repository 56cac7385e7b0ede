/// Linear interpolation between `a` and `b` at parameter `t` in [0, 1].
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Clamp a value into the [0, 1] unit interval.
pub fn clamp01(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

/// Ease-out cubic: fast start, slow finish. Applied downstream of the
/// scroll mapper and the stat counters; never inside the mapper itself.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = clamp01(t);
    1.0 - (1.0 - t).powi(3)
}

//! Interpolation primitives shared by the fade engine and the visual
//! controllers. All functions are pure; callers persist the current value.
//!
//! Two families exist on purpose: rate-based exponential approach for
//! responsive gaze-gated parameters (never quite reaches the target), and
//! duration-based linear blends for crossfades (reach the target exactly).

/// Linear blend with `t` clamped to [0, 1].
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Where `v` sits between `a` and `b`, clamped to [0, 1].
#[inline]
pub fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        0.0
    } else {
        ((v - a) / (b - a)).clamp(0.0, 1.0)
    }
}

/// Completion fraction of a duration-based fade. A non-positive duration
/// snaps to 1 so a zero-length fade finishes on the frame it starts.
#[inline]
pub fn fade_fraction(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    } else {
        (elapsed / duration).clamp(0.0, 1.0)
    }
}

/// Exponential approach of `current` toward `target` at `speed` per second.
/// Frame-rate independent; asymptotic, so it never overshoots.
#[inline]
pub fn approach(current: f32, target: f32, dt: f32, speed: f32) -> f32 {
    if dt <= 0.0 || speed <= 0.0 {
        return current;
    }
    let alpha = 1.0 - (-dt * speed).exp();
    current + (target - current) * alpha
}

/// Step toward `target` by at most `max_delta`.
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + delta.signum() * max_delta
    }
}

/// Critically damped spring toward `target`, tracking velocity across
/// frames. `smooth_time` is roughly the time to cover most of the distance.
pub fn smooth_damp(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    dt: f32,
) -> f32 {
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    target + (change + temp) * decay
}

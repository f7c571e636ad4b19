#[must_use]
pub fn frames_to_seconds(frame: u64, fps: f64) -> f64 {
    if fps <= 0.0 || !fps.is_finite() {
        return 0.0;
    }

    frame as f64 / fps
}

#[must_use]
pub fn seconds_to_frames(seconds: f64, fps: f64) -> u64 {
    if seconds <= 0.0 || fps <= 0.0 || !seconds.is_finite() || !fps.is_finite() {
        return 0;
    }

    (seconds * fps).round() as u64
}

/// Normalized position of `time` between `start` and `end`, unclamped.
/// A zero-length span yields a non-finite result the caller must guard.
#[must_use]
pub fn inverse_lerp(start: f64, end: f64, time: f64) -> f64 {
    (time - start) / (end - start)
}

#[must_use]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

#[must_use]
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

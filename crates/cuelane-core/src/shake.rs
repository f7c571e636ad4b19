//! Seeded, closed-loop 2D noise path used for camera shake.

use glam::DVec2;
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::time::finite_or;

const MAX_SHAKE_KEYFRAMES: usize = 100_000;
const MAX_SMOOTHNESS: f64 = 4.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShakeConfig {
    /// Generation stops once accumulated time reaches this bound.
    pub duration: f64,
    pub step_min: f64,
    pub step_max: f64,
    /// Raw displacement is drawn from `±range` per axis...
    pub range: f64,
    /// ...then clamped to `±clamp`.
    pub clamp: f64,
    pub seed: Option<u64>,
    /// Upper bound of the shake clock, usually the song length.
    pub clip_length: Option<f64>,
}

impl Default for ShakeConfig {
    fn default() -> Self {
        Self {
            duration: 10.0,
            step_min: 0.1,
            step_max: 0.3,
            range: 6.0,
            clamp: 3.0,
            seed: None,
            clip_length: None,
        }
    }
}

impl ShakeConfig {
    /// Replaces values that would make generation unbounded or sampling
    /// non-finite with their defaults.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let positive = |value: f64, fallback: f64| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        };
        let non_negative = |value: f64, fallback: f64| {
            if value.is_finite() && value >= 0.0 {
                value
            } else {
                fallback
            }
        };

        let step_min = positive(self.step_min, defaults.step_min);
        let step_max = positive(self.step_max, defaults.step_max).max(step_min);
        let sanitized = Self {
            duration: positive(self.duration, defaults.duration),
            step_min,
            step_max,
            range: non_negative(self.range, defaults.range),
            clamp: non_negative(self.clamp, defaults.clamp),
            seed: self.seed,
            clip_length: self.clip_length.filter(|length| length.is_finite() && *length > 0.0),
        };
        if &sanitized != self {
            warn!(original = ?self, ?sanitized, "shake config adjusted");
        }
        sanitized
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ShakeKeyframe {
    pub time: f64,
    pub value: DVec2,
}

/// Loopable path whose last keyframe repeats the first keyframe's value.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShakeSequence {
    keyframes: Vec<ShakeKeyframe>,
    length: f64,
}

impl ShakeSequence {
    #[instrument(skip(config), fields(seed = ?config.seed))]
    pub fn generate(config: &ShakeConfig) -> Self {
        let config = config.sanitized();
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let bound = DVec2::splat(config.clamp);
        let mut keyframes = Vec::new();
        let mut time = 0.0;
        while time < config.duration && keyframes.len() < MAX_SHAKE_KEYFRAMES {
            let raw = DVec2::new(
                rng.random_range(-config.range..=config.range),
                rng.random_range(-config.range..=config.range),
            );
            keyframes.push(ShakeKeyframe {
                time,
                value: raw.clamp(-bound, bound),
            });
            time += rng.random_range(config.step_min..=config.step_max);
        }

        let first = keyframes.first().map_or(DVec2::ZERO, |keyframe| keyframe.value);
        keyframes.push(ShakeKeyframe { time, value: first });

        debug!(keyframes = keyframes.len(), length = time, "shake sequence generated");
        Self {
            keyframes,
            length: time,
        }
    }

    #[must_use]
    pub fn keyframes(&self) -> &[ShakeKeyframe] {
        &self.keyframes
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Samples the path at `time` in `[0, length]`, interpolating between the
    /// bracketing keyframes with a curve shaped by `smoothness`.
    #[must_use]
    pub fn sample(&self, time: f64, smoothness: f64) -> DVec2 {
        let Some(last) = self.keyframes.last() else {
            return DVec2::ZERO;
        };
        let Some(next) = self.keyframes.iter().position(|keyframe| keyframe.time > time) else {
            return last.value;
        };
        if next == 0 {
            return self.keyframes[0].value;
        }

        let from = self.keyframes[next - 1];
        let to = self.keyframes[next];
        let alpha = finite_or(((time - from.time) / (to.time - from.time)).clamp(0.0, 1.0), 0.0);
        from.value.lerp(to.value, smooth(alpha, smoothness))
    }
}

/// Symmetric power curve with exponent `1 + smoothness`; `0` is linear.
fn smooth(alpha: f64, smoothness: f64) -> f64 {
    let exponent = 1.0 + finite_or(smoothness, 0.0).clamp(0.0, MAX_SMOOTHNESS);
    let rising = alpha.powf(exponent);
    let falling = (1.0 - alpha).powf(exponent);
    finite_or(rising / (rising + falling), alpha)
}

/// The shake clock plus the most recent sample.
#[derive(Debug, Clone)]
pub struct ShakeDriver {
    config: ShakeConfig,
    sequence: Option<ShakeSequence>,
    shake_time: f64,
    clip_length: f64,
    last_clock: Option<f64>,
    last_sample: DVec2,
}

impl ShakeDriver {
    #[must_use]
    pub fn new(config: ShakeConfig) -> Self {
        let config = config.sanitized();
        let clip_length = config.clip_length.unwrap_or(f64::MAX);
        Self {
            config,
            sequence: None,
            shake_time: 0.0,
            clip_length,
            last_clock: None,
            last_sample: DVec2::ZERO,
        }
    }

    pub fn setup(&mut self) {
        self.sequence = Some(ShakeSequence::generate(&self.config));
        self.shake_time = 0.0;
        self.last_clock = None;
    }

    pub fn set_clip_length(&mut self, clip_length: f64) {
        self.clip_length = if clip_length.is_finite() && clip_length > 0.0 {
            clip_length
        } else {
            f64::MAX
        };
        self.shake_time = self.shake_time.min(self.clip_length);
    }

    pub fn sample(&mut self, delta: f64, speed: f64, smoothness: f64) -> DVec2 {
        let step = delta * speed;
        if step.is_finite() {
            self.shake_time += step;
        }
        self.shake_time = self.shake_time.clamp(0.0, self.clip_length);

        self.last_sample = match &self.sequence {
            Some(sequence) if sequence.length() > 0.0 => {
                sequence.sample(self.shake_time % sequence.length(), smoothness)
            }
            _ => DVec2::ZERO,
        };
        self.last_sample
    }

    /// Like [`Self::sample`], deriving the delta from the previous `time`.
    pub fn sample_at(&mut self, time: f64, speed: f64, smoothness: f64) -> DVec2 {
        let delta = match self.last_clock {
            Some(previous) => finite_or(time - previous, 0.0),
            None => 0.0,
        };
        if time.is_finite() {
            self.last_clock = Some(time);
        }
        self.sample(delta, speed, smoothness)
    }

    #[must_use]
    pub fn sequence(&self) -> Option<&ShakeSequence> {
        self.sequence.as_ref()
    }

    #[must_use]
    pub fn shake_time(&self) -> f64 {
        self.shake_time
    }

    #[must_use]
    pub fn last_sample(&self) -> DVec2 {
        self.last_sample
    }
}

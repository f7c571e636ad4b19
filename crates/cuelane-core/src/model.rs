use serde::{Deserialize, Serialize};

use crate::easing::Easing;

/// One timestamped set of channel values for a single track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Keyframe {
    pub time: f64,
    pub values: Vec<f64>,
    #[serde(default)]
    pub curve: Easing,
    #[serde(default)]
    pub relative: bool,
}

impl Keyframe {
    #[must_use]
    pub fn new(time: f64, values: impl Into<Vec<f64>>) -> Self {
        Self {
            time,
            values: values.into(),
            curve: Easing::Linear,
            relative: false,
        }
    }

    #[must_use]
    pub fn with_curve(mut self, curve: Easing) -> Self {
        self.curve = curve;
        self
    }

    #[must_use]
    pub fn relative(mut self) -> Self {
        self.relative = true;
        self
    }

    /// Raw stored value of `channel`, or `None` when the keyframe is shorter.
    #[must_use]
    pub fn value(&self, channel: usize) -> Option<f64> {
        self.values.get(channel).copied()
    }
}

/// Externally authored keyframe lists, indexed by track.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Timeline {
    pub title: String,
    pub tracks: Vec<Vec<Keyframe>>,
}

impl Timeline {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tracks: Vec::new(),
        }
    }

    #[must_use]
    pub fn keyframe_count(&self) -> usize {
        self.tracks.iter().map(Vec::len).sum()
    }

    /// Widest keyframe per track, i.e. the channel count each track needs.
    #[must_use]
    pub fn channel_shape(&self) -> Vec<usize> {
        self.tracks
            .iter()
            .map(|keyframes| {
                keyframes
                    .iter()
                    .map(|keyframe| keyframe.values.len())
                    .max()
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Latest keyframe time across every track, ignoring non-finite stamps.
    #[must_use]
    pub fn end_time(&self) -> f64 {
        self.tracks
            .iter()
            .flatten()
            .map(|keyframe| keyframe.time)
            .filter(|time| time.is_finite())
            .fold(0.0, f64::max)
    }
}

/// A `(track, channel)` pair flagged as a palette selector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelRef {
    pub track: usize,
    pub channel: usize,
}

impl ChannelRef {
    #[must_use]
    pub const fn new(track: usize, channel: usize) -> Self {
        Self { track, channel }
    }
}

/// The set of selector channels whose values are palette indices.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Vec<ChannelRef>", into = "Vec<ChannelRef>")]
pub struct DiscreteChannelSpec {
    channels: Vec<ChannelRef>,
}

impl DiscreteChannelSpec {
    #[must_use]
    pub fn new(channels: impl IntoIterator<Item = ChannelRef>) -> Self {
        let mut channels: Vec<ChannelRef> = channels.into_iter().collect();
        channels.sort_unstable();
        channels.dedup();
        Self { channels }
    }

    #[must_use]
    pub fn contains(&self, track: usize, channel: usize) -> bool {
        self.channels
            .binary_search(&ChannelRef::new(track, channel))
            .is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = ChannelRef> + '_ {
        self.channels.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl From<Vec<ChannelRef>> for DiscreteChannelSpec {
    fn from(channels: Vec<ChannelRef>) -> Self {
        Self::new(channels)
    }
}

impl From<DiscreteChannelSpec> for Vec<ChannelRef> {
    fn from(spec: DiscreteChannelSpec) -> Self {
        spec.channels
    }
}

impl FromIterator<ChannelRef> for DiscreteChannelSpec {
    fn from_iter<I: IntoIterator<Item = ChannelRef>>(iter: I) -> Self {
        Self::new(iter)
    }
}

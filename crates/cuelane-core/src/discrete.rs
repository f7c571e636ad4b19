//! Selector channels: palette indices resolved separately from the
//! continuous blend weight that mixes them.

use serde::{Deserialize, Serialize};

use crate::{
    eval::{ChannelKind, evaluate_channel},
    model::{ChannelRef, DiscreteChannelSpec, Keyframe},
    store::OrderedTrack,
};

/// Two palette entries and how far to mix from `prev_index` toward
/// `next_index`. A weight of `1.0` means `next_index` is used as is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DiscreteSelection {
    pub prev_index: i32,
    pub next_index: i32,
    pub weight: f64,
}

impl DiscreteSelection {
    #[must_use]
    pub fn indices(&self) -> (i32, i32) {
        (self.prev_index, self.next_index)
    }
}

/// Resolves the palette indices bracketing `time`.
///
/// `prev_index` comes from the last keyframe at or before `time` and
/// `next_index` from the one after it. Past the end both come from the last
/// two keyframes; before the start both are the first keyframe's index.
#[must_use]
pub fn resolve_indices(track: &OrderedTrack<'_>, channel: usize, time: f64) -> Option<(i32, i32)> {
    let len = track.len();
    if len == 0 {
        return None;
    }
    let index_at = |position: usize| to_index(track.get(position), channel);

    let last = if time.is_nan() {
        Some(len - 1)
    } else {
        track.last_at_or_before(time)
    };
    Some(match last {
        None => (index_at(0), index_at(0)),
        Some(position) if position + 1 < len => (index_at(position), index_at(position + 1)),
        Some(_) => (index_at(len.saturating_sub(2)), index_at(len - 1)),
    })
}

/// Indices plus the eased blend weight of the same channel.
#[must_use]
pub fn resolve_selection(
    track: &OrderedTrack<'_>,
    channel: usize,
    time: f64,
) -> Option<DiscreteSelection> {
    let weight = evaluate_channel(track, channel, time, ChannelKind::Discrete)?;
    let (prev_index, next_index) = resolve_indices(track, channel, time)?;
    Some(DiscreteSelection {
        prev_index,
        next_index,
        weight,
    })
}

// `as` truncates toward zero, saturates, and maps NaN to 0.
#[allow(clippy::cast_possible_truncation)]
fn to_index(keyframe: &Keyframe, channel: usize) -> i32 {
    keyframe.value(channel).map_or(0, |value| value as i32)
}

/// Last selection computed for each selector channel by `Engine::advance`.
#[derive(Debug, Clone, Default)]
pub struct DiscreteCache {
    entries: Vec<(ChannelRef, Option<DiscreteSelection>)>,
}

impl DiscreteCache {
    #[must_use]
    pub fn new(spec: &DiscreteChannelSpec) -> Self {
        Self {
            entries: spec.iter().map(|channel| (channel, None)).collect(),
        }
    }

    #[must_use]
    pub fn get(&self, track: usize, channel: usize) -> Option<DiscreteSelection> {
        let key = ChannelRef::new(track, channel);
        self.entries
            .binary_search_by(|(entry, _)| entry.cmp(&key))
            .ok()
            .and_then(|slot| self.entries[slot].1)
    }

    pub fn store(&mut self, track: usize, channel: usize, selection: DiscreteSelection) {
        let key = ChannelRef::new(track, channel);
        if let Ok(slot) = self.entries.binary_search_by(|(entry, _)| entry.cmp(&key)) {
            self.entries[slot].1 = Some(selection);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette_track() -> Vec<Keyframe> {
        vec![
            Keyframe::new(0.0, vec![2.0]),
            Keyframe::new(10.0, vec![5.0]),
            Keyframe::new(20.0, vec![7.9]),
        ]
    }

    #[test]
    fn indices_bracket_time() {
        let keyframes = palette_track();
        let track = OrderedTrack::new(&keyframes);

        assert_eq!(resolve_indices(&track, 0, 4.0), Some((2, 5)));
        assert_eq!(resolve_indices(&track, 0, 10.0), Some((5, 7)));
        assert_eq!(resolve_indices(&track, 0, -1.0), Some((2, 2)));
    }

    #[test]
    fn past_end_collapses_to_last_two() {
        let keyframes = palette_track();
        let track = OrderedTrack::new(&keyframes);

        assert_eq!(resolve_indices(&track, 0, 25.0), Some((5, 7)));
        assert_eq!(resolve_indices(&track, 0, f64::NAN), Some((5, 7)));

        let single = vec![Keyframe::new(0.0, vec![3.0])];
        let track = OrderedTrack::new(&single);
        assert_eq!(resolve_indices(&track, 0, 9.0), Some((3, 3)));
    }

    #[test]
    fn non_finite_index_truncates_to_zero() {
        let keyframes = vec![
            Keyframe::new(0.0, vec![f64::NAN]),
            Keyframe::new(1.0, vec![-2.7]),
        ];
        let track = OrderedTrack::new(&keyframes);
        assert_eq!(resolve_indices(&track, 0, 0.5), Some((0, -2)));
    }

    #[test]
    fn cache_ignores_unknown_channels() {
        let spec = DiscreteChannelSpec::new([ChannelRef::new(4, 0)]);
        let mut cache = DiscreteCache::new(&spec);
        let selection = DiscreteSelection {
            prev_index: 1,
            next_index: 2,
            weight: 0.5,
        };

        cache.store(9, 9, selection);
        assert_eq!(cache.get(4, 0), None);
        cache.store(4, 0, selection);
        assert_eq!(cache.get(4, 0), Some(selection));
        assert_eq!(cache.get(9, 9), None);
    }
}

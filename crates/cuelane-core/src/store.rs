//! Read-only, time-ordered views over externally owned keyframe lists.

use std::borrow::Cow;

use crate::model::{Keyframe, Timeline};

/// Provider of per-track keyframe lists. Track indices outside
/// `0..track_count()` resolve to `None`.
pub trait TrackSource {
    fn track_count(&self) -> usize;

    fn keyframes(&self, track: usize) -> Option<&[Keyframe]>;
}

impl TrackSource for Timeline {
    fn track_count(&self) -> usize {
        self.tracks.len()
    }

    fn keyframes(&self, track: usize) -> Option<&[Keyframe]> {
        self.tracks.get(track).map(Vec::as_slice)
    }
}

impl TrackSource for [Vec<Keyframe>] {
    fn track_count(&self) -> usize {
        self.len()
    }

    fn keyframes(&self, track: usize) -> Option<&[Keyframe]> {
        self.get(track).map(Vec::as_slice)
    }
}

impl TrackSource for Vec<Vec<Keyframe>> {
    fn track_count(&self) -> usize {
        self.len()
    }

    fn keyframes(&self, track: usize) -> Option<&[Keyframe]> {
        self.get(track).map(Vec::as_slice)
    }
}

/// Indices into a track's sorted order. `prev == next` means there is no
/// real bracket (before the first keyframe or past the last one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bracket {
    pub prev: usize,
    pub next: usize,
}

impl Bracket {
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        self.prev == self.next
    }
}

/// A keyframe slice seen through its time order. When the slice is already
/// sorted no permutation is kept.
#[derive(Debug, Clone)]
pub struct OrderedTrack<'a> {
    keyframes: &'a [Keyframe],
    order: Option<Cow<'a, [usize]>>,
}

impl<'a> OrderedTrack<'a> {
    /// Borrows `scratch` as the permutation when the slice needs sorting.
    /// The buffer keeps its capacity between calls.
    pub fn with_scratch(keyframes: &'a [Keyframe], scratch: &'a mut Vec<usize>) -> Self {
        if is_time_sorted(keyframes) {
            return Self {
                keyframes,
                order: None,
            };
        }
        fill_sorted_order(keyframes, scratch);
        Self {
            keyframes,
            order: Some(Cow::Borrowed(scratch.as_slice())),
        }
    }

    /// Computes the permutation on demand, allocating only for unsorted input.
    #[must_use]
    pub fn new(keyframes: &'a [Keyframe]) -> Self {
        if is_time_sorted(keyframes) {
            return Self {
                keyframes,
                order: None,
            };
        }
        let mut order = Vec::with_capacity(keyframes.len());
        fill_sorted_order(keyframes, &mut order);
        Self {
            keyframes,
            order: Some(Cow::Owned(order)),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Keyframe at `position` in time order.
    #[must_use]
    pub fn get(&self, position: usize) -> &'a Keyframe {
        let keyframes = self.keyframes;
        let index = self
            .order
            .as_deref()
            .map_or(position, |order| order[position]);
        &keyframes[index]
    }

    /// `next` is the first keyframe strictly later than `time`; `prev` the one
    /// before it, clamped to the first. Past the end both are the last
    /// keyframe. A NaN `time` is later than nothing, so it lands past the end.
    #[must_use]
    pub fn bracket(&self, time: f64) -> Option<Bracket> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        let next = (0..len).find(|&position| self.get(position).time > time);
        Some(match next {
            Some(next) => Bracket {
                prev: next.saturating_sub(1),
                next,
            },
            None => Bracket {
                prev: len - 1,
                next: len - 1,
            },
        })
    }

    /// Position of the last keyframe with `kf.time <= time`.
    #[must_use]
    pub fn last_at_or_before(&self, time: f64) -> Option<usize> {
        (0..self.len())
            .take_while(|&position| self.get(position).time <= time)
            .last()
    }
}

fn is_time_sorted(keyframes: &[Keyframe]) -> bool {
    keyframes.is_sorted_by(|a, b| a.time.total_cmp(&b.time).is_le())
}

// Unstable sort with an index tie-break keeps authoring order for equal
// stamps without the scratch allocation a stable sort needs.
fn fill_sorted_order(keyframes: &[Keyframe], order: &mut Vec<usize>) {
    order.clear();
    order.extend(0..keyframes.len());
    order.sort_unstable_by(|&a, &b| {
        keyframes[a]
            .time
            .total_cmp(&keyframes[b].time)
            .then(a.cmp(&b))
    });
}

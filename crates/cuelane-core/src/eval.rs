//! The single evaluation routine shared by `Engine::advance` and
//! `Engine::sample`.

use crate::{
    model::Keyframe,
    store::{Bracket, OrderedTrack},
    time::{finite_or, inverse_lerp, lerp},
};

/// How a channel's keyframe values are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Magnitudes blended with relative accumulation and easing.
    Continuous,
    /// Palette indices. The numeric result is the eased blend weight.
    Discrete,
}

/// Evaluates `channel` of `track` at `time`.
///
/// Returns `None` when the track is empty or the bracketing `next` keyframe
/// does not carry the channel; callers skip dispatch in that case. The
/// returned value is always finite.
#[must_use]
pub fn evaluate_channel(
    track: &OrderedTrack<'_>,
    channel: usize,
    time: f64,
    kind: ChannelKind,
) -> Option<f64> {
    let bracket = track.bracket(time)?;
    let next = track.get(bracket.next);
    next.value(channel)?;

    match kind {
        ChannelKind::Discrete => Some(blend_weight(track, bracket, time)),
        ChannelKind::Continuous => {
            let (prev_eff, next_eff) = effective_values(track, channel, bracket);
            if bracket.is_degenerate() {
                return Some(next_eff);
            }
            let eased = blend_weight(track, bracket, time);
            Some(finite_or(lerp(prev_eff, next_eff, eased), next_eff))
        }
    }
}

/// Eased progress through the bracket, `1.0` when there is no real bracket.
#[must_use]
pub fn blend_weight(track: &OrderedTrack<'_>, bracket: Bracket, time: f64) -> f64 {
    if bracket.is_degenerate() {
        return 1.0;
    }
    let prev = track.get(bracket.prev);
    let next = track.get(bracket.next);
    let alpha = finite_or(inverse_lerp(prev.time, next.time, time).clamp(0.0, 1.0), 0.0);
    finite_or(next.curve.apply(alpha), 0.0)
}

/// `(prev_eff, next_eff)` after relative accumulation.
///
/// The running total is recomputed from the first keyframe on every call: an
/// absolute keyframe resets it to its own value, a relative one adds to it.
#[must_use]
pub fn effective_values(track: &OrderedTrack<'_>, channel: usize, bracket: Bracket) -> (f64, f64) {
    let mut total = 0.0;
    let mut before_next = 0.0;
    for position in 0..=bracket.next {
        let keyframe = track.get(position);
        let value = guarded_value(keyframe, channel);
        before_next = total;
        total = finite_or(if keyframe.relative { total + value } else { value }, 0.0);
    }

    let prev = track.get(bracket.prev);
    let next = track.get(bracket.next);
    let prev_eff = if prev.relative || next.relative {
        before_next
    } else {
        guarded_value(prev, channel)
    };
    (prev_eff, total)
}

fn guarded_value(keyframe: &Keyframe, channel: usize) -> f64 {
    keyframe
        .value(channel)
        .map_or(0.0, |value| finite_or(value, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;

    fn relative_track() -> Vec<Keyframe> {
        vec![
            Keyframe::new(0.0, vec![10.0]),
            Keyframe::new(5.0, vec![5.0]).relative(),
            Keyframe::new(10.0, vec![5.0]).relative(),
        ]
    }

    #[test]
    fn relative_keyframes_accumulate_from_last_absolute() {
        let keyframes = relative_track();
        let track = OrderedTrack::new(&keyframes);

        assert_eq!(
            effective_values(&track, 0, Bracket { prev: 1, next: 2 }),
            (15.0, 20.0)
        );
        assert_eq!(
            effective_values(&track, 0, Bracket { prev: 0, next: 1 }),
            (10.0, 15.0)
        );
    }

    #[test]
    fn absolute_keyframe_resets_running_total() {
        let keyframes = vec![
            Keyframe::new(0.0, vec![1.0]).relative(),
            Keyframe::new(1.0, vec![2.0]).relative(),
            Keyframe::new(2.0, vec![50.0]),
            Keyframe::new(3.0, vec![4.0]).relative(),
        ];
        let track = OrderedTrack::new(&keyframes);

        assert_eq!(
            effective_values(&track, 0, Bracket { prev: 2, next: 3 }),
            (50.0, 54.0)
        );
        assert_eq!(
            effective_values(&track, 0, Bracket { prev: 1, next: 2 }),
            (3.0, 50.0)
        );
    }

    #[test]
    fn eased_blend_uses_the_next_keyframe_curve() {
        let keyframes = vec![
            Keyframe::new(0.0, vec![0.0]),
            Keyframe::new(10.0, vec![100.0]).with_curve(Easing::InQuad),
        ];
        let track = OrderedTrack::new(&keyframes);

        let value = evaluate_channel(&track, 0, 5.0, ChannelKind::Continuous);
        assert_eq!(value, Some(25.0));
    }

    #[test]
    fn missing_channel_is_skipped() {
        let keyframes = vec![Keyframe::new(0.0, vec![1.0])];
        let track = OrderedTrack::new(&keyframes);

        assert_eq!(evaluate_channel(&track, 3, 0.0, ChannelKind::Continuous), None);
    }

    #[test]
    fn discrete_channel_reports_blend_weight() {
        let keyframes = vec![Keyframe::new(0.0, vec![2.0]), Keyframe::new(10.0, vec![5.0])];
        let track = OrderedTrack::new(&keyframes);

        assert_eq!(evaluate_channel(&track, 0, 4.0, ChannelKind::Discrete), Some(0.4));
        assert_eq!(evaluate_channel(&track, 0, 12.0, ChannelKind::Discrete), Some(1.0));
    }
}

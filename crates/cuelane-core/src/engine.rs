use glam::DVec2;
use thiserror::Error;
use tracing::{debug, info, instrument, trace};

use crate::{
    config::CuelaneConfig,
    discrete::{DiscreteCache, DiscreteSelection, resolve_selection},
    dispatch::DispatchTable,
    eval::{ChannelKind, evaluate_channel},
    model::DiscreteChannelSpec,
    offsets::OffsetGrid,
    shake::{ShakeConfig, ShakeDriver, ShakeSequence},
    store::{OrderedTrack, TrackSource},
    time::finite_or,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("dispatch table has no channels")]
    EmptyDispatchTable,
    #[error("discrete channel ({track}, {channel}) is outside the dispatch table")]
    DiscreteChannelOutOfRange { track: usize, channel: usize },
}

/// Per-timeline evaluation state: one engine drives one timeline.
#[derive(Debug)]
pub struct Engine {
    dispatch: DispatchTable,
    discrete: DiscreteChannelSpec,
    selections: DiscreteCache,
    offsets: OffsetGrid,
    last_values: Vec<Vec<Option<f64>>>,
    order_scratch: Vec<Vec<usize>>,
    shake: ShakeDriver,
    last_time: Option<f64>,
}

impl Engine {
    #[instrument(skip_all, fields(tracks = dispatch.track_count(), sinks = dispatch.sink_count(), discrete = discrete.len()))]
    pub fn new(
        dispatch: DispatchTable,
        discrete: DiscreteChannelSpec,
        shake: ShakeConfig,
    ) -> Result<Self, EngineError> {
        if dispatch.shape().all(|channels| channels == 0) {
            return Err(EngineError::EmptyDispatchTable);
        }
        if let Some(outside) = discrete
            .iter()
            .find(|channel| !dispatch.contains(channel.track, channel.channel))
        {
            return Err(EngineError::DiscreteChannelOutOfRange {
                track: outside.track,
                channel: outside.channel,
            });
        }

        let engine = Self {
            selections: DiscreteCache::new(&discrete),
            offsets: OffsetGrid::with_shape(dispatch.shape()),
            last_values: dispatch.shape().map(|channels| vec![None; channels]).collect(),
            order_scratch: vec![Vec::new(); dispatch.track_count()],
            shake: ShakeDriver::new(shake),
            last_time: None,
            dispatch,
            discrete,
        };
        info!("engine created");
        Ok(engine)
    }

    pub fn from_config(dispatch: DispatchTable, config: &CuelaneConfig) -> Result<Self, EngineError> {
        Self::new(dispatch, config.discrete.clone(), config.shake.clone())
    }

    /// Evaluates every track and channel of the dispatch table at `time`,
    /// applies offsets to continuous channels and calls every registered sink.
    ///
    /// Empty or absent tracks are skipped and their sinks keep the last value
    /// they received.
    #[instrument(level = "trace", skip(self, source))]
    pub fn advance<S: TrackSource + ?Sized>(&mut self, source: &S, time: f64) {
        let Self {
            dispatch,
            discrete,
            selections,
            offsets,
            last_values,
            order_scratch,
            ..
        } = self;

        for (track, scratch) in order_scratch.iter_mut().enumerate() {
            let channels = dispatch.channel_count(track);
            let Some(keyframes) = source.keyframes(track).filter(|keyframes| !keyframes.is_empty())
            else {
                continue;
            };
            if channels == 0 {
                continue;
            }
            let ordered = OrderedTrack::with_scratch(keyframes, scratch);

            for channel in 0..channels {
                let value = if discrete.contains(track, channel) {
                    let Some(selection) = resolve_selection(&ordered, channel, time) else {
                        continue;
                    };
                    selections.store(track, channel, selection);
                    selection.weight
                } else {
                    let Some(value) =
                        evaluate_channel(&ordered, channel, time, ChannelKind::Continuous)
                    else {
                        continue;
                    };
                    offsets.apply(track, channel, value)
                };

                let last = &mut last_values[track][channel];
                let value = finite_or(value, last.unwrap_or(0.0));
                *last = Some(value);
                dispatch.dispatch(track, channel, value);
            }
        }

        if time.is_finite() {
            self.last_time = Some(time);
        }
        trace!("advance complete");
    }

    /// Evaluates one channel exactly as [`Self::advance`] would, without
    /// offsets, sinks or any change to engine state.
    ///
    /// Selector channels yield their blend weight. `None` means the track is
    /// absent, empty, or does not carry the channel.
    #[must_use]
    pub fn sample<S: TrackSource + ?Sized>(
        &self,
        source: &S,
        track: usize,
        channel: usize,
        time: f64,
    ) -> Option<f64> {
        let keyframes = source.keyframes(track)?;
        let ordered = OrderedTrack::new(keyframes);
        evaluate_channel(&ordered, channel, time, self.channel_kind(track, channel))
    }

    #[must_use]
    pub fn channel_kind(&self, track: usize, channel: usize) -> ChannelKind {
        if self.discrete.contains(track, channel) {
            ChannelKind::Discrete
        } else {
            ChannelKind::Continuous
        }
    }

    /// Palette indices cached by the last [`Self::advance`].
    #[must_use]
    pub fn resolve_discrete(&self, track: usize, channel: usize) -> Option<(i32, i32)> {
        self.selection(track, channel).map(|selection| selection.indices())
    }

    #[must_use]
    pub fn selection(&self, track: usize, channel: usize) -> Option<DiscreteSelection> {
        self.selections.get(track, channel)
    }

    /// Stateless selector resolution at an arbitrary `time`.
    #[must_use]
    pub fn resolve_discrete_at<S: TrackSource + ?Sized>(
        &self,
        source: &S,
        track: usize,
        channel: usize,
        time: f64,
    ) -> Option<DiscreteSelection> {
        let keyframes = source.keyframes(track)?;
        resolve_selection(&OrderedTrack::new(keyframes), channel, time)
    }

    pub fn set_offset(&mut self, track: usize, channel: usize, value: f64) {
        self.offsets.set(track, channel, value);
    }

    #[must_use]
    pub fn offset(&self, track: usize, channel: usize) -> f64 {
        self.offsets.get(track, channel)
    }

    #[instrument(skip(self))]
    pub fn reset_offsets(&mut self) {
        self.offsets.reset();
        debug!("offsets reset");
    }

    #[instrument(skip(self))]
    pub fn setup_shake(&mut self) {
        self.shake.setup();
        if let Some(sequence) = self.shake.sequence() {
            info!(
                keyframes = sequence.keyframes().len(),
                length = sequence.length(),
                "shake sequence ready"
            );
        }
    }

    pub fn sample_shake(&mut self, delta: f64, speed: f64, smoothness: f64) -> DVec2 {
        self.shake.sample(delta, speed, smoothness)
    }

    /// Advances the shake clock by the time elapsed since the previous call.
    pub fn sample_shake_at(&mut self, time: f64, speed: f64, smoothness: f64) -> DVec2 {
        self.shake.sample_at(time, speed, smoothness)
    }

    pub fn set_clip_length(&mut self, clip_length: f64) {
        self.shake.set_clip_length(clip_length);
    }

    #[must_use]
    pub fn shake_sequence(&self) -> Option<&ShakeSequence> {
        self.shake.sequence()
    }

    #[must_use]
    pub fn last_shake(&self) -> DVec2 {
        self.shake.last_sample()
    }

    /// Last finite time passed to [`Self::advance`].
    #[must_use]
    pub fn last_time(&self) -> Option<f64> {
        self.last_time
    }

    /// Value most recently dispatched for `(track, channel)`.
    #[must_use]
    pub fn last_value(&self, track: usize, channel: usize) -> Option<f64> {
        self.last_values.get(track)?.get(channel).copied().flatten()
    }

    #[must_use]
    pub fn dispatch_table(&self) -> &DispatchTable {
        &self.dispatch
    }

    #[must_use]
    pub fn discrete_spec(&self) -> &DiscreteChannelSpec {
        &self.discrete
    }
}

//! Binds `(track, channel)` outputs to caller-supplied sinks.

use std::fmt;

/// Receives one channel's final value each `advance`.
pub type Sink = Box<dyn FnMut(f64)>;

/// Fixed table of optional sinks. Its shape defines the channel count of
/// every track for the engine's lifetime.
#[derive(Default)]
pub struct DispatchTable {
    tracks: Vec<Vec<Option<Sink>>>,
}

impl DispatchTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with `shape[track]` channels per track and no sinks yet.
    #[must_use]
    pub fn with_shape(shape: impl IntoIterator<Item = usize>) -> Self {
        Self {
            tracks: shape
                .into_iter()
                .map(|channels| std::iter::repeat_with(|| None).take(channels).collect())
                .collect(),
        }
    }

    /// Registers `sink`, growing the table to cover `(track, channel)`.
    pub fn register(&mut self, track: usize, channel: usize, sink: impl FnMut(f64) + 'static) {
        if self.tracks.len() <= track {
            self.tracks.resize_with(track + 1, Vec::new);
        }
        let channels = &mut self.tracks[track];
        if channels.len() <= channel {
            channels.resize_with(channel + 1, || None);
        }
        channels[channel] = Some(Box::new(sink));
    }

    #[must_use]
    pub fn with_sink(
        mut self,
        track: usize,
        channel: usize,
        sink: impl FnMut(f64) + 'static,
    ) -> Self {
        self.register(track, channel, sink);
        self
    }

    #[must_use]
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn channel_count(&self, track: usize) -> usize {
        self.tracks.get(track).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn contains(&self, track: usize, channel: usize) -> bool {
        channel < self.channel_count(track)
    }

    #[must_use]
    pub fn sink_count(&self) -> usize {
        self.tracks.iter().flatten().filter(|sink| sink.is_some()).count()
    }

    pub fn shape(&self) -> impl Iterator<Item = usize> + '_ {
        self.tracks.iter().map(Vec::len)
    }

    /// Calls the sink for `(track, channel)` if one is registered.
    pub fn dispatch(&mut self, track: usize, channel: usize, value: f64) -> bool {
        match self
            .tracks
            .get_mut(track)
            .and_then(|channels| channels.get_mut(channel))
        {
            Some(Some(sink)) => {
                sink(value);
                true
            }
            _ => false,
        }
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("shape", &self.shape().collect::<Vec<_>>())
            .field("sinks", &self.sink_count())
            .finish()
    }
}

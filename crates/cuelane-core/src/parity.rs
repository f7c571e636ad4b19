use std::{cell::RefCell, fs, path::Path, rc::Rc};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{instrument, warn};

use crate::{
    dispatch::DispatchTable,
    engine::Engine,
    model::{DiscreteChannelSpec, Timeline},
    shake::ShakeConfig,
    time::frames_to_seconds,
};

const PARITY_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParityReport {
    pub schema_version: u32,
    pub title: String,
    pub track_count: usize,
    pub keyframe_count: usize,
    pub frame_count: u64,
    pub dispatch_count: usize,
    /// Dispatched values that differ bit-wise from `Engine::sample`.
    pub sample_mismatches: usize,
    pub values_hash: String,
}

type Recorded = Rc<RefCell<Vec<(usize, usize, f64)>>>;

/// Drives `timeline` frame by frame through `Engine::advance`, checks each
/// dispatched value against `Engine::sample`, and fingerprints the stream.
#[instrument(skip(timeline, discrete), fields(title = %timeline.title))]
pub fn generate_parity_report(
    timeline: &Timeline,
    discrete: &DiscreteChannelSpec,
    fps: f64,
    frame_count: u64,
) -> Result<ParityReport> {
    let recorded: Recorded = Rc::default();
    let mut dispatch = DispatchTable::new();
    for (track, channels) in timeline.channel_shape().into_iter().enumerate() {
        for channel in 0..channels {
            let recorded = Rc::clone(&recorded);
            dispatch.register(track, channel, move |value| {
                recorded.borrow_mut().push((track, channel, value));
            });
        }
    }

    let mut engine = Engine::new(dispatch, discrete.clone(), ShakeConfig::default())
        .context("failed to build engine for parity run")?;

    let mut hasher = Sha256::new();
    let mut dispatch_count = 0;
    let mut sample_mismatches = 0;
    for frame in 0..frame_count {
        let time = frames_to_seconds(frame, fps);
        engine.advance(timeline, time);

        for (track, channel, value) in recorded.borrow_mut().drain(..) {
            dispatch_count += 1;
            let sampled = engine.sample(timeline, track, channel, time);
            if sampled.map(f64::to_bits) != Some(value.to_bits()) {
                sample_mismatches += 1;
                warn!(frame, track, channel, value, ?sampled, "advance/sample divergence");
            }
            hasher.update(frame.to_le_bytes());
            hasher.update(value.to_le_bytes());
        }
    }

    Ok(ParityReport {
        schema_version: PARITY_SCHEMA_VERSION,
        title: timeline.title.clone(),
        track_count: timeline.tracks.len(),
        keyframe_count: timeline.keyframe_count(),
        frame_count,
        dispatch_count,
        sample_mismatches,
        values_hash: format!("{:x}", hasher.finalize()),
    })
}

pub fn read_parity_report(path: &Path) -> Result<ParityReport> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read parity report: {}", path.display()))?;
    let report: ParityReport =
        serde_json::from_slice(&bytes).context("failed to parse parity report json")?;
    Ok(report)
}

pub fn write_parity_report(path: &Path, report: &ParityReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parity directory: {}", parent.display()))?;
    }

    let json = serde_json::to_vec_pretty(report).context("failed to encode parity report json")?;
    fs::write(path, json)
        .with_context(|| format!("failed to write parity report: {}", path.display()))?;
    Ok(())
}

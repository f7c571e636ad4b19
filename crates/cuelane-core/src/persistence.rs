use std::{fs, io::Write, path::Path};

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::model::Timeline;

#[instrument(skip(timeline), fields(title = %timeline.title, path = %path.display()))]
pub fn save_timeline(path: &Path, timeline: &Timeline) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }

    let json = serde_json::to_vec_pretty(timeline).context("failed to serialize timeline")?;
    let mut temp_file = tempfile::NamedTempFile::new_in(
        path.parent()
            .map_or_else(|| Path::new(".").to_path_buf(), Path::to_path_buf),
    )
    .context("failed to create temp timeline file")?;

    temp_file
        .write_all(&json)
        .context("failed to write temp timeline file")?;
    temp_file
        .persist(path)
        .map_err(|error| anyhow::anyhow!(error.error))
        .with_context(|| format!("failed to persist timeline: {}", path.display()))?;

    info!("timeline saved");
    Ok(())
}

#[instrument(fields(path = %path.display()))]
pub fn load_timeline(path: &Path) -> Result<Timeline> {
    let content =
        fs::read(path).with_context(|| format!("failed to read timeline: {}", path.display()))?;
    let timeline: Timeline = serde_json::from_slice(&content).context("invalid timeline json")?;
    info!(
        title = %timeline.title,
        tracks = timeline.tracks.len(),
        keyframes = timeline.keyframe_count(),
        "timeline loaded"
    );
    Ok(timeline)
}

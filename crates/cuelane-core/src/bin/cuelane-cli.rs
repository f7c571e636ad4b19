use std::{cell::RefCell, fs, io::Write, path::PathBuf, rc::Rc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use cuelane_core::{
    CuelaneConfig, DiscreteSelection, DispatchTable, Engine, Timeline,
    diagnostics::init_tracing_from_config,
    fixtures::{demo_discrete_spec, demo_timeline},
    generate_parity_report,
    parity::write_parity_report,
    persistence::{load_timeline, save_timeline},
    time::{frames_to_seconds, seconds_to_frames},
};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "cuelane-cli")]
#[command(about = "Headless tools for sampling and checking keyframe timelines")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Evaluate a timeline frame by frame and dump every dispatched value.
    Sample {
        /// Timeline JSON; the built-in demo when omitted.
        #[arg(long)]
        timeline: Option<PathBuf>,

        #[arg(long)]
        fps: Option<f64>,

        #[arg(long, default_value_t = 1.0)]
        shake_speed: f64,

        #[arg(long, default_value_t = 0.0)]
        shake_smoothness: f64,

        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write the built-in demo timeline as JSON.
    DemoTimeline {
        #[arg(long, default_value = "data/demo.cuelane.json")]
        output: PathBuf,
    },
    ParityReport {
        #[arg(long)]
        timeline: Option<PathBuf>,

        #[arg(long, default_value = "data/parity/report.json")]
        output: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct FrameDump {
    frame: u64,
    time: f64,
    values: Vec<ChannelValue>,
    selections: Vec<SelectionDump>,
    shake: [f64; 2],
}

#[derive(Debug, Serialize)]
struct ChannelValue {
    track: usize,
    channel: usize,
    value: f64,
}

#[derive(Debug, Serialize)]
struct SelectionDump {
    track: usize,
    channel: usize,
    #[serde(flatten)]
    selection: DiscreteSelection,
}

fn load_or_demo(path: Option<&PathBuf>) -> anyhow::Result<Timeline> {
    path.map_or_else(|| Ok(demo_timeline()), |path| load_timeline(path))
}

fn sample_timeline(
    timeline: &Timeline,
    config: &CuelaneConfig,
    fps: f64,
    shake_speed: f64,
    shake_smoothness: f64,
) -> anyhow::Result<Vec<FrameDump>> {
    let recorded: Rc<RefCell<Vec<ChannelValue>>> = Rc::default();
    let mut dispatch = DispatchTable::new();
    for (track, channels) in timeline.channel_shape().into_iter().enumerate() {
        for channel in 0..channels {
            let recorded = Rc::clone(&recorded);
            dispatch.register(track, channel, move |value| {
                recorded.borrow_mut().push(ChannelValue {
                    track,
                    channel,
                    value,
                });
            });
        }
    }

    let mut engine = Engine::from_config(dispatch, config)?;
    engine.setup_shake();

    let end_time = timeline.end_time() + config.sampling.tail_seconds.max(0.0);
    let frame_count = seconds_to_frames(end_time, fps) + 1;
    let mut frames = Vec::new();
    for frame in 0..frame_count {
        let time = frames_to_seconds(frame, fps);
        engine.advance(timeline, time);
        let shake = engine.sample_shake_at(time, shake_speed, shake_smoothness);
        let selections = engine
            .discrete_spec()
            .iter()
            .filter_map(|channel| {
                engine
                    .selection(channel.track, channel.channel)
                    .map(|selection| SelectionDump {
                        track: channel.track,
                        channel: channel.channel,
                        selection,
                    })
            })
            .collect();
        frames.push(FrameDump {
            frame,
            time,
            values: recorded.borrow_mut().drain(..).collect(),
            selections,
            shake: shake.to_array(),
        });
    }
    Ok(frames)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = CuelaneConfig::load_or_default()?;
    if let Some(log_dir) = cli.log_dir {
        config.diagnostics.logs_dir = log_dir;
    }
    let _telemetry = init_tracing_from_config(&config.diagnostics)?;

    match cli.command {
        Commands::Sample {
            timeline,
            fps,
            shake_speed,
            shake_smoothness,
            output,
        } => {
            let timeline_path = timeline;
            let timeline = load_or_demo(timeline_path.as_ref())?;
            if timeline_path.is_none() && config.discrete.is_empty() {
                config.discrete = demo_discrete_spec();
            }
            let fps = fps.unwrap_or(config.sampling.fps);
            let frames = sample_timeline(&timeline, &config, fps, shake_speed, shake_smoothness)?;
            let json = serde_json::to_vec_pretty(&frames).context("failed to encode frames")?;

            match output {
                Some(path) => fs::write(&path, json)
                    .with_context(|| format!("failed to write frames: {}", path.display()))?,
                None => std::io::stdout()
                    .write_all(&json)
                    .context("failed to write frames to stdout")?,
            }
            tracing::info!(frames = frames.len(), "timeline sampled");
        }
        Commands::DemoTimeline { output } => {
            save_timeline(&output, &demo_timeline())?;
        }
        Commands::ParityReport { timeline, output } => {
            let discrete = if timeline.is_none() && config.discrete.is_empty() {
                demo_discrete_spec()
            } else {
                config.discrete.clone()
            };
            let timeline = load_or_demo(timeline.as_ref())?;
            let fps = config.sampling.fps;
            let frame_count =
                seconds_to_frames(timeline.end_time() + config.sampling.tail_seconds, fps) + 1;
            let report = generate_parity_report(&timeline, &discrete, fps, frame_count)?;
            write_parity_report(&output, &report)?;
            tracing::info!(
                path = %output.display(),
                mismatches = report.sample_mismatches,
                "parity report generated"
            );
        }
    }

    Ok(())
}

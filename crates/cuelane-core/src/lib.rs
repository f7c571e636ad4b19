pub mod config;
pub mod diagnostics;
pub mod discrete;
pub mod dispatch;
pub mod easing;
pub mod engine;
pub mod eval;
pub mod fixtures;
pub mod model;
pub mod offsets;
pub mod parity;
pub mod persistence;
pub mod shake;
pub mod store;
pub mod time;

pub use config::CuelaneConfig;
pub use diagnostics::{
    TelemetryGuard, init_tracing, init_tracing_from_config, init_tracing_with_options,
};
pub use discrete::DiscreteSelection;
pub use dispatch::{DispatchTable, Sink};
pub use easing::Easing;
pub use engine::{Engine, EngineError};
pub use eval::ChannelKind;
pub use glam::DVec2;
pub use model::{ChannelRef, DiscreteChannelSpec, Keyframe, Timeline};
pub use parity::{ParityReport, generate_parity_report};
pub use shake::{ShakeConfig, ShakeKeyframe, ShakeSequence};
pub use store::TrackSource;

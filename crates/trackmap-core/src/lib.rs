pub mod columns;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod run;
pub mod timestamps;

pub use config::Config;
pub use error::{ConfigError, ParameterError, PipelineError, RenderError, RunError, SourceError};
pub use model::{RawSample, RunParameters, TimeWindow, TrackPoint, TrackSequence};
pub use pipeline::{build_track_sequence, build_track_sequence_with_report, PipelineReport};
pub use render::{render_artifact, render_document, RenderOptions};
pub use run::{execute, RunRequest, RunSummary};

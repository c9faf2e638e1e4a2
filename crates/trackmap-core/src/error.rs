// crates/trackmap-core/src/error.rs

use std::path::PathBuf;

use chrono::NaiveDateTime;
use thiserror::Error;
use trackmap_parser::ParserError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid window: start {start} is after end {end}")]
    InvalidWindow {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("no track points between {start} and {end}")]
    EmptyResult {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

#[derive(Error, Debug)]
pub enum ParameterError {
    #[error("invalid window: start {start} must be strictly before end {end}")]
    InvalidWindow {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("animation interval must be between 1 and 9999 ms, got {interval_ms}")]
    InvalidInterval { interval_ms: u32 },
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8 text", path.display())]
    NotUtf8 { path: PathBuf },

    #[error("failed to parse table: {0}")]
    Parse(#[from] ParserError),

    #[error("column '{column}' not found; available columns: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("row {row_index}: column '{column}' value '{value}' is not a valid coordinate")]
    InvalidCoordinate {
        row_index: usize,
        column: String,
        value: String,
    },

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("template error: {message}")]
    Template { message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything that can end a run without producing an artifact.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("start time must be before end time (got {start} to {end})")]
    InvalidWindow {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("animation interval must be between 1 and 9999 ms, got {interval_ms}")]
    InvalidInterval { interval_ms: u32 },

    #[error("no track points between {start} and {end}")]
    EmptyResult {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("source read failed: {0}")]
    SourceRead(#[from] SourceError),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}

impl From<PipelineError> for RunError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidWindow { start, end } => RunError::InvalidWindow { start, end },
            PipelineError::EmptyResult { start, end } => RunError::EmptyResult { start, end },
        }
    }
}

impl From<ParameterError> for RunError {
    fn from(err: ParameterError) -> Self {
        match err {
            ParameterError::InvalidWindow { start, end } => RunError::InvalidWindow { start, end },
            ParameterError::InvalidInterval { interval_ms } => {
                RunError::InvalidInterval { interval_ms }
            }
        }
    }
}

impl RunError {
    /// True for errors caused by user input that a new attempt with different parameters can fix.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RunError::InvalidWindow { .. }
                | RunError::InvalidInterval { .. }
                | RunError::EmptyResult { .. }
        )
    }
}

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::columns::extract_samples;
use crate::config::Config;
use crate::error::RunError;
use crate::ingestion::load_source;
use crate::model::RunParameters;
use crate::pipeline::{build_track_sequence_with_report, PipelineReport};
use crate::render::render_artifact_with;

/// One fully validated run: where to read, where to write, and with which parameters.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    pub parameters: RunParameters,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub source_hash: String,
    pub point_count: usize,
    pub report: PipelineReport,
}

/// Load, filter and render. Any error ends the run before the output file is touched, except a
/// failed write, which leaves any previous file in place.
pub fn execute(request: &RunRequest, config: &Config) -> Result<RunSummary, RunError> {
    let source = load_source(&request.source_path)?;
    let samples = extract_samples(&source.table, &config.columns)?;

    let window = request.parameters.window();
    let (sequence, report) =
        build_track_sequence_with_report(&samples, window.start, window.end)?;

    render_artifact_with(
        &sequence,
        &request.parameters,
        &config.render_options(),
        &request.output_path,
    )?;

    info!(
        source = %request.source_path.display(),
        output = %request.output_path.display(),
        window = %window,
        points = sequence.len(),
        "run finished"
    );

    Ok(RunSummary {
        output_path: request.output_path.clone(),
        source_hash: source.hash,
        point_count: sequence.len(),
        report,
    })
}

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::model::{RawSample, TrackPoint, TrackSequence};
use crate::timestamps::{format_display, parse_timestamp};

/// Row counts from one pipeline pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub total_rows: usize,
    pub unparseable_timestamps: usize,
    pub outside_window: usize,
    pub invalid_coordinates: usize,
    pub retained: usize,
}

pub fn build_track_sequence(
    samples: &[RawSample],
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
) -> Result<TrackSequence, PipelineError> {
    build_track_sequence_with_report(samples, window_start, window_end)
        .map(|(sequence, _)| sequence)
}

/// Turns raw rows into an ordered, filtered, rank-annotated track.
///
/// Rows whose start time is missing or unparseable are dropped and counted rather than failing
/// the run. A window with `start == end` is processed as a single instant.
pub fn build_track_sequence_with_report(
    samples: &[RawSample],
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
) -> Result<(TrackSequence, PipelineReport), PipelineError> {
    if window_start > window_end {
        return Err(PipelineError::InvalidWindow {
            start: window_start,
            end: window_end,
        });
    }

    let mut report = PipelineReport {
        total_rows: samples.len(),
        ..PipelineReport::default()
    };

    let mut first_unparseable = None;
    let mut timed: Vec<(NaiveDateTime, &RawSample)> = Vec::with_capacity(samples.len());
    for sample in samples {
        match sample.start_time.as_deref().and_then(parse_timestamp) {
            Some(ts) => timed.push((ts, sample)),
            None => {
                report.unparseable_timestamps += 1;
                first_unparseable.get_or_insert(sample.row_index);
            }
        }
    }
    if let Some(first_row) = first_unparseable {
        warn!(
            dropped = report.unparseable_timestamps,
            first_row, "dropping rows with missing or unparseable start time"
        );
    }

    // sort_by_key is stable: equal timestamps keep source order
    timed.sort_by_key(|(ts, _)| *ts);

    let mut kept: Vec<(NaiveDateTime, f64, f64)> = Vec::with_capacity(timed.len());
    for (ts, sample) in timed {
        if ts < window_start || ts > window_end {
            report.outside_window += 1;
            continue;
        }
        match usable_coordinates(sample) {
            Some((longitude, latitude)) => kept.push((ts, longitude, latitude)),
            None => report.invalid_coordinates += 1,
        }
    }

    report.retained = kept.len();
    debug!(?report, "pipeline filtering finished");

    let points = annotate(kept);
    let sequence = TrackSequence::from_points(points).ok_or(PipelineError::EmptyResult {
        start: window_start,
        end: window_end,
    })?;

    Ok((sequence, report))
}

/// `None` for a null/NaN coordinate or the `(0, 0)` "no fix" sentinel.
fn usable_coordinates(sample: &RawSample) -> Option<(f64, f64)> {
    let longitude = sample.longitude.filter(|v| !v.is_nan())?;
    let latitude = sample.latitude.filter(|v| !v.is_nan())?;
    if longitude == 0.0 && latitude == 0.0 {
        return None;
    }
    Some((longitude, latitude))
}

fn annotate(kept: Vec<(NaiveDateTime, f64, f64)>) -> Vec<TrackPoint> {
    let mut seen: HashMap<(u64, u64), usize> = HashMap::new();
    kept.into_iter()
        .map(|(start_time, longitude, latitude)| {
            let count = seen.entry(coordinate_key(longitude, latitude)).or_insert(0);
            let duplicate_rank = *count;
            *count += 1;
            TrackPoint {
                start_time,
                longitude,
                latitude,
                start_time_display: format_display(&start_time),
                duplicate_rank,
            }
        })
        .collect()
}

/// Bit-exact key; adding 0.0 folds -0.0 into 0.0.
fn coordinate_key(longitude: f64, latitude: f64) -> (u64, u64) {
    ((longitude + 0.0).to_bits(), (latitude + 0.0).to_bits())
}

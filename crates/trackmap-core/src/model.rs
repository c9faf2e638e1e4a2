use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::ParameterError;
use crate::timestamps::format_display;

/// Exclusive upper bound for the per-point animation interval.
pub const MAX_ANIMATION_INTERVAL_MS: u32 = 10_000;

/// One source row after column mapping. Cells are kept as found; validation happens in the
/// pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub row_index: usize,
    pub start_time: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

impl RawSample {
    pub fn new(
        row_index: usize,
        start_time: Option<&str>,
        longitude: Option<f64>,
        latitude: Option<f64>,
    ) -> Self {
        Self {
            row_index,
            start_time: start_time.map(str::to_string),
            longitude,
            latitude,
        }
    }
}

/// Closed interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, ParameterError> {
        if start >= end {
            return Err(ParameterError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        self.start <= *timestamp && *timestamp <= self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            format_display(&self.start),
            format_display(&self.end)
        )
    }
}

/// A validated point. Serializes to the record shape consumed by the viewer script:
/// `{"longitude", "latitude", "startTime", "duplicateRank"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPoint {
    #[serde(skip)]
    pub start_time: NaiveDateTime,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(rename = "startTime")]
    pub start_time_display: String,
    pub duplicate_rank: usize,
}

/// Ordered, non-empty sequence of track points. Only the pipeline constructs one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TrackSequence {
    points: Vec<TrackPoint>,
}

impl TrackSequence {
    pub(crate) fn from_points(points: Vec<TrackPoint>) -> Option<Self> {
        if points.is_empty() {
            None
        } else {
            Some(Self { points })
        }
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn first(&self) -> &TrackPoint {
        &self.points[0]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackPoint> {
        self.points.iter()
    }

    pub fn into_points(self) -> Vec<TrackPoint> {
        self.points
    }
}

impl<'a> IntoIterator for &'a TrackSequence {
    type Item = &'a TrackPoint;
    type IntoIter = std::slice::Iter<'a, TrackPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Caller-supplied settings for one run. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RunParameters {
    map_api_key: String,
    animation_interval_ms: u32,
    display_label: String,
    window: TimeWindow,
}

impl RunParameters {
    pub fn new(
        map_api_key: impl Into<String>,
        animation_interval_ms: u32,
        display_label: impl Into<String>,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> Result<Self, ParameterError> {
        let window = TimeWindow::new(window_start, window_end)?;
        validate_interval(animation_interval_ms)?;
        Ok(Self {
            map_api_key: map_api_key.into(),
            animation_interval_ms,
            display_label: display_label.into(),
            window,
        })
    }

    pub fn map_api_key(&self) -> &str {
        &self.map_api_key
    }

    pub fn animation_interval_ms(&self) -> u32 {
        self.animation_interval_ms
    }

    pub fn display_label(&self) -> &str {
        &self.display_label
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }
}

pub fn validate_interval(interval_ms: u32) -> Result<u32, ParameterError> {
    if interval_ms == 0 || interval_ms >= MAX_ANIMATION_INTERVAL_MS {
        return Err(ParameterError::InvalidInterval { interval_ms });
    }
    Ok(interval_ms)
}

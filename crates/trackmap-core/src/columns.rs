use polars::prelude::*;
use serde::{Deserialize, Serialize};
use trackmap_parser::SampleTable;

use crate::error::SourceError;
use crate::model::RawSample;

/// Names of the source columns holding each required field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnMapping {
    pub start_time: String,
    pub longitude: String,
    pub latitude: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            start_time: "start_time".to_string(),
            longitude: "longitude".to_string(),
            latitude: "latitude".to_string(),
        }
    }
}

/// Pulls the mapped columns out of a parsed table, one `RawSample` per row.
///
/// Timestamps stay as raw text. Coordinates are parsed here: empty, `nan` and `null` cells
/// become `None`, anything else that is not a finite number fails the whole table.
pub fn extract_samples(
    table: &SampleTable,
    mapping: &ColumnMapping,
) -> Result<Vec<RawSample>, SourceError> {
    let start_times = text_column(table, &mapping.start_time)?;
    let longitudes = text_column(table, &mapping.longitude)?;
    let latitudes = text_column(table, &mapping.latitude)?;

    let mut samples = Vec::with_capacity(table.height());
    for idx in 0..table.height() {
        samples.push(RawSample {
            row_index: idx,
            start_time: start_times.get(idx).map(str::to_string),
            longitude: parse_coordinate(longitudes.get(idx), idx, &mapping.longitude)?,
            latitude: parse_coordinate(latitudes.get(idx), idx, &mapping.latitude)?,
        });
    }

    Ok(samples)
}

fn text_column<'a>(table: &'a SampleTable, name: &str) -> Result<&'a StringChunked, SourceError> {
    if !table.has_column(name) {
        return Err(SourceError::MissingColumn {
            column: name.to_string(),
            available: table.columns.clone(),
        });
    }
    Ok(table.df.column(name)?.str()?)
}

fn parse_coordinate(
    cell: Option<&str>,
    row_index: usize,
    column: &str,
) -> Result<Option<f64>, SourceError> {
    let Some(raw) = cell.map(str::trim) else {
        return Ok(None);
    };
    if raw.is_empty()
        || raw.eq_ignore_ascii_case("nan")
        || raw.eq_ignore_ascii_case("null")
        || raw.eq_ignore_ascii_case("none")
    {
        return Ok(None);
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(SourceError::InvalidCoordinate {
            row_index,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_cells() {
        assert_eq!(parse_coordinate(None, 0, "lon").unwrap(), None);
        assert_eq!(parse_coordinate(Some(" NaN "), 0, "lon").unwrap(), None);
        assert_eq!(parse_coordinate(Some("null"), 0, "lon").unwrap(), None);
        assert_eq!(parse_coordinate(Some("116.5"), 0, "lon").unwrap(), Some(116.5));
        assert_eq!(parse_coordinate(Some("-0"), 0, "lon").unwrap(), Some(-0.0));

        let err = parse_coordinate(Some("east"), 7, "lon").unwrap_err();
        assert!(matches!(
            err,
            SourceError::InvalidCoordinate { row_index: 7, .. }
        ));
        assert!(parse_coordinate(Some("inf"), 0, "lon").is_err());
    }
}

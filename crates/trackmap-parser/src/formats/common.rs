use std::collections::HashSet;

use csv::StringRecord;
use polars::prelude::*;

use crate::errors::ParserError;

pub(crate) fn validate_header(
    parser: &'static str,
    header: &StringRecord,
) -> Result<Vec<String>, ParserError> {
    if header.len() < 2 {
        return Err(ParserError::FormatMismatch {
            parser,
            reason: format!("expected at least 2 header fields, found {}", header.len()),
        });
    }

    let mut seen = HashSet::with_capacity(header.len());
    let mut columns = Vec::with_capacity(header.len());
    for (position, raw) in header.iter().enumerate() {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ParserError::InvalidHeader {
                parser,
                message: format!("column {} has an empty name", position + 1),
            });
        }
        if !seen.insert(name) {
            return Err(ParserError::InvalidHeader {
                parser,
                message: format!("duplicate column name '{name}'"),
            });
        }
        columns.push(name.to_string());
    }

    Ok(columns)
}

pub(crate) fn clean_cell(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) fn build_string_frame(
    parser: &'static str,
    columns: &[String],
    values: Vec<Vec<Option<String>>>,
) -> Result<DataFrame, ParserError> {
    if columns.len() != values.len() {
        return Err(ParserError::Frame {
            parser,
            message: format!(
                "header had {} columns but {} value vectors were collected",
                columns.len(),
                values.len()
            ),
        });
    }

    let mut cols: Vec<Column> = Vec::with_capacity(columns.len());
    for (name, data) in columns.iter().zip(values.iter()) {
        let utf8: Vec<Option<&str>> = data.iter().map(|v| v.as_deref()).collect();
        cols.push(Series::new(name.as_str().into(), utf8).into());
    }

    DataFrame::new(cols).map_err(|err| ParserError::Frame {
        parser,
        message: format!("failed to build sample dataframe: {err}"),
    })
}

use csv::{ReaderBuilder, StringRecord};

use crate::errors::ParserError;
use crate::model::SampleTable;

use super::{build_string_frame, clean_cell, validate_header};

/// Reads a header row plus data rows split on a single-byte delimiter.
#[derive(Debug, Clone, Copy)]
pub struct DelimitedParser {
    pub(crate) name: &'static str,
    delimiter: u8,
}

pub const COMMA: DelimitedParser = DelimitedParser::new("CSV_COMMA", b',');
pub const SEMICOLON: DelimitedParser = DelimitedParser::new("CSV_SEMICOLON", b';');
pub const TAB: DelimitedParser = DelimitedParser::new("TSV", b'\t');

impl DelimitedParser {
    pub const fn new(name: &'static str, delimiter: u8) -> Self {
        Self { name, delimiter }
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub(crate) fn parse_content(&self, content: &str) -> Result<SampleTable, ParserError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut records = reader.records();
        let header = match records.next() {
            Some(record) => record.map_err(|source| self.csv_error(source))?,
            None => return Err(ParserError::EmptyData),
        };
        let columns = validate_header(self.name, &header)?;

        let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); columns.len()];
        for (row_offset, record) in records.enumerate() {
            let record = record.map_err(|source| self.csv_error(source))?;
            let line = line_of(&record).unwrap_or(row_offset + 2);
            if record.len() != columns.len() {
                return Err(ParserError::DataRow {
                    parser: self.name,
                    line,
                    message: format!(
                        "expected {} fields, found {}",
                        columns.len(),
                        record.len()
                    ),
                });
            }
            for (column, cell) in values.iter_mut().zip(record.iter()) {
                column.push(clean_cell(cell));
            }
        }

        let df = build_string_frame(self.name, &columns, values)?;
        Ok(SampleTable {
            parser: self.name,
            columns,
            df,
        })
    }

    fn csv_error(&self, source: csv::Error) -> ParserError {
        ParserError::Csv {
            parser: self.name,
            source,
        }
    }
}

fn line_of(record: &StringRecord) -> Option<usize> {
    record.position().map(|position| position.line() as usize)
}

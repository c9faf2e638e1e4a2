use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, DataType, Reader, Xlsx, XlsxError};
use chrono::SubsecRound;
use csv::StringRecord;

use crate::errors::ParserError;
use crate::formats::{build_string_frame, clean_cell, validate_header};
use crate::model::SampleTable;

const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";
const CELL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reads the first worksheet of an XLSX workbook into the same string frame the delimited
/// parsers produce. Date-formatted cells become `YYYY-MM-DD HH:MM:SS` text.
#[derive(Debug, Clone, Copy)]
pub struct WorkbookParser {
    pub(crate) name: &'static str,
}

pub static XLSX: WorkbookParser = WorkbookParser { name: "XLSX" };

impl WorkbookParser {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// XLSX files are zip archives; anything else is left to the text parsers.
    pub fn recognizes(content: &[u8]) -> bool {
        content.starts_with(ZIP_SIGNATURE)
    }

    pub(crate) fn parse_bytes(&self, content: &[u8]) -> Result<SampleTable, ParserError> {
        let mut workbook: Xlsx<_> =
            open_workbook_from_rs(Cursor::new(content)).map_err(|source| self.error(source))?;
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range.map_err(|source| self.error(source))?,
            None => return Err(ParserError::EmptyData),
        };

        let mut rows = range.rows();
        let header_cells = rows.next().ok_or(ParserError::EmptyData)?;
        // formatted but empty cells widen the used range to the right
        let width = header_cells
            .iter()
            .rposition(|cell| !cell.is_empty())
            .map_or(0, |last| last + 1);
        let header: StringRecord = header_cells[..width]
            .iter()
            .map(|cell| cell.to_string())
            .collect();
        let columns = validate_header(self.name, &header)?;

        let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); columns.len()];
        for row in rows {
            let cells: Vec<Option<String>> = (0..width)
                .map(|idx| row.get(idx).and_then(cell_text))
                .collect();
            if cells.iter().all(Option::is_none) {
                continue;
            }
            for (column, cell) in values.iter_mut().zip(cells) {
                column.push(cell);
            }
        }

        let df = build_string_frame(self.name, &columns, values)?;
        Ok(SampleTable {
            parser: self.name,
            columns,
            df,
        })
    }

    fn error(&self, source: XlsxError) -> ParserError {
        ParserError::Workbook {
            parser: self.name,
            source,
        }
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(text) => clean_cell(text),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell.as_datetime().map(|timestamp| {
            timestamp
                .round_subsecs(0)
                .format(CELL_TIMESTAMP_FORMAT)
                .to_string()
        }),
        other => clean_cell(&other.to_string()),
    }
}

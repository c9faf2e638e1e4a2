use crate::errors::{ParserAttempt, ParserError};
use crate::formats::{DelimitedParser, WorkbookParser, COMMA, SEMICOLON, TAB, XLSX};
use crate::model::SampleTable;

pub trait TableParser {
    fn name(&self) -> &'static str;
    fn parse(&self, content: &str) -> Result<SampleTable, ParserError>;
}

/// Parses a delimited table, trying comma, semicolon and tab separators in that order.
pub fn parse_table(content: &str) -> Result<SampleTable, ParserError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    if content.trim().is_empty() {
        return Err(ParserError::EmptyData);
    }

    let parsers: [&dyn TableParser; 3] = [&COMMA, &SEMICOLON, &TAB];
    parse_with_parsers(content, &parsers)
}

/// Parses the first worksheet of an XLSX workbook.
pub fn parse_workbook(content: &[u8]) -> Result<SampleTable, ParserError> {
    if !WorkbookParser::recognizes(content) {
        return Err(ParserError::FormatMismatch {
            parser: XLSX.name(),
            reason: "missing zip signature".to_string(),
        });
    }
    XLSX.parse_bytes(content)
}

pub fn parse_with_parsers(
    content: &str,
    parsers: &[&dyn TableParser],
) -> Result<SampleTable, ParserError> {
    let mut attempts = Vec::new();

    for parser in parsers {
        match parser.parse(content) {
            Ok(parsed) => return Ok(parsed),
            Err(ParserError::FormatMismatch { reason, .. }) => {
                attempts.push(ParserAttempt::new(parser.name(), reason));
            }
            Err(err) => return Err(err),
        }
    }

    Err(ParserError::NoMatchingParser { attempts })
}

impl TableParser for DelimitedParser {
    fn name(&self) -> &'static str {
        self.name
    }

    fn parse(&self, content: &str) -> Result<SampleTable, ParserError> {
        self.parse_content(content)
    }
}

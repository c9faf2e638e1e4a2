use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ParserAttempt {
    pub parser: &'static str,
    pub message: String,
}

impl ParserAttempt {
    pub fn new(parser: &'static str, message: impl Into<String>) -> Self {
        Self {
            parser,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParserAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.parser, self.message)
    }
}

/// Failures while turning delimited text into a [`crate::SampleTable`].
///
/// `FormatMismatch` means "try the next dialect"; every other variant stops the search.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("not a {parser} table: {reason}")]
    FormatMismatch {
        parser: &'static str,
        reason: String,
    },

    #[error("{parser}: bad header row: {message}")]
    InvalidHeader {
        parser: &'static str,
        message: String,
    },

    #[error("{parser}: could not read record: {source}")]
    Csv {
        parser: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{parser}: could not read workbook: {source}")]
    Workbook {
        parser: &'static str,
        #[source]
        source: calamine::XlsxError,
    },

    #[error("{parser}: line {line}: {message}")]
    DataRow {
        parser: &'static str,
        line: usize,
        message: String,
    },

    #[error("{parser}: could not assemble sample frame: {message}")]
    Frame {
        parser: &'static str,
        message: String,
    },

    #[error("input has no header row")]
    EmptyData,

    #[error("no delimiter matched the input ({})", summarize(.attempts))]
    NoMatchingParser { attempts: Vec<ParserAttempt> },
}

fn summarize(attempts: &[ParserAttempt]) -> String {
    attempts
        .iter()
        .map(ParserAttempt::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

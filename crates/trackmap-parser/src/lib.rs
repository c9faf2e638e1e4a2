pub mod errors;
pub mod formats;
pub mod model;
mod registry;

pub use errors::{ParserAttempt, ParserError};
pub use formats::WorkbookParser;
pub use model::SampleTable;
pub use registry::{parse_table, parse_with_parsers, parse_workbook, TableParser};

mod common;
mod delimited;
mod workbook;

pub use delimited::{DelimitedParser, COMMA, SEMICOLON, TAB};
pub use workbook::{WorkbookParser, XLSX};

pub(crate) use common::{build_string_frame, clean_cell, validate_header};

use polars::prelude::*;

/// A source table with every column kept as nullable UTF-8 text.
///
/// Column order follows the header row. Cells that were empty in the source are null.
#[derive(Debug, Clone)]
pub struct SampleTable {
    pub parser: &'static str,
    pub columns: Vec<String>,
    pub df: DataFrame,
}

impl SampleTable {
    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }
}

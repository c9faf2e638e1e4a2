use std::path::{Path, PathBuf};

use blake3::Hasher;
use tracing::info;
use trackmap_parser::{parse_table, parse_workbook, SampleTable, WorkbookParser};

use crate::error::SourceError;

/// A parsed source table plus what is needed to identify it in the run log.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub path: PathBuf,
    pub hash: String,
    pub table: SampleTable,
}

pub fn load_source(path: &Path) -> Result<LoadedSource, SourceError> {
    let contents = std::fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_source(path, &contents)
}

pub fn parse_source(path: &Path, contents: &[u8]) -> Result<LoadedSource, SourceError> {
    let hash = compute_hash(contents);

    let table = if is_workbook(path, contents) {
        parse_workbook(contents)?
    } else {
        let Ok(content_str) = std::str::from_utf8(contents) else {
            return Err(SourceError::NotUtf8 {
                path: path.to_path_buf(),
            });
        };
        parse_table(content_str)?
    };
    info!(
        path = %path.display(),
        hash = %hash,
        parser = table.parser,
        rows = table.height(),
        columns = table.columns.len(),
        "source table parsed"
    );

    Ok(LoadedSource {
        path: path.to_path_buf(),
        hash,
        table,
    })
}

fn is_workbook(path: &Path, contents: &[u8]) -> bool {
    let xlsx_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    xlsx_extension || WorkbookParser::recognizes(contents)
}

fn compute_hash(contents: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(contents);
    let hash = hasher.finalize();
    hash.to_hex().to_string()
}

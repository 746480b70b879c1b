//! Saving the backend's CSV export to disk.
//!
//! The body is parsed before anything is written so a truncated or HTML error
//! page never lands in the user's export directory.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::DateRange;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export is not valid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("export has no header row")]
    Empty,

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub columns: usize,
    pub rows: usize,
}

/// `AAPL_05-13_06-12.csv`
pub fn export_file_name(asset: &str, range: DateRange) -> String {
    format!("{}_{}_{}.csv", asset.trim().to_uppercase(), range.start, range.end)
}

/// Check that `body` is rectangular CSV with a header and count its rows.
pub fn inspect_csv(body: &str) -> Result<(usize, usize), ExportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(body.as_bytes());
    let columns = reader.headers()?.len();
    if columns == 0 || body.trim().is_empty() {
        return Err(ExportError::Empty);
    }
    let mut rows = 0;
    for record in reader.records() {
        record?;
        rows += 1;
    }
    Ok((columns, rows))
}

/// Validate and write `body` to `path`, creating parent directories.
pub fn write_export(body: &str, path: &Path) -> Result<ExportSummary, ExportError> {
    let (columns, rows) = inspect_csv(body)?;
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, body).map_err(io_err)?;
    tracing::info!(path = %path.display(), rows, "export written");
    Ok(ExportSummary {
        path: path.to_path_buf(),
        columns,
        rows,
    })
}

//! Dataset output: a workbook directory holding one CSV file per sheet.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use url::Url;

use crate::types::Dataset;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the output directory exists; create it if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), ExportError> {
    if dir.exists() {
        if !dir.is_dir() {
            return Err(ExportError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|err| ExportError::OutputDir(err.to_string()))?;
    }
    Ok(())
}

/// Writes datasets as `{stem}-{sheet}.csv` files under one directory.
///
/// Files are written through a temp file and renamed into place, so a
/// half-written sheet is never left behind.
pub struct Workbook {
    dir: PathBuf,
    stem: String,
}

impl Workbook {
    pub fn new(dir: PathBuf, stem: impl Into<String>) -> Self {
        Self {
            dir,
            stem: stem.into(),
        }
    }

    pub fn add_sheet(&self, sheet: &str, dataset: &Dataset) -> Result<PathBuf, ExportError> {
        ensure_output_dir(&self.dir)?;

        // Flexible: rows are as wide as the selectors made them.
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        if let Some(columns) = &dataset.columns {
            writer.write_record(columns)?;
        }
        for row in &dataset.rows {
            writer.write_record(row)?;
        }
        let buffer = writer
            .into_inner()
            .map_err(|err| ExportError::Io(io::Error::other(err.to_string())))?;

        let filename = format!("{}-{}.csv", self.stem, sanitize_sheet_name(sheet));
        write_atomic(&self.dir, &filename, &buffer)
    }
}

fn write_atomic(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf, ExportError> {
    let target = dir.join(filename);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    if target.exists() {
        fs::remove_file(&target)?;
    }
    tmp.persist(&target).map_err(|err| ExportError::Io(err.error))?;
    Ok(target)
}

fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "sheet".to_string()
    } else {
        cleaned
    }
}

/// Sheet name derived from the last path segment of the source URL, the way
/// the exported workbooks have always been labelled.
pub fn sheet_name_from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|segments| segments.last().map(|s| s.to_string()))
        })
        .filter(|segment| !segment.is_empty())
        .unwrap_or_else(|| "sheet".to_string())
}

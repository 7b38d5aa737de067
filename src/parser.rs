//! CSV source handling.
//!
//! Opens a locations export, enforces the file name gate and the required
//! header columns, and decodes data rows. Row-level semantics live in the
//! import layer; this module only gets rows off disk.

use csv::ReaderBuilder;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

use crate::error::{Error, Result};

/// Columns every locations export must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: &[&str] = &["name", "city", "state"];

/// One decoded data row. Values are taken verbatim, without trimming.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationRow {
    pub name: String,
    pub city: String,
    pub state: String,
}

/// A file is treated as a locations export only when its file name
/// contains `locations`.
pub fn is_location_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.contains("locations"))
}

/// An open, header-validated locations CSV.
#[derive(Debug)]
pub struct CsvSource {
    reader: csv::Reader<File>,
}

impl CsvSource {
    /// Open a CSV file for import.
    ///
    /// Fails with [`Error::UnrecognizedFile`] when the file name does not
    /// mark it as a locations export, and with [`Error::MissingColumns`]
    /// when the header lacks any required column.
    pub fn open(path: &Path) -> Result<Self> {
        if !is_location_file(path) {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            return Err(Error::UnrecognizedFile { file_name });
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new().from_reader(file);

        let headers = reader.headers()?;
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|&&col| !headers.iter().any(|h| h == col))
            .map(|&col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingColumns { missing });
        }

        Ok(Self { reader })
    }

    /// Iterate data rows in file order.
    pub fn rows(&mut self) -> impl Iterator<Item = Result<LocationRow>> + '_ {
        self.reader
            .deserialize::<LocationRow>()
            .map(|row| row.map_err(Error::from))
    }
}

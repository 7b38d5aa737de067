//! Error types for sitedb operations.

use thiserror::Error;

use crate::report::ImportReport;

/// Result type for sitedb operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps rusqlite::Error)
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error (wraps csv::Error)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The file name does not mark the file as a locations export
    #[error("file name {file_name:?} does not contain \"locations\"; not a locations export")]
    UnrecognizedFile { file_name: String },

    /// The CSV header lacks one or more required columns
    #[error("CSV header is missing required column(s): {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// A status or location type is absent from its registry
    #[error("no {kind} named {name:?} in the database")]
    LookupNotFound { kind: &'static str, name: String },

    /// A candidate or found location failed validation
    #[error("validation failed: {detail}")]
    Validation { detail: String },

    /// A site name whose suffix is neither "DC" nor "BR"
    #[error("cannot classify {name:?}: suffix is neither \"DC\" nor \"BR\"")]
    UnknownSuffix { name: String },

    /// An atomic run hit row errors and was rolled back
    #[error("import aborted: {} row(s) failed, all changes rolled back", .report.failed())]
    Aborted { report: ImportReport },
}

//! Per-run outcome reporting.
//!
//! An import run returns an [`ImportReport`] instead of relying on log
//! output alone: counts of locations created and reused, plus every row
//! error with its row number and the step it belongs to.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::Error;

/// The step of the row chain an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    State,
    City,
    Site,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::State => write!(f, "state"),
            Step::City => write!(f, "city"),
            Step::Site => write!(f, "site"),
        }
    }
}

/// An error recorded against one CSV row.
#[derive(Debug)]
pub struct RowError {
    /// 1-indexed position in the file, counting the header as row 1.
    pub row: u64,
    pub step: Step,
    pub error: Error,
}

impl Serialize for RowError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RowError", 3)?;
        state.serialize_field("row", &self.row)?;
        state.serialize_field("step", &self.step)?;
        state.serialize_field("error", &self.error.to_string())?;
        state.end()
    }
}

/// Aggregated outcome of one import run.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Data rows read from the file (header excluded).
    pub rows: u64,
    /// Locations inserted by this run.
    pub created: u64,
    /// Locations that already existed and were reused.
    pub existing: u64,
    /// Row errors, in file order.
    pub errors: Vec<RowError>,
}

impl ImportReport {
    /// Number of rows that recorded at least one error.
    pub fn failed(&self) -> usize {
        self.errors.len()
    }
}

impl Serialize for ImportReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ImportReport", 5)?;
        state.serialize_field("rows", &self.rows)?;
        state.serialize_field("created", &self.created)?;
        state.serialize_field("existing", &self.existing)?;
        state.serialize_field("failed", &self.failed())?;
        state.serialize_field("errors", &self.errors)?;
        state.end()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} row(s): {} location(s) created, {} reused, {} failed",
            self.rows,
            self.created,
            self.existing,
            self.failed()
        )?;
        for e in &self.errors {
            write!(f, "\n  row {} ({}): {}", e.row, e.step, e.error)?;
        }
        Ok(())
    }
}

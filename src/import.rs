//! The locations import job.
//!
//! Drives the pipeline from a CSV export to a per-run report: decode all
//! rows, then walk each row's State, City, site chain through the store's
//! get-or-create, capturing step errors against the row instead of
//! aborting the run.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::model::{classify_site, Location, LocationType};
use crate::parser::{CsvSource, LocationRow};
use crate::report::{ImportReport, RowError, Step};
use crate::store::Store;

/// Status looked up for a run when none is requested.
pub const DEFAULT_STATUS: &str = "Active";

/// Transaction behavior of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxMode {
    /// Statements commit as they land, so a row's completed steps and all
    /// earlier rows survive later failures.
    #[default]
    PerRow,
    /// One transaction around the whole run, committed only when every row
    /// succeeds.
    Atomic,
}

/// Options for one import run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Status applied to every location the run touches.
    pub status: String,
    pub tx_mode: TxMode,
    /// Draw a progress bar while rows are processed.
    pub progress: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            status: DEFAULT_STATUS.to_string(),
            tx_mode: TxMode::PerRow,
            progress: false,
        }
    }
}

/// Run the locations import against an open store.
///
/// File-level problems (file name gate, header, CSV decode, unknown
/// status) fail the run before anything is written. Row-level problems are
/// recorded in the report; in [`TxMode::Atomic`] any row error also rolls
/// the whole run back and surfaces as [`Error::Aborted`].
pub fn run_import(store: &Store, csv_path: &Path, options: &ImportOptions) -> Result<ImportReport> {
    let start = Instant::now();
    let mut source = CsvSource::open(csv_path)?;
    let rows: Vec<LocationRow> = source.rows().collect::<Result<_>>()?;
    let status_id = store.status_id(&options.status)?;

    info!(
        "importing {} row(s) from {} with status {:?}",
        rows.len(),
        csv_path.display(),
        options.status
    );

    let bar = if options.progress {
        let bar = ProgressBar::new(rows.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} rows")
                .unwrap()
                .progress_chars("=>-"),
        );
        bar.set_message("Importing");
        bar
    } else {
        ProgressBar::hidden()
    };

    if options.tx_mode == TxMode::Atomic {
        store.begin()?;
    }

    let mut report = ImportReport::default();
    for (idx, row) in rows.iter().enumerate() {
        // header is row 1, so the first data row is row 2
        let row_num = idx as u64 + 2;
        report.rows += 1;
        if let Err(e) = import_row(store, row, row_num, status_id, &mut report) {
            warn!("row {} ({}): {}", e.row, e.step, e.error);
            report.errors.push(e);
        }
        bar.inc(1);
    }
    bar.finish_with_message(format!(
        "{} created, {} reused, {} failed",
        report.created,
        report.existing,
        report.failed()
    ));

    if options.tx_mode == TxMode::Atomic {
        if report.failed() > 0 {
            store.rollback()?;
            return Err(Error::Aborted { report });
        }
        store.commit()?;
    }

    info!(
        "run complete in {:.1}s: {} created, {} reused, {} failed",
        start.elapsed().as_secs_f64(),
        report.created,
        report.existing,
        report.failed()
    );
    Ok(report)
}

/// Process one CSV row. A State or City failure abandons the rest of the
/// row; a site failure only loses the third level.
fn import_row(
    store: &Store,
    row: &LocationRow,
    row_num: u64,
    status_id: i64,
    report: &mut ImportReport,
) -> std::result::Result<(), RowError> {
    let state = ensure_location(store, &row.state, LocationType::State, None, status_id, report)
        .map_err(|error| RowError {
            row: row_num,
            step: Step::State,
            error,
        })?;

    let city = ensure_location(
        store,
        &row.city,
        LocationType::City,
        Some(state.id),
        status_id,
        report,
    )
    .map_err(|error| RowError {
        row: row_num,
        step: Step::City,
        error,
    })?;

    let site_type = classify_site(&row.name).ok_or_else(|| RowError {
        row: row_num,
        step: Step::Site,
        error: Error::UnknownSuffix {
            name: row.name.clone(),
        },
    })?;
    ensure_location(
        store,
        &row.name,
        site_type,
        Some(city.id),
        status_id,
        report,
    )
    .map_err(|error| RowError {
        row: row_num,
        step: Step::Site,
        error,
    })?;

    Ok(())
}

fn ensure_location(
    store: &Store,
    name: &str,
    location_type: LocationType,
    parent_id: Option<i64>,
    status_id: i64,
    report: &mut ImportReport,
) -> Result<Location> {
    let (location, created) =
        store.get_or_create_location(name, location_type, parent_id, status_id)?;
    if created {
        report.created += 1;
        debug!("created {} {:?}", location_type, location.name);
    } else {
        report.existing += 1;
        trace!("reusing {} {:?}", location_type, location.name);
    }
    Ok(location)
}

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::import::DEFAULT_STATUS;

#[derive(Parser, Debug)]
#[command(name = "sitedb")]
#[command(version, about = "Import site location CSVs into a SQLite inventory database")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a locations CSV export into the database
    Import {
        /// CSV file to import (file name must contain "locations")
        csv: PathBuf,

        /// Database path
        #[arg(short, long)]
        db: Option<PathBuf>,

        /// Status applied to imported locations
        #[arg(short, long, default_value = DEFAULT_STATUS)]
        status: String,

        /// Commit only if every row succeeds, rolling back otherwise
        #[arg(short, long)]
        atomic: bool,

        /// Report output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: ReportFormat,
    },

    /// Create and seed the database without importing anything
    Init {
        /// Database path
        #[arg(short, long)]
        db: Option<PathBuf>,
    },

    /// Print the stored location hierarchy
    Tree {
        /// Database path
        #[arg(short, long)]
        db: Option<PathBuf>,
    },

    /// List the built-in location types and their nesting rules
    Types,
}

/// How the import report is printed on stdout.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

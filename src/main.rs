use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use sitedb::{
    cli::{Cli, Commands, ReportFormat},
    import::{run_import, ImportOptions, TxMode},
    model::LocationType,
    report::ImportReport,
    store::Store,
    Error,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();

    match cli.command {
        Commands::Import {
            csv,
            db,
            status,
            atomic,
            format,
        } => {
            let store = open_store(db)?;
            let options = ImportOptions {
                status,
                tx_mode: if atomic { TxMode::Atomic } else { TxMode::PerRow },
                progress: true,
            };

            let report = match run_import(&store, &csv, &options) {
                Ok(report) => report,
                Err(Error::Aborted { report }) => {
                    print_report(&report, format)?;
                    bail!(
                        "import aborted: {} row(s) failed, all changes rolled back",
                        report.failed()
                    );
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("failed to import {:?}", csv));
                }
            };

            print_report(&report, format)?;
            if report.failed() > 0 {
                bail!("{} row(s) failed", report.failed());
            }
        }

        Commands::Init { db } => {
            let path = resolve_db_path(db)?;
            Store::open(&path)
                .with_context(|| format!("failed to initialize database {:?}", path))?;
            println!("Database ready at {:?}", path);
        }

        Commands::Tree { db } => {
            let store = open_store(db)?;
            print_tree(&store)?;
        }

        Commands::Types => {
            println!("Built-in location types:\n");
            for lt in LocationType::ALL {
                match lt.parent_type() {
                    Some(parent) => println!("  {} (under {})", lt, parent),
                    None => println!("  {} (root)", lt),
                }
            }
        }
    }

    Ok(())
}

/// Database path: explicit flag, or the platform data directory.
fn resolve_db_path(db: Option<PathBuf>) -> Result<PathBuf> {
    match db {
        Some(path) => Ok(path),
        None => {
            let proj_dirs = ProjectDirs::from("", "", "sitedb")
                .context("Could not determine data directory")?;
            Ok(proj_dirs.data_dir().join("sitedb.db"))
        }
    }
}

fn open_store(db: Option<PathBuf>) -> Result<Store> {
    let path = resolve_db_path(db)?;
    Store::open(&path).with_context(|| format!("failed to open database {:?}", path))
}

fn print_report(report: &ImportReport, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Text => println!("{}", report),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

fn print_tree(store: &Store) -> Result<()> {
    let states = store.children_of(None)?;
    if states.is_empty() {
        println!("No locations stored.");
        return Ok(());
    }
    for state in &states {
        println!("{}", state.name);
        for city in store.children_of(Some(state.id))? {
            println!("  {}", city.name);
            for site in store.children_of(Some(city.id))? {
                println!("    {} ({})", site.name, site.location_type);
            }
        }
    }
    Ok(())
}

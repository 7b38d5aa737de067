pub mod cli;
pub mod error;
pub mod import;
pub mod model;
pub mod parser;
pub mod report;
pub mod schema;
pub mod store;

pub use error::{Error, Result};
pub use import::{run_import, ImportOptions, TxMode};
pub use report::ImportReport;
pub use store::Store;

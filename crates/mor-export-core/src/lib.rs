pub mod accumulate;
pub mod config;
pub mod dates;
pub mod error;
pub mod executor;
pub mod format;
pub mod output;
pub mod reports;
pub mod tunnel;

pub use error::{ExportError, Result};

// crates/mor-export-core/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("SSH key error: {0}")]
    Key(String),

    #[error("SSH tunnel error: {0}")]
    Tunnel(String),

    #[error("Database query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid price '{value}': {source}")]
    InvalidPrice {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;

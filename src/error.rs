//! Error handling for warehouse build operations.
//!
//! Row-level parse failures are never errors: they recover locally as null
//! values and the row survives. The variants here cover the fatal cases only:
//! missing inputs, bad configuration, and I/O or table-write failures. The
//! unit of recovery for any of them is a full re-run of the job.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WarehouseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Input not found at path: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Failed to write table '{table}' to {path}: {reason}")]
    TableWrite {
        table: String,
        path: PathBuf,
        reason: String,
    },

    #[error("Background task failed: {reason}")]
    Task { reason: String },
}

impl WarehouseError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a table write error
    pub fn table_write(
        table: impl Into<String>,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::TableWrite {
            table: table.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WarehouseError>;

//! CSV error types

use thiserror::Error;

/// Result type for CSV operations
pub type CsvResult<T> = std::result::Result<T, CsvError>;

/// Errors that can occur during CSV export
#[derive(Debug, Error)]
pub enum CsvError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV library error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// View does not have the shape of a table
    #[error("Invalid table view: {0}")]
    Table(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] yamlcalc_core::Error),
}

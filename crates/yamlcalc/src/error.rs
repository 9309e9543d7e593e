//! Error types for rendering live documents

use std::path::PathBuf;
use thiserror::Error;

use crate::view::ViewError;
use yamlcalc_chart::ChartError;
use yamlcalc_csv::CsvError;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from loading a document and rendering its views
#[derive(Debug, Error)]
pub enum Error {
    /// Loading or reading the document failed
    #[error(transparent)]
    Document(#[from] yamlcalc_core::Error),

    /// The view could not be located
    #[error(transparent)]
    View(#[from] ViewError),

    /// CSV export failed
    #[error(transparent)]
    Csv(#[from] CsvError),

    /// Chart building or rendering failed
    #[error(transparent)]
    Chart(#[from] ChartError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The view's `type` names no writer
    #[error("Unsupported writer: {0}")]
    UnsupportedView(String),

    /// The view lacks what its writer needs
    #[error("Invalid view: {0}")]
    InvalidView(String),

    /// The output directory path is taken by something else
    #[error("Path exists but is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

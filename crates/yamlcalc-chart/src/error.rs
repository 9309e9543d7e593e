//! Chart error types

use thiserror::Error;

/// Result type for chart operations
pub type ChartResult<T> = std::result::Result<T, ChartError>;

/// Errors that can occur while building or rendering a chart
#[derive(Debug, Error)]
pub enum ChartError {
    /// View has no `chart` key
    #[error("Chart type not specified")]
    MissingChartType,

    /// `chart` names no known kind
    #[error("Invalid chart type '{0}'")]
    InvalidChartType(String),

    /// `style` names no known palette
    #[error("Invalid chart style '{0}'")]
    InvalidStyle(String),

    /// View has a key that is neither special nor an allowed property
    #[error("Invalid chart property '{0}'")]
    InvalidProperty(String),

    /// Allowed property with an unusable value
    #[error("Invalid value for chart property '{property}': {message}")]
    InvalidValue { property: String, message: String },

    /// `cols` or `rows` with the wrong shape
    #[error("Invalid chart data: {0}")]
    InvalidData(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

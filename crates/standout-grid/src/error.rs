//! Error types for the grid crate.

use thiserror::Error;

/// Errors that can occur when loading a dataset or parsing query parameters.
///
/// Per-row anomalies during a query (absent fields, unparseable dates,
/// incomparable values) are never reported here; they only affect whether
/// a row matches or where it sorts.
#[derive(Debug, Error)]
pub enum GridError {
    /// The dataset has no rows.
    #[error("data should be a non-empty list of rows")]
    EmptyData,

    /// The first row is not a non-empty record.
    #[error("data should be two-dimensional: {0}")]
    NotTwoDimensional(String),

    /// Rows were replaced after columns had already been inferred from them.
    #[error("columns were already inferred from the current rows")]
    AlreadyInitialised,

    /// Operator name not recognized.
    #[error("unknown filter operator '{0}'")]
    UnknownOperator(String),

    /// Column type name not recognized.
    #[error("unknown column type '{0}'")]
    UnknownColumnType(String),

    /// Sort direction name not recognized.
    #[error("unknown sort direction '{0}'")]
    UnknownDirection(String),

    /// Malformed configuration or record document.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;

//! Error types for the analyzer

use polars::prelude::PolarsError;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Fatal problems that abort a run before any output is written
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    /// A required column is absent from an input table
    #[error("table '{table}' is missing required column '{column}'")]
    Schema {
        table: &'static str,
        column: &'static str,
    },

    /// The centrality table holds no vertices, so quartiles are undefined
    #[error("table '{table}' contains no rows")]
    EmptyInput { table: &'static str },

    /// A table keyed by vertex lists the same vertex twice
    #[error("vertex '{vertex}' appears more than once in table '{table}'")]
    DuplicateVertex { table: &'static str, vertex: String },

    /// A required cell is null
    #[error("table '{table}' has a null '{column}' at row {row}")]
    MissingValue {
        table: &'static str,
        column: &'static str,
        row: usize,
    },

    /// A cell holds something other than the value its column requires
    #[error("table '{table}' has an invalid '{column}' value '{value}' at row {row}")]
    InvalidValue {
        table: &'static str,
        column: &'static str,
        row: usize,
        value: String,
    },

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

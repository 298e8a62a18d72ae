use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the loading and configuration layers.
///
/// Filtering and aggregation never fail: an empty selection is a valid
/// result, not an error.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The source file could not be opened or read at all.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required column is absent from the source table.
    #[error("missing required column '{column}'")]
    DataFormat { column: String },

    /// A single cell could not be turned into its semantic type.
    #[error("row {row}, column '{column}': cannot parse '{value}' ({reason})")]
    ValueParse {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

impl DashboardError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DashboardError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(
        row: usize,
        column: &str,
        value: &str,
        reason: impl std::fmt::Display,
    ) -> Self {
        DashboardError::ValueParse {
            row,
            column: column.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

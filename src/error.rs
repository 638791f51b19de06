//! Error types for ingestion and aggregation.

use thiserror::Error;

/// Failures that stop an analysis run.
///
/// Per-cell coercion problems never show up here: unparseable values become
/// missing and the run continues.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("source '{source_name}' is missing required column '{column}'")]
    MissingColumn { source_name: String, column: String },

    #[error("source '{0}' declares no since-year column")]
    NoSinceColumn(String),

    #[error("invalid segment thresholds: medium ({medium}) must not exceed high ({high})")]
    InvalidThresholds { medium: f64, high: f64 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the analysis core.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

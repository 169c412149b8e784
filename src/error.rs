use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Library error taxonomy
// ---------------------------------------------------------------------------

/// Errors produced by loading, merging and aggregating benchmark samples.
///
/// Unknown merge references are not represented here: they are logged and
/// skipped by [`crate::merge::merge`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read parquet file {path}: {message}")]
    Parquet { path: PathBuf, message: String },

    #[error("unsupported file extension for {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("{path}: row {row}, column '{column}': '{value}' is not a number")]
    Parse {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    #[error("dataset '{dataset}' has no column '{column}'")]
    MissingColumn { dataset: String, column: String },

    #[error("dataset '{dataset}' has no rows in column '{column}'")]
    EmptyColumn { dataset: String, column: String },

    #[error("column '{column}' has {actual} rows, dataset '{dataset}' has {expected}")]
    ColumnLength {
        dataset: String,
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("cycle length must be greater than zero")]
    ZeroCycleLength,

    #[error("no samples fall into phase {phase}")]
    EmptySeries { phase: usize },

    #[error("xz depths ({xz}) and y depths ({y}) must have the same length")]
    GridMismatch { xz: usize, y: usize },

    #[error("sweep grid has no configurations")]
    EmptyGrid,

    #[error("sweep requests no series")]
    NoSeries,

    #[error("divisor must be a positive finite number, got {0}")]
    InvalidDivisor(f64),
}

pub type Result<T> = std::result::Result<T, Error>;

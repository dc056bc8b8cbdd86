use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Required file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("Threshold {value} is outside [0.0, 1.0]")]
    InvalidThreshold { value: f64 },

    #[error("Column '{column}' not found")]
    ColumnNotFound { column: String },

    #[error("Non-numeric value '{value}' in probability column '{column}' at row {row}")]
    NonNumericProbability {
        column: String,
        row: usize,
        value: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ExplorerResult<T> = Result<T, ExplorerError>;

//! Error types for stock_metrics

use thiserror::Error;

/// Main error type for stock_metrics
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl MetricsError {
    /// HTTP-style status code for the serving layer
    pub fn status_code(&self) -> u16 {
        match self {
            MetricsError::NotFound(_) => 404,
            MetricsError::InvalidArgument(_) => 400,
            MetricsError::DivisionByZero(_) | MetricsError::InsufficientData(_) => 422,
            _ => 500,
        }
    }

    /// True for failures caused by the request or the data, not the infrastructure
    pub fn is_data_error(&self) -> bool {
        self.status_code() < 500
    }
}

/// Result type alias for stock_metrics operations
pub type Result<T> = std::result::Result<T, MetricsError>;

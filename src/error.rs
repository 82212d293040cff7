use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrendError {
    #[error("Unrecognized date format: {0}")]
    DateFormat(String),

    #[error("Invalid window granularity: {0} (expected day, week or month)")]
    Granularity(String),

    #[error("Missing columns in input CSV: {0:?}")]
    MissingColumns(Vec<String>),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrendError>;

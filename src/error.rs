use thiserror::Error;

#[derive(Error, Debug)]
pub enum LikeligridError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Contradiction in column names: model has {expected:?}, result file has {found:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Parse Error: {0}")]
    Parse(String),
}

pub type LgResult<T> = Result<T, LikeligridError>;

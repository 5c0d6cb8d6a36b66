use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsvBurnError {
    #[error("Cannot access data file {path:?}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Resource measurement unavailable: {0}")]
    MeasurementUnavailable(String),

    #[error("{} not found!", .0.display())]
    MissingLog(PathBuf),

    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CsvBurnError {
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CsvBurnError::FileAccess {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CsvBurnError>;

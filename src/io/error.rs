use std::io;
use std::string::FromUtf8Error;
use thiserror::Error;

/// IO-level errors for CSV/JSON decoding and encoding
#[derive(Error, Debug)]
pub enum IoError {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV async parsing error: {0}")]
    CsvAsync(#[from] csv_async::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Output is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

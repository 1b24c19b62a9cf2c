use std::io;
use thiserror::Error;

use crate::engine::PipelineError;
use crate::io::IoError;
use crate::step::{StepError, ValidationError};

/// Top-level application errors unifying all layer errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Input/output error: {0}")]
    Adapter(#[from] IoError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Invalid pipeline: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unexpected output: {0}")]
    Output(#[from] StepError),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        assert_eq!(
            AppError::FileNotFound("input.csv".to_string()).to_string(),
            "File not found: input.csv"
        );
        assert_eq!(
            AppError::InvalidArguments("missing file".to_string()).to_string(),
            "Invalid arguments: missing file"
        );
    }

    #[test]
    fn io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let app_err = AppError::from(io_err);

        match app_err {
            AppError::Io(_) => {}
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn pipeline_error_conversion() {
        let app_err = AppError::from(PipelineError::Cancelled);

        match app_err {
            AppError::Pipeline(PipelineError::Cancelled) => {}
            _ => panic!("Expected Pipeline error variant"),
        }
    }

    #[test]
    fn validation_error_conversion() {
        let app_err = AppError::from(ValidationError::InvalidAggregator {
            name: "Sum".to_string(),
        });
        assert_eq!(app_err.to_string(), "Invalid pipeline: invalid aggregator [Sum]");
    }
}

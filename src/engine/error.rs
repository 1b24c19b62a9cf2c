use thiserror::Error;

use crate::io::IoError;
use crate::step::{StepError, ValidationError};

/// Errors surfaced to a pipeline's error handler
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Pipeline validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Step {name} failed: {source}")]
    Step {
        name: String,
        #[source]
        source: StepError,
    },

    #[error("Aggregator {name} failed: {source}")]
    Aggregator {
        name: String,
        #[source]
        source: StepError,
    },

    #[error("Pipeline cancelled")]
    Cancelled,

    #[error("Output conversion failed: {0}")]
    Conversion(#[source] StepError),

    #[error("Input error: {0}")]
    Input(#[from] IoError),

    #[error("[{name}] {source}")]
    Named {
        name: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// The error without any pipeline-name prefix
    pub fn inner(&self) -> &PipelineError {
        match self {
            Self::Named { source, .. } => source.inner(),
            other => other,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.inner(), Self::Cancelled)
    }

    /// Name of the failing step or aggregator, if any
    pub fn failed_at(&self) -> Option<&str> {
        match self.inner() {
            Self::Step { name, .. } | Self::Aggregator { name, .. } => Some(name),
            _ => None,
        }
    }
}

use std::sync::{Arc, Mutex, PoisonError};

use tracing::error;

use crate::engine::PipelineError;

/// Receives runtime and validation errors reported by a pipeline
pub trait ErrorHandler: Send + Sync {
    fn handle_error(&self, error: PipelineError);
}

/// Log errors with `tracing::error!` (default)
pub struct LogErrors;

impl ErrorHandler for LogErrors {
    fn handle_error(&self, error: PipelineError) {
        error!(error = %error, "Pipeline error");
    }
}

/// Drop errors without logging
pub struct SilentErrors;

impl ErrorHandler for SilentErrors {
    fn handle_error(&self, _error: PipelineError) {}
}

/// Keep errors in a shared buffer; clones share the same buffer
#[derive(Clone, Default)]
pub struct CollectErrors {
    errors: Arc<Mutex<Vec<PipelineError>>>,
}

impl CollectErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rendered messages of the collected errors
    pub fn messages(&self) -> Vec<String> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Drain the collected errors
    pub fn take(&self) -> Vec<PipelineError> {
        std::mem::take(&mut *self.errors.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl ErrorHandler for CollectErrors {
    fn handle_error(&self, error: PipelineError) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error);
    }
}

impl<F> ErrorHandler for F
where
    F: Fn(PipelineError) + Send + Sync,
{
    fn handle_error(&self, error: PipelineError) {
        self(error)
    }
}

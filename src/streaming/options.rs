use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::error::{ErrorHandler, LogErrors};
use crate::engine::PipelineError;

/// Default capacity of queues created by the streaming input adapters
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Shared runtime configuration of a pipeline and its input adapters
#[derive(Clone)]
pub struct PipelineOptions {
    name: Option<String>,
    error_handler: Arc<dyn ErrorHandler>,
    cancellation: CancellationToken,
    channel_capacity: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            name: None,
            error_handler: Arc::new(LogErrors),
            cancellation: CancellationToken::new(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name prefixed to every reported error
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.error_handler = Arc::new(handler);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Queue capacity for streaming adapters (at least 1)
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Hand an error to the handler, prefixed with the pipeline name if set
    pub fn report(&self, error: PipelineError) {
        let error = match &self.name {
            Some(name) => PipelineError::Named {
                name: name.clone(),
                source: Box::new(error),
            },
            None => error,
        };
        self.error_handler.handle_error(error);
    }
}

impl fmt::Debug for PipelineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("name", &self.name)
            .field("cancelled", &self.cancellation.is_cancelled())
            .field("channel_capacity", &self.channel_capacity)
            .finish_non_exhaustive()
    }
}

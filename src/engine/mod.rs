pub mod error;
pub mod processor;
pub mod validator;

// Re-export commonly used types
pub use error::PipelineError;
pub use processor::Processor;
pub use validator::{Chain, Validator};

pub mod error;
pub mod input;
pub mod options;
pub mod pipeline;
pub mod sink;

// Re-export commonly used types
pub use error::{CollectErrors, ErrorHandler, LogErrors, SilentErrors};
pub use input::Input;
pub use options::{DEFAULT_CHANNEL_CAPACITY, PipelineOptions};
pub use pipeline::{IndexedIter, Iter, Pipeline};

pub mod cli;
pub mod error;
pub mod totals;

// Re-export commonly used types
pub use cli::{CliApp, RunContext};
pub use error::AppError;
pub use totals::{KeyTotal, Row, group_totals, write_totals};

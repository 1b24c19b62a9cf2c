pub mod csv_reader;
pub mod csv_writer;
pub mod error;
pub mod json_reader;
pub mod json_writer;

// Re-export commonly used types
pub use csv_reader::{csv_queue, csv_queue_from_file, csv_queue_without_headers, read_csv};
pub use csv_writer::{to_csv, write_csv};
pub use error::IoError;
pub use json_reader::{json_lines_queue, json_lines_queue_from_file, read_json};
pub use json_writer::{to_json, write_json_lines};

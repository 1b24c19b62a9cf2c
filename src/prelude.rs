//! Prelude module for convenient imports
//!
//! Import everything you need with: `use stepflow::prelude::*;`

// Step model
pub use crate::step::{
    Arg, ArgType, ArgTypes, Args, CustomStep, Reducer, Step, StepError, StepResult, Steps,
    ValidationError, Value, aggregate,
};
pub use crate::{custom_arg, steps};

// Built-in steps and aggregators
pub use crate::aggregate::{
    avg, fold, group_by, max, min, reduce, sum, try_fold, try_group_by,
};
pub use crate::ops::{
    filter, inspect, log, map, merge, skip, skip_while, split, take, take_while, try_filter,
    try_inspect, try_map, try_skip_while, try_split, try_take_while, with_branches,
};

// Engine types
pub use crate::engine::{Chain, PipelineError, Validator};

// Streaming types
pub use crate::streaming::{
    CollectErrors, DEFAULT_CHANNEL_CAPACITY, ErrorHandler, Input, LogErrors, Pipeline,
    PipelineOptions, SilentErrors,
};

// IO types
pub use crate::io::{
    IoError, csv_queue, csv_queue_from_file, csv_queue_without_headers, json_lines_queue,
    json_lines_queue_from_file, read_csv, read_json, to_csv, to_json, write_csv,
    write_json_lines,
};

// App types
pub use crate::app::{AppError, CliApp, KeyTotal, Row, RunContext, group_totals, write_totals};

use std::fmt::Display;

use thiserror::Error;

use super::args::MAX_ARGS;
use super::value::Value;

/// Boxed user error carried by fallible step functions
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build-time errors raised while checking adjacent step types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("incompatible input argument type [{found}!={expected}:{slot}]")]
    IncompatibleInArgType {
        found: String,
        expected: String,
        slot: usize,
    },

    #[error("invalid step [{name}:{position}]")]
    InvalidStep { name: String, position: usize },

    #[error("invalid aggregator [{name}]")]
    InvalidAggregator { name: String },

    #[error("step validation failed [{name}:{position}]: {source}")]
    StepValidationFailed {
        name: String,
        position: usize,
        source: Box<ValidationError>,
    },

    #[error("branch validation failed [{branch}]: {source}")]
    BranchValidationFailed {
        branch: usize,
        source: Box<ValidationError>,
    },

    #[error("aggregator validation failed [{name}]: {source}")]
    AggregatorValidationFailed {
        name: String,
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    /// Innermost error of a wrapped validation failure
    pub fn root_cause(&self) -> &ValidationError {
        match self {
            Self::StepValidationFailed { source, .. }
            | Self::BranchValidationFailed { source, .. }
            | Self::AggregatorValidationFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Runtime errors raised by a single step or aggregator
#[derive(Error, Debug)]
pub enum StepError {
    #[error(transparent)]
    Custom(#[from] BoxError),

    #[error("Missing argument at slot {0}")]
    MissingArg(usize),

    #[error("Too many arguments: {0} (capacity {cap})", cap = MAX_ARGS)]
    TooManyArgs(usize),

    #[error("Unexpected argument type [{found}!={expected}]")]
    UnexpectedArgType { found: String, expected: String },

    #[error("Branch key {key} out of range ({branches} branches)")]
    BranchOutOfRange { key: u8, branches: usize },

    #[error("Arithmetic overflow")]
    Overflow,
}

impl StepError {
    /// Wrap any user error (or message) as a step failure
    pub fn custom(error: impl Into<BoxError>) -> Self {
        Self::Custom(error.into())
    }

    pub(crate) fn unexpected(found: &Value, expected: impl Display) -> Self {
        Self::UnexpectedArgType {
            found: found.arg_type().to_string(),
            expected: expected.to_string(),
        }
    }
}

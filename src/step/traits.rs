use super::args::{ArgTypes, Args};
use super::error::{StepError, ValidationError};
use super::value::Value;

/// Outcome of running one step on one item
#[derive(Debug)]
pub enum StepResult {
    /// Continue with these arguments
    Emit(Args),
    /// Drop the item; later steps and the aggregator never see it
    Skip,
    /// Terminal failure for this run
    Fail(StepError),
}

impl StepResult {
    pub fn emit(value: Value) -> Self {
        Self::Emit(Args::one(value))
    }
}

impl From<Result<Args, StepError>> for StepResult {
    fn from(result: Result<Args, StepError>) -> Self {
        match result {
            Ok(args) => Self::Emit(args),
            Err(e) => Self::Fail(e),
        }
    }
}

/// A named, validated transformation over an argument tuple
pub trait Step: Send {
    fn name(&self) -> &str;

    /// Check the previous step's output types and return this step's output types
    fn validate(&self, prev: &ArgTypes) -> Result<ArgTypes, ValidationError>;

    fn run(&mut self, input: Args) -> StepResult;

    /// Restore initial state (counters, flags)
    fn reset(&mut self) {}

    /// Name of the pipeline about to run this step
    fn bind_pipeline(&mut self, _name: Option<&str>) {}

    fn is_runnable(&self) -> bool {
        true
    }
}

/// Stateful terminal element folding every surviving item
pub trait Reducer: Send {
    fn name(&self) -> &str;

    fn validate(&self, prev: &ArgTypes) -> Result<ArgTypes, ValidationError>;

    fn reduce(&mut self, input: Args) -> Result<(), StepError>;

    /// Accumulated value, emitted once after the last item
    fn result(&self) -> Args;

    fn reset(&mut self);

    fn is_runnable(&self) -> bool {
        true
    }
}

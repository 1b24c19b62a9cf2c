use super::args::{ArgTypes, Args};
use super::error::{StepError, ValidationError};
use super::traits::{Step, StepResult};

type RunFn = Box<dyn FnMut(Args) -> StepResult + Send>;

/// Step assembled from a name, declared types and a run function
///
/// A step without a run function fails validation as an invalid step.
pub struct CustomStep {
    name: String,
    input: ArgTypes,
    output: ArgTypes,
    run: Option<RunFn>,
    reset: Option<Box<dyn FnMut() + Send>>,
}

impl CustomStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: ArgTypes::default(),
            output: ArgTypes::default(),
            run: None,
            reset: None,
        }
    }

    pub fn with_input(mut self, types: ArgTypes) -> Self {
        self.input = types;
        self
    }

    pub fn with_output(mut self, types: ArgTypes) -> Self {
        self.output = types;
        self
    }

    pub fn with_run<F>(mut self, run: F) -> Self
    where
        F: FnMut(Args) -> StepResult + Send + 'static,
    {
        self.run = Some(Box::new(run));
        self
    }

    pub fn with_reset<F>(mut self, reset: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.reset = Some(Box::new(reset));
        self
    }
}

impl Step for CustomStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, prev: &ArgTypes) -> Result<ArgTypes, ValidationError> {
        prev.check_compatible(&self.input)?;
        Ok(self.output.clone())
    }

    fn run(&mut self, input: Args) -> StepResult {
        match self.run.as_mut() {
            Some(run) => run(input),
            None => StepResult::Fail(StepError::custom(format!(
                "step {} has no run function",
                self.name
            ))),
        }
    }

    fn reset(&mut self) {
        if let Some(reset) = self.reset.as_mut() {
            reset();
        }
    }

    fn is_runnable(&self) -> bool {
        self.run.is_some()
    }
}

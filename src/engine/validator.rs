use tracing::debug;

use crate::step::{ArgTypes, Reducer, Step, Steps, ValidationError};

/// A step list whose adjacent types have been checked
#[derive(Debug)]
pub struct Chain {
    steps: Steps,
    input: ArgTypes,
    output: ArgTypes,
}

impl Chain {
    pub fn input_types(&self) -> &ArgTypes {
        &self.input
    }

    /// What the chain yields: the aggregator's output when one is present
    pub fn output_types(&self) -> &ArgTypes {
        &self.output
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn has_aggregator(&self) -> bool {
        self.steps.has_aggregator()
    }

    pub fn reset(&mut self) {
        self.steps.reset();
    }

    pub(crate) fn bind_pipeline(&mut self, name: Option<&str>) {
        self.steps.bind_pipeline(name);
    }

    pub(crate) fn steps_mut(&mut self) -> &mut Steps {
        &mut self.steps
    }
}

/// Build-time type checker for step lists
pub struct Validator;

impl Validator {
    /// Check `steps` against the declared `input` types
    pub fn validate(input: ArgTypes, steps: Steps) -> Result<Chain, ValidationError> {
        let output = check(&input, &steps)?;
        debug!(
            steps = steps.len(),
            aggregated = steps.has_aggregator(),
            output = ?output,
            "Validated step chain"
        );
        Ok(Chain {
            steps,
            input,
            output,
        })
    }
}

/// Check a full list (steps, then aggregator) and return its final output types
pub fn check(input: &ArgTypes, steps: &Steps) -> Result<ArgTypes, ValidationError> {
    let output = check_steps(input, steps.steps())?;
    match steps.aggregator() {
        Some(reducer) => check_aggregator(&output, reducer),
        None => Ok(output),
    }
}

/// Walk the steps from `input`, returning the last step's output types
pub fn check_steps(
    input: &ArgTypes,
    steps: &[Box<dyn Step>],
) -> Result<ArgTypes, ValidationError> {
    let mut cursor = input.clone();
    for (idx, step) in steps.iter().enumerate() {
        let position = idx + 1;
        let name = step.name();
        if name.is_empty() || !step.is_runnable() {
            return Err(ValidationError::InvalidStep {
                name: name.to_string(),
                position,
            });
        }
        cursor = step
            .validate(&cursor)
            .map_err(|source| ValidationError::StepValidationFailed {
                name: name.to_string(),
                position,
                source: Box::new(source),
            })?;
    }
    Ok(cursor)
}

pub fn check_aggregator(
    prev: &ArgTypes,
    reducer: &dyn Reducer,
) -> Result<ArgTypes, ValidationError> {
    let name = reducer.name();
    if name.is_empty() || !reducer.is_runnable() {
        return Err(ValidationError::InvalidAggregator {
            name: name.to_string(),
        });
    }
    reducer
        .validate(prev)
        .map_err(|source| ValidationError::AggregatorValidationFailed {
            name: name.to_string(),
            source: Box::new(source),
        })
}

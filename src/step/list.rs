use std::fmt;

use super::args::ArgTypes;
use super::error::ValidationError;
use super::traits::{Reducer, Step};
use crate::engine::validator;

/// Ordered step list with an optional terminal aggregator
#[derive(Default)]
pub struct Steps {
    steps: Vec<Box<dyn Step>>,
    aggregator: Option<Box<dyn Reducer>>,
}

impl Steps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step
    pub fn then(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn push(&mut self, step: Box<dyn Step>) {
        self.steps.push(step);
    }

    /// Terminate the list with an aggregator, replacing any previous one
    pub fn aggregate(mut self, reducer: impl Reducer + 'static) -> Self {
        self.aggregator = Some(Box::new(reducer));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn has_aggregator(&self) -> bool {
        self.aggregator.is_some()
    }

    /// Validate as a detached list: the first step has no known input
    pub fn validate(&self) -> Result<ArgTypes, ValidationError> {
        validator::check(&ArgTypes::skip_first(), self)
    }

    pub fn reset(&mut self) {
        for step in &mut self.steps {
            step.reset();
        }
        if let Some(aggregator) = self.aggregator.as_mut() {
            aggregator.reset();
        }
    }

    pub(crate) fn bind_pipeline(&mut self, name: Option<&str>) {
        for step in &mut self.steps {
            step.bind_pipeline(name);
        }
    }

    pub(crate) fn steps(&self) -> &[Box<dyn Step>] {
        &self.steps
    }

    pub(crate) fn steps_mut(&mut self) -> &mut [Box<dyn Step>] {
        &mut self.steps
    }

    pub(crate) fn aggregator(&self) -> Option<&dyn Reducer> {
        self.aggregator.as_deref()
    }

    pub(crate) fn aggregator_mut(&mut self) -> Option<&mut (dyn Reducer + 'static)> {
        self.aggregator.as_deref_mut()
    }
}

impl fmt::Debug for Steps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Steps")
            .field("steps", &self.steps.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("aggregator", &self.aggregator.as_ref().map(|a| a.name()))
            .finish()
    }
}

/// Step list holding only an aggregator
pub fn aggregate(reducer: impl Reducer + 'static) -> Steps {
    Steps::new().aggregate(reducer)
}

/// Build a `Steps` list from step expressions
///
/// ```
/// use stepflow::ops::{filter, map};
///
/// let steps = stepflow::steps![map(|x: i32| x + 1), filter(|x: &i32| *x > 2)];
/// assert_eq!(steps.len(), 2);
/// ```
#[macro_export]
macro_rules! steps {
    ($($step:expr),* $(,)?) => {
        $crate::step::Steps::new()$(.then($step))*
    };
}

use std::marker::PhantomData;

use super::basic::accept;
use crate::engine::validator;
use crate::step::args::slot_name;
use crate::step::{
    Arg, ArgType, ArgTypes, Args, BoxError, Branch, Step, StepError, StepResult, Steps,
    ValidationError, Value,
};

/// Payload type carried by a branch-marker input
fn branch_payload(prev: &ArgTypes) -> Result<ArgType, ValidationError> {
    let payload = match prev.first() {
        Some(ArgType::SkipFirstArgValidation) => ArgType::SkipFirstArgValidation,
        Some(ArgType::Branch(payload)) => (**payload).clone(),
        other => {
            return Err(ValidationError::IncompatibleInArgType {
                found: slot_name(other),
                expected: "branch".to_string(),
                slot: 1,
            });
        }
    };
    prev.check_compatible(&ArgTypes::one(ArgType::branch(payload.clone())))?;
    Ok(payload)
}

fn take_branch(input: &mut Args) -> Result<Branch, StepError> {
    match input.take(0) {
        Some(Value::Branch(branch)) => Ok(*branch),
        Some(other) => Err(StepError::unexpected(&other, "branch")),
        None => Err(StepError::MissingArg(1)),
    }
}

struct Split<I, F> {
    f: F,
    _types: PhantomData<fn(I)>,
}

impl<I, F> Step for Split<I, F>
where
    I: Arg,
    F: FnMut(&I) -> Result<u8, StepError> + Send,
{
    fn name(&self) -> &str {
        "Split"
    }

    fn validate(&self, prev: &ArgTypes) -> Result<ArgTypes, ValidationError> {
        accept::<I>(prev, ArgTypes::one(ArgType::branch(I::arg_type())))
    }

    fn run(&mut self, mut input: Args) -> StepResult {
        let item = match input.arg::<I>(0) {
            Ok(item) => item,
            Err(e) => return StepResult::Fail(e),
        };
        match (self.f)(&item) {
            Ok(key) => StepResult::emit(Value::branch(key, item.into_value())),
            Err(e) => StepResult::Fail(e),
        }
    }
}

/// Tag every item with the branch key chosen by `classify`
pub fn split<I, F>(mut classify: F) -> impl Step
where
    I: Arg,
    F: FnMut(&I) -> u8 + Send + 'static,
{
    Split {
        f: move |item: &I| Ok::<_, StepError>(classify(item)),
        _types: PhantomData,
    }
}

pub fn try_split<I, E, F>(mut classify: F) -> impl Step
where
    I: Arg,
    E: Into<BoxError>,
    F: FnMut(&I) -> Result<u8, E> + Send + 'static,
{
    Split {
        f: move |item: &I| classify(item).map_err(|e| StepError::Custom(e.into())),
        _types: PhantomData,
    }
}

struct WithBranches {
    branches: Vec<Steps>,
}

impl WithBranches {
    fn validate_branch(input: &ArgTypes, branch: &Steps) -> Result<ArgTypes, ValidationError> {
        if let Some(aggregator) = branch.aggregator() {
            return Err(ValidationError::InvalidAggregator {
                name: aggregator.name().to_string(),
            });
        }
        validator::check_steps(input, branch.steps())
    }
}

impl Step for WithBranches {
    fn name(&self) -> &str {
        "WithBranches"
    }

    fn validate(&self, prev: &ArgTypes) -> Result<ArgTypes, ValidationError> {
        let input = ArgTypes::one(branch_payload(prev)?);
        let mut outputs = Vec::with_capacity(self.branches.len());
        for (key, branch) in self.branches.iter().enumerate() {
            let output = Self::validate_branch(&input, branch).map_err(|source| {
                ValidationError::BranchValidationFailed {
                    branch: key,
                    source: Box::new(source),
                }
            })?;
            outputs.push(output);
        }

        // branches agreeing on a single output type keep it, anything else widens
        let payload = match outputs.split_first() {
            Some((first, rest)) if first.len() == 1 && rest.iter().all(|o| o == first) => {
                first.first().cloned().unwrap_or(ArgType::Any)
            }
            _ => ArgType::Any,
        };
        Ok(ArgTypes::one(ArgType::branch(payload)))
    }

    fn run(&mut self, mut input: Args) -> StepResult {
        let Branch { key, value } = match take_branch(&mut input) {
            Ok(branch) => branch,
            Err(e) => return StepResult::Fail(e),
        };
        let branches = self.branches.len();
        let Some(branch) = self.branches.get_mut(usize::from(key)) else {
            return StepResult::Fail(StepError::BranchOutOfRange { key, branches });
        };

        let mut args = Args::one(value);
        for step in branch.steps_mut() {
            match step.run(args) {
                StepResult::Emit(out) => args = out,
                other => return other,
            }
        }
        match args.into_first() {
            Some(value) => StepResult::emit(Value::branch(key, value)),
            None => StepResult::Skip,
        }
    }

    fn reset(&mut self) {
        for branch in &mut self.branches {
            branch.reset();
        }
    }

    fn bind_pipeline(&mut self, name: Option<&str>) {
        for branch in &mut self.branches {
            branch.bind_pipeline(name);
        }
    }
}

/// Route each branch-marked item through `branches[key]`, keeping its key
///
/// Branches run one item at a time in input order. A key with no matching
/// branch fails the run.
pub fn with_branches(branches: impl IntoIterator<Item = Steps>) -> impl Step {
    WithBranches {
        branches: branches.into_iter().collect(),
    }
}

struct Merge;

impl Step for Merge {
    fn name(&self) -> &str {
        "Merge"
    }

    fn validate(&self, prev: &ArgTypes) -> Result<ArgTypes, ValidationError> {
        branch_payload(prev)?;
        Ok(ArgTypes::one(ArgType::Any))
    }

    fn run(&mut self, mut input: Args) -> StepResult {
        match take_branch(&mut input) {
            Ok(branch) => StepResult::emit(branch.value),
            Err(e) => StepResult::Fail(e),
        }
    }
}

/// Drop the branch marker and emit the bare payload
pub fn merge() -> impl Step {
    Merge
}

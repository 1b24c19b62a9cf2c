use std::marker::PhantomData;

use tracing::info;

use crate::step::{Arg, ArgTypes, Args, BoxError, Step, StepError, StepResult, ValidationError};

/// Check a single-value input of type `I` and declare `output`
pub(crate) fn accept<I: Arg>(
    prev: &ArgTypes,
    output: ArgTypes,
) -> Result<ArgTypes, ValidationError> {
    prev.check_compatible(&ArgTypes::of::<I>())?;
    Ok(output)
}

fn user_error<E: Into<BoxError>>(error: E) -> StepError {
    StepError::Custom(error.into())
}

struct Map<I, O, F> {
    f: F,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O, F> Step for Map<I, O, F>
where
    I: Arg,
    O: Arg,
    F: FnMut(I) -> Result<O, StepError> + Send,
{
    fn name(&self) -> &str {
        "Map"
    }

    fn validate(&self, prev: &ArgTypes) -> Result<ArgTypes, ValidationError> {
        accept::<I>(prev, ArgTypes::of::<O>())
    }

    fn run(&mut self, mut input: Args) -> StepResult {
        input
            .arg::<I>(0)
            .and_then(&mut self.f)
            .map(|out| Args::one(out.into_value()))
            .into()
    }
}

/// Transform every item
pub fn map<I, O, F>(mut f: F) -> impl Step
where
    I: Arg,
    O: Arg,
    F: FnMut(I) -> O + Send + 'static,
{
    Map {
        f: move |item: I| Ok::<_, StepError>(f(item)),
        _types: PhantomData,
    }
}

/// Transform every item; an error ends the run
pub fn try_map<I, O, E, F>(mut f: F) -> impl Step
where
    I: Arg,
    O: Arg,
    E: Into<BoxError>,
    F: FnMut(I) -> Result<O, E> + Send + 'static,
{
    Map {
        f: move |item: I| f(item).map_err(user_error),
        _types: PhantomData,
    }
}

struct Filter<I, F> {
    f: F,
    _types: PhantomData<fn(I)>,
}

impl<I, F> Step for Filter<I, F>
where
    I: Arg,
    F: FnMut(&I) -> Result<bool, StepError> + Send,
{
    fn name(&self) -> &str {
        "Filter"
    }

    fn validate(&self, prev: &ArgTypes) -> Result<ArgTypes, ValidationError> {
        accept::<I>(prev, ArgTypes::of::<I>())
    }

    fn run(&mut self, mut input: Args) -> StepResult {
        let item = match input.arg::<I>(0) {
            Ok(item) => item,
            Err(e) => return StepResult::Fail(e),
        };
        match (self.f)(&item) {
            Ok(true) => StepResult::emit(item.into_value()),
            Ok(false) => StepResult::Skip,
            Err(e) => StepResult::Fail(e),
        }
    }
}

/// Keep items matching the predicate
pub fn filter<I, F>(mut f: F) -> impl Step
where
    I: Arg,
    F: FnMut(&I) -> bool + Send + 'static,
{
    Filter {
        f: move |item: &I| Ok::<_, StepError>(f(item)),
        _types: PhantomData,
    }
}

/// Keep items matching the predicate; an error ends the run
pub fn try_filter<I, E, F>(mut f: F) -> impl Step
where
    I: Arg,
    E: Into<BoxError>,
    F: FnMut(&I) -> Result<bool, E> + Send + 'static,
{
    Filter {
        f: move |item: &I| f(item).map_err(user_error),
        _types: PhantomData,
    }
}

struct Take {
    limit: usize,
    seen: usize,
}

impl Step for Take {
    fn name(&self) -> &str {
        "Take"
    }

    fn validate(&self, prev: &ArgTypes) -> Result<ArgTypes, ValidationError> {
        Ok(prev.clone())
    }

    fn run(&mut self, input: Args) -> StepResult {
        if self.seen >= self.limit {
            return StepResult::Skip;
        }
        self.seen += 1;
        StepResult::Emit(input)
    }

    fn reset(&mut self) {
        self.seen = 0;
    }
}

/// Pass the first `limit` items, skip the rest
pub fn take(limit: usize) -> impl Step {
    Take { limit, seen: 0 }
}

struct Skip {
    count: usize,
    seen: usize,
}

impl Step for Skip {
    fn name(&self) -> &str {
        "Skip"
    }

    fn validate(&self, prev: &ArgTypes) -> Result<ArgTypes, ValidationError> {
        Ok(prev.clone())
    }

    fn run(&mut self, input: Args) -> StepResult {
        if self.seen < self.count {
            self.seen += 1;
            return StepResult::Skip;
        }
        StepResult::Emit(input)
    }

    fn reset(&mut self) {
        self.seen = 0;
    }
}

/// Skip the first `count` items, pass the rest
pub fn skip(count: usize) -> impl Step {
    Skip { count, seen: 0 }
}

struct TakeWhile<I, F> {
    f: F,
    stopped: bool,
    _types: PhantomData<fn(I)>,
}

impl<I, F> Step for TakeWhile<I, F>
where
    I: Arg,
    F: FnMut(&I) -> Result<bool, StepError> + Send,
{
    fn name(&self) -> &str {
        "TakeWhile"
    }

    fn validate(&self, prev: &ArgTypes) -> Result<ArgTypes, ValidationError> {
        accept::<I>(prev, ArgTypes::of::<I>())
    }

    fn run(&mut self, mut input: Args) -> StepResult {
        if self.stopped {
            return StepResult::Skip;
        }
        let item = match input.arg::<I>(0) {
            Ok(item) => item,
            Err(e) => return StepResult::Fail(e),
        };
        match (self.f)(&item) {
            Ok(true) => StepResult::emit(item.into_value()),
            Ok(false) => {
                self.stopped = true;
                StepResult::Skip
            }
            Err(e) => StepResult::Fail(e),
        }
    }

    fn reset(&mut self) {
        self.stopped = false;
    }
}

/// Pass items until the predicate first returns false, then skip everything
pub fn take_while<I, F>(mut f: F) -> impl Step
where
    I: Arg,
    F: FnMut(&I) -> bool + Send + 'static,
{
    TakeWhile {
        f: move |item: &I| Ok::<_, StepError>(f(item)),
        stopped: false,
        _types: PhantomData,
    }
}

pub fn try_take_while<I, E, F>(mut f: F) -> impl Step
where
    I: Arg,
    E: Into<BoxError>,
    F: FnMut(&I) -> Result<bool, E> + Send + 'static,
{
    TakeWhile {
        f: move |item: &I| f(item).map_err(user_error),
        stopped: false,
        _types: PhantomData,
    }
}

struct SkipWhile<I, F> {
    f: F,
    skipping: bool,
    _types: PhantomData<fn(I)>,
}

impl<I, F> Step for SkipWhile<I, F>
where
    I: Arg,
    F: FnMut(&I) -> Result<bool, StepError> + Send,
{
    fn name(&self) -> &str {
        "SkipWhile"
    }

    fn validate(&self, prev: &ArgTypes) -> Result<ArgTypes, ValidationError> {
        accept::<I>(prev, ArgTypes::of::<I>())
    }

    fn run(&mut self, mut input: Args) -> StepResult {
        if !self.skipping {
            return StepResult::Emit(input);
        }
        let item = match input.arg::<I>(0) {
            Ok(item) => item,
            Err(e) => return StepResult::Fail(e),
        };
        match (self.f)(&item) {
            Ok(true) => StepResult::Skip,
            Ok(false) => {
                self.skipping = false;
                StepResult::emit(item.into_value())
            }
            Err(e) => StepResult::Fail(e),
        }
    }

    fn reset(&mut self) {
        self.skipping = true;
    }
}

/// Skip items while the predicate holds, then pass everything
pub fn skip_while<I, F>(mut f: F) -> impl Step
where
    I: Arg,
    F: FnMut(&I) -> bool + Send + 'static,
{
    SkipWhile {
        f: move |item: &I| Ok::<_, StepError>(f(item)),
        skipping: true,
        _types: PhantomData,
    }
}

pub fn try_skip_while<I, E, F>(mut f: F) -> impl Step
where
    I: Arg,
    E: Into<BoxError>,
    F: FnMut(&I) -> Result<bool, E> + Send + 'static,
{
    SkipWhile {
        f: move |item: &I| f(item).map_err(user_error),
        skipping: true,
        _types: PhantomData,
    }
}

struct Inspect<I, F> {
    f: F,
    _types: PhantomData<fn(I)>,
}

impl<I, F> Step for Inspect<I, F>
where
    I: Arg,
    F: FnMut(&I) -> Result<(), StepError> + Send,
{
    fn name(&self) -> &str {
        "Inspect"
    }

    fn validate(&self, prev: &ArgTypes) -> Result<ArgTypes, ValidationError> {
        accept::<I>(prev, ArgTypes::of::<I>())
    }

    fn run(&mut self, mut input: Args) -> StepResult {
        let item = match input.arg::<I>(0) {
            Ok(item) => item,
            Err(e) => return StepResult::Fail(e),
        };
        if let Err(e) = (self.f)(&item) {
            return StepResult::Fail(e);
        }
        match input.set(0, item.into_value()) {
            Ok(()) => StepResult::Emit(input),
            Err(e) => StepResult::Fail(e),
        }
    }
}

/// Run a side effect on every item and pass it on unchanged
pub fn inspect<I, F>(mut f: F) -> impl Step
where
    I: Arg,
    F: FnMut(&I) + Send + 'static,
{
    Inspect {
        f: move |item: &I| {
            f(item);
            Ok::<_, StepError>(())
        },
        _types: PhantomData,
    }
}

pub fn try_inspect<I, E, F>(mut f: F) -> impl Step
where
    I: Arg,
    E: Into<BoxError>,
    F: FnMut(&I) -> Result<(), E> + Send + 'static,
{
    Inspect {
        f: move |item: &I| f(item).map_err(user_error),
        _types: PhantomData,
    }
}

struct Log {
    prefix: String,
    pipeline: Option<String>,
}

impl Step for Log {
    fn name(&self) -> &str {
        "Log"
    }

    fn validate(&self, prev: &ArgTypes) -> Result<ArgTypes, ValidationError> {
        Ok(prev.clone())
    }

    fn run(&mut self, input: Args) -> StepResult {
        info!(
            target: "stepflow::log",
            prefix = %self.prefix,
            pipeline = self.pipeline.as_deref().unwrap_or("unnamed"),
            args = ?input,
            "Step input"
        );
        StepResult::Emit(input)
    }

    fn bind_pipeline(&mut self, name: Option<&str>) {
        self.pipeline = name.map(str::to_string);
    }
}

/// Log every item's arguments at `info` and pass them on
pub fn log(prefix: impl Into<String>) -> impl Step {
    Log {
        prefix: prefix.into(),
        pipeline: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{ArgType, Value};

    fn run_all(step: &mut impl Step, items: &[i32]) -> Vec<Option<Value>> {
        items
            .iter()
            .map(|item| match step.run(Args::one(Value::I32(*item))) {
                StepResult::Emit(args) => args.into_first(),
                StepResult::Skip => None,
                StepResult::Fail(e) => panic!("Unexpected failure: {}", e),
            })
            .collect()
    }

    #[test]
    fn map_declares_output_type() {
        let step = map(|x: i32| x.to_string());
        assert_eq!(
            step.validate(&ArgTypes::of::<i32>()).unwrap(),
            ArgTypes::of::<String>()
        );
        assert!(step.validate(&ArgTypes::of::<i64>()).is_err());
    }

    #[test]
    fn map_transforms_items() {
        let mut step = map(|x: i32| x * 10);
        assert_eq!(
            run_all(&mut step, &[1, 2]),
            vec![Some(Value::I32(10)), Some(Value::I32(20))]
        );
    }

    #[test]
    fn try_map_reports_user_error() {
        let mut step = try_map(|x: i32| {
            if x < 0 {
                Err("negative")
            } else {
                Ok(x)
            }
        });
        match step.run(Args::one(Value::I32(-1))) {
            StepResult::Fail(e) => assert_eq!(e.to_string(), "negative"),
            other => panic!("Expected Fail, got {:?}", other),
        }
    }

    #[test]
    fn wrong_runtime_type_fails() {
        let mut step = map(|x: i32| x);
        assert!(matches!(
            step.run(Args::one(Value::Bool(true))),
            StepResult::Fail(StepError::UnexpectedArgType { .. })
        ));
    }

    #[test]
    fn filter_skips_rejected_items() {
        let mut step = filter(|x: &i32| x % 2 == 0);
        assert_eq!(
            run_all(&mut step, &[1, 2, 3, 4]),
            vec![None, Some(Value::I32(2)), None, Some(Value::I32(4))]
        );
    }

    #[test]
    fn take_counts_and_resets() {
        let mut step = take(2);
        assert_eq!(
            run_all(&mut step, &[1, 2, 3]),
            vec![Some(Value::I32(1)), Some(Value::I32(2)), None]
        );
        step.reset();
        assert_eq!(run_all(&mut step, &[9]), vec![Some(Value::I32(9))]);
    }

    #[test]
    fn take_zero_skips_everything() {
        let mut step = take(0);
        assert_eq!(run_all(&mut step, &[1, 2]), vec![None, None]);
    }

    #[test]
    fn skip_drops_leading_items() {
        let mut step = skip(2);
        assert_eq!(
            run_all(&mut step, &[1, 2, 3]),
            vec![None, None, Some(Value::I32(3))]
        );
    }

    #[test]
    fn take_while_stops_for_good() {
        let mut step = take_while(|x: &i32| *x < 3);
        assert_eq!(
            run_all(&mut step, &[1, 2, 3, 1]),
            vec![Some(Value::I32(1)), Some(Value::I32(2)), None, None]
        );
        step.reset();
        assert_eq!(run_all(&mut step, &[1]), vec![Some(Value::I32(1))]);
    }

    #[test]
    fn skip_while_passes_after_first_false() {
        let mut step = skip_while(|x: &i32| *x < 3);
        assert_eq!(
            run_all(&mut step, &[1, 2, 3, 1]),
            vec![None, None, Some(Value::I32(3)), Some(Value::I32(1))]
        );
    }

    #[test]
    fn inspect_sees_items_and_passes_them_on() {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut step = inspect(move |x: &i32| sink.lock().unwrap().push(*x));
        assert_eq!(
            run_all(&mut step, &[5, 6]),
            vec![Some(Value::I32(5)), Some(Value::I32(6))]
        );
        assert_eq!(*seen.lock().unwrap(), vec![5, 6]);
    }

    #[test]
    fn log_records_bound_pipeline_name() {
        let mut step = Log {
            prefix: "debug".to_string(),
            pipeline: None,
        };
        step.bind_pipeline(Some("ingest"));
        assert_eq!(step.pipeline.as_deref(), Some("ingest"));
        assert_eq!(
            run_all(&mut step, &[1]),
            vec![Some(Value::I32(1))]
        );

        step.bind_pipeline(None);
        assert_eq!(step.pipeline, None);
    }

    #[test]
    fn log_passes_types_through() {
        let step = log("debug");
        let types = ArgTypes::two(ArgType::I32, ArgType::String);
        assert_eq!(step.validate(&types).unwrap(), types);
    }
}

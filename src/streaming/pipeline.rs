use std::fmt;

use futures::Stream;
use tokio_util::sync::CancellationToken;
use tracing::{Span, debug, debug_span};

use super::error::ErrorHandler;
use super::input::{Cursor, Input};
use super::options::PipelineOptions;
use crate::engine::{PipelineError, Processor, Validator};
use crate::step::{Arg, ArgTypes, Args, Steps, ValidationError, Value};

/// An input bound to a validated step chain
///
/// A pipeline whose steps fail validation is poisoned: iterating it reports
/// the validation error to the error handler and yields nothing.
pub struct Pipeline<T: Arg> {
    input: Input<T>,
    state: Result<Processor, ValidationError>,
    options: PipelineOptions,
}

impl<T: Arg> Pipeline<T> {
    /// Build a pipeline; validation errors poison it instead of failing
    pub fn new(input: impl Into<Input<T>>, steps: Steps) -> Self {
        let state = Validator::validate(ArgTypes::of::<T>(), steps).map(Processor::new);
        if let Err(e) = &state {
            debug!(error = %e, "Pipeline poisoned by validation error");
        }
        Self {
            input: input.into(),
            state,
            options: PipelineOptions::default(),
        }
    }

    /// Build a pipeline, returning the validation error directly
    pub fn try_new(input: impl Into<Input<T>>, steps: Steps) -> Result<Self, ValidationError> {
        let pipeline = Self::new(input, steps);
        match pipeline.state {
            Ok(_) => Ok(pipeline),
            Err(e) => Err(e),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.options = self.options.with_name(name);
        self
    }

    pub fn with_error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.options = self.options.with_error_handler(handler);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.options = self.options.with_cancellation(token);
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// The validation error, if the pipeline is poisoned
    pub fn error(&self) -> Option<&ValidationError> {
        self.state.as_ref().err()
    }

    pub fn is_poisoned(&self) -> bool {
        self.state.is_err()
    }

    /// Output types of the validated chain
    pub fn output_types(&self) -> Option<&ArgTypes> {
        self.state
            .as_ref()
            .ok()
            .map(|processor| processor.chain().output_types())
    }

    /// Re-arm every stateful step and the aggregator before another iteration
    ///
    /// Without a reset, counters and accumulators carry over between runs.
    pub fn reset(&mut self) {
        if let Ok(processor) = self.state.as_mut() {
            processor.reset();
        }
    }

    /// Blocking iteration over output values
    ///
    /// Queue inputs block the current thread while waiting; use
    /// [`Pipeline::stream`] inside an async runtime.
    pub fn iter(&mut self) -> Iter<'_, T> {
        Iter {
            run: Run::start(self),
        }
    }

    /// Blocking iteration over `(key, value)` pairs
    ///
    /// The key is the item's position, unless the output holds two slots, in
    /// which case slot 0 is the key and slot 1 the value.
    pub fn iter_indexed(&mut self) -> IndexedIter<'_, T> {
        IndexedIter {
            run: Run::start(self),
        }
    }

    /// Async stream over output values
    pub fn stream(&mut self) -> impl Stream<Item = Value> + '_ {
        futures::stream::unfold(Run::start(self), |mut run| async move {
            loop {
                let (_, args) = run.next_async().await?;
                if let Some(value) = args.into_first() {
                    return Some((value, run));
                }
            }
        })
    }

    /// Async stream over `(key, value)` pairs, keyed like [`Pipeline::iter_indexed`]
    pub fn stream_indexed(&mut self) -> impl Stream<Item = (Value, Value)> + '_ {
        futures::stream::unfold(Run::start(self), |mut run| async move {
            loop {
                let (index, args) = run.next_async().await?;
                if let Some(entry) = entry(index, args) {
                    return Some((entry, run));
                }
            }
        })
    }
}

impl<T: Arg> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("queue", &self.input.is_queue())
            .field("poisoned", &self.is_poisoned())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn entry(index: usize, args: Args) -> Option<(Value, Value)> {
    if args.len() > 1 {
        args.into_pair()
    } else {
        args.into_first().map(|value| (Value::Usize(index), value))
    }
}

/// State of one pass over a pipeline's input
struct Run<'a, T> {
    cursor: Cursor<'a, T>,
    state: Result<&'a mut Processor, &'a ValidationError>,
    options: &'a PipelineOptions,
    span: Span,
    index: usize,
    done: bool,
}

impl<'a, T: Arg> Run<'a, T> {
    fn start(pipeline: &'a mut Pipeline<T>) -> Self {
        let Pipeline {
            input,
            state,
            options,
        } = pipeline;
        if let Ok(processor) = state.as_mut() {
            processor.bind_pipeline(options.name());
        }
        let span = debug_span!("pipeline", name = options.name().unwrap_or("unnamed"));
        Self {
            cursor: Cursor::new(input),
            state: state.as_mut().map_err(|e| &*e),
            options,
            span,
            index: 0,
            done: false,
        }
    }

    /// Report a poisoned pipeline once and stop
    fn ready(&mut self) -> bool {
        if self.done {
            return false;
        }
        if let Err(error) = self.state {
            self.fail(PipelineError::Validation(error.clone()));
            return false;
        }
        true
    }

    fn fail(&mut self, error: PipelineError) {
        self.done = true;
        self.options.report(error);
    }

    /// Stop with `Cancelled` once the token has fired, even for chains with no steps
    fn cancelled(&mut self) -> bool {
        if !self.options.cancellation().is_cancelled() {
            return false;
        }
        self.fail(PipelineError::Cancelled);
        true
    }

    fn feed(&mut self, item: T, is_last: bool) -> Option<(usize, Args)> {
        let index = self.index;
        self.index += 1;
        if is_last {
            self.done = true;
        }
        if self.cancelled() {
            return None;
        }

        let processor = self.state.as_mut().ok()?;
        let outcome = {
            let _entered = self.span.enter();
            processor.process(item.into_value(), is_last, self.options.cancellation())
        };
        match outcome {
            Ok(Some(args)) if !args.is_empty() => Some((index, args)),
            Ok(_) => None,
            Err(error) => {
                self.fail(error);
                None
            }
        }
    }

    fn next_blocking(&mut self) -> Option<(usize, Args)> {
        while self.ready() {
            if self.cancelled() {
                return None;
            }
            let Some((item, is_last)) = self.cursor.next_blocking() else {
                self.done = true;
                return None;
            };
            if let Some(out) = self.feed(item, is_last) {
                return Some(out);
            }
        }
        None
    }

    async fn next_async(&mut self) -> Option<(usize, Args)> {
        while self.ready() {
            match self.cursor.next(self.options.cancellation()).await {
                Ok(Some((item, is_last))) => {
                    if let Some(out) = self.feed(item, is_last) {
                        return Some(out);
                    }
                }
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Err(error) => {
                    self.fail(error);
                    return None;
                }
            }
        }
        None
    }
}

/// Blocking iterator over a pipeline's output values
pub struct Iter<'a, T: Arg> {
    run: Run<'a, T>,
}

impl<T: Arg> Iterator for Iter<'_, T> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        loop {
            let (_, args) = self.run.next_blocking()?;
            if let Some(value) = args.into_first() {
                return Some(value);
            }
        }
    }
}

/// Blocking iterator over a pipeline's `(key, value)` pairs
pub struct IndexedIter<'a, T: Arg> {
    run: Run<'a, T>,
}

impl<T: Arg> Iterator for IndexedIter<'_, T> {
    type Item = (Value, Value);

    fn next(&mut self) -> Option<(Value, Value)> {
        loop {
            let (index, args) = self.run.next_blocking()?;
            if let Some(entry) = entry(index, args) {
                return Some(entry);
            }
        }
    }
}

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::PipelineError;
use super::validator::Chain;
use crate::step::{Args, StepResult, Value};

/// Drives single items through a validated chain
///
/// The aggregator's result is emitted once, when the item flagged as last has
/// been processed and at least one item reached the aggregator.
#[derive(Debug)]
pub struct Processor {
    chain: Chain,
    aggregated: bool,
}

impl Processor {
    pub fn new(chain: Chain) -> Self {
        Self {
            chain,
            aggregated: false,
        }
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Run one item through every step and the aggregator
    ///
    /// Returns the arguments to yield for this item, if any. Errors are
    /// terminal for the run.
    pub fn process(
        &mut self,
        item: Value,
        is_last: bool,
        cancel: &CancellationToken,
    ) -> Result<Option<Args>, PipelineError> {
        let steps = self.chain.steps_mut();
        let mut current = Some(Args::one(item));

        for step in steps.steps_mut() {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }
            let Some(args) = current.take() else {
                break;
            };
            match step.run(args) {
                StepResult::Emit(out) => current = Some(out),
                StepResult::Skip => {
                    debug!(step = step.name(), "Item skipped");
                    break;
                }
                StepResult::Fail(source) => {
                    warn!(step = step.name(), error = %source, "Step failed");
                    return Err(PipelineError::Step {
                        name: step.name().to_string(),
                        source,
                    });
                }
            }
        }

        let Some(args) = current else {
            return Ok(self.flush(is_last));
        };

        let Some(aggregator) = steps.aggregator_mut() else {
            return Ok(Some(args));
        };
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        if let Err(source) = aggregator.reduce(args) {
            warn!(aggregator = aggregator.name(), error = %source, "Aggregator failed");
            return Err(PipelineError::Aggregator {
                name: aggregator.name().to_string(),
                source,
            });
        }
        self.aggregated = true;

        Ok(self.flush(is_last))
    }

    /// Hand the owning pipeline's name to every step
    pub fn bind_pipeline(&mut self, name: Option<&str>) {
        self.chain.bind_pipeline(name);
    }

    /// Re-arm every step, the aggregator and the emission flag
    pub fn reset(&mut self) {
        self.chain.reset();
        self.aggregated = false;
    }

    fn flush(&mut self, is_last: bool) -> Option<Args> {
        if !is_last || !self.aggregated {
            return None;
        }
        let result = self.chain.steps_mut().aggregator_mut()?.result();
        debug!("Emitting aggregated result");
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::sum;
    use crate::engine::Validator;
    use crate::ops::{filter, map, take};
    use crate::step::{ArgTypes, Steps};

    fn processor(steps: Steps) -> Processor {
        Processor::new(Validator::validate(ArgTypes::of::<i32>(), steps).unwrap())
    }

    fn first(args: Option<Args>) -> Option<Value> {
        args.and_then(Args::into_first)
    }

    #[test]
    fn passes_item_through_steps() {
        let mut p = processor(Steps::new().then(map(|x: i32| x * 2)));
        let token = CancellationToken::new();
        let out = p.process(Value::I32(4), false, &token).unwrap();
        assert_eq!(first(out), Some(Value::I32(8)));
    }

    #[test]
    fn skipped_item_yields_nothing() {
        let mut p = processor(Steps::new().then(filter(|x: &i32| *x > 10)));
        let token = CancellationToken::new();
        assert!(p.process(Value::I32(4), false, &token).unwrap().is_none());
    }

    #[test]
    fn aggregate_emits_only_at_last_item() {
        let mut p = processor(Steps::new().aggregate(sum::<i32>()));
        let token = CancellationToken::new();
        assert!(p.process(Value::I32(1), false, &token).unwrap().is_none());
        assert!(p.process(Value::I32(2), false, &token).unwrap().is_none());
        let out = p.process(Value::I32(3), true, &token).unwrap();
        assert_eq!(first(out), Some(Value::I32(6)));
    }

    #[test]
    fn aggregate_emits_when_last_item_is_skipped() {
        let mut p = processor(
            Steps::new()
                .then(filter(|x: &i32| *x < 3))
                .aggregate(sum::<i32>()),
        );
        let token = CancellationToken::new();
        assert!(p.process(Value::I32(1), false, &token).unwrap().is_none());
        assert!(p.process(Value::I32(2), false, &token).unwrap().is_none());
        let out = p.process(Value::I32(3), true, &token).unwrap();
        assert_eq!(first(out), Some(Value::I32(3)));
    }

    #[test]
    fn nothing_aggregated_means_nothing_emitted() {
        let mut p = processor(
            Steps::new()
                .then(filter(|_: &i32| false))
                .aggregate(sum::<i32>()),
        );
        let token = CancellationToken::new();
        assert!(p.process(Value::I32(1), true, &token).unwrap().is_none());
    }

    #[test]
    fn cancellation_is_checked_before_steps() {
        let mut p = processor(Steps::new().then(map(|x: i32| x)));
        let token = CancellationToken::new();
        token.cancel();
        let err = p.process(Value::I32(1), false, &token).unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled));
    }

    #[test]
    fn reset_rearms_state() {
        let mut p = processor(Steps::new().then(take(1)).aggregate(sum::<i32>()));
        let token = CancellationToken::new();
        let out = p.process(Value::I32(5), true, &token).unwrap();
        assert_eq!(first(out), Some(Value::I32(5)));

        p.reset();
        let out = p.process(Value::I32(7), true, &token).unwrap();
        assert_eq!(first(out), Some(Value::I32(7)));
    }
}

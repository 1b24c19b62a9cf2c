use crate::ops::basic::accept;
use crate::step::{Arg, ArgTypes, Args, BoxError, Reducer, StepError, ValidationError};

/// Accumulator over items of type `T`, restarting from `init` on reset
pub(crate) struct Fold<T, F> {
    name: &'static str,
    init: T,
    acc: T,
    f: F,
}

impl<T, F> Fold<T, F>
where
    T: Arg,
    F: FnMut(T, T) -> Result<T, StepError> + Send,
{
    pub(crate) fn named(name: &'static str, init: T, f: F) -> Self {
        Self {
            name,
            acc: init.clone(),
            init,
            f,
        }
    }
}

impl<T, F> Reducer for Fold<T, F>
where
    T: Arg,
    F: FnMut(T, T) -> Result<T, StepError> + Send,
{
    fn name(&self) -> &str {
        self.name
    }

    fn validate(&self, prev: &ArgTypes) -> Result<ArgTypes, ValidationError> {
        accept::<T>(prev, ArgTypes::of::<T>())
    }

    fn reduce(&mut self, mut input: Args) -> Result<(), StepError> {
        let item = input.arg::<T>(0)?;
        // a failed combine leaves the accumulator untouched
        self.acc = (self.f)(self.acc.clone(), item)?;
        Ok(())
    }

    fn result(&self) -> Args {
        Args::one(self.acc.clone().into_value())
    }

    fn reset(&mut self) {
        self.acc = self.init.clone();
    }
}

/// Fold items into an accumulator starting at `init`
pub fn fold<T, F>(init: T, mut f: F) -> impl Reducer
where
    T: Arg,
    F: FnMut(T, T) -> T + Send + 'static,
{
    Fold::named("Fold", init, move |acc: T, item: T| {
        Ok::<_, StepError>(f(acc, item))
    })
}

/// Fold items; an error ends the run
pub fn try_fold<T, E, F>(init: T, mut f: F) -> impl Reducer
where
    T: Arg,
    E: Into<BoxError>,
    F: FnMut(T, T) -> Result<T, E> + Send + 'static,
{
    Fold::named("Fold", init, move |acc: T, item: T| {
        f(acc, item).map_err(|e| StepError::Custom(e.into()))
    })
}

/// Fold from `T::default()`
pub fn reduce<T, F>(mut f: F) -> impl Reducer
where
    T: Arg + Default,
    F: FnMut(T, T) -> T + Send + 'static,
{
    Fold::named("Reduce", T::default(), move |acc: T, item: T| {
        Ok::<_, StepError>(f(acc, item))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Value;

    fn feed(reducer: &mut impl Reducer, items: &[i64]) {
        for item in items {
            reducer.reduce(Args::one(Value::I64(*item))).unwrap();
        }
    }

    #[test]
    fn fold_accumulates_from_init() {
        let mut r = fold(100i64, |acc, x| acc - x);
        feed(&mut r, &[1, 2, 3]);
        assert_eq!(r.result().into_first(), Some(Value::I64(94)));
    }

    #[test]
    fn fold_reset_restores_init() {
        let mut r = fold(10i64, |acc, x| acc + x);
        feed(&mut r, &[5]);
        r.reset();
        assert_eq!(r.result().into_first(), Some(Value::I64(10)));
    }

    #[test]
    fn reduce_starts_from_default() {
        let mut r = reduce(|acc: i64, x: i64| acc * 2 + x);
        feed(&mut r, &[1, 1]);
        assert_eq!(r.result().into_first(), Some(Value::I64(3)));
        assert_eq!(r.name(), "Reduce");
    }

    #[test]
    fn try_fold_propagates_error() {
        let mut r = try_fold(0i64, |acc, x| {
            if x < 0 {
                Err("negative input")
            } else {
                Ok(acc + x)
            }
        });
        let err = r.reduce(Args::one(Value::I64(-1))).unwrap_err();
        assert_eq!(err.to_string(), "negative input");
    }

    #[test]
    fn failed_combine_keeps_accumulated_state() {
        let mut r = try_fold(0i64, |acc, x| {
            if x < 0 {
                Err("negative input")
            } else {
                Ok(acc + x)
            }
        });
        feed(&mut r, &[4, 5]);
        assert!(r.reduce(Args::one(Value::I64(-1))).is_err());
        assert_eq!(r.result().into_first(), Some(Value::I64(9)));

        feed(&mut r, &[1]);
        assert_eq!(r.result().into_first(), Some(Value::I64(10)));
    }

    #[test]
    fn fold_validates_item_type() {
        let r = fold(String::new(), |mut acc, s| {
            acc.push_str(&s);
            acc
        });
        assert_eq!(
            r.validate(&ArgTypes::of::<String>()).unwrap(),
            ArgTypes::of::<String>()
        );
        assert!(r.validate(&ArgTypes::of::<i32>()).is_err());
    }
}

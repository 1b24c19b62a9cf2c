use std::marker::PhantomData;

use super::fold::Fold;
use crate::ops::basic::accept;
use crate::step::{Arg, ArgTypes, Args, Reducer, StepError, ValidationError, Value};

/// Numeric kinds usable by `sum`, `min`, `max` and `avg`
pub trait Numeric: Arg + Copy + PartialOrd + Default {
    /// Seed for `max`
    const LOWEST: Self;
    /// Seed for `min`
    const HIGHEST: Self;

    fn checked_sum(self, other: Self) -> Option<Self>;

    fn as_f64(self) -> f64;
}

macro_rules! integer_numeric {
    ($($ty:ty),+ $(,)?) => {$(
        impl Numeric for $ty {
            const LOWEST: Self = <$ty>::MIN;
            const HIGHEST: Self = <$ty>::MAX;

            fn checked_sum(self, other: Self) -> Option<Self> {
                self.checked_add(other)
            }

            fn as_f64(self) -> f64 {
                self as f64
            }
        }
    )+};
}

integer_numeric!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! float_numeric {
    ($($ty:ty),+ $(,)?) => {$(
        impl Numeric for $ty {
            const LOWEST: Self = <$ty>::MIN;
            const HIGHEST: Self = <$ty>::MAX;

            fn checked_sum(self, other: Self) -> Option<Self> {
                Some(self + other)
            }

            fn as_f64(self) -> f64 {
                f64::from(self)
            }
        }
    )+};
}

float_numeric!(f32, f64);

/// Sum of all items; integer overflow fails the run
pub fn sum<N: Numeric>() -> impl Reducer {
    Fold::named("Sum", N::default(), |acc: N, item: N| {
        acc.checked_sum(item).ok_or(StepError::Overflow)
    })
}

/// Largest item, seeded with the kind's lowest value
pub fn max<N: Numeric>() -> impl Reducer {
    Fold::named("Max", N::LOWEST, |acc: N, item: N| {
        Ok::<_, StepError>(if item > acc { item } else { acc })
    })
}

/// Smallest item, seeded with the kind's highest value
pub fn min<N: Numeric>() -> impl Reducer {
    Fold::named("Min", N::HIGHEST, |acc: N, item: N| {
        Ok::<_, StepError>(if item < acc { item } else { acc })
    })
}

struct Avg<N> {
    count: u64,
    mean: f64,
    _kind: PhantomData<fn(N)>,
}

impl<N: Numeric> Reducer for Avg<N> {
    fn name(&self) -> &str {
        "Avg"
    }

    fn validate(&self, prev: &ArgTypes) -> Result<ArgTypes, ValidationError> {
        accept::<N>(prev, ArgTypes::of::<f64>())
    }

    fn reduce(&mut self, mut input: Args) -> Result<(), StepError> {
        let item = input.arg::<N>(0)?.as_f64();
        self.count += 1;
        self.mean += (item - self.mean) / self.count as f64;
        Ok(())
    }

    fn result(&self) -> Args {
        Args::one(Value::F64(self.mean))
    }

    fn reset(&mut self) {
        self.count = 0;
        self.mean = 0.0;
    }
}

/// Running mean of all items as `f64`
pub fn avg<N: Numeric>() -> impl Reducer {
    Avg::<N> {
        count: 0,
        mean: 0.0,
        _kind: PhantomData,
    }
}

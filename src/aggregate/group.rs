use std::hash::Hash;
use std::marker::PhantomData;

use indexmap::IndexMap;

use crate::ops::basic::accept;
use crate::step::{Arg, ArgTypes, Args, BoxError, Reducer, StepError, ValidationError};

struct GroupBy<I, K, V, F> {
    f: F,
    groups: IndexMap<K, Vec<V>>,
    _input: PhantomData<fn(I)>,
}

impl<I, K, V, F> Reducer for GroupBy<I, K, V, F>
where
    I: Arg,
    K: Arg + Eq + Hash,
    V: Arg,
    F: FnMut(I) -> Result<(K, V), StepError> + Send,
{
    fn name(&self) -> &str {
        "GroupBy"
    }

    fn validate(&self, prev: &ArgTypes) -> Result<ArgTypes, ValidationError> {
        accept::<I>(prev, ArgTypes::of::<IndexMap<K, Vec<V>>>())
    }

    fn reduce(&mut self, mut input: Args) -> Result<(), StepError> {
        let item = input.arg::<I>(0)?;
        let (key, value) = (self.f)(item)?;
        self.groups.entry(key).or_default().push(value);
        Ok(())
    }

    fn result(&self) -> Args {
        Args::one(self.groups.clone().into_value())
    }

    fn reset(&mut self) {
        self.groups = IndexMap::new();
    }
}

/// Group items into `key -> [values]`, keys in first-seen order
pub fn group_by<I, K, V, F>(mut f: F) -> impl Reducer
where
    I: Arg,
    K: Arg + Eq + Hash,
    V: Arg,
    F: FnMut(I) -> (K, V) + Send + 'static,
{
    GroupBy {
        f: move |item: I| Ok::<_, StepError>(f(item)),
        groups: IndexMap::new(),
        _input: PhantomData,
    }
}

pub fn try_group_by<I, K, V, E, F>(mut f: F) -> impl Reducer
where
    I: Arg,
    K: Arg + Eq + Hash,
    V: Arg,
    E: Into<BoxError>,
    F: FnMut(I) -> Result<(K, V), E> + Send + 'static,
{
    GroupBy {
        f: move |item: I| f(item).map_err(|e| StepError::Custom(e.into())),
        groups: IndexMap::new(),
        _input: PhantomData,
    }
}

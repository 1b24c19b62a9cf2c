use super::error::{StepError, ValidationError};
use super::value::{Arg, ArgType, Value};

/// Capacity of an argument tuple
pub const MAX_ARGS: usize = 4;

/// Fixed-capacity argument tuple passed between steps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    slots: [Option<Value>; MAX_ARGS],
    len: usize,
}

impl Args {
    pub fn one(value: Value) -> Self {
        Self {
            slots: [Some(value), None, None, None],
            len: 1,
        }
    }

    pub fn two(first: Value, second: Value) -> Self {
        Self {
            slots: [Some(first), Some(second), None, None],
            len: 2,
        }
    }

    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Result<Self, StepError> {
        let mut args = Self::default();
        for value in values {
            if args.len == MAX_ARGS {
                return Err(StepError::TooManyArgs(args.len + 1));
            }
            args.slots[args.len] = Some(value);
            args.len += 1;
        }
        Ok(args)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, slot: usize) -> Option<&Value> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Move a value out of its slot, leaving the slot empty
    pub fn take(&mut self, slot: usize) -> Option<Value> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    /// Put a value back into a slot below `len`
    pub fn set(&mut self, slot: usize, value: Value) -> Result<(), StepError> {
        if slot >= self.len {
            return Err(StepError::MissingArg(slot + 1));
        }
        self.slots[slot] = Some(value);
        Ok(())
    }

    /// Take and convert the value in `slot`
    pub fn arg<T: Arg>(&mut self, slot: usize) -> Result<T, StepError> {
        self.take(slot)
            .ok_or(StepError::MissingArg(slot + 1))
            .and_then(T::from_value)
    }

    pub fn into_first(mut self) -> Option<Value> {
        self.take(0)
    }

    /// First two slots, when the tuple holds at least two values
    pub fn into_pair(mut self) -> Option<(Value, Value)> {
        if self.len < 2 {
            return None;
        }
        Some((self.take(0)?, self.take(1)?))
    }

    pub fn types(&self) -> ArgTypes {
        ArgTypes::new(self.slots.iter().flatten().map(Value::arg_type))
    }
}

/// Parallel type tuple describing a step's inputs or outputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ArgTypes([Option<ArgType>; MAX_ARGS]);

impl ArgTypes {
    /// Build from up to `MAX_ARGS` types; extra types are ignored
    pub fn new(types: impl IntoIterator<Item = ArgType>) -> Self {
        let mut slots: [Option<ArgType>; MAX_ARGS] = Default::default();
        for (slot, arg_type) in slots.iter_mut().zip(types) {
            *slot = Some(arg_type);
        }
        Self(slots)
    }

    pub fn one(arg_type: ArgType) -> Self {
        Self::new([arg_type])
    }

    pub fn two(first: ArgType, second: ArgType) -> Self {
        Self::new([first, second])
    }

    pub fn of<T: Arg>() -> Self {
        Self::one(T::arg_type())
    }

    /// Sentinel input for a step list with no known predecessor
    pub fn skip_first() -> Self {
        Self::one(ArgType::SkipFirstArgValidation)
    }

    pub fn first(&self) -> Option<&ArgType> {
        self.slot(0)
    }

    pub fn slot(&self, slot: usize) -> Option<&ArgType> {
        self.0.get(slot).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.0.iter().take_while(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.0[0].is_none()
    }

    pub fn skips_first(&self) -> bool {
        matches!(self.first(), Some(ArgType::SkipFirstArgValidation))
    }

    /// Check that these (previous output) types feed a step expecting `expected`
    ///
    /// Every slot must match; slot 0 is not compared when it holds the
    /// `SkipFirstArgValidation` sentinel.
    pub fn check_compatible(&self, expected: &ArgTypes) -> Result<(), ValidationError> {
        for (idx, (found, wanted)) in self.0.iter().zip(expected.0.iter()).enumerate() {
            if idx == 0 && self.skips_first() {
                continue;
            }
            if found != wanted {
                return Err(ValidationError::IncompatibleInArgType {
                    found: slot_name(found.as_ref()),
                    expected: slot_name(wanted.as_ref()),
                    slot: idx + 1,
                });
            }
        }
        Ok(())
    }
}

pub(crate) fn slot_name(slot: Option<&ArgType>) -> String {
    slot.map_or_else(|| "none".to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_track_length() {
        let args = Args::two(Value::I32(1), Value::Bool(true));
        assert_eq!(args.len(), 2);
        assert_eq!(args.get(1), Some(&Value::Bool(true)));
        assert_eq!(args.get(2), None);
        assert_eq!(args.types(), ArgTypes::two(ArgType::I32, ArgType::Bool));
    }

    #[test]
    fn from_values_rejects_overflowing_tuple() {
        let values = (0..5).map(Value::I32);
        let err = Args::from_values(values).unwrap_err();
        assert!(matches!(err, StepError::TooManyArgs(5)));
    }

    #[test]
    fn arg_takes_and_converts() {
        let mut args = Args::one(Value::String("x".to_string()));
        let value: String = args.arg(0).unwrap();
        assert_eq!(value, "x");
        assert!(matches!(args.arg::<String>(0), Err(StepError::MissingArg(1))));
    }

    #[test]
    fn into_pair_requires_two_slots() {
        assert_eq!(Args::one(Value::I32(1)).into_pair(), None);
        assert_eq!(
            Args::two(Value::I32(1), Value::I32(2)).into_pair(),
            Some((Value::I32(1), Value::I32(2)))
        );
    }

    #[test]
    fn compatible_types_pass() {
        let prev = ArgTypes::of::<i32>();
        assert!(prev.check_compatible(&ArgTypes::of::<i32>()).is_ok());
    }

    #[test]
    fn mismatch_reports_one_based_slot() {
        let prev = ArgTypes::two(ArgType::I32, ArgType::String);
        let expected = ArgTypes::two(ArgType::I32, ArgType::Bool);
        let err = prev.check_compatible(&expected).unwrap_err();
        assert_eq!(
            err.to_string(),
            "incompatible input argument type [string!=bool:2]"
        );
    }

    #[test]
    fn extra_slot_is_a_mismatch() {
        let prev = ArgTypes::two(ArgType::I32, ArgType::I32);
        let err = prev.check_compatible(&ArgTypes::of::<i32>()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::IncompatibleInArgType {
                found: "i32".to_string(),
                expected: "none".to_string(),
                slot: 2,
            }
        );
    }

    #[test]
    fn sentinel_skips_first_slot_only() {
        let prev = ArgTypes::skip_first();
        assert!(prev.check_compatible(&ArgTypes::of::<String>()).is_ok());

        let err = prev
            .check_compatible(&ArgTypes::two(ArgType::I32, ArgType::I32))
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::IncompatibleInArgType { slot: 2, .. }
        ));
    }
}

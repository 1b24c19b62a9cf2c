use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;

use super::error::StepError;

/// Runtime type tag compared by value during validation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgType {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    String,
    /// Widened type produced by merge; only `Value` inputs accept it
    Any,
    /// Branch marker carrying its payload type
    Branch(Box<ArgType>),
    Custom {
        id: TypeId,
        name: &'static str,
    },
    /// Validation-only sentinel: the first step has no previous output
    SkipFirstArgValidation,
}

impl ArgType {
    pub fn of<T: Arg>() -> Self {
        T::arg_type()
    }

    pub fn custom<T: 'static>() -> Self {
        Self::Custom {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn branch(payload: ArgType) -> Self {
        Self::Branch(Box::new(payload))
    }

    pub fn branch_payload(&self) -> Option<&ArgType> {
        match self {
            Self::Branch(payload) => Some(payload),
            _ => None,
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "string",
            Self::Any => "any",
            Self::Branch(payload) => return write!(f, "branch<{payload}>"),
            Self::Custom { name, .. } => *name,
            Self::SkipFirstArgValidation => "skip",
        };
        f.write_str(name)
    }
}

trait CloneAny: Send {
    fn clone_box(&self) -> Box<dyn CloneAny>;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn value_type(&self) -> TypeId;
}

impl<T: Any + Clone + Send> CloneAny for T {
    fn clone_box(&self) -> Box<dyn CloneAny> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn value_type(&self) -> TypeId {
        TypeId::of::<T>()
    }
}

/// Type-erased user value travelling in a `Value::Custom` slot
pub struct CustomValue {
    name: &'static str,
    inner: Box<dyn CloneAny>,
}

impl CustomValue {
    pub fn new<T: Any + Clone + Send>(value: T) -> Self {
        Self {
            name: type_name::<T>(),
            inner: Box::new(value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.name
    }

    pub fn arg_type(&self) -> ArgType {
        ArgType::Custom {
            id: self.inner.value_type(),
            name: self.name,
        }
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.value_type() == TypeId::of::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref()
    }

    pub fn downcast<T: Any>(self) -> Result<T, StepError> {
        let found = self.name;
        self.inner
            .into_any()
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| StepError::UnexpectedArgType {
                found: found.to_string(),
                expected: type_name::<T>().to_string(),
            })
    }
}

impl Clone for CustomValue {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            inner: self.inner.clone_box(),
        }
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Custom").field(&self.name).finish()
    }
}

/// Branch marker produced by split and consumed by branches/merge
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub key: u8,
    pub value: Value,
}

/// A single argument slot value
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    F32(f32),
    F64(f64),
    String(String),
    Branch(Box<Branch>),
    Custom(CustomValue),
}

impl Value {
    pub fn new<T: Arg>(value: T) -> Self {
        value.into_value()
    }

    pub fn custom<T: Any + Clone + Send>(value: T) -> Self {
        Self::Custom(CustomValue::new(value))
    }

    pub fn branch(key: u8, value: Value) -> Self {
        Self::Branch(Box::new(Branch { key, value }))
    }

    pub fn arg_type(&self) -> ArgType {
        match self {
            Self::Bool(_) => ArgType::Bool,
            Self::Char(_) => ArgType::Char,
            Self::I8(_) => ArgType::I8,
            Self::I16(_) => ArgType::I16,
            Self::I32(_) => ArgType::I32,
            Self::I64(_) => ArgType::I64,
            Self::Isize(_) => ArgType::Isize,
            Self::U8(_) => ArgType::U8,
            Self::U16(_) => ArgType::U16,
            Self::U32(_) => ArgType::U32,
            Self::U64(_) => ArgType::U64,
            Self::Usize(_) => ArgType::Usize,
            Self::F32(_) => ArgType::F32,
            Self::F64(_) => ArgType::F64,
            Self::String(_) => ArgType::String,
            Self::Branch(branch) => ArgType::branch(branch.value.arg_type()),
            Self::Custom(custom) => custom.arg_type(),
        }
    }

    pub fn get<T: Arg>(self) -> Result<T, StepError> {
        T::from_value(self)
    }

    pub fn downcast_custom<T: Any>(self) -> Result<T, StepError> {
        match self {
            Self::Custom(custom) => custom.downcast(),
            other => Err(StepError::unexpected(&other, type_name::<T>())),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::I8(a), Self::I8(b)) => a == b,
            (Self::I16(a), Self::I16(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::Isize(a), Self::Isize(b)) => a == b,
            (Self::U8(a), Self::U8(b)) => a == b,
            (Self::U16(a), Self::U16(b)) => a == b,
            (Self::U32(a), Self::U32(b)) => a == b,
            (Self::U64(a), Self::U64(b)) => a == b,
            (Self::Usize(a), Self::Usize(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a == b,
            (Self::F64(a), Self::F64(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Branch(a), Self::Branch(b)) => a == b,
            // custom payloads carry no equality
            _ => false,
        }
    }
}

/// Conversion between Rust values and argument slots
pub trait Arg: Clone + Send + 'static {
    fn arg_type() -> ArgType;
    fn into_value(self) -> Value;
    fn from_value(value: Value) -> Result<Self, StepError>;
}

macro_rules! primitive_arg {
    ($($ty:ty => $variant:ident),+ $(,)?) => {$(
        impl Arg for $ty {
            fn arg_type() -> ArgType {
                ArgType::$variant
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: Value) -> Result<Self, StepError> {
                match value {
                    Value::$variant(inner) => Ok(inner),
                    other => Err(StepError::unexpected(&other, ArgType::$variant)),
                }
            }
        }
    )+};
}

primitive_arg!(
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => String,
);

impl Arg for Value {
    fn arg_type() -> ArgType {
        ArgType::Any
    }

    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: Value) -> Result<Self, StepError> {
        Ok(value)
    }
}

impl<T: Arg> Arg for Vec<T> {
    fn arg_type() -> ArgType {
        ArgType::custom::<Self>()
    }

    fn into_value(self) -> Value {
        Value::custom(self)
    }

    fn from_value(value: Value) -> Result<Self, StepError> {
        value.downcast_custom()
    }
}

impl<T: Arg> Arg for Option<T> {
    fn arg_type() -> ArgType {
        ArgType::custom::<Self>()
    }

    fn into_value(self) -> Value {
        Value::custom(self)
    }

    fn from_value(value: Value) -> Result<Self, StepError> {
        value.downcast_custom()
    }
}

impl<K: Arg + Eq + Hash, V: Arg> Arg for HashMap<K, V> {
    fn arg_type() -> ArgType {
        ArgType::custom::<Self>()
    }

    fn into_value(self) -> Value {
        Value::custom(self)
    }

    fn from_value(value: Value) -> Result<Self, StepError> {
        value.downcast_custom()
    }
}

impl<K: Arg + Eq + Hash, V: Arg> Arg for IndexMap<K, V> {
    fn arg_type() -> ArgType {
        ArgType::custom::<Self>()
    }

    fn into_value(self) -> Value {
        Value::custom(self)
    }

    fn from_value(value: Value) -> Result<Self, StepError> {
        value.downcast_custom()
    }
}

/// Register user types as pipeline arguments carried in `Value::Custom`
///
/// ```
/// #[derive(Clone)]
/// struct Reading {
///     sensor: String,
///     celsius: f64,
/// }
///
/// stepflow::custom_arg!(Reading);
/// ```
#[macro_export]
macro_rules! custom_arg {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::step::Arg for $ty {
            fn arg_type() -> $crate::step::ArgType {
                $crate::step::ArgType::custom::<Self>()
            }

            fn into_value(self) -> $crate::step::Value {
                $crate::step::Value::custom(self)
            }

            fn from_value(
                value: $crate::step::Value,
            ) -> ::std::result::Result<Self, $crate::step::StepError> {
                value.downcast_custom::<Self>()
            }
        }
    )+};
}

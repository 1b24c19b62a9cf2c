pub mod args;
pub mod custom;
pub mod error;
pub mod list;
pub mod traits;
pub mod value;

pub use args::{ArgTypes, Args, MAX_ARGS};
pub use custom::CustomStep;
pub use error::{BoxError, StepError, ValidationError};
pub use list::{Steps, aggregate};
pub use traits::{Reducer, Step, StepResult};
pub use value::{Arg, ArgType, Branch, CustomValue, Value};

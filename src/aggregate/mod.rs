//! Built-in aggregators (reducers)

pub mod fold;
pub mod group;
pub mod numeric;

pub use fold::{fold, reduce, try_fold};
pub use group::{group_by, try_group_by};
pub use numeric::{Numeric, avg, max, min, sum};

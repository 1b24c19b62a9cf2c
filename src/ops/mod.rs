//! Built-in steps

pub mod basic;
pub mod branch;

pub use basic::{
    filter, inspect, log, map, skip, skip_while, take, take_while, try_filter, try_inspect,
    try_map, try_skip_while, try_take_while,
};
pub use branch::{merge, split, try_split, with_branches};

//! Typed, composable data-transformation pipelines
//!
//! A [`Pipeline`](streaming::Pipeline) binds an input (a finite collection or
//! a tokio queue) to a chain of steps whose argument types are checked when
//! the pipeline is built. Items are then pulled through the chain lazily,
//! either as a blocking [`Iterator`] or as a [`futures::Stream`].
//!
//! ```
//! use stepflow::prelude::*;
//!
//! let mut pipeline = Pipeline::new(
//!     vec![1, 2, 3, 4, 5, 6],
//!     steps![
//!         split(|x: &i32| (*x % 2) as u8),
//!         with_branches(vec![
//!             steps![map(|x: i32| x * 10)],
//!             steps![map(|x: i32| -x)],
//!         ]),
//!         merge(),
//!     ],
//! );
//!
//! let out: Vec<Value> = pipeline.iter().collect();
//! assert_eq!(out[0], Value::I32(-1));
//! assert_eq!(out[1], Value::I32(20));
//! ```

pub mod aggregate;
pub mod app;
pub mod engine;
pub mod io;
pub mod ops;
pub mod prelude;
pub mod step;
pub mod streaming;

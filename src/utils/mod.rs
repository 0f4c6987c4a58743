//! Utility functions used throughout the runtime.
//!
//! # Contents
//!
//! - [`measure_fn`]: Elapsed wall time of a closure

mod measure;

pub(crate) use self::measure::measure_fn;

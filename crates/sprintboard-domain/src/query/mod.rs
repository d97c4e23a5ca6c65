//! Read-side projections.
//!
//! Views are built from a committed snapshot and never mutate it.

pub mod sprint;

pub use sprint::*;

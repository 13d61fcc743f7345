//! Common test utilities for equiv-core
//!
//! Scripted solvers, recorded traces and in-memory stores, so no test
//! needs a z3 binary.

#![allow(dead_code)]

mod builders;
mod fixtures;

pub use builders::*;
pub use fixtures::*;

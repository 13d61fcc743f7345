//! Constraint model infrastructure

pub mod smtlib;

pub use smtlib::{build_script, render, symbol, Declarations};

//! Shared module - Common types and utilities

pub mod timing;

pub use timing::Stopwatches;

//! Refinement infrastructure

pub mod trace_source;

pub use trace_source::{Trace, TraceInstrumentation, TraceIteration, TraceSource};

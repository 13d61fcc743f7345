//! CEGAR Refinement
//!
//! Iterates analysis and refinement until a definitive classification,
//! exhaustion of abstracted units, or the run watchdog.
//!
//! ```text
//! CegarController
//!   ├── Instrumentation       prepare / expand abstracted units
//!   ├── SymbolicPathSource    explored partitions + abstraction summary
//!   ├── EquivalenceOracle     verdict per partition
//!   ├── CandidateSelector     heuristic (H123 | H3 | R)
//!   └── ResultStore           run / iteration / partition / time records
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{CegarController, RunOutcome, RunRequest};
pub use domain::{
    after_iteration, AbstractedUnit, AbstractionSummary, CandidateSelector, CegarState,
    Instrumentation, StopReason, SymbolicPathSource, Watchdog,
};
pub use infrastructure::{Trace, TraceInstrumentation, TraceIteration, TraceSource};

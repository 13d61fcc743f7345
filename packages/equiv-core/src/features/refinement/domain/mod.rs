//! Refinement domain

pub mod abstraction;
pub mod ports;
pub mod selector;
pub mod state;
pub mod watchdog;

pub use abstraction::{AbstractedUnit, AbstractionSummary};
pub use ports::{Instrumentation, SymbolicPathSource};
pub use selector::CandidateSelector;
pub use state::{after_iteration, CegarState, StopReason};
pub use watchdog::Watchdog;

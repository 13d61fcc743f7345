//! Solver adapters

pub mod recorder;
pub mod scripted;
pub mod z3_process;

pub use recorder::{FsQueryRecorder, MemoryQueryRecorder, RecordedQuery};
pub use scripted::ScriptedSolver;
pub use z3_process::Z3ProcessSolver;

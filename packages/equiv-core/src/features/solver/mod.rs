//! SMT Solver Protocol
//!
//! Queries are plain SMT-LIB scripts; answers are tri-state with an optional
//! model. Every query is recorded through a `QueryRecorder`.
//!
//! ## Architecture
//!
//! ```text
//! solver
//! ├── domain/
//! │   ├── query           # QueryKind (PC/NEQ/EQ), SmtQuery, SolverAnswer
//! │   ├── model           # (get-model) parsing
//! │   └── ports           # SmtSolver, QueryRecorder
//! └── infrastructure/
//!     ├── z3_process      # `z3 -in -smt2` child process
//!     ├── scripted        # rule-driven solver for tests and replays
//!     └── recorder        # file and in-memory artifact recorders
//! ```

pub mod domain;
pub mod infrastructure;

pub use domain::{
    Cancellation, Model, QueryKey, QueryKind, QueryRecorder, SmtQuery, SmtSolver, SolverAnswer,
};
pub use infrastructure::{
    FsQueryRecorder, MemoryQueryRecorder, RecordedQuery, ScriptedSolver, Z3ProcessSolver,
};

//! Equivalence Oracle
//!
//! Reduces one explored partition (path condition plus both versions'
//! results) to the PC/NEQ/EQ solver statuses and UIF flags that the
//! classifier consumes.
//!
//! ```text
//! ExploredPartition ──► EquivalenceOracle ──► PartitionVerdict
//!                            │
//!                            ├── SmtSolver       (fresh context per query)
//!                            └── QueryRecorder   (query/answer/model artifacts)
//! ```

pub mod application;
pub mod domain;

pub use application::EquivalenceOracle;
pub use domain::{ExploredPartition, PartitionVerdict, ResultValue};

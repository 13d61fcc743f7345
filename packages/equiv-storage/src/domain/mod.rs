//! Domain layer for the result store
//!
//! # Domain Models
//!
//! - `PartitionRecord`: one explored path of one iteration
//! - `IterationRecord`: one pass of the refinement loop
//! - `RunRecord`: the whole attempt for a benchmark/tool pair
//! - `TimeRecord`: one stopwatch reading
//!
//! # Port Trait
//!
//! - `ResultStore`: upsert-only storage abstraction injected into the analysis
//!
//! # Examples
//!
//! ```rust,ignore
//! use equiv_storage::domain::{PartitionRecord, ResultStore};
//!
//! async fn example(store: impl ResultStore) -> equiv_storage::Result<()> {
//!     // Written on creation so that a forced shutdown still leaves a row
//!     let partition = PartitionRecord::index_only("Ell/sqrt", "CEGAR", 1, 1);
//!     store.upsert_partition(&partition).await?;
//!     Ok(())
//! }
//! ```

pub mod models;
pub mod ports;

pub use models::{
    Classification, IterationRecord, PartitionRecord, RunRecord, SolverStatus, TimeRecord,
};
pub use ports::ResultStore;

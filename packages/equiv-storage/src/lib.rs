//! equiv-storage: persisted results of equivalence-checking runs
//!
//! ## Records
//!
//! | Record      | Key                                         |
//! |-------------|---------------------------------------------|
//! | `Run`       | benchmark, tool                             |
//! | `Iteration` | benchmark, tool, iteration                  |
//! | `Partition` | benchmark, tool, iteration, partition index |
//! | `Time`      | benchmark, tool, topic, task                |
//!
//! All writes are upserts. A partition is written twice: index-only when its
//! path is first explored, then in full once classified.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use equiv_storage::{InMemoryResultStore, ResultStore, RunRecord};
//!
//! let store = InMemoryResultStore::new();
//! store.delete_run("Ell/sqrt", "CEGAR").await?;
//! store.upsert_run(&RunRecord::started("Ell/sqrt", "CEGAR")).await?;
//! ```

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::{ErrorKind, Result, StorageError};

pub use domain::{
    Classification, IterationRecord, PartitionRecord, ResultStore, RunRecord, SolverStatus,
    TimeRecord,
};
pub use infrastructure::InMemoryResultStore;
#[cfg(feature = "sqlite")]
pub use infrastructure::SqliteResultStore;

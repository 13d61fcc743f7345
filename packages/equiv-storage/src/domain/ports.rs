//! Result Store Port (Trait Interface)
//!
//! The analysis core only ever talks to this trait; it never opens a
//! connection itself.
//! - Development / CI: SQLite (zero-config)
//! - Testing: InMemory

use async_trait::async_trait;

use super::models::{IterationRecord, PartitionRecord, RunRecord, TimeRecord};
use crate::Result;

/// Result Store Port
///
/// Writes are upserts keyed by the record keys. Every upsert validates the
/// record first and rejects it with `ErrorKind::InvalidRecord`.
#[async_trait]
pub trait ResultStore: Send + Sync {
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Writes
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Insert or replace a partition (index-only or fully classified)
    async fn upsert_partition(&self, partition: &PartitionRecord) -> Result<()>;

    /// Insert or replace an iteration
    async fn upsert_iteration(&self, iteration: &IterationRecord) -> Result<()>;

    /// Insert or replace a run
    async fn upsert_run(&self, run: &RunRecord) -> Result<()>;

    /// Insert or replace a stopwatch reading
    async fn upsert_time(&self, time: &TimeRecord) -> Result<()>;

    /// Delete a run together with its iterations, partitions and times
    ///
    /// Deleting a run that does not exist is not an error.
    async fn delete_run(&self, benchmark: &str, tool: &str) -> Result<()>;

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Reads
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    async fn get_run(&self, benchmark: &str, tool: &str) -> Result<Option<RunRecord>>;

    async fn get_iteration(
        &self,
        benchmark: &str,
        tool: &str,
        iteration: u32,
    ) -> Result<Option<IterationRecord>>;

    /// Iterations of a run, ordered by iteration number
    async fn list_iterations(&self, benchmark: &str, tool: &str) -> Result<Vec<IterationRecord>>;

    /// Partitions of one iteration, ordered by partition index
    async fn list_partitions(
        &self,
        benchmark: &str,
        tool: &str,
        iteration: u32,
    ) -> Result<Vec<PartitionRecord>>;

    /// Stopwatch readings of a run, ordered by step
    async fn list_times(&self, benchmark: &str, tool: &str) -> Result<Vec<TimeRecord>>;
}

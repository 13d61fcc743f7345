//! In-Memory Result Store
//!
//! HashMap-based implementation for unit tests and one-shot runs that do not
//! need the results afterwards.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::models::{IterationRecord, PartitionRecord, RunRecord, TimeRecord};
use crate::domain::ports::ResultStore;
use crate::Result;

type RunKey = (String, String);

#[derive(Default)]
struct Tables {
    runs: BTreeMap<RunKey, RunRecord>,
    iterations: BTreeMap<(RunKey, u32), IterationRecord>,
    partitions: BTreeMap<(RunKey, u32, u32), PartitionRecord>,
    times: BTreeMap<(RunKey, String, String), TimeRecord>,
}

fn run_key(benchmark: &str, tool: &str) -> RunKey {
    (benchmark.to_string(), tool.to_string())
}

#[derive(Clone, Default)]
pub struct InMemoryResultStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of partition rows across all runs
    pub fn partition_count(&self) -> usize {
        self.tables.read().partitions.len()
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn upsert_partition(&self, partition: &PartitionRecord) -> Result<()> {
        partition.validate()?;
        let key = (
            run_key(&partition.benchmark, &partition.tool),
            partition.iteration,
            partition.partition,
        );
        self.tables.write().partitions.insert(key, partition.clone());
        Ok(())
    }

    async fn upsert_iteration(&self, iteration: &IterationRecord) -> Result<()> {
        iteration.validate()?;
        let key = (
            run_key(&iteration.benchmark, &iteration.tool),
            iteration.iteration,
        );
        self.tables.write().iterations.insert(key, iteration.clone());
        Ok(())
    }

    async fn upsert_run(&self, run: &RunRecord) -> Result<()> {
        run.validate()?;
        self.tables
            .write()
            .runs
            .insert(run_key(&run.benchmark, &run.tool), run.clone());
        Ok(())
    }

    async fn upsert_time(&self, time: &TimeRecord) -> Result<()> {
        let key = (
            run_key(&time.benchmark, &time.tool),
            time.topic.clone(),
            time.task.clone(),
        );
        self.tables.write().times.insert(key, time.clone());
        Ok(())
    }

    async fn delete_run(&self, benchmark: &str, tool: &str) -> Result<()> {
        let key = run_key(benchmark, tool);
        let mut tables = self.tables.write();
        tables.runs.remove(&key);
        tables.iterations.retain(|(k, _), _| *k != key);
        tables.partitions.retain(|(k, _, _), _| *k != key);
        tables.times.retain(|(k, _, _), _| *k != key);
        Ok(())
    }

    async fn get_run(&self, benchmark: &str, tool: &str) -> Result<Option<RunRecord>> {
        Ok(self.tables.read().runs.get(&run_key(benchmark, tool)).cloned())
    }

    async fn get_iteration(
        &self,
        benchmark: &str,
        tool: &str,
        iteration: u32,
    ) -> Result<Option<IterationRecord>> {
        Ok(self
            .tables
            .read()
            .iterations
            .get(&(run_key(benchmark, tool), iteration))
            .cloned())
    }

    async fn list_iterations(&self, benchmark: &str, tool: &str) -> Result<Vec<IterationRecord>> {
        let key = run_key(benchmark, tool);
        Ok(self
            .tables
            .read()
            .iterations
            .iter()
            .filter(|((k, _), _)| *k == key)
            .map(|(_, it)| it.clone())
            .collect())
    }

    async fn list_partitions(
        &self,
        benchmark: &str,
        tool: &str,
        iteration: u32,
    ) -> Result<Vec<PartitionRecord>> {
        let key = run_key(benchmark, tool);
        Ok(self
            .tables
            .read()
            .partitions
            .iter()
            .filter(|((k, i, _), _)| *k == key && *i == iteration)
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn list_times(&self, benchmark: &str, tool: &str) -> Result<Vec<TimeRecord>> {
        let key = run_key(benchmark, tool);
        let mut times: Vec<TimeRecord> = self
            .tables
            .read()
            .times
            .iter()
            .filter(|((k, _, _), _)| *k == key)
            .map(|(_, t)| t.clone())
            .collect();
        times.sort_by_key(|t| t.step);
        Ok(times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Classification;
    use crate::ErrorKind;

    #[tokio::test]
    async fn test_partition_upsert_replaces_index_only_row() {
        let store = InMemoryResultStore::new();
        let mut p = PartitionRecord::index_only("b", "t", 1, 3);
        store.upsert_partition(&p).await.unwrap();

        p.result = Some(Classification::Eq);
        store.upsert_partition(&p).await.unwrap();

        let rows = store.list_partitions("b", "t", 1).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].result, Some(Classification::Eq));
    }

    #[tokio::test]
    async fn test_rejects_error_iteration_without_text() {
        let store = InMemoryResultStore::new();
        let mut it = IterationRecord::started("b", "t", 1);
        it.result = Some(Classification::Error);

        let err = store.upsert_iteration(&it).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidRecord);
        assert!(store.get_iteration("b", "t", 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_run_only_touches_its_own_rows() {
        let store = InMemoryResultStore::new();
        for tool in ["CEGAR", "SE"] {
            store.upsert_run(&RunRecord::started("b", tool)).await.unwrap();
            store
                .upsert_iteration(&IterationRecord::started("b", tool, 1))
                .await
                .unwrap();
            store
                .upsert_partition(&PartitionRecord::index_only("b", tool, 1, 1))
                .await
                .unwrap();
        }

        store.delete_run("b", "CEGAR").await.unwrap();

        assert!(store.get_run("b", "CEGAR").await.unwrap().is_none());
        assert!(store.list_iterations("b", "CEGAR").await.unwrap().is_empty());
        assert!(store.get_run("b", "SE").await.unwrap().is_some());
        assert_eq!(store.partition_count(), 1);
    }
}

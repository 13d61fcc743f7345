//! SQLite Result Store
//!
//! File-based persistent storage using SQLite. One table per record kind,
//! primary keys mirror the record keys so every write is a plain
//! `INSERT OR REPLACE`.

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::models::{IterationRecord, PartitionRecord, RunRecord, TimeRecord};
use crate::domain::ports::ResultStore;
use crate::{Result, StorageError};

/// SQLite-based ResultStore implementation
#[derive(Clone)]
pub struct SqliteResultStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteResultStore {
    /// Open (or create) a store at the given path
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS runs (
                benchmark TEXT NOT NULL,
                tool TEXT NOT NULL,
                result TEXT,
                has_timed_out BOOLEAN,
                is_depth_limited BOOLEAN,
                has_uif BOOLEAN,
                can_iterate BOOLEAN,
                iteration_count INTEGER,
                runtime REAL,
                errors TEXT,
                started_at TEXT NOT NULL,
                PRIMARY KEY (benchmark, tool)
            );

            CREATE TABLE IF NOT EXISTS iterations (
                benchmark TEXT NOT NULL,
                tool TEXT NOT NULL,
                iteration INTEGER NOT NULL,
                result TEXT,
                has_timed_out BOOLEAN,
                is_depth_limited BOOLEAN,
                has_uif BOOLEAN,
                partition_count INTEGER,
                runtime REAL,
                errors TEXT,
                PRIMARY KEY (benchmark, tool, iteration)
            );

            CREATE TABLE IF NOT EXISTS partitions (
                benchmark TEXT NOT NULL,
                tool TEXT NOT NULL,
                iteration INTEGER NOT NULL,
                partition_index INTEGER NOT NULL,
                result TEXT,
                pc_status TEXT,
                neq_status TEXT,
                eq_status TEXT,
                has_uif BOOLEAN,
                has_uif_pc BOOLEAN,
                has_uif_v1 BOOLEAN,
                has_uif_v2 BOOLEAN,
                has_timed_out BOOLEAN,
                is_depth_limited BOOLEAN,
                constraint_count INTEGER,
                runtime REAL,
                errors TEXT,
                PRIMARY KEY (benchmark, tool, iteration, partition_index)
            );

            CREATE TABLE IF NOT EXISTS times (
                benchmark TEXT NOT NULL,
                tool TEXT NOT NULL,
                topic TEXT NOT NULL,
                task TEXT NOT NULL,
                runtime REAL NOT NULL,
                step INTEGER NOT NULL,
                is_missing BOOLEAN NOT NULL,
                PRIMARY KEY (benchmark, tool, topic, task)
            );",
        )?;
        Ok(())
    }
}

/// Parse an optional enum column stored as its string form.
fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr<Err = StorageError>,
{
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        T::from_str(&s)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn iteration_from_row(row: &Row<'_>) -> rusqlite::Result<IterationRecord> {
    Ok(IterationRecord {
        benchmark: row.get(0)?,
        tool: row.get(1)?,
        iteration: row.get(2)?,
        result: parse_column(row, 3)?,
        has_timed_out: row.get(4)?,
        is_depth_limited: row.get(5)?,
        has_uif: row.get(6)?,
        partition_count: row.get(7)?,
        runtime: row.get(8)?,
        errors: row.get(9)?,
    })
}

fn partition_from_row(row: &Row<'_>) -> rusqlite::Result<PartitionRecord> {
    Ok(PartitionRecord {
        benchmark: row.get(0)?,
        tool: row.get(1)?,
        iteration: row.get(2)?,
        partition: row.get(3)?,
        result: parse_column(row, 4)?,
        pc_status: parse_column(row, 5)?,
        neq_status: parse_column(row, 6)?,
        eq_status: parse_column(row, 7)?,
        has_uif_pc: row.get(8)?,
        has_uif_v1: row.get(9)?,
        has_uif_v2: row.get(10)?,
        has_timed_out: row.get(11)?,
        is_depth_limited: row.get(12)?,
        constraint_count: row.get(13)?,
        runtime: row.get(14)?,
        errors: row.get(15)?,
    })
}

const ITERATION_COLUMNS: &str = "benchmark, tool, iteration, result, has_timed_out, \
     is_depth_limited, has_uif, partition_count, runtime, errors";

const PARTITION_COLUMNS: &str = "benchmark, tool, iteration, partition_index, result, pc_status, \
     neq_status, eq_status, has_uif_pc, has_uif_v1, has_uif_v2, has_timed_out, is_depth_limited, \
     constraint_count, runtime, errors";

#[async_trait]
impl ResultStore for SqliteResultStore {
    async fn upsert_partition(&self, p: &PartitionRecord) -> Result<()> {
        p.validate()?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO partitions (benchmark, tool, iteration, partition_index, result,
                pc_status, neq_status, eq_status, has_uif, has_uif_pc, has_uif_v1, has_uif_v2,
                has_timed_out, is_depth_limited, constraint_count, runtime, errors)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                &p.benchmark,
                &p.tool,
                p.iteration,
                p.partition,
                p.result.map(|c| c.as_str()),
                p.pc_status.map(|s| s.as_str()),
                p.neq_status.map(|s| s.as_str()),
                p.eq_status.map(|s| s.as_str()),
                p.has_uif(),
                p.has_uif_pc,
                p.has_uif_v1,
                p.has_uif_v2,
                p.has_timed_out,
                p.is_depth_limited,
                p.constraint_count,
                p.runtime,
                &p.errors,
            ],
        )?;
        Ok(())
    }

    async fn upsert_iteration(&self, it: &IterationRecord) -> Result<()> {
        it.validate()?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO iterations (benchmark, tool, iteration, result, has_timed_out,
                is_depth_limited, has_uif, partition_count, runtime, errors)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                &it.benchmark,
                &it.tool,
                it.iteration,
                it.result.map(|c| c.as_str()),
                it.has_timed_out,
                it.is_depth_limited,
                it.has_uif,
                it.partition_count,
                it.runtime,
                &it.errors,
            ],
        )?;
        Ok(())
    }

    async fn upsert_run(&self, run: &RunRecord) -> Result<()> {
        run.validate()?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO runs (benchmark, tool, result, has_timed_out, is_depth_limited,
                has_uif, can_iterate, iteration_count, runtime, errors, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                &run.benchmark,
                &run.tool,
                run.result.map(|c| c.as_str()),
                run.has_timed_out,
                run.is_depth_limited,
                run.has_uif,
                run.can_iterate,
                run.iteration_count,
                run.runtime,
                &run.errors,
                run.started_at,
            ],
        )?;
        Ok(())
    }

    async fn upsert_time(&self, time: &TimeRecord) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO times (benchmark, tool, topic, task, runtime, step, is_missing)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &time.benchmark,
                &time.tool,
                &time.topic,
                &time.task,
                time.runtime,
                time.step,
                time.is_missing,
            ],
        )?;
        Ok(())
    }

    async fn delete_run(&self, benchmark: &str, tool: &str) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| StorageError::database(format!("BEGIN failed: {}", e)))?;
        for table in ["partitions", "iterations", "times", "runs"] {
            tx.execute(
                &format!("DELETE FROM {} WHERE benchmark = ?1 AND tool = ?2", table),
                params![benchmark, tool],
            )?;
        }
        tx.commit()
            .map_err(|e| StorageError::database(format!("COMMIT failed: {}", e)))?;
        Ok(())
    }

    async fn get_run(&self, benchmark: &str, tool: &str) -> Result<Option<RunRecord>> {
        let conn = self.conn.lock();
        let run = conn
            .query_row(
                "SELECT benchmark, tool, result, has_timed_out, is_depth_limited, has_uif,
                        can_iterate, iteration_count, runtime, errors, started_at
                 FROM runs WHERE benchmark = ?1 AND tool = ?2",
                params![benchmark, tool],
                |row| {
                    Ok(RunRecord {
                        benchmark: row.get(0)?,
                        tool: row.get(1)?,
                        result: parse_column(row, 2)?,
                        has_timed_out: row.get(3)?,
                        is_depth_limited: row.get(4)?,
                        has_uif: row.get(5)?,
                        can_iterate: row.get(6)?,
                        iteration_count: row.get(7)?,
                        runtime: row.get(8)?,
                        errors: row.get(9)?,
                        started_at: row.get(10)?,
                    })
                },
            )
            .optional()?;
        Ok(run)
    }

    async fn get_iteration(
        &self,
        benchmark: &str,
        tool: &str,
        iteration: u32,
    ) -> Result<Option<IterationRecord>> {
        let conn = self.conn.lock();
        let it = conn
            .query_row(
                &format!(
                    "SELECT {} FROM iterations WHERE benchmark = ?1 AND tool = ?2 AND iteration = ?3",
                    ITERATION_COLUMNS
                ),
                params![benchmark, tool, iteration],
                iteration_from_row,
            )
            .optional()?;
        Ok(it)
    }

    async fn list_iterations(&self, benchmark: &str, tool: &str) -> Result<Vec<IterationRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM iterations WHERE benchmark = ?1 AND tool = ?2 ORDER BY iteration",
            ITERATION_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![benchmark, tool], iteration_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn list_partitions(
        &self,
        benchmark: &str,
        tool: &str,
        iteration: u32,
    ) -> Result<Vec<PartitionRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM partitions
             WHERE benchmark = ?1 AND tool = ?2 AND iteration = ?3 ORDER BY partition_index",
            PARTITION_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![benchmark, tool, iteration], partition_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn list_times(&self, benchmark: &str, tool: &str) -> Result<Vec<TimeRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT benchmark, tool, topic, task, runtime, step, is_missing
             FROM times WHERE benchmark = ?1 AND tool = ?2 ORDER BY step",
        )?;
        let rows = stmt
            .query_map(params![benchmark, tool], |row| {
                Ok(TimeRecord {
                    benchmark: row.get(0)?,
                    tool: row.get(1)?,
                    topic: row.get(2)?,
                    task: row.get(3)?,
                    runtime: row.get(4)?,
                    step: row.get(5)?,
                    is_missing: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Classification, SolverStatus};
    use pretty_assertions::assert_eq;

    fn classified_partition(index: u32) -> PartitionRecord {
        let mut p = PartitionRecord::index_only("Ell/sqrt", "CEGAR", 1, index);
        p.result = Some(Classification::MaybeNeq);
        p.pc_status = Some(SolverStatus::Sat);
        p.neq_status = Some(SolverStatus::Sat);
        p.eq_status = Some(SolverStatus::Unknown);
        p.has_uif_pc = Some(true);
        p.has_uif_v1 = Some(false);
        p.has_uif_v2 = Some(false);
        p.constraint_count = Some(2);
        p.runtime = Some(0.25);
        p
    }

    #[tokio::test]
    async fn test_partition_roundtrip() {
        let store = SqliteResultStore::in_memory().unwrap();
        store
            .upsert_partition(&PartitionRecord::index_only("Ell/sqrt", "CEGAR", 1, 1))
            .await
            .unwrap();
        store.upsert_partition(&classified_partition(1)).await.unwrap();

        let rows = store.list_partitions("Ell/sqrt", "CEGAR", 1).await.unwrap();
        assert_eq!(rows, vec![classified_partition(1)]);
    }

    #[tokio::test]
    async fn test_partitions_ordered_by_index() {
        let store = SqliteResultStore::in_memory().unwrap();
        for i in [3, 1, 2] {
            store.upsert_partition(&classified_partition(i)).await.unwrap();
        }
        let idx: Vec<u32> = store
            .list_partitions("Ell/sqrt", "CEGAR", 1)
            .await
            .unwrap()
            .iter()
            .map(|p| p.partition)
            .collect();
        assert_eq!(idx, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_run_roundtrip_and_delete() {
        let store = SqliteResultStore::in_memory().unwrap();
        let mut run = RunRecord::started("Ell/sqrt", "CEGAR");
        run.result = Some(Classification::Error);
        run.errors = Some("instrumentation failed".to_string());
        run.iteration_count = Some(2);
        store.upsert_run(&run).await.unwrap();

        let mut it = IterationRecord::started("Ell/sqrt", "CEGAR", 1);
        it.partition_count = Some(4);
        store.upsert_iteration(&it).await.unwrap();

        let loaded = store.get_run("Ell/sqrt", "CEGAR").await.unwrap().unwrap();
        assert_eq!(loaded.result, Some(Classification::Error));
        assert_eq!(loaded.iteration_count, Some(2));
        assert_eq!(
            store.get_iteration("Ell/sqrt", "CEGAR", 1).await.unwrap(),
            Some(it)
        );

        store.delete_run("Ell/sqrt", "CEGAR").await.unwrap();
        assert!(store.get_run("Ell/sqrt", "CEGAR").await.unwrap().is_none());
        assert!(store
            .list_iterations("Ell/sqrt", "CEGAR")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.db");

        {
            let store = SqliteResultStore::new(&path).unwrap();
            store
                .upsert_time(&TimeRecord {
                    benchmark: "b".into(),
                    tool: "SE".into(),
                    topic: "run".into(),
                    task: String::new(),
                    runtime: 1.5,
                    step: 0,
                    is_missing: false,
                })
                .await
                .unwrap();
        }

        let reopened = SqliteResultStore::new(&path).unwrap();
        let times = reopened.list_times("b", "SE").await.unwrap();
        assert_eq!(times.len(), 1);
        assert_eq!(times[0].runtime, 1.5);
    }
}

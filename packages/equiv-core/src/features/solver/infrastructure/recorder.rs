//! Query artifact recorders

use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::features::solver::domain::{QueryKey, QueryRecorder, SmtQuery, SolverAnswer};

/// Writes `P<n>-<KIND>-{query.smt2,answer.txt,model.txt}` under
/// `<root>/iteration-<i>/`
#[derive(Debug, Clone)]
pub struct FsQueryRecorder {
    root: PathBuf,
}

impl FsQueryRecorder {
    /// `root` is the run directory, usually `<artifacts>/<benchmark>/<tool>`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn iteration_dir(&self, iteration: u32) -> PathBuf {
        self.root.join(format!("iteration-{}", iteration))
    }
}

impl QueryRecorder for FsQueryRecorder {
    fn record(&self, key: QueryKey, query: &SmtQuery, answer: &SolverAnswer) -> Result<()> {
        let dir = self.iteration_dir(key.iteration);
        fs::create_dir_all(&dir)?;

        let stem = key.stem();
        fs::write(dir.join(format!("{}-query.smt2", stem)), &query.script)?;
        fs::write(dir.join(format!("{}-answer.txt", stem)), answer.answer_text())?;
        if let Some(model) = &answer.model {
            fs::write(dir.join(format!("{}-model.txt", stem)), model.raw())?;
        }
        Ok(())
    }
}

/// One recorded query
#[derive(Debug, Clone)]
pub struct RecordedQuery {
    pub key: QueryKey,
    pub query: SmtQuery,
    pub answer: SolverAnswer,
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct MemoryQueryRecorder {
    records: Mutex<Vec<RecordedQuery>>,
}

impl MemoryQueryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<RecordedQuery> {
        self.records.lock().clone()
    }

    pub fn keys(&self) -> Vec<QueryKey> {
        let mut keys: Vec<_> = self.records.lock().iter().map(|r| r.key).collect();
        keys.sort();
        keys
    }
}

impl QueryRecorder for MemoryQueryRecorder {
    fn record(&self, key: QueryKey, query: &SmtQuery, answer: &SolverAnswer) -> Result<()> {
        self.records.lock().push(RecordedQuery {
            key,
            query: query.clone(),
            answer: answer.clone(),
        });
        Ok(())
    }
}

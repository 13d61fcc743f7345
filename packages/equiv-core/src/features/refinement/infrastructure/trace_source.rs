//! Recorded exploration traces
//!
//! Replays the partitions a symbolic executor produced for each abstraction
//! state. A trace is a JSON document:
//!
//! ```json
//! {
//!   "iterations": [
//!     { "expanded": [], "summary": [{"name": "UF_f", "call_sites_v1": 1, "call_sites_v2": 2}],
//!       "partitions": [{"index": 1, "pc": {...}, "v1": {...}, "v2": {...}}] },
//!     { "expanded": ["UF_f"], "summary": [], "partitions": [...] }
//!   ]
//! }
//! ```
//!
//! `TraceSource` and its `TraceInstrumentation` share the set of expanded
//! units; `start` replays the entry whose `expanded` set matches it.

use std::collections::{BTreeSet, VecDeque};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{EquivError, Result};
use crate::features::oracle::ExploredPartition;
use crate::features::refinement::domain::{
    AbstractedUnit, AbstractionSummary, Instrumentation, SymbolicPathSource,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub iterations: Vec<TraceIteration>,
}

/// Exploration result for one abstraction state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceIteration {
    /// Units expanded before this exploration
    #[serde(default)]
    pub expanded: BTreeSet<String>,
    #[serde(default)]
    pub summary: AbstractionSummary,
    #[serde(default)]
    pub partitions: Vec<ExploredPartition>,
}

type Expanded = Arc<Mutex<BTreeSet<String>>>;

/// Path source backed by a `Trace`
#[derive(Debug)]
pub struct TraceSource {
    trace: Trace,
    expanded: Expanded,
    current: Option<usize>,
    pending: VecDeque<ExploredPartition>,
}

impl TraceSource {
    pub fn new(trace: Trace) -> Self {
        Self {
            trace,
            expanded: Arc::new(Mutex::new(BTreeSet::new())),
            current: None,
            pending: VecDeque::new(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Instrumentation that records expansions for this source
    pub fn instrumentation(&self) -> TraceInstrumentation {
        TraceInstrumentation {
            expanded: Arc::clone(&self.expanded),
            known: self
                .trace
                .iterations
                .iter()
                .flat_map(|it| it.summary.units.iter().map(|u| u.name.clone()))
                .collect(),
        }
    }

    /// Matching entry, else the entry at the iteration's position, else the last
    fn entry_for(&self, iteration: u32) -> Option<usize> {
        let expanded = self.expanded.lock();
        self.trace
            .iterations
            .iter()
            .position(|it| it.expanded == *expanded)
            .or_else(|| {
                let at = iteration.saturating_sub(1) as usize;
                (at < self.trace.iterations.len()).then_some(at)
            })
            .or_else(|| self.trace.iterations.len().checked_sub(1))
    }
}

#[async_trait]
impl SymbolicPathSource for TraceSource {
    async fn start(&mut self, iteration: u32) -> Result<()> {
        let entry = self
            .entry_for(iteration)
            .ok_or_else(|| EquivError::analysis("trace has no iterations"))?;
        debug!(iteration, entry, "Replaying trace entry");

        self.current = Some(entry);
        self.pending = self.trace.iterations[entry].partitions.iter().cloned().collect();
        Ok(())
    }

    async fn next_partition(&mut self) -> Result<Option<ExploredPartition>> {
        if self.current.is_none() {
            return Err(EquivError::analysis("exploration has not been started"));
        }
        Ok(self.pending.pop_front())
    }

    fn abstraction_summary(&self) -> AbstractionSummary {
        self.current
            .and_then(|i| self.trace.iterations.get(i))
            .map(|it| it.summary.clone())
            .unwrap_or_default()
    }
}

/// Expands units by adding them to the shared expanded set
#[derive(Debug, Clone)]
pub struct TraceInstrumentation {
    expanded: Expanded,
    known: BTreeSet<String>,
}

impl TraceInstrumentation {
    pub fn expanded(&self) -> BTreeSet<String> {
        self.expanded.lock().clone()
    }
}

#[async_trait]
impl Instrumentation for TraceInstrumentation {
    async fn expand(&mut self, unit: &AbstractedUnit) -> Result<()> {
        if !self.known.contains(&unit.name) {
            return Err(EquivError::analysis(format!(
                "'{}' is not abstracted in the trace",
                unit.name
            )));
        }
        self.expanded.lock().insert(unit.name.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TRACE: &str = r#"{
        "iterations": [
            {
                "summary": [{"name": "UF_f"}, {"name": "UF_g", "has_loop": true}],
                "partitions": [
                    {"index": 1,
                     "pc": {"kind": "constant", "value": {"type": "bool", "value": true}},
                     "v1": {"kind": "concrete", "value": {"type": "int", "value": 1}},
                     "v2": {"kind": "raised", "error": "ArithmeticException"}}
                ]
            },
            {
                "expanded": ["UF_g"],
                "summary": [{"name": "UF_f"}],
                "partitions": []
            }
        ]
    }"#;

    #[tokio::test]
    async fn test_replays_entry_matching_expansions() {
        let mut source = TraceSource::from_json(TRACE).unwrap();
        let mut instrumentation = source.instrumentation();

        source.start(1).await.unwrap();
        assert_eq!(source.abstraction_summary().units.len(), 2);
        let first = source.next_partition().await.unwrap().unwrap();
        assert_eq!(first.index, 1);
        assert!(source.next_partition().await.unwrap().is_none());

        instrumentation.expand(&AbstractedUnit::new("UF_g")).await.unwrap();
        source.start(2).await.unwrap();
        assert_eq!(source.abstraction_summary().units.len(), 1);
        assert!(source.next_partition().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unmatched_expansion_falls_back_to_position() {
        let mut source = TraceSource::from_json(TRACE).unwrap();
        let mut instrumentation = source.instrumentation();

        instrumentation.expand(&AbstractedUnit::new("UF_f")).await.unwrap();
        source.start(5).await.unwrap();
        assert_eq!(source.abstraction_summary().units.len(), 1);
        assert!(instrumentation.expand(&AbstractedUnit::new("UF_zzz")).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_trace_is_an_analysis_error() {
        let mut source = TraceSource::new(Trace::default());
        assert!(matches!(source.start(1).await, Err(EquivError::Analysis(_))));
        assert!(source.next_partition().await.is_err());
    }
}

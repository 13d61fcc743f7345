//! Logical records produced by an equivalence-checking run
//!
//! Keys:
//! - `RunRecord`: (benchmark, tool)
//! - `IterationRecord`: (benchmark, tool, iteration)
//! - `PartitionRecord`: (benchmark, tool, iteration, partition)
//! - `TimeRecord`: (benchmark, tool, topic, task)
//!
//! Non-key fields are `Option`s: a record is first written with its key only
//! and filled in once the corresponding step has finished.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Result, StorageError};

// ═══════════════════════════════════════════════════════════════════════════
// Shared Enums
// ═══════════════════════════════════════════════════════════════════════════

/// Verdict attached to a partition, an iteration or a run.
///
/// Variants are listed in the order used by reports; the certainty order used
/// when folding partitions lives with the aggregator in `equiv-core`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// No output of the analysis exists at all
    Missing,
    /// The input of the base tool does not exist
    BaseToolMissing,
    /// Instrumentation, compilation or solver-process failure
    Error,
    Timeout,
    /// The path condition is unsatisfiable
    Unreachable,
    Unknown,
    DepthLimited,
    MaybeNeq,
    MaybeEq,
    Neq,
    Eq,
}

impl Classification {
    pub const ALL: [Classification; 11] = [
        Classification::Missing,
        Classification::BaseToolMissing,
        Classification::Error,
        Classification::Timeout,
        Classification::Unreachable,
        Classification::Unknown,
        Classification::DepthLimited,
        Classification::MaybeNeq,
        Classification::MaybeEq,
        Classification::Neq,
        Classification::Eq,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "MISSING",
            Self::BaseToolMissing => "BASE_TOOL_MISSING",
            Self::Error => "ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Unreachable => "UNREACHABLE",
            Self::Unknown => "UNKNOWN",
            Self::DepthLimited => "DEPTH_LIMITED",
            Self::MaybeNeq => "MAYBE_NEQ",
            Self::MaybeEq => "MAYBE_EQ",
            Self::Neq => "NEQ",
            Self::Eq => "EQ",
        }
    }

    /// `EQ`, `NEQ` and `ERROR` end the refinement loop.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Eq | Self::Neq | Self::Error)
    }

    /// Only describe missing upstream artifacts, never a partition.
    pub fn is_run_level_only(&self) -> bool {
        matches!(self, Self::Missing | Self::BaseToolMissing)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Classification {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| StorageError::decode(format!("Unknown classification '{}'", s)))
    }
}

/// Tri-state answer of one satisfiability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverStatus {
    Sat,
    Unsat,
    /// Timeout or solver incompleteness
    Unknown,
}

impl SolverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sat => "sat",
            Self::Unsat => "unsat",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SolverStatus {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sat" => Ok(Self::Sat),
            "unsat" => Ok(Self::Unsat),
            "unknown" => Ok(Self::Unknown),
            other => Err(StorageError::decode(format!(
                "Unknown solver status '{}'",
                other
            ))),
        }
    }
}

fn require_error_text(
    what: &str,
    result: Option<Classification>,
    errors: &Option<String>,
) -> Result<()> {
    let has_text = errors.as_deref().map_or(false, |e| !e.trim().is_empty());
    if result == Some(Classification::Error) && !has_text {
        return Err(StorageError::invalid_record(format!(
            "{} classified as ERROR must carry error text",
            what
        )));
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// Partition
// ═══════════════════════════════════════════════════════════════════════════

/// One explored path within one iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionRecord {
    pub benchmark: String,
    pub tool: String,
    pub iteration: u32,
    pub partition: u32,

    pub result: Option<Classification>,
    pub pc_status: Option<SolverStatus>,
    pub neq_status: Option<SolverStatus>,
    pub eq_status: Option<SolverStatus>,
    pub has_uif_pc: Option<bool>,
    pub has_uif_v1: Option<bool>,
    pub has_uif_v2: Option<bool>,
    pub has_timed_out: Option<bool>,
    pub is_depth_limited: Option<bool>,
    pub constraint_count: Option<u32>,
    /// Seconds
    pub runtime: Option<f64>,
    pub errors: Option<String>,
}

impl PartitionRecord {
    /// Key-only record, written as soon as exploration of the path starts.
    pub fn index_only(
        benchmark: impl Into<String>,
        tool: impl Into<String>,
        iteration: u32,
        partition: u32,
    ) -> Self {
        Self {
            benchmark: benchmark.into(),
            tool: tool.into(),
            iteration,
            partition,
            result: None,
            pc_status: None,
            neq_status: None,
            eq_status: None,
            has_uif_pc: None,
            has_uif_v1: None,
            has_uif_v2: None,
            has_timed_out: None,
            is_depth_limited: None,
            constraint_count: None,
            runtime: None,
            errors: None,
        }
    }

    /// Disjunction of the three UIF flags; `None` while none of them is known.
    pub fn has_uif(&self) -> Option<bool> {
        let flags = [self.has_uif_pc, self.has_uif_v1, self.has_uif_v2];
        if flags.iter().all(Option::is_none) {
            None
        } else {
            Some(flags.iter().any(|f| *f == Some(true)))
        }
    }

    pub fn is_classified(&self) -> bool {
        self.result.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(result) = self.result {
            if result.is_run_level_only() {
                return Err(StorageError::invalid_record(format!(
                    "Partition {} cannot be classified as {}",
                    self.partition, result
                )));
            }
        }
        require_error_text("Partition", self.result, &self.errors)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Iteration
// ═══════════════════════════════════════════════════════════════════════════

/// One pass of the refinement loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub benchmark: String,
    pub tool: String,
    pub iteration: u32,

    pub result: Option<Classification>,
    pub has_timed_out: Option<bool>,
    pub is_depth_limited: Option<bool>,
    pub has_uif: Option<bool>,
    pub partition_count: Option<u32>,
    /// Seconds
    pub runtime: Option<f64>,
    pub errors: Option<String>,
}

impl IterationRecord {
    pub fn started(benchmark: impl Into<String>, tool: impl Into<String>, iteration: u32) -> Self {
        Self {
            benchmark: benchmark.into(),
            tool: tool.into(),
            iteration,
            result: None,
            has_timed_out: None,
            is_depth_limited: None,
            has_uif: None,
            partition_count: None,
            runtime: None,
            errors: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_error_text("Iteration", self.result, &self.errors)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Run
// ═══════════════════════════════════════════════════════════════════════════

/// Whole equivalence-checking attempt for one benchmark/tool pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub benchmark: String,
    pub tool: String,

    pub result: Option<Classification>,
    pub has_timed_out: Option<bool>,
    pub is_depth_limited: Option<bool>,
    pub has_uif: Option<bool>,
    pub can_iterate: Option<bool>,
    pub iteration_count: Option<u32>,
    /// Seconds
    pub runtime: Option<f64>,
    pub errors: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl RunRecord {
    pub fn started(benchmark: impl Into<String>, tool: impl Into<String>) -> Self {
        Self {
            benchmark: benchmark.into(),
            tool: tool.into(),
            result: None,
            has_timed_out: None,
            is_depth_limited: None,
            has_uif: None,
            can_iterate: None,
            iteration_count: None,
            runtime: None,
            errors: None,
            started_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_error_text("Run", self.result, &self.errors)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Time
// ═══════════════════════════════════════════════════════════════════════════

/// Elapsed time of one named step (stopwatch) of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRecord {
    pub benchmark: String,
    pub tool: String,
    /// Stopwatch name without the task suffix, e.g. `iteration-2`
    pub topic: String,
    /// Task suffix, e.g. `symbolic-execution`; empty for the topic itself
    pub task: String,
    /// Seconds
    pub runtime: f64,
    pub step: u32,
    pub is_missing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_str_roundtrip() {
        for c in Classification::ALL {
            assert_eq!(c.as_str().parse::<Classification>().unwrap(), c);
        }
        assert!("MAYBE".parse::<Classification>().is_err());
    }

    #[test]
    fn test_classification_serde_names() {
        let json = serde_json::to_string(&Classification::BaseToolMissing).unwrap();
        assert_eq!(json, "\"BASE_TOOL_MISSING\"");
        let json = serde_json::to_string(&SolverStatus::Unsat).unwrap();
        assert_eq!(json, "\"unsat\"");
    }

    #[test]
    fn test_final_classifications() {
        let finals: Vec<_> = Classification::ALL
            .iter()
            .filter(|c| c.is_final())
            .collect();
        assert_eq!(
            finals,
            vec![&Classification::Error, &Classification::Neq, &Classification::Eq]
        );
    }

    #[test]
    fn test_partition_has_uif_disjunction() {
        let mut p = PartitionRecord::index_only("b", "t", 1, 1);
        assert_eq!(p.has_uif(), None);

        p.has_uif_pc = Some(false);
        assert_eq!(p.has_uif(), Some(false));

        p.has_uif_v2 = Some(true);
        assert_eq!(p.has_uif(), Some(true));
    }

    #[test]
    fn test_partition_rejects_run_level_classification() {
        let mut p = PartitionRecord::index_only("b", "t", 1, 1);
        p.result = Some(Classification::Missing);
        assert!(p.validate().is_err());

        p.result = Some(Classification::Unreachable);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_error_requires_text() {
        let mut it = IterationRecord::started("b", "t", 1);
        it.result = Some(Classification::Error);
        assert!(it.validate().is_err());

        it.errors = Some("   ".to_string());
        assert!(it.validate().is_err());

        it.errors = Some("solver crashed".to_string());
        assert!(it.validate().is_ok());

        let mut run = RunRecord::started("b", "t");
        run.result = Some(Classification::Error);
        assert!(run.validate().is_err());
        run.result = Some(Classification::Timeout);
        assert!(run.validate().is_ok());
    }
}

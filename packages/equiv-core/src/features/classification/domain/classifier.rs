//! Partition classifier
//!
//! Pure decision function from query outcomes and flags to one
//! `Classification`. First matching rule wins:
//!
//! 1. missing / base tool missing (run level only)
//! 2. PC `unsat` → `UNREACHABLE`, whatever else is known
//! 3. error → `ERROR`, timeout → `TIMEOUT`, depth limit → `DEPTH_LIMITED`
//! 4. NEQ `unsat` → `EQ`, or `MAYBE_EQ` when the PC contains a UIF
//! 5. NEQ `sat` → `NEQ` without UIFs; with UIFs `NEQ` only if EQ is `unsat`,
//!    else `MAYBE_NEQ`
//! 6. NEQ `unknown` → `UNKNOWN`

use equiv_storage::PartitionRecord;

use crate::errors::{EquivError, Result};
use crate::features::oracle::PartitionVerdict;
use crate::{Classification, SolverStatus};

/// Everything the classifier looks at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionFacts {
    pub is_missing: bool,
    pub is_base_tool_missing: bool,
    pub is_error: bool,
    pub is_timeout: bool,
    pub is_depth_limited: bool,
    pub pc_status: Option<SolverStatus>,
    pub neq_status: Option<SolverStatus>,
    pub eq_status: Option<SolverStatus>,
    pub has_uif_pc: bool,
    pub has_uif_v1: bool,
    pub has_uif_v2: bool,
}

impl PartitionFacts {
    pub fn has_uif(&self) -> bool {
        self.has_uif_pc || self.has_uif_v1 || self.has_uif_v2
    }

    pub fn classify(&self) -> Result<Classification> {
        if self.is_missing {
            return Ok(Classification::Missing);
        }
        if self.is_base_tool_missing {
            return Ok(Classification::BaseToolMissing);
        }
        if self.pc_status == Some(SolverStatus::Unsat) {
            return Ok(Classification::Unreachable);
        }
        if self.is_error {
            return Ok(Classification::Error);
        }
        if self.is_timeout {
            return Ok(Classification::Timeout);
        }
        if self.is_depth_limited {
            return Ok(Classification::DepthLimited);
        }

        let neq = self.neq_status.ok_or_else(|| {
            EquivError::precondition("reachable partition has no non-equivalence status")
        })?;

        match neq {
            SolverStatus::Unsat if self.has_uif_pc => Ok(Classification::MaybeEq),
            SolverStatus::Unsat => Ok(Classification::Eq),
            SolverStatus::Sat if !self.has_uif() => Ok(Classification::Neq),
            SolverStatus::Sat => match self.eq_status {
                Some(SolverStatus::Unsat) => Ok(Classification::Neq),
                Some(_) => Ok(Classification::MaybeNeq),
                None => Err(EquivError::precondition(
                    "non-equivalence is sat under abstraction but no equivalence status was computed",
                )),
            },
            SolverStatus::Unknown => Ok(Classification::Unknown),
        }
    }
}

impl From<&PartitionVerdict> for PartitionFacts {
    fn from(v: &PartitionVerdict) -> Self {
        Self {
            is_error: v.is_error(),
            is_depth_limited: v.depth_limited,
            pc_status: v.pc_status,
            neq_status: v.neq_status,
            eq_status: v.eq_status,
            has_uif_pc: v.has_uif_pc,
            has_uif_v1: v.has_uif_v1,
            has_uif_v2: v.has_uif_v2,
            ..Self::default()
        }
    }
}

/// Rebuild the classifier inputs from a stored record
impl From<&PartitionRecord> for PartitionFacts {
    fn from(p: &PartitionRecord) -> Self {
        Self {
            is_error: p.errors.as_deref().is_some_and(|e| !e.trim().is_empty()),
            is_timeout: p.has_timed_out.unwrap_or(false),
            is_depth_limited: p.is_depth_limited.unwrap_or(false),
            pc_status: p.pc_status,
            neq_status: p.neq_status,
            eq_status: p.eq_status,
            has_uif_pc: p.has_uif_pc.unwrap_or(false),
            has_uif_v1: p.has_uif_v1.unwrap_or(false),
            has_uif_v2: p.has_uif_v2.unwrap_or(false),
            ..Self::default()
        }
    }
}

/// Classify an oracle verdict
pub fn classify_verdict(verdict: &PartitionVerdict) -> Result<Classification> {
    PartitionFacts::from(verdict).classify()
}

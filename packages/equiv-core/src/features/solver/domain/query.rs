//! Queries and answers

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::Result;
use crate::features::constraint_model::{build_script, Expression};
use crate::SolverStatus;

use super::model::Model;

/// Which of the three per-partition checks a query implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryKind {
    /// Reachability: `PC`
    Pc,
    /// Non-equivalence: `PC ∧ V1 ≠ V2`
    Neq,
    /// Conditional equivalence: `PC ∧ V1 = V2`
    Eq,
}

impl QueryKind {
    pub const ALL: [QueryKind; 3] = [QueryKind::Pc, QueryKind::Neq, QueryKind::Eq];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pc => "PC",
            Self::Neq => "NEQ",
            Self::Eq => "EQ",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A self-contained solver script
#[derive(Debug, Clone, PartialEq)]
pub struct SmtQuery {
    pub kind: QueryKind,
    pub script: String,
}

impl SmtQuery {
    pub fn build(kind: QueryKind, assertions: &[Expression], timeout_ms: u64) -> Result<Self> {
        Ok(Self {
            kind,
            script: build_script(assertions, timeout_ms)?,
        })
    }
}

/// Solver answer to one query
#[derive(Debug, Clone, PartialEq)]
pub struct SolverAnswer {
    pub status: SolverStatus,
    /// Present for `sat` answers when the solver produced one
    pub model: Option<Model>,
    /// Why the answer is `unknown` (timeout, incompleteness)
    pub reason: Option<String>,
}

impl SolverAnswer {
    pub fn sat(model: Option<Model>) -> Self {
        Self {
            status: SolverStatus::Sat,
            model,
            reason: None,
        }
    }

    pub fn unsat() -> Self {
        Self {
            status: SolverStatus::Unsat,
            model: None,
            reason: None,
        }
    }

    pub fn unknown(reason: impl Into<String>) -> Self {
        Self {
            status: SolverStatus::Unknown,
            model: None,
            reason: Some(reason.into()),
        }
    }

    /// Text written to the answer artifact
    pub fn answer_text(&self) -> String {
        match &self.reason {
            Some(reason) => format!("{}\n{}\n", self.status, reason),
            None => format!("{}\n", self.status),
        }
    }
}

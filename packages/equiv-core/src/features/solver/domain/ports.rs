//! Solver and recorder ports
//!
//! Both are synchronous: a query runs to completion (or to its timeout) on
//! the calling thread. Implementations must not share solver state between
//! calls; every `check` starts from a fresh context.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::errors::Result;

use super::query::{QueryKind, SmtQuery, SolverAnswer};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Solver
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Decision procedure for self-contained scripts
///
/// A timeout is an `unknown` answer, not an error. `Err` is reserved for
/// failures that make the answer meaningless: the process could not be
/// started, crashed, or rejected the script.
pub trait SmtSolver: Send + Sync {
    fn check(&self, query: &SmtQuery) -> Result<SolverAnswer>;

    /// Like `check`, but returns `EquivError::Cancelled` soon after
    /// `cancel` is set. The default ignores the flag.
    fn check_until(&self, query: &SmtQuery, cancel: &Cancellation) -> Result<SolverAnswer> {
        let _ = cancel;
        self.check(query)
    }

    fn name(&self) -> &str;
}

/// Shared stop flag for queries still running on blocking threads
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Recorder
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Identifies one query within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    pub iteration: u32,
    pub partition: u32,
    pub kind: QueryKind,
}

impl QueryKey {
    pub fn new(iteration: u32, partition: u32, kind: QueryKind) -> Self {
        Self {
            iteration,
            partition,
            kind,
        }
    }

    /// File stem of the query artifacts, e.g. `P3-NEQ`
    pub fn stem(&self) -> String {
        format!("P{}-{}", self.partition, self.kind)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "iteration-{}/{}", self.iteration, self.stem())
    }
}

/// Durable record of every query and its answer
pub trait QueryRecorder: Send + Sync {
    fn record(&self, key: QueryKey, query: &SmtQuery, answer: &SolverAnswer) -> Result<()>;
}

//! Equivalence oracle
//!
//! Up to three queries per partition, each in a fresh solver context:
//!
//! | Query | Assertions        | Issued when                               |
//! |-------|-------------------|-------------------------------------------|
//! | PC    | `PC`              | always                                    |
//! | NEQ   | `PC ∧ V1 ≠ V2`    | PC is not `unsat`                         |
//! | EQ    | `PC ∧ V1 = V2`    | NEQ is `sat` and a UIF appears anywhere   |
//!
//! A malformed query or a failing solver stops the partition with an error
//! text; statuses obtained before the failure are kept. Once a
//! `Cancellation` is set, no further query is started.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::errors::{EquivError, Result};
use crate::features::constraint_model::{Expression, Operator, Sort};
use crate::features::oracle::domain::{ExploredPartition, PartitionVerdict, ResultValue};
use crate::features::solver::{Cancellation, QueryKey, QueryKind, QueryRecorder, SmtQuery, SmtSolver};
use crate::SolverStatus;

/// Turns explored partitions into verdicts
#[derive(Clone)]
pub struct EquivalenceOracle {
    solver: Arc<dyn SmtSolver>,
    recorder: Arc<dyn QueryRecorder>,
    timeout_ms: u64,
}

impl EquivalenceOracle {
    pub fn new(
        solver: Arc<dyn SmtSolver>,
        recorder: Arc<dyn QueryRecorder>,
        timeout: Duration,
    ) -> Self {
        Self {
            solver,
            recorder,
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    /// Check one partition. Failures end up in `PartitionVerdict::error`.
    pub fn check(&self, iteration: u32, partition: &ExploredPartition) -> PartitionVerdict {
        self.check_until(iteration, partition, &Cancellation::new())
    }

    pub fn check_until(
        &self,
        iteration: u32,
        partition: &ExploredPartition,
        cancel: &Cancellation,
    ) -> PartitionVerdict {
        let start = Instant::now();
        let mut verdict = PartitionVerdict::new(partition.index);
        verdict.has_uif_pc = partition.pc.contains_uif();
        verdict.has_uif_v1 = partition.v1.contains_uif();
        verdict.has_uif_v2 = partition.v2.contains_uif();
        verdict.constraint_count = partition.pc.constraint_count();
        verdict.depth_limited = partition.depth_limited;

        match self.run_queries(iteration, partition, &mut verdict, cancel) {
            Ok(()) => {}
            Err(EquivError::Cancelled) => {
                debug!(iteration, partition = partition.index, "partition check cancelled");
                verdict.error = Some(EquivError::Cancelled.to_string());
            }
            Err(e) => {
                warn!(
                    iteration,
                    partition = partition.index,
                    error = %e,
                    "partition check failed"
                );
                verdict.error = Some(e.to_string());
            }
        }

        verdict.runtime = start.elapsed();
        verdict
    }

    /// Check a batch of independent partitions, preserving input order
    pub fn check_all(&self, iteration: u32, partitions: &[ExploredPartition]) -> Vec<PartitionVerdict> {
        self.check_all_until(iteration, partitions, &Cancellation::new())
    }

    pub fn check_all_until(
        &self,
        iteration: u32,
        partitions: &[ExploredPartition],
        cancel: &Cancellation,
    ) -> Vec<PartitionVerdict> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            partitions
                .par_iter()
                .map(|p| self.check_until(iteration, p, cancel))
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            partitions
                .iter()
                .map(|p| self.check_until(iteration, p, cancel))
                .collect()
        }
    }

    fn run_queries(
        &self,
        iteration: u32,
        partition: &ExploredPartition,
        verdict: &mut PartitionVerdict,
        cancel: &Cancellation,
    ) -> Result<()> {
        let pc = &partition.pc;
        let query = |kind, assertions| {
            self.query(iteration, partition.index, kind, assertions, cancel)
        };

        let pc_status = query(QueryKind::Pc, vec![pc.clone()])?;
        verdict.pc_status = Some(pc_status);
        if pc_status == SolverStatus::Unsat {
            return Ok(());
        }

        let (v1, v2) = match (partition.v1.to_expression(), partition.v2.to_expression()) {
            (Some(v1), Some(v2)) => (v1, v2),
            _ => {
                apply_raised(&partition.v1, &partition.v2, verdict);
                return Ok(());
            }
        };

        let neq = vec![pc.clone(), relate(&v1, &v2, false)?];
        let neq_status = query(QueryKind::Neq, neq)?;
        verdict.neq_status = Some(neq_status);

        if neq_status == SolverStatus::Sat && verdict.has_uif() {
            let eq = vec![pc.clone(), relate(&v1, &v2, true)?];
            let eq_status = query(QueryKind::Eq, eq)?;
            verdict.eq_status = Some(eq_status);
        }
        Ok(())
    }

    fn query(
        &self,
        iteration: u32,
        partition: u32,
        kind: QueryKind,
        assertions: Vec<Expression>,
        cancel: &Cancellation,
    ) -> Result<SolverStatus> {
        if cancel.is_cancelled() {
            return Err(EquivError::Cancelled);
        }
        let query = SmtQuery::build(kind, &assertions, self.timeout_ms)?;

        #[cfg(feature = "trace")]
        tracing::trace!(iteration, partition, %kind, script = %query.script, "query");

        let answer = self.solver.check_until(&query, cancel)?;
        self.recorder
            .record(QueryKey::new(iteration, partition, kind), &query, &answer)?;

        debug!(
            iteration,
            partition,
            %kind,
            status = %answer.status,
            reason = answer.reason.as_deref().unwrap_or(""),
            "query answered"
        );
        if let (QueryKind::Neq, Some(model)) = (kind, &answer.model) {
            debug!(iteration, partition, counterexample = %model.summary(), "versions differ");
        }
        Ok(answer.status)
    }
}

/// `v1 = v2` or `v1 ≠ v2`, using string predicates for strings
fn relate(v1: &Expression, v2: &Expression, equal: bool) -> Result<Expression> {
    let strings = v1.sort()? == Sort::String;
    let op = match (strings, equal) {
        (true, true) => Operator::Equals,
        (true, false) => Operator::NotEquals,
        (false, true) => Operator::Eq,
        (false, false) => Operator::Ne,
    };
    Ok(Expression::binary(op, v1.clone(), v2.clone()))
}

/// Outcome when at least one version raised instead of returning.
///
/// Raising differs from every returned value, so only two raised errors of
/// the same kind agree.
fn apply_raised(v1: &ResultValue, v2: &ResultValue, verdict: &mut PartitionVerdict) {
    let same = matches!(
        (v1.raised_error(), v2.raised_error()),
        (Some(a), Some(b)) if a == b
    );
    if same {
        verdict.neq_status = Some(SolverStatus::Unsat);
    } else {
        verdict.neq_status = Some(SolverStatus::Sat);
        verdict.eq_status = Some(SolverStatus::Unsat);
    }
}

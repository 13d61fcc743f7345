//! Scripted solver
//!
//! Answers queries from a rule table instead of running a decision
//! procedure. Used by the integration tests and for replaying recorded
//! answers.

use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::errors::{EquivError, Result};
use crate::features::solver::domain::{
    Cancellation, QueryKind, SmtQuery, SmtSolver, SolverAnswer,
};

/// Upper bound on a stalled query that nobody cancels
const STALL_LIMIT: Duration = Duration::from_secs(30);
use crate::SolverStatus;

#[derive(Debug, Clone)]
enum Outcome {
    Status(SolverStatus),
    Timeout,
    Fail(String),
    /// Block until cancelled
    Stall,
}

#[derive(Debug, Clone)]
struct Rule {
    kind: Option<QueryKind>,
    needle: Option<String>,
    outcome: Outcome,
}

impl Rule {
    fn matches(&self, query: &SmtQuery) -> bool {
        self.kind.map_or(true, |k| k == query.kind)
            && self
                .needle
                .as_deref()
                .map_or(true, |n| query.script.contains(n))
    }
}

/// Rule-driven solver; the first matching rule wins
#[derive(Debug)]
pub struct ScriptedSolver {
    rules: Vec<Rule>,
    fallback: SolverStatus,
    calls: Mutex<Vec<SmtQuery>>,
}

impl Default for ScriptedSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedSolver {
    /// Every query is `sat` until rules say otherwise
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: SolverStatus::Sat,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn otherwise(mut self, status: SolverStatus) -> Self {
        self.fallback = status;
        self
    }

    pub fn when(self, kind: QueryKind, status: SolverStatus) -> Self {
        self.push(Some(kind), None, Outcome::Status(status))
    }

    /// Match queries of `kind` whose script contains `needle`
    pub fn when_script(self, kind: QueryKind, needle: &str, status: SolverStatus) -> Self {
        self.push(Some(kind), Some(needle), Outcome::Status(status))
    }

    /// Any query whose script contains `needle`
    pub fn when_any(self, needle: &str, status: SolverStatus) -> Self {
        self.push(None, Some(needle), Outcome::Status(status))
    }

    pub fn time_out(self, kind: QueryKind) -> Self {
        self.push(Some(kind), None, Outcome::Timeout)
    }

    pub fn fail(self, kind: QueryKind, message: &str) -> Self {
        self.push(Some(kind), None, Outcome::Fail(message.to_string()))
    }

    pub fn fail_script(self, needle: &str, message: &str) -> Self {
        self.push(None, Some(needle), Outcome::Fail(message.to_string()))
    }

    /// Queries whose script contains `needle` hang until cancelled
    pub fn stall_script(self, needle: &str) -> Self {
        self.push(None, Some(needle), Outcome::Stall)
    }

    fn push(mut self, kind: Option<QueryKind>, needle: Option<&str>, outcome: Outcome) -> Self {
        self.rules.push(Rule {
            kind,
            needle: needle.map(str::to_string),
            outcome,
        });
        self
    }

    /// Queries seen so far, in call order
    pub fn calls(&self) -> Vec<SmtQuery> {
        self.calls.lock().clone()
    }

    pub fn call_kinds(&self) -> Vec<QueryKind> {
        self.calls.lock().iter().map(|q| q.kind).collect()
    }
}

impl SmtSolver for ScriptedSolver {
    fn check(&self, query: &SmtQuery) -> Result<SolverAnswer> {
        self.check_until(query, &Cancellation::new())
    }

    fn check_until(&self, query: &SmtQuery, cancel: &Cancellation) -> Result<SolverAnswer> {
        self.calls.lock().push(query.clone());

        let outcome = self
            .rules
            .iter()
            .find(|r| r.matches(query))
            .map(|r| r.outcome.clone())
            .unwrap_or(Outcome::Status(self.fallback));

        match outcome {
            Outcome::Status(SolverStatus::Sat) => Ok(SolverAnswer::sat(None)),
            Outcome::Status(SolverStatus::Unsat) => Ok(SolverAnswer::unsat()),
            Outcome::Status(SolverStatus::Unknown) => {
                Ok(SolverAnswer::unknown("solver returned unknown"))
            }
            Outcome::Timeout => Ok(SolverAnswer::unknown("timeout")),
            Outcome::Fail(message) => Err(EquivError::solver(message)),
            Outcome::Stall => {
                let start = Instant::now();
                while start.elapsed() < STALL_LIMIT {
                    if cancel.is_cancelled() {
                        return Err(EquivError::Cancelled);
                    }
                    thread::sleep(Duration::from_millis(5));
                }
                Ok(SolverAnswer::unknown("timeout"))
            }
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(kind: QueryKind, script: &str) -> SmtQuery {
        SmtQuery {
            kind,
            script: script.to_string(),
        }
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let solver = ScriptedSolver::new()
            .when_script(QueryKind::Neq, "UF_f", SolverStatus::Unknown)
            .when(QueryKind::Neq, SolverStatus::Unsat);

        assert_eq!(solver.check(&query(QueryKind::Neq, "(UF_f x)")).unwrap().status, SolverStatus::Unknown);
        assert_eq!(solver.check(&query(QueryKind::Neq, "x")).unwrap().status, SolverStatus::Unsat);
        assert_eq!(solver.check(&query(QueryKind::Pc, "x")).unwrap().status, SolverStatus::Sat);
        assert_eq!(solver.call_kinds(), vec![QueryKind::Neq, QueryKind::Neq, QueryKind::Pc]);
    }

    #[test]
    fn test_failures_and_timeouts() {
        let solver = ScriptedSolver::new()
            .fail(QueryKind::Eq, "segfault")
            .time_out(QueryKind::Neq);
        assert!(solver.check(&query(QueryKind::Eq, "")).is_err());
        let answer = solver.check(&query(QueryKind::Neq, "")).unwrap();
        assert_eq!(answer.reason.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_stalled_query_ends_on_cancel() {
        let solver = ScriptedSolver::new().stall_script("slow");
        let cancel = Cancellation::new();

        let stopper = {
            let cancel = cancel.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                cancel.cancel();
            })
        };
        let start = Instant::now();
        let result = solver.check_until(&query(QueryKind::Pc, "slow"), &cancel);
        stopper.join().unwrap();

        assert!(matches!(result, Err(EquivError::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}

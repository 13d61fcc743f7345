//! Z3 as a child process
//!
//! Each query spawns `z3 -in -smt2`, writes the script to stdin and reads
//! the answer from stdout. The script carries its own `:timeout` option; the
//! process is additionally killed once a grace period past that timeout has
//! elapsed, which is reported as `unknown`. A cancelled query kills the
//! process at the next poll.

use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::errors::{EquivError, Result};
use crate::features::solver::domain::{Cancellation, Model, SmtQuery, SmtSolver, SolverAnswer};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const GRACE: Duration = Duration::from_secs(2);

/// Process-backed Z3 binding
#[derive(Debug, Clone)]
pub struct Z3ProcessSolver {
    binary: String,
    timeout: Duration,
}

impl Z3ProcessSolver {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Whether the binary can be started at all
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    fn spawn(&self) -> Result<Child> {
        Command::new(&self.binary)
            .arg("-in")
            .arg("-smt2")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| EquivError::solver(format!("failed to spawn {}: {}", self.binary, e)))
    }

    fn wall_clock_limit(&self) -> Duration {
        self.timeout + self.timeout / 10 + GRACE
    }
}

impl SmtSolver for Z3ProcessSolver {
    fn check(&self, query: &SmtQuery) -> Result<SolverAnswer> {
        self.check_until(query, &Cancellation::new())
    }

    fn check_until(&self, query: &SmtQuery, cancel: &Cancellation) -> Result<SolverAnswer> {
        if cancel.is_cancelled() {
            return Err(EquivError::Cancelled);
        }
        let mut child = self.spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(query.script.as_bytes())
                .map_err(|e| EquivError::solver(format!("failed to write query: {}", e)))?;
        }

        // Drain stdout concurrently so a large model cannot fill the pipe
        let reader = child.stdout.take().map(|mut stdout| {
            thread::spawn(move || {
                let mut out = String::new();
                stdout.read_to_string(&mut out).map(|_| out)
            })
        });

        let status = match wait_timeout(&mut child, self.wall_clock_limit(), cancel)? {
            Waited::Exited(status) => status,
            Waited::TimedOut => {
                warn!(kind = %query.kind, "solver exceeded its time limit, killing process");
                let _ = child.kill();
                let _ = child.wait();
                return Ok(SolverAnswer::unknown("timeout"));
            }
            Waited::Cancelled => {
                debug!(kind = %query.kind, "query cancelled, killing process");
                let _ = child.kill();
                let _ = child.wait();
                return Err(EquivError::Cancelled);
            }
        };

        let output = match reader {
            Some(handle) => handle
                .join()
                .map_err(|_| EquivError::solver("solver output reader panicked"))?
                .map_err(|e| EquivError::solver(format!("failed to read solver output: {}", e)))?,
            None => String::new(),
        };

        debug!(kind = %query.kind, exit = ?status.code(), "solver finished");
        parse_output(&output, status)
    }

    fn name(&self) -> &str {
        &self.binary
    }
}

enum Waited {
    Exited(ExitStatus),
    TimedOut,
    Cancelled,
}

fn wait_timeout(child: &mut Child, limit: Duration, cancel: &Cancellation) -> Result<Waited> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Waited::Exited(status));
        }
        if cancel.is_cancelled() {
            return Ok(Waited::Cancelled);
        }
        if start.elapsed() >= limit {
            return Ok(Waited::TimedOut);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Interpret solver output.
///
/// The first non-empty line is the status. Errors printed after it come
/// from `(get-model)` on non-sat answers and are ignored.
pub fn parse_output(output: &str, status: ExitStatus) -> Result<SolverAnswer> {
    let mut lines = output.lines().map(str::trim).skip_while(|l| l.is_empty());
    let first = lines.next().unwrap_or("");

    match first {
        "sat" => {
            let rest: Vec<&str> = lines.collect();
            let text = rest.join("\n");
            // the status stands even when the model cannot be read
            let model = if text.trim_start().starts_with('(') {
                Some(Model::parse(&text).unwrap_or_else(|e| {
                    warn!(error = %e, "keeping unparsed model text");
                    Model::unparsed(&text)
                }))
            } else {
                None
            };
            Ok(SolverAnswer::sat(model))
        }
        "unsat" => Ok(SolverAnswer::unsat()),
        "unknown" => Ok(SolverAnswer::unknown("solver returned unknown")),
        "timeout" => Ok(SolverAnswer::unknown("timeout")),
        line if line.starts_with("(error") => Err(EquivError::solver(line.to_string())),
        "" => Err(EquivError::solver(format!(
            "solver produced no output (exit status {:?})",
            status.code()
        ))),
        line => Err(EquivError::solver(format!("unexpected solver output: {}", line))),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::SolverStatus;
    use std::os::unix::process::ExitStatusExt;

    fn ok() -> ExitStatus {
        ExitStatus::from_raw(0)
    }

    #[test]
    fn test_parse_status_lines() {
        assert_eq!(parse_output("unsat\n(error \"model is not available\")\n", ok()).unwrap().status, SolverStatus::Unsat);
        assert_eq!(parse_output("unknown\n", ok()).unwrap().status, SolverStatus::Unknown);

        let timeout = parse_output("timeout\n", ok()).unwrap();
        assert_eq!(timeout.status, SolverStatus::Unknown);
        assert_eq!(timeout.reason.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_parse_sat_with_model() {
        let answer = parse_output("sat\n(\n  (define-fun x () Int\n    5)\n)\n", ok()).unwrap();
        assert_eq!(answer.status, SolverStatus::Sat);
        assert_eq!(answer.model.unwrap().get("x"), Some("5"));
    }

    #[test]
    fn test_unreadable_model_keeps_sat() {
        let answer = parse_output("sat\n((define-fun x () Int 1)\n", ok()).unwrap();
        assert_eq!(answer.status, SolverStatus::Sat);
        let model = answer.model.unwrap();
        assert!(model.is_empty());
        assert!(model.raw().contains("define-fun x"));
    }

    #[test]
    fn test_errors_are_not_unknown() {
        let err = parse_output("(error \"line 4 column 10: unknown constant y\")\nsat\n", ok()).unwrap_err();
        assert!(matches!(err, EquivError::Solver(_)));
        assert!(parse_output("", ExitStatus::from_raw(139)).is_err());
    }

    #[test]
    fn test_cancelled_before_spawn() {
        let solver = Z3ProcessSolver::new("definitely-not-a-solver-binary", Duration::from_secs(1));
        let cancel = Cancellation::new();
        cancel.cancel();
        let query = SmtQuery {
            kind: crate::features::solver::QueryKind::Pc,
            script: "(check-sat)\n".to_string(),
        };
        assert!(matches!(solver.check_until(&query, &cancel), Err(EquivError::Cancelled)));
    }

    #[test]
    fn test_missing_binary_is_a_solver_error() {
        let solver = Z3ProcessSolver::new("definitely-not-a-solver-binary", Duration::from_secs(1));
        assert!(!solver.is_available());
        let query = SmtQuery {
            kind: crate::features::solver::QueryKind::Pc,
            script: "(check-sat)\n".to_string(),
        };
        assert!(matches!(solver.check(&query), Err(EquivError::Solver(_))));
    }
}

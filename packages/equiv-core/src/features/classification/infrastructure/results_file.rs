//! Human-readable results file
//!
//! One block per iteration:
//!
//! ```text
//! -----------------------Results-------------------------------------------
//!   -symbolic-execution : 412 ms
//!   -classification : 37 ms
//! Output : UNKNOWN
//! Reason: too much abstraction
//! -----------------------END-------------------------------------------
//! ```
//!
//! The same format is produced by external base tools, so the reader only
//! relies on the `--Results--` marker and the `Output : ` line.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use equiv_storage::IterationRecord;

use crate::errors::{EquivError, Result};
use crate::features::classification::domain::{classify_iteration, IterationFlags};
use crate::Classification;

const RESULTS_MARKER: &str = "--Results--";
const OUTPUT_PREFIX: &str = "Output : ";
const TOO_MUCH_ABSTRACTION: &str = "too much abstraction";

/// Summary of one iteration
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsBlock {
    pub timings: Vec<(String, Duration)>,
    pub classification: Classification,
    /// Shown on the `Reason:` line of inconclusive outputs
    pub reason: Option<String>,
}

impl ResultsBlock {
    pub fn new(classification: Classification) -> Self {
        Self {
            timings: Vec::new(),
            classification,
            reason: None,
        }
    }

    pub fn with_timing(mut self, phase: impl Into<String>, elapsed: Duration) -> Self {
        self.timings.push((phase.into(), elapsed));
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::from(
            "-----------------------Results-------------------------------------------\n",
        );
        for (phase, elapsed) in &self.timings {
            out.push_str(&format!("  -{} : {} ms\n", phase, elapsed.as_millis()));
        }
        match self.classification {
            Classification::Eq | Classification::MaybeEq => {
                out.push_str("Output : EQUIVALENT\n");
            }
            Classification::Neq => out.push_str("Output : NOT EQUIVALENT\n"),
            Classification::MaybeNeq => {
                out.push_str("Output : UNKNOWN \n");
                out.push_str(&format!("Reason: {}\n", TOO_MUCH_ABSTRACTION));
            }
            other => {
                let reason = self
                    .reason
                    .clone()
                    .unwrap_or_else(|| other.as_str().to_ascii_lowercase());
                out.push_str("Output : UNKNOWN \n");
                out.push_str(&format!("Reason: {}\n", reason.replace(TOO_MUCH_ABSTRACTION, "")));
            }
        }
        out.push_str("-----------------------END-------------------------------------------\n");
        out
    }
}

/// `<artifacts>/<benchmark>/<tool>/results.txt`
#[derive(Debug, Clone)]
pub struct ResultsFile {
    path: PathBuf,
}

impl ResultsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_run(artifacts_dir: &Path, benchmark: &str, tool: &str) -> Self {
        Self::new(artifacts_dir.join(benchmark).join(tool).join("results.txt"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the output of a previous attempt
    pub fn reset(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn append(&self, block: &ResultsBlock) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(block.render().as_bytes())?;
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Reading
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Classify one block's output.
///
/// `EQUIVALENT` is only `EQ` when the iteration is known not to be depth
/// limited.
pub fn classify_output(block: &str, is_depth_limited: Option<bool>) -> Result<Classification> {
    let output = block
        .find(OUTPUT_PREFIX)
        .map(|i| &block[i..])
        .ok_or_else(|| EquivError::parse_error(format!("no output line in '{}'", block.trim())))?;

    if output.starts_with("Output : EQUIVALENT") {
        if is_depth_limited == Some(false) {
            Ok(Classification::Eq)
        } else {
            Ok(Classification::MaybeEq)
        }
    } else if output.starts_with("Output : NOT EQUIVALENT") {
        Ok(Classification::Neq)
    } else if output.starts_with("Output : UNKNOWN") {
        if output.contains(TOO_MUCH_ABSTRACTION) {
            Ok(Classification::MaybeNeq)
        } else {
            Ok(Classification::Unknown)
        }
    } else {
        Err(EquivError::parse_error(format!(
            "unable to classify output '{}'",
            output.lines().next().unwrap_or("").trim()
        )))
    }
}

/// Classify every block of a results file, in order
pub fn parse_results(
    text: &str,
    depth_limited: impl Fn(u32) -> Option<bool>,
) -> Result<Vec<Classification>> {
    text.split(RESULTS_MARKER)
        .skip(1)
        .enumerate()
        .map(|(i, block)| classify_output(block, depth_limited(i as u32 + 1)))
        .collect()
}

/// Turn a run's results file into iteration records.
///
/// Without a results file the run either timed out or failed; a single
/// iteration records which. `errors` and the timeout flag apply to every
/// block's classification; the timeout is stored on the last iteration only.
pub fn read_iterations(
    file: &ResultsFile,
    benchmark: &str,
    tool: &str,
    errors: &str,
    is_timeout: bool,
    depth_limited: impl Fn(u32) -> Option<bool>,
) -> Result<Vec<IterationRecord>> {
    let is_error = !errors.trim().is_empty();

    if !file.path().exists() {
        if !is_error && !is_timeout {
            return Err(EquivError::precondition(format!(
                "'{}' is missing but the run neither failed nor timed out",
                file.path().display()
            )));
        }
        let mut it = IterationRecord::started(benchmark, tool, 1);
        it.result = Some(if is_timeout {
            Classification::Timeout
        } else {
            Classification::Error
        });
        it.has_timed_out = Some(is_timeout);
        it.errors = Some(errors.to_string());
        return Ok(vec![it]);
    }

    let text = fs::read_to_string(file.path())?;
    let outputs = parse_results(&text, &depth_limited)?;
    let flags = IterationFlags {
        is_error,
        is_timeout,
    };
    let last = outputs.len();

    Ok(outputs
        .into_iter()
        .enumerate()
        .map(|(i, output)| {
            let number = i as u32 + 1;
            let is_last = number as usize == last;
            let mut it = IterationRecord::started(benchmark, tool, number);
            it.result = Some(classify_iteration([output], flags));
            it.has_timed_out = Some(is_last && is_timeout);
            it.is_depth_limited = depth_limited(number);
            it.errors = Some(if is_last || is_error {
                errors.to_string()
            } else {
                String::new()
            });
            it
        })
        .collect())
}

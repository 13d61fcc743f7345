//! Iteration and run aggregation
//!
//! An iteration takes the least certain classification among its reachable
//! partitions. Dominance, strongest first:
//!
//! ```text
//! MISSING > BASE_TOOL_MISSING > ERROR > TIMEOUT > NEQ > MAYBE_NEQ
//!         > DEPTH_LIMITED > UNKNOWN > MAYBE_EQ > EQ
//! ```
//!
//! `UNREACHABLE` partitions do not take part. An iteration with no reachable
//! partition is `UNKNOWN`. A run is classified by its terminal iteration.

use crate::Classification;

/// Position in the dominance order; lower dominates
fn dominance(c: Classification) -> u8 {
    match c {
        Classification::Missing => 0,
        Classification::BaseToolMissing => 1,
        Classification::Error => 2,
        Classification::Timeout => 3,
        Classification::Neq => 4,
        Classification::MaybeNeq => 5,
        Classification::DepthLimited => 6,
        Classification::Unknown => 7,
        Classification::MaybeEq => 8,
        Classification::Eq => 9,
        Classification::Unreachable => u8::MAX,
    }
}

/// Fold partition classifications, ignoring `UNREACHABLE`
pub fn fold_partitions(partitions: impl IntoIterator<Item = Classification>) -> Classification {
    partitions
        .into_iter()
        .filter(|c| *c != Classification::Unreachable)
        .min_by_key(|c| dominance(*c))
        .unwrap_or(Classification::Unknown)
}

/// Iteration-level failure flags, which override partition results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationFlags {
    pub is_error: bool,
    pub is_timeout: bool,
}

pub fn classify_iteration(
    partitions: impl IntoIterator<Item = Classification>,
    flags: IterationFlags,
) -> Classification {
    if flags.is_error {
        return Classification::Error;
    }
    if flags.is_timeout {
        return Classification::Timeout;
    }
    fold_partitions(partitions)
}

/// Terminal iteration's classification; a run without iterations is `MISSING`
pub fn classify_run(iterations: &[Classification]) -> Classification {
    iterations
        .last()
        .copied()
        .unwrap_or(Classification::Missing)
}

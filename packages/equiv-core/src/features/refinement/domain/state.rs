//! CEGAR state machine
//!
//! ```text
//! Analyzing ──(final verdict | no candidate | timeout)──► Done
//!     ▲                │
//!     └── Refining ◄───┘ (candidate found)
//! ```

use std::fmt;

use crate::Classification;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CegarState {
    Analyzing,
    Refining,
    Done,
}

impl fmt::Display for CegarState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Analyzing => "ANALYZING",
            Self::Refining => "REFINING",
            Self::Done => "DONE",
        };
        write!(f, "{}", s)
    }
}

/// Why a run stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// `EQ`, `NEQ` or `ERROR`
    Final(Classification),
    /// Abstraction exhausted
    NothingLeftToRefine,
    /// The tool never refines
    SingleIteration,
    TimedOut,
    /// The instrumentation collaborator failed to expand a unit
    RefinementFailed(String),
    /// The run's input does not exist, nothing was analyzed
    BaseToolMissing,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Final(c) => write!(f, "final classification {}", c),
            Self::NothingLeftToRefine => write!(f, "nothing left to refine"),
            Self::SingleIteration => write!(f, "tool does not refine"),
            Self::TimedOut => write!(f, "timed out"),
            Self::RefinementFailed(e) => write!(f, "refinement failed: {}", e),
            Self::BaseToolMissing => write!(f, "input missing"),
        }
    }
}

/// Transition taken after an iteration has been classified
pub fn after_iteration(classification: Classification, can_iterate: bool) -> Result<CegarState, StopReason> {
    if classification.is_final() {
        Err(StopReason::Final(classification))
    } else if !can_iterate {
        Err(StopReason::SingleIteration)
    } else {
        Ok(CegarState::Refining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_classifications_stop() {
        for c in [Classification::Eq, Classification::Neq, Classification::Error] {
            assert_eq!(after_iteration(c, true), Err(StopReason::Final(c)));
        }
    }

    #[test]
    fn test_inconclusive_refines_only_when_tool_iterates() {
        assert_eq!(after_iteration(Classification::MaybeNeq, true), Ok(CegarState::Refining));
        assert_eq!(after_iteration(Classification::Timeout, true), Ok(CegarState::Refining));
        assert_eq!(
            after_iteration(Classification::Unknown, false),
            Err(StopReason::SingleIteration)
        );
    }
}

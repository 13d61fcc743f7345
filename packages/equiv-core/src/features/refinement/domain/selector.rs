//! Refinement candidate selection
//!
//! Only units shared by both versions and not yet refined are eligible.
//! The heuristic narrows eligibility and orders the rest; declaration order
//! breaks ties.

use std::collections::BTreeSet;

use crate::config::Heuristic;

use super::abstraction::{AbstractedUnit, AbstractionSummary};

#[derive(Debug, Clone, Copy)]
pub struct CandidateSelector {
    heuristic: Heuristic,
}

impl CandidateSelector {
    pub fn new(heuristic: Heuristic) -> Self {
        Self { heuristic }
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// Eligible units, best first.
    ///
    /// `inconclusive` holds the UIF names that occur in partitions of the
    /// current iteration without a definitive classification.
    pub fn candidates<'a>(
        &self,
        summary: &'a AbstractionSummary,
        refined: &BTreeSet<String>,
        inconclusive: &BTreeSet<String>,
    ) -> Vec<&'a AbstractedUnit> {
        let unrefined: Vec<&AbstractedUnit> = summary
            .shared()
            .filter(|u| !refined.contains(&u.name))
            .collect();

        let mut eligible = unrefined.clone();
        if self.heuristic.uses_occurrence_filter() {
            let occurring: Vec<_> = unrefined
                .iter()
                .copied()
                .filter(|u| inconclusive.contains(&u.name))
                .collect();
            if !occurring.is_empty() {
                eligible = occurring;
            }
        }

        // stable sort keeps declaration order among equal keys
        let divergence = self.heuristic.uses_divergence_order();
        let shape = self.heuristic.uses_shape_order();
        eligible.sort_by_key(|u| {
            (
                divergence && !u.call_counts_differ(),
                shape && u.has_loop,
                if shape { u.call_sites() } else { 0 },
            )
        });
        eligible
    }

    pub fn select<'a>(
        &self,
        summary: &'a AbstractionSummary,
        refined: &BTreeSet<String>,
        inconclusive: &BTreeSet<String>,
    ) -> Option<&'a AbstractedUnit> {
        self.candidates(summary, refined, inconclusive)
            .into_iter()
            .next()
    }
}

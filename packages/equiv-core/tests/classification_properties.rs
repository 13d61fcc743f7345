//! Property-based tests for partition classification and aggregation
//!
//! Invariants that hold for ALL inputs:
//! - Unreachable override: PC `unsat` wins over every other fact
//! - Idempotence: reclassifying from stored fields gives the same result
//! - Monotonicity: extra `UNREACHABLE` partitions never change an iteration

use equiv_core::features::classification::{classify_iteration, IterationFlags, PartitionFacts};
use equiv_core::{Classification, SolverStatus};
use equiv_storage::PartitionRecord;
use proptest::prelude::*;

fn status() -> impl Strategy<Value = SolverStatus> {
    prop_oneof![
        Just(SolverStatus::Sat),
        Just(SolverStatus::Unsat),
        Just(SolverStatus::Unknown),
    ]
}

fn partition_class() -> impl Strategy<Value = Classification> {
    prop_oneof![
        Just(Classification::Eq),
        Just(Classification::MaybeEq),
        Just(Classification::Neq),
        Just(Classification::MaybeNeq),
        Just(Classification::Unknown),
        Just(Classification::DepthLimited),
        Just(Classification::Timeout),
        Just(Classification::Error),
        Just(Classification::Unreachable),
    ]
}

/// Facts as the oracle can produce them: EQ only after a `sat` NEQ with UIFs
fn reachable_facts() -> impl Strategy<Value = PartitionFacts> {
    (status(), status(), any::<[bool; 3]>(), any::<bool>()).prop_map(
        |(neq, eq, [pc, v1, v2], depth_limited)| {
            let has_uif = pc || v1 || v2;
            PartitionFacts {
                is_depth_limited: depth_limited,
                pc_status: Some(SolverStatus::Sat),
                neq_status: Some(neq),
                eq_status: (neq == SolverStatus::Sat && has_uif).then_some(eq),
                has_uif_pc: pc,
                has_uif_v1: v1,
                has_uif_v2: v2,
                ..PartitionFacts::default()
            }
        },
    )
}

fn arbitrary_facts() -> impl Strategy<Value = PartitionFacts> {
    (
        any::<[bool; 4]>(),
        proptest::option::of(status()),
        proptest::option::of(status()),
        any::<[bool; 3]>(),
    )
        .prop_map(|([error, timeout, depth, _], neq, eq, [pc, v1, v2])| PartitionFacts {
            is_error: error,
            is_timeout: timeout,
            is_depth_limited: depth,
            pc_status: Some(SolverStatus::Unsat),
            neq_status: neq,
            eq_status: eq,
            has_uif_pc: pc,
            has_uif_v1: v1,
            has_uif_v2: v2,
            ..PartitionFacts::default()
        })
}

fn stored(facts: &PartitionFacts, result: Classification) -> PartitionRecord {
    let mut record = PartitionRecord::index_only("b", "CEGAR", 1, 1);
    record.result = Some(result);
    record.pc_status = facts.pc_status;
    record.neq_status = facts.neq_status;
    record.eq_status = facts.eq_status;
    record.has_uif_pc = Some(facts.has_uif_pc);
    record.has_uif_v1 = Some(facts.has_uif_v1);
    record.has_uif_v2 = Some(facts.has_uif_v2);
    record.has_timed_out = Some(facts.is_timeout);
    record.is_depth_limited = Some(facts.is_depth_limited);
    if result == Classification::Error {
        record.errors = Some("solver crashed".to_string());
    }
    record
}

proptest! {
    #[test]
    fn prop_unreachable_overrides_everything(facts in arbitrary_facts()) {
        prop_assert_eq!(facts.classify().unwrap(), Classification::Unreachable);
    }

    #[test]
    fn prop_reachable_facts_always_classify(facts in reachable_facts()) {
        let class = facts.classify().unwrap();
        prop_assert!(class != Classification::Unreachable);
        prop_assert!(!class.is_run_level_only());
    }

    #[test]
    fn prop_neq_unsat_without_pc_uif_is_eq(mut facts in reachable_facts()) {
        facts.is_depth_limited = false;
        facts.neq_status = Some(SolverStatus::Unsat);
        facts.eq_status = None;
        facts.has_uif_pc = false;
        prop_assert_eq!(facts.classify().unwrap(), Classification::Eq);
    }

    #[test]
    fn prop_neq_sat_follows_eq_query(mut facts in reachable_facts(), eq in status()) {
        facts.is_depth_limited = false;
        facts.neq_status = Some(SolverStatus::Sat);
        facts.eq_status = facts.has_uif().then_some(eq);
        let expected = if !facts.has_uif() || eq == SolverStatus::Unsat {
            Classification::Neq
        } else {
            Classification::MaybeNeq
        };
        prop_assert_eq!(facts.classify().unwrap(), expected);
    }

    #[test]
    fn prop_reclassification_is_idempotent(facts in reachable_facts()) {
        let first = facts.classify().unwrap();
        let record = stored(&facts, first);
        let again = PartitionFacts::from(&record).classify().unwrap();
        prop_assert_eq!(first, again);
    }

    #[test]
    fn prop_unreachable_partitions_do_not_change_iterations(
        classes in proptest::collection::vec(partition_class(), 0..12),
        extra in 1usize..4,
        error in any::<bool>(),
        timeout in any::<bool>(),
    ) {
        let flags = IterationFlags { is_error: error, is_timeout: timeout };
        let before = classify_iteration(classes.clone(), flags);

        let mut with_unreachable = classes;
        with_unreachable.extend(std::iter::repeat(Classification::Unreachable).take(extra));
        prop_assert_eq!(classify_iteration(with_unreachable, flags), before);
    }
}

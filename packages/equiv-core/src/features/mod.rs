//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/         - Pure logic and ports (traits)
//! - application/    - Use cases
//! - infrastructure/ - External dependency implementations

/// Expression trees and SMT-LIB rendering
pub mod constraint_model;

/// Solver port, z3 process backend, query artifacts
pub mod solver;

/// PC / NEQ / EQ queries per explored partition
pub mod oracle;

/// Partition classifier, iteration/run aggregation, results file
pub mod classification;

/// CEGAR loop, heuristics, watchdog
pub mod refinement;

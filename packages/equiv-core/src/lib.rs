/*
 * equiv-core - Regression Verification Engine
 *
 * Feature-First Hexagonal Architecture:
 * - config/    : YAML configuration (exploration, solver, refinement, run)
 * - shared/    : Stopwatches
 * - features/  : Vertical slices (constraint_model → solver → oracle → classification → refinement)
 *
 * Records are persisted through equiv-storage.
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Record builders take every field
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::upper_case_acronyms)] // PC, NEQ, UIF naming

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Configuration (versioned YAML)
pub mod config;

/// Error types
pub mod errors;

/// Feature slices
pub mod features;

/// Shared utilities
pub mod shared;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{EquivConfig, Heuristic, Tool};
pub use errors::{EquivError, Result};
pub use equiv_storage::{Classification, SolverStatus};

pub use features::classification::{classify_iteration, classify_run, PartitionFacts};
pub use features::constraint_model::{Expression, Sort};
pub use features::oracle::{EquivalenceOracle, ExploredPartition, PartitionVerdict, ResultValue};
pub use features::refinement::{CegarController, RunOutcome, RunRequest};
pub use features::solver::{SmtSolver, Z3ProcessSolver};

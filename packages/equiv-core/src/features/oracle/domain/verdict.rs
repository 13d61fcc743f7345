//! Oracle output for one partition

use std::time::Duration;

use crate::SolverStatus;

/// Query outcomes and facts gathered for one partition.
///
/// A verdict is complete once the oracle returns it; classification reads
/// it but never changes it.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionVerdict {
    pub index: u32,
    pub pc_status: Option<SolverStatus>,
    pub neq_status: Option<SolverStatus>,
    pub eq_status: Option<SolverStatus>,
    pub has_uif_pc: bool,
    pub has_uif_v1: bool,
    pub has_uif_v2: bool,
    pub constraint_count: u32,
    pub depth_limited: bool,
    /// Set when a query was malformed or the solver failed
    pub error: Option<String>,
    pub runtime: Duration,
}

impl PartitionVerdict {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            pc_status: None,
            neq_status: None,
            eq_status: None,
            has_uif_pc: false,
            has_uif_v1: false,
            has_uif_v2: false,
            constraint_count: 0,
            depth_limited: false,
            error: None,
            runtime: Duration::ZERO,
        }
    }

    pub fn has_uif(&self) -> bool {
        self.has_uif_pc || self.has_uif_v1 || self.has_uif_v2
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

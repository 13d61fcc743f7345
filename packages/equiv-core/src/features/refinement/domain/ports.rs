//! Collaborators of the refinement controller

use async_trait::async_trait;

use crate::errors::Result;
use crate::features::oracle::ExploredPartition;

use super::abstraction::{AbstractedUnit, AbstractionSummary};

/// Pull-based source of explored partitions
#[async_trait]
pub trait SymbolicPathSource: Send {
    /// Begin exploration for `iteration` (1-based)
    async fn start(&mut self, iteration: u32) -> Result<()>;

    /// Next partition, `None` once enumeration is complete
    async fn next_partition(&mut self) -> Result<Option<ExploredPartition>>;

    /// Units abstracted in the iteration being explored
    fn abstraction_summary(&self) -> AbstractionSummary;
}

/// Builds the analyzed programs and expands abstracted units
#[async_trait]
pub trait Instrumentation: Send {
    /// Prepare both versions for `iteration`
    async fn prepare(&mut self, _iteration: u32) -> Result<()> {
        Ok(())
    }

    /// Re-expand `unit` in both versions before the next iteration
    async fn expand(&mut self, unit: &AbstractedUnit) -> Result<()>;
}

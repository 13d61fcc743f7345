//! Oracle domain

pub mod partition;
pub mod verdict;

pub use partition::{ExploredPartition, ResultValue};
pub use verdict::PartitionVerdict;

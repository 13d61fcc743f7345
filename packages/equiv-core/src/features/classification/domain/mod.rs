//! Classification domain

pub mod aggregator;
pub mod classifier;

pub use aggregator::{classify_iteration, classify_run, fold_partitions, IterationFlags};
pub use classifier::{classify_verdict, PartitionFacts};

//! Classification
//!
//! Partition classifier, iteration/run aggregation and the results file.
//!
//! ```text
//! PartitionVerdict ──► PartitionFacts::classify ──► Classification
//!                                                      │
//!                 fold_partitions / classify_iteration ◄┘
//!                                │
//!                          classify_run
//! ```

pub mod domain;
pub mod infrastructure;

pub use domain::{
    classify_iteration, classify_run, classify_verdict, fold_partitions, IterationFlags,
    PartitionFacts,
};
pub use infrastructure::{
    classify_output, parse_results, read_iterations, ResultsBlock, ResultsFile,
};

//! Oracle application layer

pub mod oracle;

pub use oracle::EquivalenceOracle;

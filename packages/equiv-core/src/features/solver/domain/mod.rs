//! Solver domain

pub mod model;
pub mod ports;
pub mod query;

pub use model::Model;
pub use ports::{Cancellation, QueryKey, QueryRecorder, SmtSolver};
pub use query::{QueryKind, SmtQuery, SolverAnswer};

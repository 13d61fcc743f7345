//! Constraint model domain

pub mod expression;
pub mod operator;
pub mod source_location;

pub use expression::{Constant, Expression, Sort};
pub use operator::{MathFunction, Operator, OperatorKind};
pub use source_location::{Provenance, SourceLocation};

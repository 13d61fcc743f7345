//! Constraint Model
//!
//! Expression trees for path conditions and symbolic results, and their
//! SMT-LIB v2 rendering.
//!
//! ## Architecture
//!
//! ```text
//! constraint_model
//! ├── domain/             # Expression, Sort, Operator, SourceLocation
//! └── infrastructure/
//!     └── smtlib          # Term rendering, declarations, scripts
//! ```

pub mod domain;
pub mod infrastructure;

pub use domain::{
    Constant, Expression, MathFunction, Operator, OperatorKind, Provenance, SourceLocation, Sort,
};
pub use infrastructure::{build_script, Declarations};

//! Configuration
//!
//! ```text
//! EquivConfig
//! ├── exploration   bound, value ranges (forwarded to the path source)
//! ├── solver        per-query timeout, binary, parallelism
//! ├── refinement    heuristic (H123 | H3 | R)
//! └── run           tool (SE | DSE | CEGAR), watchdog timeout, artifacts dir
//! ```
//!
//! Loaded from a versioned YAML file (`version: 1`); every section and field
//! is optional and falls back to its default.

pub mod error;
pub mod heuristic;
pub mod io;
pub mod settings;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use heuristic::{Heuristic, Tool};
pub use io::ConfigFileV1;
pub use settings::{
    EquivConfig, ExplorationConfig, RefinementConfig, RunConfig, SolverConfig, ValueRanges,
};
pub use validation::{validate_sections, Validatable};

//! Configuration sections
//!
//! Every section is `#[serde(default)]` so a YAML file only needs to name
//! the values it overrides.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::error::{ConfigError, ConfigResult};
use super::heuristic::{Heuristic, Tool};
use super::validation::{validate_sections, Validatable};

// ═══════════════════════════════════════════════════════════════════════════
// Exploration
// ═══════════════════════════════════════════════════════════════════════════

/// Inputs forwarded to the symbolic path source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExplorationConfig {
    /// Loop/path-exploration bound
    pub bound: u32,
    pub ranges: ValueRanges,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            bound: default_bound(),
            ranges: ValueRanges::default(),
        }
    }
}

fn default_bound() -> u32 {
    5
}

/// Value ranges of symbolic inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValueRanges {
    pub min_int: i64,
    pub max_int: i64,
    pub min_long: i64,
    pub max_long: i64,
    pub min_double: f64,
    pub max_double: f64,
}

impl Default for ValueRanges {
    fn default() -> Self {
        Self {
            min_int: -100,
            max_int: 100,
            min_long: -100,
            max_long: 100,
            min_double: -100.0,
            max_double: 100.0,
        }
    }
}

impl Validatable for ValueRanges {
    fn validate(&self) -> ConfigResult<()> {
        if self.min_int > self.max_int {
            return Err(ConfigError::inverted_bounds("ranges.int", self.min_int, self.max_int));
        }
        if self.min_long > self.max_long {
            return Err(ConfigError::inverted_bounds("ranges.long", self.min_long, self.max_long));
        }
        if !(self.min_double <= self.max_double) {
            return Err(ConfigError::inverted_bounds(
                "ranges.double",
                self.min_double,
                self.max_double,
            ));
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "ValueRanges"
    }
}

impl Validatable for ExplorationConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.bound == 0 || self.bound > 10_000 {
            return Err(ConfigError::out_of_range(
                "exploration.bound",
                self.bound,
                1,
                10_000,
                "The exploration bound must allow at least one loop unrolling",
            ));
        }
        self.ranges.validate()
    }

    fn config_name(&self) -> &'static str {
        "ExplorationConfig"
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Solver
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Per-query timeout in milliseconds
    pub timeout_ms: u64,
    /// Solver executable, invoked as `<binary> -in -smt2`
    pub binary: String,
    /// Partitions checked concurrently
    pub parallelism: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 300_000,
            binary: "z3".to_string(),
            parallelism: num_cpus::get(),
        }
    }
}

impl SolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Validatable for SolverConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.timeout_ms == 0 || self.timeout_ms > 86_400_000 {
            return Err(ConfigError::out_of_range(
                "solver.timeout_ms",
                self.timeout_ms,
                1,
                86_400_000,
                "A zero timeout makes every query UNKNOWN",
            ));
        }
        if self.parallelism == 0 || self.parallelism > 1024 {
            return Err(ConfigError::out_of_range(
                "solver.parallelism",
                self.parallelism,
                1,
                1024,
                "Use 1 to check partitions one at a time",
            ));
        }
        if self.binary.trim().is_empty() {
            return Err(ConfigError::Validation(
                "solver.binary must name an executable".to_string(),
            ));
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "SolverConfig"
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Refinement / Run
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RefinementConfig {
    pub heuristic: Heuristic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub tool: Tool,
    /// Outer watchdog for the whole attempt, in seconds
    pub timeout_secs: u64,
    /// Root directory of query artifacts and results files
    pub artifacts_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tool: Tool::default(),
            timeout_secs: 3600,
            artifacts_dir: PathBuf::from("artifacts"),
        }
    }
}

impl RunConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Validatable for RunConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::out_of_range(
                "run.timeout_secs",
                self.timeout_secs,
                1,
                u64::MAX,
                "The watchdog would fire before the first iteration",
            ));
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "RunConfig"
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Top-level
// ═══════════════════════════════════════════════════════════════════════════

/// Complete configuration of one equivalence-checking attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EquivConfig {
    pub exploration: ExplorationConfig,
    pub solver: SolverConfig,
    pub refinement: RefinementConfig,
    pub run: RunConfig,
}

impl EquivConfig {
    /// Record label of the configured tool (e.g. `CEGAR-H3`)
    pub fn tool_label(&self) -> String {
        self.run.tool.label(self.refinement.heuristic)
    }
}

impl Validatable for EquivConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_sections(&[&self.exploration, &self.solver, &self.run])
    }

    fn config_name(&self) -> &'static str {
        "EquivConfig"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EquivConfig::default();
        assert_eq!(config.exploration.bound, 5);
        assert_eq!(config.exploration.ranges.min_int, -100);
        assert_eq!(config.exploration.ranges.max_double, 100.0);
        assert_eq!(config.refinement.heuristic, Heuristic::H123);
        assert_eq!(config.run.tool, Tool::Cegar);
        assert_eq!(config.run.timeout(), Duration::from_secs(3600));
        assert!(config.solver.parallelism >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_ranges_rejected() {
        let mut config = EquivConfig::default();
        config.exploration.ranges.min_int = 10;
        config.exploration.ranges.max_int = -10;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvertedBounds { .. }));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = EquivConfig::default();
        config.solver.timeout_ms = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::Range { .. }
        ));
    }

    #[test]
    fn test_tool_label_follows_heuristic() {
        let mut config = EquivConfig::default();
        config.refinement.heuristic = Heuristic::H3;
        assert_eq!(config.tool_label(), "CEGAR-H3");
    }
}

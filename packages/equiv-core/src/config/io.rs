//! Configuration I/O (YAML loading)

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, ConfigResult};
use super::settings::{EquivConfig, ExplorationConfig, RefinementConfig, RunConfig, SolverConfig};
use super::validation::Validatable;

pub const SUPPORTED_VERSIONS: [u32; 1] = [1];

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileV1 {
    /// Schema version (always 1 for v1)
    pub version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exploration: Option<ExplorationConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refinement: Option<RefinementConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<RunConfig>,
}

impl EquivConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let file: ConfigFileV1 = serde_yaml::from_str(yaml)?;
        if !SUPPORTED_VERSIONS.contains(&file.version) {
            return Err(ConfigError::UnsupportedVersion {
                found: file.version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let config = Self {
            exploration: file.exploration.unwrap_or_default(),
            solver: file.solver.unwrap_or_default(),
            refinement: file.refinement.unwrap_or_default(),
            run: file.run.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Export as a complete v1 document
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = ConfigFileV1 {
            version: 1,
            exploration: Some(self.exploration.clone()),
            solver: Some(self.solver.clone()),
            refinement: Some(self.refinement.clone()),
            run: Some(self.run.clone()),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Heuristic, Tool};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = EquivConfig::default();
        config.refinement.heuristic = Heuristic::R;
        config.solver.parallelism = 2;

        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("version: 1"));
        assert!(yaml.contains("heuristic: R"));

        let back = EquivConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_yaml_loading_partial_sections() {
        let yaml_content = r#"
version: 1
exploration:
  bound: 8
solver:
  timeout_ms: 1000
run:
  tool: SE
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml_content.as_bytes()).unwrap();

        let config = EquivConfig::from_yaml(temp_file.path()).unwrap();
        assert_eq!(config.exploration.bound, 8);
        assert_eq!(config.exploration.ranges.max_int, 100);
        assert_eq!(config.solver.timeout_ms, 1000);
        assert_eq!(config.solver.binary, "z3");
        assert_eq!(config.run.tool, Tool::Se);
        assert_eq!(config.tool_label(), "SE");
    }

    #[test]
    fn test_yaml_missing_version() {
        assert!(EquivConfig::from_yaml_str("solver:\n  timeout_ms: 5\n").is_err());
    }

    #[test]
    fn test_yaml_unsupported_version() {
        let err = EquivConfig::from_yaml_str("version: 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion { found: 2, .. }));
    }

    #[test]
    fn test_yaml_unknown_field_rejected() {
        let err = EquivConfig::from_yaml_str("version: 1\nsolver:\n  timeout: 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_yaml_invalid_value_rejected() {
        let err = EquivConfig::from_yaml_str("version: 1\nexploration:\n  bound: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Range { .. }));
    }
}

//! Configuration errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Numeric field outside its accepted interval
    #[error("'{field}' = {value} is outside {min}..={max}: {hint}")]
    Range {
        field: String,
        value: String,
        min: String,
        max: String,
        hint: String,
    },

    #[error("'{field}' has min {min} above max {max}")]
    InvertedBounds {
        field: String,
        min: String,
        max: String,
    },

    #[error("configuration version {found} is not supported (expected {})", join(supported))]
    UnsupportedVersion { found: u32, supported: Vec<u32> },

    /// Heuristic or tool name that does not parse
    #[error("unknown {kind} '{name}', expected one of {}", valid.join(", "))]
    UnknownName {
        kind: &'static str,
        name: String,
        valid: Vec<&'static str>,
    },

    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn join(versions: &[u32]) -> String {
    versions
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ConfigError {
    pub fn out_of_range(
        field: impl Into<String>,
        value: impl ToString,
        min: impl ToString,
        max: impl ToString,
        hint: impl Into<String>,
    ) -> Self {
        Self::Range {
            field: field.into(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
            hint: hint.into(),
        }
    }

    pub fn inverted_bounds(field: impl Into<String>, min: impl ToString, max: impl ToString) -> Self {
        Self::InvertedBounds {
            field: field.into(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    pub fn unknown_name(kind: &'static str, name: impl Into<String>, valid: &[&'static str]) -> Self {
        Self::UnknownName {
            kind,
            name: name.into(),
            valid: valid.to_vec(),
        }
    }

    /// Field path for range and bounds errors
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Range { field, .. } | Self::InvertedBounds { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_name_lists_valid_names() {
        let err = ConfigError::unknown_name("heuristic", "h13", &["H123", "H3", "R"]);
        assert_eq!(
            err.to_string(),
            "unknown heuristic 'h13', expected one of H123, H3, R"
        );
        assert_eq!(err.field(), None);
    }

    #[test]
    fn test_range_message() {
        let err = ConfigError::out_of_range(
            "solver.timeout_ms",
            0,
            1,
            86_400_000,
            "a zero timeout makes every query UNKNOWN",
        );
        assert_eq!(err.field(), Some("solver.timeout_ms"));
        assert!(err.to_string().contains("= 0 is outside 1..=86400000"));
    }

    #[test]
    fn test_unsupported_version_message() {
        let err = ConfigError::UnsupportedVersion {
            found: 2,
            supported: vec![1],
        };
        assert_eq!(
            err.to_string(),
            "configuration version 2 is not supported (expected 1)"
        );
    }
}

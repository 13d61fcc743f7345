//! Refinement heuristics and tools
//!
//! A `Tool` names the analysis that produced a run. Only `Cegar` refines;
//! the heuristic then decides which abstracted units are eligible and in
//! which order they are concretized.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ConfigError;

/// Candidate selection strategy of the refinement controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Heuristic {
    /// Occurrence in inconclusive partitions, call-count divergence, then loop/size order
    #[default]
    H123,
    /// Loop-free units first, then fewer call sites
    H3,
    /// Declaration order only
    R,
}

impl Heuristic {
    pub const NAMES: [&'static str; 3] = ["H123", "H3", "R"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::H123 => "H123",
            Self::H3 => "H3",
            Self::R => "R",
        }
    }

    /// Restrict eligibility to units seen in inconclusive partitions
    pub fn uses_occurrence_filter(&self) -> bool {
        matches!(self, Self::H123)
    }

    /// Prefer units whose call counts differ between versions
    pub fn uses_divergence_order(&self) -> bool {
        matches!(self, Self::H123)
    }

    /// Prefer loop-free units, then fewer call sites
    pub fn uses_shape_order(&self) -> bool {
        matches!(self, Self::H123 | Self::H3)
    }
}

impl FromStr for Heuristic {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "H123" => Ok(Self::H123),
            "H3" => Ok(Self::H3),
            "R" => Ok(Self::R),
            _ => Err(ConfigError::unknown_name("heuristic", s, &Self::NAMES)),
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Analysis tool of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Tool {
    /// Plain symbolic execution, one iteration
    #[serde(rename = "SE")]
    Se,
    /// Symbolic execution on both versions with a shared driver, one iteration
    #[serde(rename = "DSE")]
    Dse,
    /// Abstraction with refinement
    #[default]
    #[serde(rename = "CEGAR")]
    Cegar,
}

impl Tool {
    pub const NAMES: [&'static str; 3] = ["SE", "DSE", "CEGAR"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Se => "SE",
            Self::Dse => "DSE",
            Self::Cegar => "CEGAR",
        }
    }

    pub fn can_iterate(&self) -> bool {
        matches!(self, Self::Cegar)
    }

    /// Label stored in every record, e.g. `CEGAR-H3`
    pub fn label(&self, heuristic: Heuristic) -> String {
        match (self, heuristic) {
            (Self::Cegar, Heuristic::H123) => "CEGAR".to_string(),
            (Self::Cegar, h) => format!("CEGAR-{}", h),
            (other, _) => other.as_str().to_string(),
        }
    }
}

impl FromStr for Tool {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SE" => Ok(Self::Se),
            "DSE" => Ok(Self::Dse),
            "CEGAR" => Ok(Self::Cegar),
            _ => Err(ConfigError::unknown_name("tool", s, &Self::NAMES)),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_parse_case_insensitive() {
        assert_eq!("h3".parse::<Heuristic>().unwrap(), Heuristic::H3);
        assert_eq!(" R ".parse::<Heuristic>().unwrap(), Heuristic::R);
        assert!("H4".parse::<Heuristic>().is_err());
    }

    #[test]
    fn test_heuristic_flags() {
        assert!(Heuristic::H123.uses_occurrence_filter());
        assert!(Heuristic::H123.uses_shape_order());
        assert!(!Heuristic::H3.uses_occurrence_filter());
        assert!(Heuristic::H3.uses_shape_order());
        assert!(!Heuristic::R.uses_shape_order());
    }

    #[test]
    fn test_tool_labels() {
        assert_eq!(Tool::Cegar.label(Heuristic::H123), "CEGAR");
        assert_eq!(Tool::Cegar.label(Heuristic::R), "CEGAR-R");
        assert_eq!(Tool::Se.label(Heuristic::H3), "SE");
        assert!(Tool::Cegar.can_iterate());
        assert!(!Tool::Dse.can_iterate());
    }

    #[test]
    fn test_serde_names() {
        let yaml = serde_yaml::to_string(&Tool::Dse).unwrap();
        assert_eq!(yaml.trim(), "DSE");
        let h: Heuristic = serde_yaml::from_str("H3").unwrap();
        assert_eq!(h, Heuristic::H3);
    }
}

//! Abstracted units
//!
//! A unit is a computation (typically a called method) that the path source
//! replaced by an uninterpreted function. Its name is the name of that
//! function in the queries.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractedUnit {
    pub name: String,
    #[serde(default = "default_true")]
    pub in_v1: bool,
    #[serde(default = "default_true")]
    pub in_v2: bool,
    /// Body contains a loop
    #[serde(default)]
    pub has_loop: bool,
    #[serde(default)]
    pub call_sites_v1: u32,
    #[serde(default)]
    pub call_sites_v2: u32,
}

impl AbstractedUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            in_v1: true,
            in_v2: true,
            has_loop: false,
            call_sites_v1: 0,
            call_sites_v2: 0,
        }
    }

    pub fn with_loop(mut self) -> Self {
        self.has_loop = true;
        self
    }

    pub fn with_call_sites(mut self, v1: u32, v2: u32) -> Self {
        self.call_sites_v1 = v1;
        self.call_sites_v2 = v2;
        self
    }

    pub fn only_in_v1(mut self) -> Self {
        self.in_v2 = false;
        self
    }

    /// Present in both versions, so expanding it affects both sides alike
    pub fn is_shared(&self) -> bool {
        self.in_v1 && self.in_v2
    }

    /// Total over both versions; counts come from trace files, so this saturates
    pub fn call_sites(&self) -> u32 {
        self.call_sites_v1.saturating_add(self.call_sites_v2)
    }

    pub fn call_counts_differ(&self) -> bool {
        self.call_sites_v1 != self.call_sites_v2
    }
}

/// Units abstracted in one iteration, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbstractionSummary {
    pub units: Vec<AbstractedUnit>,
}

impl AbstractionSummary {
    pub fn new(units: Vec<AbstractedUnit>) -> Self {
        Self { units }
    }

    pub fn shared(&self) -> impl Iterator<Item = &AbstractedUnit> {
        self.units.iter().filter(|u| u.is_shared())
    }

    pub fn shared_count(&self) -> usize {
        self.shared().count()
    }

    pub fn get(&self, name: &str) -> Option<&AbstractedUnit> {
        self.units.iter().find(|u| u.name == name)
    }
}

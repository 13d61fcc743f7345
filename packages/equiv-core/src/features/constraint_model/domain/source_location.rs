//! Provenance of branch constraints

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Where a constraint was produced in the analyzed program
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file_path: String,
    pub class_name: String,
    pub method_name: String,
    pub line_number: u32,
    /// Branch choice taken at this location, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice: Option<u32>,
}

impl SourceLocation {
    pub fn new(
        file_path: impl Into<String>,
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        line_number: u32,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            class_name: class_name.into(),
            method_name: method_name.into(),
            line_number,
            choice: None,
        }
    }

    pub fn with_choice(mut self, choice: u32) -> Self {
        self.choice = Some(choice);
        self
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} ({}.{})",
            self.file_path, self.line_number, self.class_name, self.method_name
        )?;
        if let Some(choice) = self.choice {
            write!(f, " [choice {}]", choice)?;
        }
        Ok(())
    }
}

/// Optional location attached to an expression node.
///
/// Always compares equal and hashes to nothing so that two structurally
/// identical expressions deduplicate regardless of where they came from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Provenance(pub Option<SourceLocation>);

impl Provenance {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn at(location: SourceLocation) -> Self {
        Self(Some(location))
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.0.as_ref()
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }
}

impl PartialEq for Provenance {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Provenance {}

impl Hash for Provenance {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let loc = SourceLocation::new("Foo.java", "Foo", "bar", 12).with_choice(1);
        assert_eq!(loc.to_string(), "Foo.java:12 (Foo.bar) [choice 1]");
    }

    #[test]
    fn test_provenance_ignored_by_equality() {
        let a = Provenance::at(SourceLocation::new("A.java", "A", "m", 1));
        let b = Provenance::none();
        assert_eq!(a, b);
    }
}

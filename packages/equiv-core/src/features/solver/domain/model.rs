//! Satisfying assignments
//!
//! Models are read from the solver's `(get-model)` output with `smt2parser`.
//! Only constant definitions (`(define-fun x () Int 3)`) become assignments;
//! function interpretations are kept in the raw text.

use std::collections::BTreeMap;

use smt2parser::{concrete, CommandStream};

use crate::errors::{EquivError, Result};

/// Variable assignments of a `sat` answer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    assignments: BTreeMap<String, String>,
    raw: String,
}

impl Model {
    /// Parse a model block such as
    ///
    /// ```text
    /// (
    ///   (define-fun x () Int
    ///     (- 1))
    /// )
    /// ```
    ///
    /// Older solvers open the block with `(model`.
    pub fn parse(text: &str) -> Result<Self> {
        let raw = text.trim();
        let body = raw
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| EquivError::solver("model is not a parenthesized block"))?;
        let body = body.trim_start();
        let body = body.strip_prefix("model").unwrap_or(body);

        let mut assignments = BTreeMap::new();
        let stream = CommandStream::new(body.as_bytes(), concrete::SyntaxBuilder, None);
        for command in stream {
            let command =
                command.map_err(|e| EquivError::solver(format!("unreadable model: {:?}", e)))?;
            if let concrete::Command::DefineFun { sig, term } = command {
                if sig.parameters.is_empty() {
                    assignments.insert(unquote(&sig.name.0).to_string(), term.to_string());
                }
            }
        }

        Ok(Self {
            assignments,
            raw: raw.to_string(),
        })
    }

    /// Model text the parser could not read; kept for the artifacts only
    pub fn unparsed(text: &str) -> Self {
        Self {
            assignments: BTreeMap::new(),
            raw: text.trim().to_string(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.assignments.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.assignments
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// `x = 5, y = (- 1)`
    pub fn summary(&self) -> String {
        self.iter()
            .map(|(name, value)| format!("{} = {}", name, value))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Model text as printed by the solver
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

fn unquote(symbol: &str) -> &str {
    symbol
        .strip_prefix('|')
        .and_then(|s| s.strip_suffix('|'))
        .unwrap_or(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiline_model() {
        let text = "(\n  (define-fun y () Int\n    7)\n  (define-fun x () Int\n    (- 1))\n  (define-fun UF_f ((x!0 Int)) Int\n    0)\n)";
        let model = Model::parse(text).unwrap();
        assert_eq!(model.len(), 2);
        assert_eq!(model.get("x"), Some("(- 1)"));
        assert_eq!(model.get("y"), Some("7"));
        assert_eq!(model.get("UF_f"), None);
        assert!(model.raw().contains("UF_f"));
        assert_eq!(model.summary(), "x = (- 1), y = 7");
    }

    #[test]
    fn test_parse_legacy_model_header() {
        let text = "(model\n  (define-fun n () Int 3)\n)";
        let model = Model::parse(text).unwrap();
        assert_eq!(model.get("n"), Some("3"));
    }

    #[test]
    fn test_unreadable_model_is_an_error() {
        assert!(Model::parse("((define-fun x () Int 1)").is_err());
        assert!(Model::parse("(define-fun x () Int").is_err());
    }

    #[test]
    fn test_unparsed_keeps_text_only() {
        let model = Model::unparsed("  (garbage  ");
        assert!(model.is_empty());
        assert_eq!(model.raw(), "(garbage");
    }
}

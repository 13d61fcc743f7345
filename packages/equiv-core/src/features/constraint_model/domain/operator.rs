//! Binary operators and built-in math functions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::EquivError;

/// Operator kind, used for sort inference and rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Comparison,
    Arithmetic,
    Boolean,
    StringPredicate,
}

/// Binary operator, serialized by its source symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,

    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "**")]
    Pow,
    #[serde(rename = "%")]
    Mod,

    #[serde(rename = "&")]
    And,
    #[serde(rename = "|")]
    Or,
    #[serde(rename = "^")]
    Xor,

    #[serde(rename = "equals")]
    Equals,
    #[serde(rename = "notequals")]
    NotEquals,
    #[serde(rename = "startswith")]
    StartsWith,
    #[serde(rename = "notstartswith")]
    NotStartsWith,
    #[serde(rename = "endswith")]
    EndsWith,
    #[serde(rename = "notendswith")]
    NotEndsWith,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "notcontains")]
    NotContains,
}

impl Operator {
    pub const ALL: [Operator; 23] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Lt,
        Operator::Le,
        Operator::Gt,
        Operator::Ge,
        Operator::Plus,
        Operator::Minus,
        Operator::Mul,
        Operator::Div,
        Operator::Pow,
        Operator::Mod,
        Operator::And,
        Operator::Or,
        Operator::Xor,
        Operator::Equals,
        Operator::NotEquals,
        Operator::StartsWith,
        Operator::NotStartsWith,
        Operator::EndsWith,
        Operator::NotEndsWith,
        Operator::Contains,
        Operator::NotContains,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "**",
            Self::Mod => "%",
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Equals => "equals",
            Self::NotEquals => "notequals",
            Self::StartsWith => "startswith",
            Self::NotStartsWith => "notstartswith",
            Self::EndsWith => "endswith",
            Self::NotEndsWith => "notendswith",
            Self::Contains => "contains",
            Self::NotContains => "notcontains",
        }
    }

    pub fn kind(&self) -> OperatorKind {
        match self {
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge => {
                OperatorKind::Comparison
            }
            Self::Plus | Self::Minus | Self::Mul | Self::Div | Self::Pow | Self::Mod => {
                OperatorKind::Arithmetic
            }
            Self::And | Self::Or | Self::Xor => OperatorKind::Boolean,
            _ => OperatorKind::StringPredicate,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Operator {
    type Err = EquivError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.symbol() == s)
            .ok_or_else(|| EquivError::malformed(format!("Unknown operator '{}'", s)))
    }
}

/// Real-valued math functions with a fixed meaning in queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MathFunction {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Pow,
    Sqrt,
    Exp,
    Log,
}

impl MathFunction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Atan2 => "atan2",
            Self::Pow => "pow",
            Self::Sqrt => "sqrt",
            Self::Exp => "exp",
            Self::Log => "log",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Self::Atan2 | Self::Pow => 2,
            _ => 1,
        }
    }

    /// Declaration emitted ahead of the assertions.
    ///
    /// `None` for solver built-ins: declaring them would shadow the built-in
    /// with an uninterpreted symbol.
    pub fn declaration(&self) -> Option<&'static str> {
        match self {
            Self::Pow => Some("(define-fun pow ((a Real) (b Real)) Real (^ a b))"),
            Self::Sqrt => Some("(define-fun sqrt ((x Real)) Real (^ x 0.5))"),
            Self::Exp => Some("(define-fun exp ((x Real)) Real (^ 2.718281828459045 x))"),
            Self::Log => Some("(declare-fun log (Real) Real)"),
            Self::Sin
            | Self::Cos
            | Self::Tan
            | Self::Asin
            | Self::Acos
            | Self::Atan
            | Self::Atan2 => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_lookup() {
        for op in Operator::ALL {
            assert_eq!(op.symbol().parse::<Operator>().unwrap(), op);
        }
        assert_eq!(" ** ".parse::<Operator>().unwrap(), Operator::Pow);
        assert!("<>".parse::<Operator>().is_err());
    }

    #[test]
    fn test_serde_uses_symbols() {
        assert_eq!(serde_json::to_string(&Operator::Le).unwrap(), "\"<=\"");
        let op: Operator = serde_json::from_str("\"startswith\"").unwrap();
        assert_eq!(op, Operator::StartsWith);
    }

    #[test]
    fn test_builtins_are_not_declared() {
        for f in [
            MathFunction::Sin,
            MathFunction::Cos,
            MathFunction::Tan,
            MathFunction::Asin,
            MathFunction::Acos,
            MathFunction::Atan,
            MathFunction::Atan2,
        ] {
            assert!(f.declaration().is_none(), "{} must stay built-in", f.name());
        }
        assert!(MathFunction::Log
            .declaration()
            .unwrap()
            .starts_with("(declare-fun log"));
        assert!(MathFunction::Pow
            .declaration()
            .unwrap()
            .starts_with("(define-fun pow"));
    }
}

//! Side-effect-free expression trees
//!
//! Path conditions and symbolic results are both `Expression`s. Nodes are
//! immutable once built and compare/hash structurally; source locations are
//! carried as `Provenance` and ignored by both.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::operator::{MathFunction, Operator, OperatorKind};
use super::source_location::{Provenance, SourceLocation};
use crate::errors::{EquivError, Result};

/// Sort (type) of an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    Int,
    Real,
    Bool,
    String,
}

impl Sort {
    pub fn smt_name(&self) -> &'static str {
        match self {
            Self::Int => "Int",
            Self::Real => "Real",
            Self::Bool => "Bool",
            Self::String => "String",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Real)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.smt_name())
    }
}

/// Literal value
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Constant {
    Int(i64),
    Real(f64),
    Bool(bool),
    #[serde(rename = "string")]
    Str(String),
}

impl Constant {
    pub fn sort(&self) -> Sort {
        match self {
            Self::Int(_) => Sort::Int,
            Self::Real(_) => Sort::Real,
            Self::Bool(_) => Sort::Bool,
            Self::Str(_) => Sort::String,
        }
    }
}

// Reals compare by bit pattern so that constants can be hashed.
impl PartialEq for Constant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a.to_bits() == b.to_bits(),
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Constant {}

impl Hash for Constant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Int(v) => v.hash(state),
            Self::Real(v) => v.to_bits().hash(state),
            Self::Bool(v) => v.hash(state),
            Self::Str(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Real(v) => write!(f, "{:?}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Str(v) => write!(f, "{:?}", v),
        }
    }
}

/// Expression tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expression {
    Constant {
        value: Constant,
    },
    Variable {
        name: String,
        sort: Sort,
    },
    Binary {
        op: Operator,
        left: Box<Expression>,
        right: Box<Expression>,
        #[serde(default, skip_serializing_if = "Provenance::is_none")]
        location: Provenance,
    },
    /// Application of an uninterpreted function standing in for an
    /// abstracted computation
    Uif {
        name: String,
        sort: Sort,
        args: Vec<Expression>,
    },
    /// Application of a built-in real function
    Math {
        function: MathFunction,
        args: Vec<Expression>,
    },
}

impl Expression {
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Constructors
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    pub fn int(value: i64) -> Self {
        Self::Constant {
            value: Constant::Int(value),
        }
    }

    pub fn real(value: f64) -> Self {
        Self::Constant {
            value: Constant::Real(value),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self::Constant {
            value: Constant::Bool(value),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::Constant {
            value: Constant::Str(value.into()),
        }
    }

    pub fn var(name: impl Into<String>, sort: Sort) -> Self {
        Self::Variable {
            name: name.into(),
            sort,
        }
    }

    pub fn int_var(name: impl Into<String>) -> Self {
        Self::var(name, Sort::Int)
    }

    pub fn real_var(name: impl Into<String>) -> Self {
        Self::var(name, Sort::Real)
    }

    pub fn binary(op: Operator, left: Expression, right: Expression) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            location: Provenance::none(),
        }
    }

    pub fn binary_at(
        op: Operator,
        left: Expression,
        right: Expression,
        location: SourceLocation,
    ) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            location: Provenance::at(location),
        }
    }

    pub fn uif(name: impl Into<String>, sort: Sort, args: Vec<Expression>) -> Self {
        Self::Uif {
            name: name.into(),
            sort,
            args,
        }
    }

    pub fn math(function: MathFunction, args: Vec<Expression>) -> Self {
        Self::Math { function, args }
    }

    /// `s equals ""`
    pub fn is_empty_string(s: Expression) -> Self {
        Self::binary(Operator::Equals, s, Self::string(""))
    }

    /// Left-nested conjunction; the empty conjunction is `true`.
    pub fn conjunction(constraints: impl IntoIterator<Item = Expression>) -> Self {
        constraints
            .into_iter()
            .reduce(|acc, c| Self::binary(Operator::And, acc, c))
            .unwrap_or_else(|| Self::boolean(true))
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Queries
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Pre-order walk over all nodes
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expression)) {
        visit(self);
        match self {
            Self::Constant { .. } | Self::Variable { .. } => {}
            Self::Binary { left, right, .. } => {
                left.walk(visit);
                right.walk(visit);
            }
            Self::Uif { args, .. } | Self::Math { args, .. } => {
                for arg in args {
                    arg.walk(visit);
                }
            }
        }
    }

    pub fn contains_uif(&self) -> bool {
        let mut found = false;
        self.walk(&mut |e| {
            if matches!(e, Expression::Uif { .. }) {
                found = true;
            }
        });
        found
    }

    /// Names of all uninterpreted functions applied in this tree
    pub fn uif_names(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.walk(&mut |e| {
            if let Expression::Uif { name, .. } = e {
                names.insert(name.as_str());
            }
        });
        names
    }

    /// Top-level conjuncts; a literal `true` contributes none.
    pub fn conjuncts(&self) -> Vec<&Expression> {
        match self {
            Self::Binary {
                op: Operator::And,
                left,
                right,
                ..
            } if left.is_boolean() && right.is_boolean() => {
                let mut out = left.conjuncts();
                out.extend(right.conjuncts());
                out
            }
            Self::Constant {
                value: Constant::Bool(true),
            } => Vec::new(),
            other => vec![other],
        }
    }

    pub fn constraint_count(&self) -> u32 {
        self.conjuncts().len() as u32
    }

    fn is_boolean(&self) -> bool {
        matches!(self.sort(), Ok(Sort::Bool))
    }

    /// Infer the sort, rejecting ill-typed trees
    pub fn sort(&self) -> Result<Sort> {
        match self {
            Self::Constant { value } => Ok(value.sort()),
            Self::Variable { sort, .. } | Self::Uif { sort, .. } => Ok(*sort),
            Self::Math { function, args } => {
                if args.len() != function.arity() {
                    return Err(EquivError::malformed(format!(
                        "{} expects {} argument(s), got {}",
                        function.name(),
                        function.arity(),
                        args.len()
                    )));
                }
                for arg in args {
                    if !arg.sort()?.is_numeric() {
                        return Err(EquivError::malformed(format!(
                            "{} applied to a non-numeric argument",
                            function.name()
                        )));
                    }
                }
                Ok(Sort::Real)
            }
            Self::Binary {
                op, left, right, ..
            } => {
                let (l, r) = (left.sort()?, right.sort()?);
                match op.kind() {
                    OperatorKind::Comparison => {
                        let comparable = (l.is_numeric() && r.is_numeric())
                            || (l == r && matches!(op, Operator::Eq | Operator::Ne));
                        if !comparable {
                            return Err(ill_typed(*op, l, r));
                        }
                        Ok(Sort::Bool)
                    }
                    OperatorKind::Arithmetic => {
                        if !(l.is_numeric() && r.is_numeric()) {
                            return Err(ill_typed(*op, l, r));
                        }
                        if *op == Operator::Pow || l == Sort::Real || r == Sort::Real {
                            Ok(Sort::Real)
                        } else {
                            Ok(Sort::Int)
                        }
                    }
                    OperatorKind::Boolean => match (l, r) {
                        (Sort::Bool, Sort::Bool) => Ok(Sort::Bool),
                        (Sort::Int, Sort::Int) => Ok(Sort::Int),
                        _ => Err(ill_typed(*op, l, r)),
                    },
                    OperatorKind::StringPredicate => {
                        if l != Sort::String || r != Sort::String {
                            return Err(ill_typed(*op, l, r));
                        }
                        Ok(Sort::Bool)
                    }
                }
            }
        }
    }
}

fn ill_typed(op: Operator, left: Sort, right: Sort) -> EquivError {
    EquivError::malformed(format!(
        "operator '{}' cannot combine {} and {}",
        op, left, right
    ))
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant { value } => write!(f, "{}", value),
            Self::Variable { name, .. } => write!(f, "{}", name),
            Self::Binary {
                op, left, right, ..
            } => write!(f, "({} {} {})", left, op, right),
            Self::Uif { name, args, .. } => write_call(f, name, args),
            Self::Math { function, args } => write_call(f, function.name(), args),
        }
    }
}

fn write_call(f: &mut fmt::Formatter<'_>, name: &str, args: &[Expression]) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg)?;
    }
    write!(f, ")")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn x() -> Expression {
        Expression::int_var("x")
    }

    #[test]
    fn test_structural_equality_ignores_location() {
        let plain = Expression::binary(Operator::Gt, x(), Expression::int(0));
        let located = Expression::binary_at(
            Operator::Gt,
            x(),
            Expression::int(0),
            SourceLocation::new("A.java", "A", "m", 3),
        );
        assert_eq!(plain, located);

        let set: HashSet<_> = [plain, located].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_conjunction_and_constraint_count() {
        assert_eq!(Expression::conjunction(vec![]), Expression::boolean(true));
        assert_eq!(Expression::boolean(true).constraint_count(), 0);

        let pc = Expression::conjunction(vec![
            Expression::binary(Operator::Gt, x(), Expression::int(0)),
            Expression::binary(Operator::Lt, x(), Expression::int(10)),
            Expression::binary(Operator::Ne, x(), Expression::int(5)),
        ]);
        assert_eq!(pc.constraint_count(), 3);
        assert_eq!(pc.sort().unwrap(), Sort::Bool);
    }

    #[test]
    fn test_uif_detection() {
        let f = Expression::uif("UF_f", Sort::Int, vec![x()]);
        let pc = Expression::binary(Operator::Gt, f.clone(), Expression::int(0));
        assert!(pc.contains_uif());
        assert!(!x().contains_uif());
        assert_eq!(pc.uif_names().into_iter().collect::<Vec<_>>(), vec!["UF_f"]);

        let log = Expression::math(MathFunction::Log, vec![Expression::real_var("y")]);
        assert!(!log.contains_uif());
    }

    #[test]
    fn test_sort_inference() {
        let mixed = Expression::binary(Operator::Plus, x(), Expression::real(1.5));
        assert_eq!(mixed.sort().unwrap(), Sort::Real);

        let modulo = Expression::binary(Operator::Mod, x(), Expression::int(2));
        assert_eq!(modulo.sort().unwrap(), Sort::Int);

        let bad = Expression::binary(Operator::Plus, x(), Expression::string("a"));
        assert!(matches!(bad.sort(), Err(EquivError::MalformedQuery(_))));

        let arity = Expression::math(MathFunction::Pow, vec![x()]);
        assert!(arity.sort().is_err());
    }

    #[test]
    fn test_display() {
        let e = Expression::binary(
            Operator::Ge,
            Expression::uif("UF_g", Sort::Int, vec![x(), Expression::int(2)]),
            Expression::int(0),
        );
        assert_eq!(e.to_string(), "(UF_g(x, 2) >= 0)");
    }

    #[test]
    fn test_json_shape() {
        let e = Expression::binary(Operator::Gt, x(), Expression::int(0));
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["kind"], "binary");
        assert_eq!(json["op"], ">");
        assert_eq!(json["left"]["name"], "x");
        assert_eq!(json["right"]["value"]["type"], "int");

        let back: Expression = serde_json::from_value(json).unwrap();
        assert_eq!(back, e);
    }
}

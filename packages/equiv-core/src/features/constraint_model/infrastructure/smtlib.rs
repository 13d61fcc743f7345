//! SMT-LIB v2 rendering
//!
//! Turns expressions into solver scripts. Every query is self-contained:
//! options, logic, declarations (sorted by symbol), assertions, then
//! `(check-sat)` and `(get-model)`.
//!
//! Rendering rules worth knowing:
//! - negative numerals are written `(- n)`; reals always carry a decimal point
//! - mixed Int/Real operands are lifted with `to_real`
//! - `/` on two Ints is `div`, `%` is `mod` (Int only)
//! - `&`, `|`, `^` are only defined on Bool
//! - one name with two different signatures is a malformed query

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{EquivError, Result};
use crate::features::constraint_model::domain::{
    Constant, Expression, MathFunction, Operator, OperatorKind, Sort,
};

static SIMPLE_SYMBOL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z~!@$%^&*_+=<>.?/\-][A-Za-z0-9~!@$%^&*_+=<>.?/\-]*$")
        .expect("valid symbol regex")
});

const RESERVED: &[&str] = &[
    "and", "or", "not", "xor", "ite", "div", "mod", "abs", "true", "false", "let", "forall",
    "exists", "par", "as", "to_real", "to_int",
];

/// Quote a symbol with `|..|` unless it is a plain SMT-LIB simple symbol
pub fn symbol(name: &str) -> Result<String> {
    if SIMPLE_SYMBOL.is_match(name) && !RESERVED.contains(&name) {
        return Ok(name.to_string());
    }
    if name.is_empty() || name.contains('|') || name.contains('\\') {
        return Err(EquivError::malformed(format!(
            "'{}' cannot be used as a symbol",
            name
        )));
    }
    Ok(format!("|{}|", name))
}

/// Signature of a declared symbol
#[derive(Debug, Clone, PartialEq, Eq)]
struct Signature {
    params: Vec<Sort>,
    result: Sort,
}

/// Declarations needed by a set of assertions
#[derive(Debug, Default)]
pub struct Declarations {
    symbols: FxHashMap<String, Signature>,
    functions: BTreeSet<MathFunction>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every variable, UIF and math function used by `expr`
    pub fn collect(&mut self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::Constant { .. } => Ok(()),
            Expression::Variable { name, sort } => self.declare(name, Vec::new(), *sort),
            Expression::Binary { op, left, right, .. } => {
                // `**` renders through the `pow` definition
                if *op == Operator::Pow {
                    self.functions.insert(MathFunction::Pow);
                }
                self.collect(left)?;
                self.collect(right)
            }
            Expression::Uif { name, sort, args } => {
                let params = args.iter().map(Expression::sort).collect::<Result<Vec<_>>>()?;
                self.declare(name, params, *sort)?;
                args.iter().try_for_each(|a| self.collect(a))
            }
            Expression::Math { function, args } => {
                self.functions.insert(*function);
                args.iter().try_for_each(|a| self.collect(a))
            }
        }
    }

    fn declare(&mut self, name: &str, params: Vec<Sort>, result: Sort) -> Result<()> {
        let signature = Signature { params, result };
        match self.symbols.get(name) {
            Some(existing) if *existing != signature => Err(EquivError::malformed(format!(
                "'{}' is used with conflicting sorts",
                name
            ))),
            Some(_) => Ok(()),
            None => {
                self.symbols.insert(name.to_string(), signature);
                Ok(())
            }
        }
    }

    /// Declaration commands, math definitions first, symbols sorted by name
    pub fn render(&self) -> Result<Vec<String>> {
        let mut lines: Vec<String> = self
            .functions
            .iter()
            .filter_map(|f| f.declaration().map(str::to_string))
            .collect();

        let sorted: BTreeMap<_, _> = self.symbols.iter().collect();
        for (name, sig) in sorted {
            let params = sig
                .params
                .iter()
                .map(Sort::smt_name)
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(format!(
                "(declare-fun {} ({}) {})",
                symbol(name)?,
                params,
                sig.result.smt_name()
            ));
        }
        Ok(lines)
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && self.functions.is_empty()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Terms
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Render a single term
pub fn render(expr: &Expression) -> Result<String> {
    render_sorted(expr).map(|(text, _)| text)
}

fn render_sorted(expr: &Expression) -> Result<(String, Sort)> {
    match expr {
        Expression::Constant { value } => Ok((render_constant(value)?, value.sort())),
        Expression::Variable { name, sort } => Ok((symbol(name)?, *sort)),
        Expression::Uif { name, sort, args } => {
            if args.is_empty() {
                return Ok((symbol(name)?, *sort));
            }
            let rendered = args
                .iter()
                .map(|a| render_sorted(a).map(|(t, _)| t))
                .collect::<Result<Vec<_>>>()?;
            Ok((format!("({} {})", symbol(name)?, rendered.join(" ")), *sort))
        }
        Expression::Math { function, args } => {
            expr.sort()?;
            let rendered = args
                .iter()
                .map(|a| render_sorted(a).map(|(t, s)| lift(t, s, Sort::Real)))
                .collect::<Result<Vec<_>>>()?;
            Ok((format!("({} {})", function.name(), rendered.join(" ")), Sort::Real))
        }
        Expression::Binary {
            op, left, right, ..
        } => render_binary(*op, left, right),
    }
}

fn render_binary(op: Operator, left: &Expression, right: &Expression) -> Result<(String, Sort)> {
    let (l, ls) = render_sorted(left)?;
    let (r, rs) = render_sorted(right)?;
    let ill_typed = || {
        EquivError::malformed(format!("operator '{}' cannot combine {} and {}", op, ls, rs))
    };

    match op.kind() {
        OperatorKind::Comparison => {
            let (l, r) = if ls.is_numeric() && rs.is_numeric() {
                let target = widen(ls, rs);
                (lift(l, ls, target), lift(r, rs, target))
            } else if ls == rs && matches!(op, Operator::Eq | Operator::Ne) {
                (l, r)
            } else {
                return Err(ill_typed());
            };
            let text = match op {
                Operator::Eq => format!("(= {} {})", l, r),
                Operator::Ne => format!("(not (= {} {}))", l, r),
                Operator::Lt => format!("(< {} {})", l, r),
                Operator::Le => format!("(<= {} {})", l, r),
                Operator::Gt => format!("(> {} {})", l, r),
                _ => format!("(>= {} {})", l, r),
            };
            Ok((text, Sort::Bool))
        }
        OperatorKind::Arithmetic => {
            if !(ls.is_numeric() && rs.is_numeric()) {
                return Err(ill_typed());
            }
            if op == Operator::Pow {
                let text = format!(
                    "(pow {} {})",
                    lift(l, ls, Sort::Real),
                    lift(r, rs, Sort::Real)
                );
                return Ok((text, Sort::Real));
            }
            let target = widen(ls, rs);
            let (l, r) = (lift(l, ls, target), lift(r, rs, target));
            let head = match (op, target) {
                (Operator::Plus, _) => "+",
                (Operator::Minus, _) => "-",
                (Operator::Mul, _) => "*",
                (Operator::Div, Sort::Int) => "div",
                (Operator::Div, _) => "/",
                (Operator::Mod, Sort::Int) => "mod",
                _ => return Err(ill_typed()),
            };
            Ok((format!("({} {} {})", head, l, r), target))
        }
        OperatorKind::Boolean => {
            if ls != Sort::Bool || rs != Sort::Bool {
                return Err(EquivError::malformed(format!(
                    "bitwise '{}' on {} and {} is not supported",
                    op, ls, rs
                )));
            }
            let head = match op {
                Operator::And => "and",
                Operator::Or => "or",
                _ => "xor",
            };
            Ok((format!("({} {} {})", head, l, r), Sort::Bool))
        }
        OperatorKind::StringPredicate => {
            if ls != Sort::String || rs != Sort::String {
                return Err(ill_typed());
            }
            let text = match op {
                Operator::Equals => format!("(= {} {})", l, r),
                Operator::NotEquals => format!("(not (= {} {}))", l, r),
                Operator::StartsWith => format!("(str.prefixof {} {})", r, l),
                Operator::NotStartsWith => format!("(not (str.prefixof {} {}))", r, l),
                Operator::EndsWith => format!("(str.suffixof {} {})", r, l),
                Operator::NotEndsWith => format!("(not (str.suffixof {} {}))", r, l),
                Operator::Contains => format!("(str.contains {} {})", l, r),
                _ => format!("(not (str.contains {} {}))", l, r),
            };
            Ok((text, Sort::Bool))
        }
    }
}

fn widen(a: Sort, b: Sort) -> Sort {
    if a == Sort::Real || b == Sort::Real {
        Sort::Real
    } else {
        Sort::Int
    }
}

fn lift(text: String, from: Sort, to: Sort) -> String {
    if from == Sort::Int && to == Sort::Real {
        format!("(to_real {})", text)
    } else {
        text
    }
}

fn render_constant(value: &Constant) -> Result<String> {
    match value {
        Constant::Int(v) if *v < 0 => Ok(format!("(- {})", v.unsigned_abs())),
        Constant::Int(v) => Ok(v.to_string()),
        Constant::Real(v) => {
            if !v.is_finite() {
                return Err(EquivError::malformed(format!(
                    "real constant {} has no SMT-LIB form",
                    v
                )));
            }
            let magnitude = decimal(v.abs());
            if v.is_sign_negative() && *v != 0.0 {
                Ok(format!("(- {})", magnitude))
            } else {
                Ok(magnitude)
            }
        }
        Constant::Bool(v) => Ok(v.to_string()),
        Constant::Str(s) => Ok(string_literal(s)),
    }
}

fn decimal(v: f64) -> String {
    let text = v.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\"\""),
            ' '..='~' => out.push(c),
            other => out.push_str(&format!("\\u{{{:x}}}", other as u32)),
        }
    }
    out.push('"');
    out
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scripts
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Build a complete script asserting every expression.
///
/// Each assertion must be Bool-sorted.
pub fn build_script(assertions: &[Expression], timeout_ms: u64) -> Result<String> {
    let mut declarations = Declarations::new();
    let mut asserts = Vec::with_capacity(assertions.len());
    for assertion in assertions {
        declarations.collect(assertion)?;
        let (text, sort) = render_sorted(assertion)?;
        if sort != Sort::Bool {
            return Err(EquivError::malformed(format!(
                "assertion '{}' has sort {}",
                assertion, sort
            )));
        }
        asserts.push(text);
    }

    let mut script = String::new();
    script.push_str("(set-option :produce-models true)\n");
    script.push_str(&format!("(set-option :timeout {})\n", timeout_ms));
    script.push_str("(set-logic ALL)\n");
    for line in declarations.render()? {
        script.push_str(&line);
        script.push('\n');
    }
    for text in asserts {
        script.push_str(&format!("(assert {})\n", text));
    }
    script.push_str("(check-sat)\n");
    script.push_str("(get-model)\n");
    script.push_str("(exit)\n");
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn x() -> Expression {
        Expression::int_var("x")
    }

    // ═══════════════════════════════════════════════════════════════════
    // Constants and symbols
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn test_negative_numerals() {
        assert_eq!(render(&Expression::int(-5)).unwrap(), "(- 5)");
        assert_eq!(render(&Expression::int(i64::MIN)).unwrap(), "(- 9223372036854775808)");
        assert_eq!(render(&Expression::real(-0.5)).unwrap(), "(- 0.5)");
        assert_eq!(render(&Expression::real(3.0)).unwrap(), "3.0");
    }

    #[test]
    fn test_non_finite_real_is_malformed() {
        let err = render(&Expression::real(f64::NAN)).unwrap_err();
        assert!(matches!(err, EquivError::MalformedQuery(_)));
        assert!(render(&Expression::real(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_symbol_quoting() {
        assert_eq!(symbol("x_1").unwrap(), "x_1");
        assert_eq!(symbol("a[0]").unwrap(), "|a[0]|");
        assert_eq!(symbol("div").unwrap(), "|div|");
        assert!(symbol("a|b").is_err());
    }

    #[test]
    fn test_string_literal_escaping() {
        assert_eq!(render(&Expression::string("say \"hi\"")).unwrap(), "\"say \"\"hi\"\"\"");
    }

    // ═══════════════════════════════════════════════════════════════════
    // Operators
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn test_mixed_sorts_are_lifted() {
        let e = Expression::binary(Operator::Lt, x(), Expression::real(1.5));
        assert_eq!(render(&e).unwrap(), "(< (to_real x) 1.5)");
    }

    #[test]
    fn test_division_and_modulo() {
        let int_div = Expression::binary(Operator::Div, x(), Expression::int(2));
        assert_eq!(render(&int_div).unwrap(), "(div x 2)");

        let real_div = Expression::binary(Operator::Div, Expression::real_var("y"), Expression::int(2));
        assert_eq!(render(&real_div).unwrap(), "(/ y (to_real 2))");

        let modulo = Expression::binary(Operator::Mod, x(), Expression::int(3));
        assert_eq!(render(&modulo).unwrap(), "(mod x 3)");

        let real_mod = Expression::binary(Operator::Mod, Expression::real_var("y"), Expression::int(3));
        assert!(render(&real_mod).is_err());
    }

    #[test]
    fn test_bitwise_on_ints_is_malformed() {
        let e = Expression::binary(Operator::And, x(), Expression::int(1));
        assert!(matches!(render(&e), Err(EquivError::MalformedQuery(_))));
    }

    #[test]
    fn test_string_predicates() {
        let s = Expression::var("s", Sort::String);
        let starts = Expression::binary(Operator::StartsWith, s.clone(), Expression::string("ab"));
        assert_eq!(render(&starts).unwrap(), "(str.prefixof \"ab\" s)");

        let not_contains = Expression::binary(Operator::NotContains, s.clone(), Expression::string("z"));
        assert_eq!(render(&not_contains).unwrap(), "(not (str.contains s \"z\"))");

        assert_eq!(render(&Expression::is_empty_string(s)).unwrap(), "(= s \"\")");
    }

    // ═══════════════════════════════════════════════════════════════════
    // Scripts
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn test_build_script_layout() {
        let pc = Expression::conjunction(vec![
            Expression::binary(Operator::Gt, Expression::int_var("y"), Expression::int(0)),
            Expression::binary(
                Operator::Eq,
                Expression::uif("UF_f", Sort::Int, vec![x()]),
                Expression::binary(Operator::Pow, x(), Expression::int(2)),
            ),
        ]);
        let script = build_script(&[pc], 1000).unwrap();
        let expected = "\
(set-option :produce-models true)
(set-option :timeout 1000)
(set-logic ALL)
(define-fun pow ((a Real) (b Real)) Real (^ a b))
(declare-fun UF_f (Int) Int)
(declare-fun x () Int)
(declare-fun y () Int)
(assert (and (> y 0) (= (to_real (UF_f x)) (pow (to_real x) (to_real 2)))))
(check-sat)
(get-model)
(exit)
";
        assert_eq!(script, expected);
    }

    #[test]
    fn test_power_operator_defines_pow() {
        let squared = Expression::binary(Operator::Pow, x(), Expression::int(2));
        let e = Expression::binary(Operator::Gt, squared, Expression::int(0));
        let script = build_script(&[e], 50).unwrap();

        assert!(script.contains("(define-fun pow ((a Real) (b Real)) Real (^ a b))"));
        assert!(script.contains("(assert (> (pow (to_real x) (to_real 2)) (to_real 0)))"));
        assert_eq!(script.matches("define-fun pow").count(), 1);
    }

    #[test]
    fn test_conflicting_sorts_are_malformed() {
        let e = Expression::binary(Operator::Lt, Expression::int_var("v"), Expression::real_var("v"));
        assert!(matches!(build_script(&[e], 10), Err(EquivError::MalformedQuery(_))));
    }

    #[test]
    fn test_non_boolean_assertion_rejected() {
        assert!(build_script(&[x()], 10).is_err());
    }
}

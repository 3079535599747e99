//! A small arithmetic expression evaluator over a closed grammar.
//!
//! Backs two surfaces: the legacy flat-formula simulation path (variables
//! bound per assumption name) and `custom` function nodes (single free
//! variable `x`). The grammar is numbers, `+ - * / ^ ( )`, unary minus, a
//! fixed whitelist of functions, and the constants `pi` and `e`.
//!
//! Failure is always data at the public boundary: [`evaluate_formula`]
//! returns a NaN sentinel instead of an error, so callers filter rather
//! than handle.

mod parser;

use std::collections::HashMap;

use thiserror::Error;

use parser::Parser;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("Unexpected character '{0}' in formula")]
    UnexpectedChar(char),
    #[error("Malformed number literal '{0}'")]
    BadNumber(String),
    #[error("Unexpected token {0}")]
    UnexpectedToken(String),
    #[error("Formula ended unexpectedly")]
    UnexpectedEnd,
    #[error("Trailing input after expression: {0}")]
    TrailingInput(String),
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),
    #[error("Unbound variable '{0}'")]
    UnboundVariable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    /// `^` in the surface syntax.
    Power,
}

/// The whitelisted named functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Sqrt,
    Log,
    Exp,
    Sin,
    Cos,
    Tan,
    Abs,
}

impl Builtin {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "sqrt" => Some(Builtin::Sqrt),
            "log" => Some(Builtin::Log),
            "exp" => Some(Builtin::Exp),
            "sin" => Some(Builtin::Sin),
            "cos" => Some(Builtin::Cos),
            "tan" => Some(Builtin::Tan),
            "abs" => Some(Builtin::Abs),
            _ => None,
        }
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            Builtin::Sqrt => x.sqrt(),
            Builtin::Log => x.ln(),
            Builtin::Exp => x.exp(),
            Builtin::Sin => x.sin(),
            Builtin::Cos => x.cos(),
            Builtin::Tan => x.tan(),
            Builtin::Abs => x.abs(),
        }
    }
}

/// A parsed formula.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(String),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call(Builtin, Box<Expr>),
}

impl Expr {
    /// Parses a formula string.
    pub fn parse(input: &str) -> Result<Self, ExprError> {
        Parser::parse(input)
    }

    fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    /// Evaluates against the given variable bindings.
    ///
    /// Division by zero evaluates to 0, matching the graph operator path,
    /// so the two evaluation surfaces agree on the one policy.
    pub fn eval(&self, bindings: &HashMap<String, f64>) -> Result<f64, ExprError> {
        match self {
            Expr::Number(n) => Ok(*n),
            Expr::Variable(name) => bindings
                .get(name)
                .copied()
                .ok_or_else(|| ExprError::UnboundVariable(name.clone())),
            Expr::Negate(inner) => Ok(-inner.eval(bindings)?),
            Expr::Binary { op, lhs, rhs } => {
                let l = lhs.eval(bindings)?;
                let r = rhs.eval(bindings)?;
                Ok(match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Subtract => l - r,
                    BinaryOp::Multiply => l * r,
                    BinaryOp::Divide => {
                        if r == 0.0 {
                            0.0
                        } else {
                            l / r
                        }
                    }
                    BinaryOp::Power => l.powf(r),
                })
            }
            Expr::Call(builtin, arg) => Ok(builtin.apply(arg.eval(bindings)?)),
        }
    }
}

/// Evaluates `formula` against `bindings`.
///
/// Any parse or evaluation failure yields the NaN sentinel; callers must
/// check `is_finite` before using the result. Domain violations inside the
/// math itself (log of zero and the like) also surface as NaN/infinity and
/// are filtered at sample-collection time.
pub fn evaluate_formula(formula: &str, bindings: &HashMap<String, f64>) -> f64 {
    match Expr::parse(formula) {
        Ok(expr) => expr.eval(bindings).unwrap_or(f64::NAN),
        Err(_) => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn eval(formula: &str) -> f64 {
        evaluate_formula(formula, &HashMap::new())
    }

    #[rstest]
    #[case("1 + 2 * 3", 7.0)]
    #[case("(1 + 2) * 3", 9.0)]
    #[case("10 - 4 - 3", 3.0)] // left-associative
    #[case("2 ^ 3 ^ 2", 512.0)] // right-associative
    #[case("2 ^ -1", 0.5)]
    #[case("-3 ^ 2", -9.0)] // negation binds looser than power
    #[case("1.5e2 + 1", 151.0)]
    #[case("sqrt(16)", 4.0)]
    #[case("abs(-5)", 5.0)]
    #[case("exp(0)", 1.0)]
    #[case("log(e)", 1.0)]
    #[case("cos(0)", 1.0)]
    fn test_evaluation_table(#[case] formula: &str, #[case] expected: f64) {
        assert!((eval(formula) - expected).abs() < 1e-9, "{formula}");
    }

    #[test]
    fn test_pi_constant_folds() {
        assert!((eval("sin(pi)")).abs() < 1e-12);
        assert!((eval("pi * 2") - std::f64::consts::TAU).abs() < 1e-12);
    }

    #[test]
    fn test_division_by_zero_is_zero() {
        // Same policy as the graph operator path.
        assert_eq!(eval("1 / 0"), 0.0);
        assert_eq!(eval("5 / (2 - 2)"), 0.0);
    }

    #[test]
    fn test_variables_resolve_from_bindings() {
        let mut bindings = HashMap::new();
        bindings.insert("people".to_string(), 3.0e6);
        bindings.insert("per_person".to_string(), 0.02);
        let v = evaluate_formula("people * per_person", &bindings);
        assert!((v - 60_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_failures_are_nan_not_panics() {
        assert!(eval("1 +").is_nan()); // truncated
        assert!(eval("foo(3)").is_nan()); // unknown function
        assert!(eval("x + 1").is_nan()); // unbound variable
        assert!(eval("1 $ 2").is_nan()); // stray character
        assert!(eval("(1 + 2").is_nan()); // unbalanced paren
        assert!(eval("1 2").is_nan()); // trailing input
    }

    #[test]
    fn test_longest_name_wins_without_substitution() {
        // Regression against prefix capture: a variable named "x" must not
        // leak into "x2" when both are bound.
        let mut bindings = HashMap::new();
        bindings.insert("x".to_string(), 1.0);
        bindings.insert("x2".to_string(), 10.0);
        assert_eq!(evaluate_formula("x2 + x", &bindings), 11.0);
    }

    #[test]
    fn test_domain_violation_flows_through_as_nan() {
        assert!(eval("sqrt(0 - 4)").is_nan());
    }
}

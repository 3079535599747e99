//! Pure scalar transforms and comparison predicates used by function and
//! conditional nodes.
//!
//! These are total except for domain errors: sqrt of a negative, log of
//! zero and friends are allowed to produce NaN or infinity, which the
//! sample collector filters out. Nothing here raises.

use std::collections::HashMap;

use crate::expr::evaluate_formula;
use crate::graph::{Comparison, FunctionKind, Parameter};

/// Default exponent for `pow` when no numeric parameter is set.
const DEFAULT_EXPONENT: f64 = 2.0;

/// Applies a scalar function to its resolved inputs.
///
/// `secondary` is only meaningful for `min`/`max`; when it is unwired both
/// degenerate to the identity. `parameter` supplies the exponent for `pow`
/// and the expression body for `custom`.
pub fn apply(
    function: FunctionKind,
    primary: f64,
    secondary: Option<f64>,
    parameter: Option<&Parameter>,
) -> f64 {
    match function {
        FunctionKind::Sqrt => primary.sqrt(),
        FunctionKind::Square => primary * primary,
        FunctionKind::Pow => {
            let exponent = parameter
                .and_then(Parameter::as_number)
                .unwrap_or(DEFAULT_EXPONENT);
            primary.powf(exponent)
        }
        FunctionKind::Exp => primary.exp(),
        FunctionKind::Ln => primary.ln(),
        FunctionKind::Log10 => primary.log10(),
        FunctionKind::Log2 => primary.log2(),
        FunctionKind::Abs => primary.abs(),
        FunctionKind::Ceil => primary.ceil(),
        FunctionKind::Floor => primary.floor(),
        FunctionKind::Round => primary.round(),
        FunctionKind::Sin => primary.sin(),
        FunctionKind::Cos => primary.cos(),
        FunctionKind::Tan => primary.tan(),
        FunctionKind::Min => primary.min(secondary.unwrap_or(primary)),
        FunctionKind::Max => primary.max(secondary.unwrap_or(primary)),
        FunctionKind::Custom => apply_custom(primary, parameter),
    }
}

/// Evaluates a `custom` node's expression with `x` bound to the input.
/// A missing or non-text parameter, or any evaluation failure, is the NaN
/// sentinel; the collector drops that sample.
fn apply_custom(input: f64, parameter: Option<&Parameter>) -> f64 {
    let Some(body) = parameter.and_then(Parameter::as_text) else {
        return f64::NAN;
    };
    let mut bindings = HashMap::with_capacity(1);
    bindings.insert("x".to_string(), input);
    evaluate_formula(body, &bindings)
}

/// Applies a conditional node's predicate. Exact floating-point
/// comparison, no tolerance.
pub fn compare(comparison: Comparison, a: f64, b: f64) -> bool {
    match comparison {
        Comparison::Gt => a > b,
        Comparison::Gte => a >= b,
        Comparison::Lt => a < b,
        Comparison::Lte => a <= b,
        Comparison::Eq => a == b,
        Comparison::Neq => a != b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(FunctionKind::Sqrt, 9.0, 3.0)]
    #[case(FunctionKind::Square, 3.0, 9.0)]
    #[case(FunctionKind::Exp, 0.0, 1.0)]
    #[case(FunctionKind::Ln, 1.0, 0.0)]
    #[case(FunctionKind::Log10, 1000.0, 3.0)]
    #[case(FunctionKind::Log2, 8.0, 3.0)]
    #[case(FunctionKind::Abs, -4.5, 4.5)]
    #[case(FunctionKind::Ceil, 2.1, 3.0)]
    #[case(FunctionKind::Floor, 2.9, 2.0)]
    #[case(FunctionKind::Round, 2.5, 3.0)]
    #[case(FunctionKind::Sin, 0.0, 0.0)]
    #[case(FunctionKind::Cos, 0.0, 1.0)]
    #[case(FunctionKind::Tan, 0.0, 0.0)]
    fn test_unary_table(#[case] function: FunctionKind, #[case] x: f64, #[case] expected: f64) {
        let v = apply(function, x, None, None);
        assert!((v - expected).abs() < 1e-9, "{function:?}({x}) = {v}");
    }

    #[test]
    fn test_pow_uses_parameter_and_defaults_to_square() {
        assert_eq!(apply(FunctionKind::Pow, 2.0, None, Some(&Parameter::Number(10.0))), 1024.0);
        assert_eq!(apply(FunctionKind::Pow, 3.0, None, None), 9.0);
    }

    #[test]
    fn test_min_max_degenerate_to_identity_when_unwired() {
        assert_eq!(apply(FunctionKind::Min, 4.0, Some(7.0), None), 4.0);
        assert_eq!(apply(FunctionKind::Max, 4.0, Some(7.0), None), 7.0);
        assert_eq!(apply(FunctionKind::Min, 4.0, None, None), 4.0);
        assert_eq!(apply(FunctionKind::Max, 4.0, None, None), 4.0);
    }

    #[test]
    fn test_custom_expression() {
        let double_plus_one = Parameter::Text("x * 2 + 1".to_string());
        assert_eq!(apply(FunctionKind::Custom, 5.0, None, Some(&double_plus_one)), 11.0);

        let root = Parameter::Text("sqrt(x)".to_string());
        assert_eq!(apply(FunctionKind::Custom, 9.0, None, Some(&root)), 3.0);
    }

    #[test]
    fn test_custom_failures_are_nan() {
        let broken = Parameter::Text("x +".to_string());
        assert!(apply(FunctionKind::Custom, 1.0, None, Some(&broken)).is_nan());
        // No body at all.
        assert!(apply(FunctionKind::Custom, 1.0, None, None).is_nan());
        // Numeric parameter where text is required.
        assert!(apply(FunctionKind::Custom, 1.0, None, Some(&Parameter::Number(2.0))).is_nan());
    }

    #[test]
    fn test_domain_violations_produce_nan_not_panics() {
        assert!(apply(FunctionKind::Sqrt, -1.0, None, None).is_nan());
        assert!(apply(FunctionKind::Ln, 0.0, None, None).is_infinite());
    }

    #[rstest]
    #[case(Comparison::Gt, 5.0, 3.0, true)]
    #[case(Comparison::Gt, 3.0, 3.0, false)]
    #[case(Comparison::Gte, 3.0, 3.0, true)]
    #[case(Comparison::Lt, 2.0, 3.0, true)]
    #[case(Comparison::Lte, 3.0, 3.0, true)]
    #[case(Comparison::Eq, 3.0, 3.0, true)]
    #[case(Comparison::Eq, 3.0, 3.0000001, false)]
    #[case(Comparison::Neq, 3.0, 4.0, true)]
    fn test_comparison_table(
        #[case] comparison: Comparison,
        #[case] a: f64,
        #[case] b: f64,
        #[case] expected: bool,
    ) {
        assert_eq!(compare(comparison, a, b), expected);
    }
}

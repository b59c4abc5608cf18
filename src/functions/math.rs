//! Single-argument numeric functions. Trigonometry works in radians.

use crate::ast::{ASTNode, Evaluator};
use crate::error::EvalError;
use crate::functions::{Arity, Registry};
use decimath_macros::decimath_fn;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};

pub fn register(registry: &Registry) {
    registry.define("abs", Arity::Fixed(1), abs);
    registry.define("ceil", Arity::Fixed(1), ceil);
    registry.define("floor", Arity::Fixed(1), floor);
    registry.define("round", Arity::Fixed(1), round);
    registry.define("trunc", Arity::Fixed(1), trunc);
    registry.define("sqrt", Arity::Fixed(1), sqrt);
    registry.define("ln", Arity::Fixed(1), ln);
    registry.define("exp", Arity::Fixed(1), exp);
    registry.define("sin", Arity::Fixed(1), sin);
    registry.define("cos", Arity::Fixed(1), cos);
    registry.define("tan", Arity::Fixed(1), tan);
    registry.define("cot", Arity::Fixed(1), cot);
    registry.define("sec", Arity::Fixed(1), sec);
    registry.define("csc", Arity::Fixed(1), csc);
}

#[decimath_fn]
fn abs(x: Decimal) -> Result<Decimal, EvalError> {
    Ok(x.abs())
}

#[decimath_fn]
fn ceil(x: Decimal) -> Result<Decimal, EvalError> {
    Ok(x.ceil())
}

#[decimath_fn]
fn floor(x: Decimal) -> Result<Decimal, EvalError> {
    Ok(x.floor())
}

/// Rounds half away from zero: `round(2.5)` is `3`, `round(-2.5)` is `-3`.
#[decimath_fn]
fn round(x: Decimal) -> Result<Decimal, EvalError> {
    Ok(x.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

#[decimath_fn]
fn trunc(x: Decimal) -> Result<Decimal, EvalError> {
    Ok(x.trunc())
}

#[decimath_fn]
fn sqrt(x: Decimal) -> Result<Decimal, EvalError> {
    if x < Decimal::ZERO {
        return Err(EvalError::invalid_argument(
            "sqrt",
            format!("square root of negative number {}", x),
        ));
    }
    x.sqrt()
        .ok_or_else(|| EvalError::invalid_argument("sqrt", format!("cannot take square root of {}", x)))
}

#[decimath_fn]
fn ln(x: Decimal) -> Result<Decimal, EvalError> {
    if x <= Decimal::ZERO {
        return Err(EvalError::invalid_argument(
            "ln",
            format!("logarithm of non-positive number {}", x),
        ));
    }
    x.checked_ln()
        .ok_or_else(|| EvalError::invalid_argument("ln", format!("cannot take logarithm of {}", x)))
}

/// Results too small to represent are zero, matching `^`.
#[decimath_fn]
fn exp(x: Decimal) -> Result<Decimal, EvalError> {
    match x.checked_exp() {
        Some(value) => Ok(value),
        None if x < Decimal::ZERO => Ok(Decimal::ZERO),
        None => Err(EvalError::invalid_argument("exp", format!("e^{} is out of range", x))),
    }
}

#[decimath_fn]
fn sin(x: Decimal) -> Result<Decimal, EvalError> {
    x.checked_sin()
        .ok_or_else(|| EvalError::invalid_argument("sin", format!("cannot compute sin({})", x)))
}

#[decimath_fn]
fn cos(x: Decimal) -> Result<Decimal, EvalError> {
    x.checked_cos()
        .ok_or_else(|| EvalError::invalid_argument("cos", format!("cannot compute cos({})", x)))
}

#[decimath_fn]
fn tan(x: Decimal) -> Result<Decimal, EvalError> {
    x.checked_tan()
        .ok_or_else(|| EvalError::invalid_argument("tan", format!("tan({}) is undefined", x)))
}

#[decimath_fn]
fn cot(x: Decimal) -> Result<Decimal, EvalError> {
    let tangent = x
        .checked_tan()
        .ok_or_else(|| EvalError::invalid_argument("cot", format!("cannot compute tan({})", x)))?;
    reciprocal("cot", x, tangent)
}

#[decimath_fn]
fn sec(x: Decimal) -> Result<Decimal, EvalError> {
    let cosine = x
        .checked_cos()
        .ok_or_else(|| EvalError::invalid_argument("sec", format!("cannot compute cos({})", x)))?;
    reciprocal("sec", x, cosine)
}

#[decimath_fn]
fn csc(x: Decimal) -> Result<Decimal, EvalError> {
    let sine = x
        .checked_sin()
        .ok_or_else(|| EvalError::invalid_argument("csc", format!("cannot compute sin({})", x)))?;
    reciprocal("csc", x, sine)
}

fn reciprocal(function: &str, x: Decimal, value: Decimal) -> Result<Decimal, EvalError> {
    if value.is_zero() {
        return Err(EvalError::invalid_argument(
            function,
            format!("{}({}) is undefined", function, x),
        ));
    }
    Decimal::ONE
        .checked_div(value)
        .ok_or_else(|| EvalError::invalid_argument(function, format!("{}({}) is out of range", function, x)))
}

#[cfg(test)]
mod tests {
    use crate::ast::Evaluator;
    use crate::error::{Error, EvalError};
    use crate::functions::{Arity, Registry};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn eval(expression: &str) -> Result<Decimal, Error> {
        let registry = Registry::new();
        Evaluator::new(&registry).evaluate_expression(expression)
    }

    #[test]
    fn test_abs_and_rounding() {
        assert_eq!(eval("abs(-2.5)").unwrap(), dec!(2.5));
        assert_eq!(eval("ceil(1.2)").unwrap(), dec!(2));
        assert_eq!(eval("ceil(-1.2)").unwrap(), dec!(-1));
        assert_eq!(eval("floor(1.8)").unwrap(), dec!(1));
        assert_eq!(eval("floor(-1.2)").unwrap(), dec!(-2));
        assert_eq!(eval("trunc(-1.8)").unwrap(), dec!(-1));
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(eval("round(2.5)").unwrap(), dec!(3));
        assert_eq!(eval("round(-2.5)").unwrap(), dec!(-3));
        assert_eq!(eval("round(2.49)").unwrap(), dec!(2));
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(eval("sqrt(16)").unwrap(), dec!(4));
        assert_eq!(eval("sqrt(2.25)").unwrap().round_dp(10), dec!(1.5));
        assert!(matches!(
            eval("sqrt(-1)"),
            Err(Error::Eval(EvalError::InvalidArgument { offset: Some(0), .. }))
        ));
    }

    #[test]
    fn test_ln_and_exp() {
        assert_eq!(eval("ln(1)").unwrap(), dec!(0));
        assert_eq!(eval("exp(0)").unwrap(), dec!(1));
        assert_eq!(eval("ln(exp(2))").unwrap().round_dp(4), dec!(2));
        assert!(matches!(
            eval("ln(0)"),
            Err(Error::Eval(EvalError::InvalidArgument { .. }))
        ));
    }

    #[test]
    fn test_exp_underflow_matches_power() {
        assert_eq!(eval("exp(-100)").unwrap(), dec!(0));
        assert_eq!(eval("exp(-70)").unwrap(), eval("0.1 ^ 30").unwrap());
        assert!(matches!(
            eval("exp(100)"),
            Err(Error::Eval(EvalError::InvalidArgument { .. }))
        ));
    }

    #[test]
    fn test_trigonometry() {
        assert_eq!(eval("sin(0)").unwrap(), dec!(0));
        assert_eq!(eval("cos(0)").unwrap(), dec!(1));
        assert_eq!(eval("tan(0)").unwrap(), dec!(0));
        assert_eq!(eval("sec(0)").unwrap(), dec!(1));
        let identity = eval("sin(0.7) ^ 2 + cos(0.7) ^ 2").unwrap();
        assert_eq!(identity.round_dp(4), dec!(1));
    }

    #[test]
    fn test_reciprocal_trigonometry_at_zero() {
        assert!(matches!(
            eval("cot(0)"),
            Err(Error::Eval(EvalError::InvalidArgument { .. }))
        ));
        assert!(matches!(
            eval("csc(0)"),
            Err(Error::Eval(EvalError::InvalidArgument { .. }))
        ));
    }

    #[test]
    fn test_fixed_arity_is_enforced() {
        assert_eq!(
            eval("abs(1, 2)"),
            Err(Error::Eval(EvalError::ArityMismatch {
                name: "abs".to_string(),
                expected: Arity::Fixed(1),
                found: 2,
                offset: Some(0),
            }))
        );
    }

    #[test]
    fn test_generated_check_catches_lenient_calls() {
        // With the evaluator's check off, the function's own check still fires.
        let registry = Registry::new();
        let evaluator = Evaluator::new(&registry).with_strict_arity(false);
        assert_eq!(
            evaluator.evaluate_expression("floor()"),
            Err(Error::Eval(EvalError::ArityMismatch {
                name: "floor".to_string(),
                expected: Arity::Fixed(1),
                found: 0,
                offset: Some(0),
            }))
        );
    }
}

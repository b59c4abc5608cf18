use crate::ast::{ASTNode, Evaluator};
use crate::error::EvalError;
use crate::functions::{Arity, Registry};
use decimath_macros::decimath_fn;
use rust_decimal::Decimal;

pub fn register(registry: &Registry) {
    registry.define("max", Arity::Variadic, max);
    registry.define("min", Arity::Variadic, min);
}

#[decimath_fn]
fn max(values: Vec<Decimal>) -> Result<Decimal, EvalError> {
    values
        .into_iter()
        .max()
        .ok_or_else(|| EvalError::invalid_argument("max", "expects at least one argument"))
}

#[decimath_fn]
fn min(values: Vec<Decimal>) -> Result<Decimal, EvalError> {
    values
        .into_iter()
        .min()
        .ok_or_else(|| EvalError::invalid_argument("min", "expects at least one argument"))
}

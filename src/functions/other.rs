use crate::ast::{ASTNode, Evaluator};
use crate::error::EvalError;
use crate::functions::{Arity, Registry};
use decimath_macros::decimath_fn;
use log::debug;
use rust_decimal::Decimal;

pub fn register(registry: &Registry) {
    registry.define("noerr", Arity::Fixed(1), noerr);
}

/// Evaluates its argument and yields `0` instead of any fault.
#[decimath_fn]
fn noerr(evaluator: &Evaluator, expression: &ASTNode) -> Result<Decimal, EvalError> {
    match evaluator.evaluate(expression) {
        Ok(value) => Ok(value),
        Err(err) => {
            debug!("noerr suppressed: {}", err);
            Ok(Decimal::ZERO)
        }
    }
}

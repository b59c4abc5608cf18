use decimath_macros::decimath_fn;
use decimath_rs::{evaluate_expression, register_function, ASTNode, Decimal, EvalError, Evaluator};
use log::debug;

/// Compound growth: `principal * (1 + rate) ^ periods`.
#[decimath_fn]
fn compound(principal: Decimal, rate: Decimal, periods: Decimal) -> Result<Decimal, EvalError> {
    let growth = decimath_rs::Operator::Power.apply(Decimal::ONE + rate, periods, 0)?;
    principal
        .checked_mul(growth)
        .ok_or_else(|| EvalError::invalid_argument("compound", "result is out of range"))
}

fn main() {
    pretty_env_logger::init();

    if let Err(err) = register_function("compound", 3, compound) {
        eprintln!("{}", err);
        return;
    }

    let expressions = [
        "0.1 + 0.2",
        "2 ^ 3 ^ 2",
        "round(compound(1000, 0.05, 10) * 100) / 100",
        "max(1.5, -2, sqrt(6.25))",
        "noerr(1 / 0) + 7",
        "10 / (5 - 5)",
        "(1 + 2",
        "1 + unknown(3)",
    ];

    for expression in expressions {
        debug!("evaluating {}", expression);
        match evaluate_expression(expression) {
            Ok(result) => println!("{} = {}", expression, result),
            Err(err) => println!("{}", err.render(expression)),
        }
    }
}

pub mod ast;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod functions;

pub use ast::{ASTNode, Evaluator, Operator, Parser};
pub use diagnostics::render_error_context;
pub use engine::{Engine, EngineConfig};
pub use error::{Error, EvalError, LexError, RegistryError, SyntaxError};
pub use functions::{Arity, Registry};
pub use rust_decimal::Decimal;

use std::sync::OnceLock;

static ENGINE: OnceLock<Engine> = OnceLock::new();

/// The process-wide engine behind [`evaluate_expression`] and [`register_function`].
pub fn global_engine() -> &'static Engine {
    ENGINE.get_or_init(Engine::new)
}

/// Evaluates `expression` against the process-wide engine.
///
/// ```
/// use decimath_rs::{evaluate_expression, Decimal};
///
/// let total = evaluate_expression("0.1 + 0.2").unwrap();
/// assert_eq!(total, Decimal::new(3, 1));
/// ```
pub fn evaluate_expression(expression: &str) -> Result<Decimal, Error> {
    global_engine().evaluate_expression(expression)
}

/// Registers a function with the process-wide engine. `arity` is `-1` for variadic.
pub fn register_function<F>(name: &str, arity: i32, function: F) -> Result<(), RegistryError>
where
    F: Fn(&Evaluator<'_>, &[ASTNode]) -> Result<Decimal, EvalError> + Send + Sync + 'static,
{
    global_engine().register_function(name, arity, function)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_global_registration_is_visible_to_evaluation() {
        register_function("lib_test_double", 1, |evaluator, args| {
            Ok(evaluator.evaluate(&args[0])? * dec!(2))
        })
        .unwrap();
        assert_eq!(evaluate_expression("lib_test_double(2.5) + 1").unwrap(), dec!(6));
        assert!(register_function("lib_test_double", 1, |_, _| Ok(Decimal::ZERO)).is_err());
    }

    #[test]
    fn test_global_builtins() {
        assert_eq!(evaluate_expression("max(1, abs(-4), 2)").unwrap(), dec!(4));
    }

    #[test]
    fn test_rendered_error_points_at_offset() {
        let source = "1 + )";
        let err = evaluate_expression(source).unwrap_err();
        assert_eq!(err.offset(), Some(4));
        assert_eq!(render_error_context(source, 4), "-----\n1 + )\n    ^\n-----\n");
    }
}

use crate::ast::{ASTNode, Parser};
use crate::error::{Error, EvalError};
use crate::functions::Registry;
use log::trace;
use rust_decimal::Decimal;

/// Walks an expression tree bottom-up, resolving calls against a registry.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    registry: &'a Registry,
    strict_arity: bool,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator that checks fixed arities before calling functions.
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            strict_arity: true,
        }
    }

    /// With strict arity off, functions receive whatever arguments were
    /// written and are left to validate them.
    pub fn with_strict_arity(mut self, strict_arity: bool) -> Self {
        self.strict_arity = strict_arity;
        self
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Parses and evaluates `expression`.
    pub fn evaluate_expression(&self, expression: &str) -> Result<Decimal, Error> {
        let ast = Parser::parse_expression(expression)?;
        Ok(self.evaluate(&ast)?)
    }

    /// Evaluates `ast`. The first fault anywhere in the tree aborts the walk.
    pub fn evaluate(&self, ast: &ASTNode) -> Result<Decimal, EvalError> {
        match ast {
            ASTNode::Number(value) => Ok(*value),

            ASTNode::BinaryOperation {
                left,
                operator,
                right,
                offset,
            } => {
                let left_value = self.evaluate(left)?;
                let right_value = self.evaluate(right)?;
                trace!("{} {} {}", left_value, operator, right_value);
                operator.apply(left_value, right_value, *offset)
            }

            ASTNode::FunctionCall { name, args, offset } => self.call(name, args, *offset),
        }
    }

    /// Evaluates each argument in order, stopping at the first failure.
    pub fn evaluate_all(&self, args: &[ASTNode]) -> Result<Vec<Decimal>, EvalError> {
        args.iter().map(|arg| self.evaluate(arg)).collect()
    }

    fn call(&self, name: &str, args: &[ASTNode], offset: usize) -> Result<Decimal, EvalError> {
        let function = self
            .registry
            .lookup(name)
            .ok_or_else(|| EvalError::UnknownFunction {
                name: name.to_string(),
                offset,
            })?;

        if self.strict_arity && !function.arity().accepts(args.len()) {
            return Err(EvalError::ArityMismatch {
                name: name.to_string(),
                expected: function.arity(),
                found: args.len(),
                offset: Some(offset),
            });
        }

        trace!("Calling {} with {} argument(s)", name, args.len());
        function.call(self, args).map_err(|err| err.at(offset))
    }
}

use crate::error::EvalError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use std::fmt;

mod evaluator;
mod parser;
mod tokenizer;

pub use evaluator::Evaluator;
pub use parser::Parser;
pub use tokenizer::{tokenize, Token, TokenKind};

/// Parsed expression. Children are owned, so every tree is finite and acyclic.
#[derive(Debug, Clone, PartialEq)]
pub enum ASTNode {
    Number(Decimal),
    BinaryOperation {
        left: Box<ASTNode>,
        operator: Operator,
        right: Box<ASTNode>,
        /// Byte offset of the operator token.
        offset: usize,
    },
    FunctionCall {
        name: String,
        args: Vec<ASTNode>,
        /// Byte offset of the function name.
        offset: usize,
    },
}

impl ASTNode {
    pub fn binary(left: ASTNode, operator: Operator, right: ASTNode, offset: usize) -> Self {
        ASTNode::BinaryOperation {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            offset,
        }
    }

    /// Source offset the node was parsed from, if it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            ASTNode::Number(_) => None,
            ASTNode::BinaryOperation { offset, .. } | ASTNode::FunctionCall { offset, .. } => {
                Some(*offset)
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
            Operator::Power => "^",
        }
    }

    /// Binding strength used by the precedence climbing parser; higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            Operator::Add | Operator::Subtract => 1,
            Operator::Multiply | Operator::Divide | Operator::Modulo => 2,
            Operator::Power => 3,
        }
    }

    pub fn is_right_associative(&self) -> bool {
        matches!(self, Operator::Power)
    }

    /// Applies the operator with checked decimal arithmetic. `offset` is the
    /// operator's source position, attached to any fault raised.
    pub fn apply(&self, left: Decimal, right: Decimal, offset: usize) -> Result<Decimal, EvalError> {
        let overflow = || EvalError::Overflow {
            operator: *self,
            left,
            right,
            offset,
        };
        let division_by_zero = || EvalError::DivisionByZero {
            operator: *self,
            left,
            right,
            offset,
        };

        match self {
            Operator::Add => left.checked_add(right).ok_or_else(overflow),
            Operator::Subtract => left.checked_sub(right).ok_or_else(overflow),
            Operator::Multiply => left.checked_mul(right).ok_or_else(overflow),
            Operator::Divide => {
                if right.is_zero() {
                    Err(division_by_zero())
                } else {
                    left.checked_div(right).ok_or_else(overflow)
                }
            }
            Operator::Modulo => {
                if right.is_zero() {
                    Err(division_by_zero())
                } else {
                    left.checked_rem(right).ok_or_else(overflow)
                }
            }
            Operator::Power => {
                if left.is_zero() && right < Decimal::ZERO {
                    return Err(division_by_zero());
                }
                // Results too small to represent are flushed to zero, as
                // `checked_powi` does on its own; too large is an overflow.
                let out_of_range = || {
                    if (left.abs() < Decimal::ONE) == (right > Decimal::ZERO) {
                        Ok(Decimal::ZERO)
                    } else {
                        Err(overflow())
                    }
                };
                let integral = right.fract().is_zero();
                if left == Decimal::ONE {
                    return Ok(Decimal::ONE);
                }
                if left == Decimal::NEGATIVE_ONE && integral {
                    let even = (right % Decimal::TWO).is_zero();
                    return Ok(if even { Decimal::ONE } else { Decimal::NEGATIVE_ONE });
                }
                if integral {
                    // Integral exponents are exact.
                    return match right.to_i64().and_then(|exponent| left.checked_powi(exponent)) {
                        Some(value) => Ok(value),
                        None => out_of_range(),
                    };
                }
                if left.is_zero() {
                    return Ok(Decimal::ZERO);
                }
                if left < Decimal::ZERO {
                    return Err(EvalError::Domain {
                        reason: format!(
                            "{} ^ {} has no real value: negative base with a fractional exponent",
                            left, right
                        ),
                        offset,
                    });
                }
                match left.checked_powd(right) {
                    Some(value) => Ok(value),
                    None => out_of_range(),
                }
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl TryFrom<&str> for Operator {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Subtract),
            "*" => Ok(Operator::Multiply),
            "/" => Ok(Operator::Divide),
            "%" => Ok(Operator::Modulo),
            "^" | "**" => Ok(Operator::Power),
            _ => Err(format!("Unknown operator: {}", value)),
        }
    }
}

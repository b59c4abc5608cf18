use crate::ast::Operator;
use crate::diagnostics::render_error_context;
use crate::functions::Arity;
use rust_decimal::Decimal;
use thiserror::Error;

/// Failure while splitting the source into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character '{character}' at offset {offset}")]
    UnexpectedCharacter { character: char, offset: usize },

    #[error("invalid number literal '{literal}' at offset {offset}")]
    InvalidNumber { literal: String, offset: usize },
}

impl LexError {
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnexpectedCharacter { offset, .. } | LexError::InvalidNumber { offset, .. } => {
                *offset
            }
        }
    }
}

/// Malformed grammar. Only the first one encountered is ever reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("unexpected token '{found}' at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },

    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEnd { offset: usize },

    #[error("unclosed parenthesis at offset {offset}")]
    UnclosedParenthesis { offset: usize },

    #[error("unmatched closing parenthesis at offset {offset}")]
    UnmatchedParenthesis { offset: usize },

    #[error("identifier '{name}' at offset {offset} must be called like a function: {name}(...)")]
    BareIdentifier { name: String, offset: usize },

    #[error("empty argument in call to '{function}' at offset {offset}")]
    EmptyArgument { function: String, offset: usize },

    #[error("unexpected '{found}' after complete expression at offset {offset}")]
    TrailingInput { found: String, offset: usize },
}

impl SyntaxError {
    pub fn offset(&self) -> usize {
        match self {
            SyntaxError::UnexpectedToken { offset, .. }
            | SyntaxError::UnexpectedEnd { offset }
            | SyntaxError::UnclosedParenthesis { offset }
            | SyntaxError::UnmatchedParenthesis { offset }
            | SyntaxError::BareIdentifier { offset, .. }
            | SyntaxError::EmptyArgument { offset, .. }
            | SyntaxError::TrailingInput { offset, .. } => *offset,
        }
    }
}

/// Rejected function registration. The registry is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("function name must not be empty")]
    EmptyName,

    #[error("invalid arity {arity} for function '{name}': expected -1, 0, or a positive integer")]
    InvalidArity { name: String, arity: i32 },

    #[error("function '{name}' is already registered")]
    DuplicateName { name: String },
}

/// Runtime fault raised while walking an expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("division by zero: [{left} {operator} {right}]")]
    DivisionByZero {
        operator: Operator,
        left: Decimal,
        right: Decimal,
        offset: usize,
    },

    #[error("function '{name}' is not registered")]
    UnknownFunction { name: String, offset: usize },

    #[error("function '{name}' expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: Arity,
        found: usize,
        offset: Option<usize>,
    },

    #[error("arithmetic overflow: [{left} {operator} {right}]")]
    Overflow {
        operator: Operator,
        left: Decimal,
        right: Decimal,
        offset: usize,
    },

    #[error("{reason}")]
    Domain { reason: String, offset: usize },

    #[error("invalid argument to '{function}': {reason}")]
    InvalidArgument {
        function: String,
        reason: String,
        offset: Option<usize>,
    },
}

impl EvalError {
    /// Shorthand for native functions rejecting the argument count they were handed.
    pub fn arity_mismatch(name: &str, expected: usize, found: usize) -> Self {
        EvalError::ArityMismatch {
            name: name.to_string(),
            expected: Arity::Fixed(expected),
            found,
            offset: None,
        }
    }

    pub fn invalid_argument(function: &str, reason: impl Into<String>) -> Self {
        EvalError::InvalidArgument {
            function: function.to_string(),
            reason: reason.into(),
            offset: None,
        }
    }

    pub fn offset(&self) -> Option<usize> {
        match self {
            EvalError::DivisionByZero { offset, .. }
            | EvalError::UnknownFunction { offset, .. }
            | EvalError::Overflow { offset, .. }
            | EvalError::Domain { offset, .. } => Some(*offset),
            EvalError::ArityMismatch { offset, .. } | EvalError::InvalidArgument { offset, .. } => {
                *offset
            }
        }
    }

    /// Fills in the source offset when the raising code did not know it.
    pub(crate) fn at(mut self, location: usize) -> Self {
        match &mut self {
            EvalError::ArityMismatch { offset, .. } | EvalError::InvalidArgument { offset, .. } => {
                offset.get_or_insert(location);
            }
            _ => {}
        }
        self
    }
}

/// Everything `evaluate_expression` can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl Error {
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Lex(err) => Some(err.offset()),
            Error::Syntax(err) => Some(err.offset()),
            Error::Eval(err) => err.offset(),
        }
    }

    /// The error message followed by a caret excerpt of `source`, when the offset is known.
    pub fn render(&self, source: &str) -> String {
        match self.offset() {
            Some(offset) => format!("{}\n{}", self, render_error_context(source, offset)),
            None => self.to_string(),
        }
    }
}

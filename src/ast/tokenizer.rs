use crate::ast::Operator;
use crate::error::LexError;
use log::{debug, trace};
use pest::error::InputLocation;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use rust_decimal::Decimal;
use std::str::FromStr;

#[derive(Parser)]
#[grammar = "ast/tokens.pest"]
struct TokenGrammar;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(Decimal),
    Operator(Operator),
    /// Candidate function name.
    Identifier(String),
    LeftParen,
    RightParen,
    Comma,
    EndOfInput,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The slice of source the token was read from; empty for `EndOfInput`.
    pub text: String,
    /// Byte offset of the first character of the token.
    pub offset: usize,
}

impl Token {
    /// How the token reads in an error message.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::EndOfInput => "end of input".to_string(),
            _ => self.text.clone(),
        }
    }
}

/// Splits `source` into tokens in source order. The last token is always
/// `EndOfInput`, positioned at `source.len()`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    debug!("Tokenizing expression: {}", source);
    let mut pairs = TokenGrammar::parse(Rule::tokens, source).map_err(|e| {
        let offset = match e.location {
            InputLocation::Pos(pos) => pos,
            InputLocation::Span((start, _)) => start,
        };
        let character = source[offset..]
            .chars()
            .next()
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        LexError::UnexpectedCharacter { character, offset }
    })?;

    let mut tokens = Vec::new();
    let Some(stream) = pairs.next() else {
        return Ok(vec![end_of_input(source)]);
    };

    for pair in stream.into_inner() {
        let token = match pair.as_rule() {
            Rule::EOI => end_of_input(source),
            _ => match build_token(pair)? {
                Some(token) => token,
                None => continue,
            },
        };
        trace!("Token: {:?}", token);
        tokens.push(token);
    }

    if !matches!(tokens.last(), Some(Token { kind: TokenKind::EndOfInput, .. })) {
        tokens.push(end_of_input(source));
    }

    debug!("Produced {} tokens", tokens.len());
    Ok(tokens)
}

fn build_token(pair: Pair<Rule>) -> Result<Option<Token>, LexError> {
    let text = pair.as_str();
    let offset = pair.as_span().start();

    let kind = match pair.as_rule() {
        Rule::number => TokenKind::Number(parse_number(text, offset)?),
        Rule::identifier => TokenKind::Identifier(text.to_string()),
        Rule::operator => {
            let operator = Operator::try_from(text).map_err(|_| LexError::UnexpectedCharacter {
                character: text.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER),
                offset,
            })?;
            TokenKind::Operator(operator)
        }
        Rule::left_paren => TokenKind::LeftParen,
        Rule::right_paren => TokenKind::RightParen,
        Rule::comma => TokenKind::Comma,
        other => {
            trace!("Skipping rule {:?}", other);
            return Ok(None);
        }
    };

    Ok(Some(Token {
        kind,
        text: text.to_string(),
        offset,
    }))
}

/// `.5` and `5.` are accepted as shorthands for `0.5` and `5`.
///
/// A literal whose digits cannot all be held is rejected rather than rounded.
fn parse_number(text: &str, offset: usize) -> Result<Decimal, LexError> {
    let invalid = || LexError::InvalidNumber {
        literal: text.to_string(),
        offset,
    };
    let normalized = if text.starts_with('.') {
        format!("0{}", text)
    } else {
        text.trim_end_matches('.').to_string()
    };

    let value = Decimal::from_str(&normalized).map_err(|_| invalid())?;
    let fraction_digits = normalized
        .split_once('.')
        .map_or(0, |(_, fraction)| fraction.len());
    if value.scale() as usize != fraction_digits {
        return Err(invalid());
    }
    Ok(value)
}

fn end_of_input(source: &str) -> Token {
    Token {
        kind: TokenKind::EndOfInput,
        text: String::new(),
        offset: source.len(),
    }
}

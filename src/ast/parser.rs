use crate::ast::{tokenize, ASTNode, Operator, Token, TokenKind};
use crate::error::{Error, SyntaxError};
use log::{debug, trace};
use rust_decimal::Decimal;

/// Recursive descent parser with precedence climbing for the binary operators.
///
/// ```text
/// expression := unary (operator unary)*      -- climbed by precedence
/// unary      := ("-" | "+") unary | primary
/// primary    := number | "(" expression ")" | identifier "(" arguments? ")"
/// arguments  := expression ("," expression)*
/// ```
///
/// Every step returns `Result`, so the first syntax error short-circuits the
/// rest of the parse and is the only one reported.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    cursor: usize,
    source: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, source: &'a str) -> Self {
        Self {
            tokens,
            cursor: 0,
            source,
        }
    }

    /// Tokenizes and parses `input` in one go.
    pub fn parse_expression(input: &str) -> Result<ASTNode, Error> {
        let tokens = tokenize(input)?;
        let ast = Parser::new(tokens, input).parse()?;
        Ok(ast)
    }

    pub fn parse(mut self) -> Result<ASTNode, SyntaxError> {
        debug!("Parsing expression: {}", self.source);
        let node = self.parse_binary(0)?;

        let next = self.peek();
        match next.kind {
            TokenKind::EndOfInput => {
                debug!("Parse result: {:?}", node);
                Ok(node)
            }
            TokenKind::RightParen => Err(SyntaxError::UnmatchedParenthesis {
                offset: next.offset,
            }),
            _ => Err(SyntaxError::TrailingInput {
                found: next.describe(),
                offset: next.offset,
            }),
        }
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<ASTNode, SyntaxError> {
        let mut left = self.parse_unary()?;

        while let TokenKind::Operator(operator) = self.peek().kind {
            let precedence = operator.precedence();
            if precedence < min_precedence {
                break;
            }
            let offset = self.advance().offset;
            trace!("Binary operator {} at offset {}", operator, offset);

            let next_min = if operator.is_right_associative() {
                precedence
            } else {
                precedence + 1
            };
            let right = self.parse_binary(next_min)?;
            left = ASTNode::binary(left, operator, right, offset);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<ASTNode, SyntaxError> {
        match self.peek().kind {
            TokenKind::Operator(Operator::Subtract) => {
                let offset = self.advance().offset;
                let operand = self.parse_unary()?;
                Ok(ASTNode::binary(
                    ASTNode::Number(Decimal::ZERO),
                    Operator::Subtract,
                    operand,
                    offset,
                ))
            }
            TokenKind::Operator(Operator::Add) => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<ASTNode, SyntaxError> {
        let token = self.advance();
        trace!("Primary: {:?}", token);

        match token.kind {
            TokenKind::Number(value) => Ok(ASTNode::Number(value)),
            TokenKind::LeftParen => {
                let inner = self.parse_binary(0)?;
                match self.peek().kind {
                    TokenKind::RightParen => {
                        self.advance();
                        Ok(inner)
                    }
                    TokenKind::EndOfInput => Err(SyntaxError::UnclosedParenthesis {
                        offset: token.offset,
                    }),
                    _ => Err(SyntaxError::UnexpectedToken {
                        found: self.peek().describe(),
                        offset: self.peek().offset,
                    }),
                }
            }
            TokenKind::Identifier(name) => {
                if self.peek().kind != TokenKind::LeftParen {
                    return Err(SyntaxError::BareIdentifier {
                        name,
                        offset: token.offset,
                    });
                }
                let paren = self.advance();
                let args = self.parse_arguments(&name, paren.offset)?;
                Ok(ASTNode::FunctionCall {
                    name,
                    args,
                    offset: token.offset,
                })
            }
            TokenKind::EndOfInput => Err(SyntaxError::UnexpectedEnd {
                offset: token.offset,
            }),
            TokenKind::Operator(_) | TokenKind::RightParen | TokenKind::Comma => {
                Err(SyntaxError::UnexpectedToken {
                    found: token.describe(),
                    offset: token.offset,
                })
            }
        }
    }

    /// Parses the argument list after the opening parenthesis of a call,
    /// consuming the closing one.
    fn parse_arguments(
        &mut self,
        function: &str,
        paren_offset: usize,
    ) -> Result<Vec<ASTNode>, SyntaxError> {
        let mut args = Vec::new();
        if self.peek().kind == TokenKind::RightParen {
            self.advance();
            return Ok(args);
        }

        loop {
            let next = self.peek();
            if matches!(next.kind, TokenKind::Comma | TokenKind::RightParen) {
                return Err(SyntaxError::EmptyArgument {
                    function: function.to_string(),
                    offset: next.offset,
                });
            }
            args.push(self.parse_binary(0)?);

            let separator = self.advance();
            match separator.kind {
                TokenKind::Comma => continue,
                TokenKind::RightParen => break,
                TokenKind::EndOfInput => {
                    return Err(SyntaxError::UnclosedParenthesis {
                        offset: paren_offset,
                    })
                }
                _ => {
                    return Err(SyntaxError::UnexpectedToken {
                        found: separator.describe(),
                        offset: separator.offset,
                    })
                }
            }
        }

        Ok(args)
    }

    fn peek(&self) -> &Token {
        // `tokenize` always ends the stream with `EndOfInput`, and the cursor never moves past it.
        &self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::EndOfInput {
            self.cursor += 1;
        }
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse(input: &str) -> Result<ASTNode, Error> {
        Parser::parse_expression(input)
    }

    fn syntax_error(input: &str) -> SyntaxError {
        match parse(input) {
            Err(Error::Syntax(err)) => err,
            other => panic!("expected a syntax error for {:?}, got {:?}", input, other),
        }
    }

    fn num(value: Decimal) -> ASTNode {
        ASTNode::Number(value)
    }

    #[test]
    fn test_number_literal() {
        assert_eq!(parse("42.5").unwrap(), num(dec!(42.5)));
    }

    #[test]
    fn test_simple_binary_expression() {
        let expected = ASTNode::binary(num(dec!(1)), Operator::Add, num(dec!(2)), 2);
        assert_eq!(parse("1 + 2").unwrap(), expected);
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        let expected = ASTNode::binary(
            num(dec!(2)),
            Operator::Add,
            ASTNode::binary(num(dec!(3)), Operator::Multiply, num(dec!(4)), 6),
            2,
        );
        assert_eq!(parse("2 + 3 * 4").unwrap(), expected);
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        let expected = ASTNode::binary(
            ASTNode::binary(num(dec!(10)), Operator::Subtract, num(dec!(2)), 3),
            Operator::Subtract,
            num(dec!(3)),
            7,
        );
        assert_eq!(parse("10 - 2 - 3").unwrap(), expected);
    }

    #[test]
    fn test_power_is_right_associative() {
        let expected = ASTNode::binary(
            num(dec!(2)),
            Operator::Power,
            ASTNode::binary(num(dec!(3)), Operator::Power, num(dec!(2)), 6),
            2,
        );
        assert_eq!(parse("2 ^ 3 ^ 2").unwrap(), expected);
    }

    #[test]
    fn test_power_binds_tighter_than_modulo() {
        let expected = ASTNode::binary(
            num(dec!(7)),
            Operator::Modulo,
            ASTNode::binary(num(dec!(2)), Operator::Power, num(dec!(2)), 5),
            2,
        );
        assert_eq!(parse("7 % 2^2").unwrap(), expected);
    }

    #[test]
    fn test_grouped_expression() {
        let expected = ASTNode::binary(
            ASTNode::binary(num(dec!(2)), Operator::Add, num(dec!(3)), 3),
            Operator::Multiply,
            num(dec!(4)),
            8,
        );
        assert_eq!(parse("(2 + 3) * 4").unwrap(), expected);
    }

    #[test]
    fn test_unary_minus_becomes_subtraction_from_zero() {
        let expected = ASTNode::binary(num(Decimal::ZERO), Operator::Subtract, num(dec!(5)), 0);
        assert_eq!(parse("-5").unwrap(), expected);
    }

    #[test]
    fn test_unary_sign_binds_before_power() {
        let expected = ASTNode::binary(
            ASTNode::binary(num(Decimal::ZERO), Operator::Subtract, num(dec!(2)), 0),
            Operator::Power,
            num(dec!(2)),
            3,
        );
        assert_eq!(parse("-2 ^ 2").unwrap(), expected);
    }

    #[test]
    fn test_unary_plus_is_identity() {
        assert_eq!(parse("+7").unwrap(), num(dec!(7)));
        let expected = ASTNode::binary(num(Decimal::ZERO), Operator::Subtract, num(dec!(7)), 1);
        assert_eq!(parse("+-+7").unwrap(), expected);
    }

    #[test]
    fn test_unary_after_binary_operator() {
        let expected = ASTNode::binary(
            num(dec!(2)),
            Operator::Multiply,
            ASTNode::binary(num(Decimal::ZERO), Operator::Subtract, num(dec!(3)), 4),
            2,
        );
        assert_eq!(parse("2 * -3").unwrap(), expected);
    }

    #[test]
    fn test_function_call() {
        let expected = ASTNode::FunctionCall {
            name: "max".to_string(),
            args: vec![
                num(dec!(1)),
                ASTNode::binary(num(dec!(2)), Operator::Add, num(dec!(3)), 9),
            ],
            offset: 0,
        };
        assert_eq!(parse("max(1, 2 + 3)").unwrap(), expected);
    }

    #[test]
    fn test_zero_argument_call() {
        let expected = ASTNode::FunctionCall {
            name: "pi".to_string(),
            args: vec![],
            offset: 2,
        };
        assert_eq!(parse("  pi()").unwrap(), expected);
    }

    #[test]
    fn test_nested_calls() {
        let ast = parse("abs(min(-1, 2))").unwrap();
        match ast {
            ASTNode::FunctionCall { name, args, .. } => {
                assert_eq!(name, "abs");
                assert!(matches!(&args[0], ASTNode::FunctionCall { name, args, offset: 4 }
                    if name == "min" && args.len() == 2));
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_parenthesis() {
        assert_eq!(
            syntax_error("(1 + 2"),
            SyntaxError::UnclosedParenthesis { offset: 0 }
        );
        assert_eq!(
            syntax_error("1 * (2 + (3)"),
            SyntaxError::UnclosedParenthesis { offset: 4 }
        );
    }

    #[test]
    fn test_unclosed_call() {
        assert_eq!(
            syntax_error("max(1, 2"),
            SyntaxError::UnclosedParenthesis { offset: 3 }
        );
    }

    #[test]
    fn test_unmatched_closing_parenthesis() {
        assert_eq!(
            syntax_error("1 + 2)"),
            SyntaxError::UnmatchedParenthesis { offset: 5 }
        );
    }

    #[test]
    fn test_missing_operand() {
        assert_eq!(syntax_error("1 +"), SyntaxError::UnexpectedEnd { offset: 3 });
        assert_eq!(
            syntax_error("* 2"),
            SyntaxError::UnexpectedToken {
                found: "*".to_string(),
                offset: 0,
            }
        );
        assert_eq!(
            syntax_error("()"),
            SyntaxError::UnexpectedToken {
                found: ")".to_string(),
                offset: 1,
            }
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(syntax_error(""), SyntaxError::UnexpectedEnd { offset: 0 });
        assert_eq!(syntax_error("   "), SyntaxError::UnexpectedEnd { offset: 3 });
    }

    #[test]
    fn test_bare_identifier() {
        assert_eq!(
            syntax_error("1 + price"),
            SyntaxError::BareIdentifier {
                name: "price".to_string(),
                offset: 4,
            }
        );
    }

    #[test]
    fn test_empty_arguments() {
        assert_eq!(
            syntax_error("max(,1)"),
            SyntaxError::EmptyArgument {
                function: "max".to_string(),
                offset: 4,
            }
        );
        assert_eq!(
            syntax_error("max(1,)"),
            SyntaxError::EmptyArgument {
                function: "max".to_string(),
                offset: 6,
            }
        );
        assert_eq!(
            syntax_error("max(1,,2)"),
            SyntaxError::EmptyArgument {
                function: "max".to_string(),
                offset: 6,
            }
        );
    }

    #[test]
    fn test_trailing_input() {
        assert_eq!(
            syntax_error("1 2"),
            SyntaxError::TrailingInput {
                found: "2".to_string(),
                offset: 2,
            }
        );
        assert_eq!(
            syntax_error("1, 2"),
            SyntaxError::TrailingInput {
                found: ",".to_string(),
                offset: 1,
            }
        );
    }

    #[test]
    fn test_bad_separator_in_arguments() {
        assert_eq!(
            syntax_error("max(1 2)"),
            SyntaxError::UnexpectedToken {
                found: "2".to_string(),
                offset: 6,
            }
        );
    }

    #[test]
    fn test_first_error_wins() {
        // Both the bare identifier and the unclosed parenthesis are wrong;
        // only the earlier one is reported.
        assert_eq!(
            syntax_error("(x + 1"),
            SyntaxError::BareIdentifier {
                name: "x".to_string(),
                offset: 1,
            }
        );
    }

    #[test]
    fn test_lex_error_is_reported_before_parsing() {
        assert!(matches!(parse("(1 + #"), Err(Error::Lex(_))));
    }
}

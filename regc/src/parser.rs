#![expect(missing_docs)]

use num_bigint::BigUint;
use thiserror::Error;
use tracing::trace;

use crate::ast::{BinaryOperator, DataType, Expression, Program, Statement};
use crate::error::{ErrorKind, Severity};
use crate::lexer::{Token, TokenKind};

/// Errors that can occur during parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A declaration keyword was not followed by a name.
    ///
    /// # Examples
    ///
    /// `uint16 = 4;`
    #[error("expected identifier, got {found}")]
    ExpectedIdentifier {
        /// Text of the token found instead.
        found: String,
    },

    /// A token did not match what the grammar requires at this point.
    ///
    /// # Examples
    ///
    /// Expected `=`, `;` or `(` after `uint16 x`, found `+`.
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// Description of the expected token.
        expected: &'static str,
        /// Text of the token found instead.
        found: String,
    },

    /// A parenthesized expression was not closed.
    #[error("expected closing parenthesis, got {found}")]
    UnclosedParenthesis { found: String },

    /// The input ended inside a function body.
    #[error("unexpected end of file in body of function {function}")]
    UnexpectedEof { function: String },

    /// A numeric literal token that does not hold a decimal number.
    #[error("invalid numeric literal: {text}")]
    InvalidNumber { text: String },

    /// A token that cannot start an expression.
    #[error("unimplemented token in parser: {found}")]
    NotImplemented { found: String },
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::NotImplemented { .. } => ErrorKind::NotImplemented,
            ParseError::ExpectedIdentifier { .. }
            | ParseError::UnexpectedToken { .. }
            | ParseError::UnclosedParenthesis { .. }
            | ParseError::UnexpectedEof { .. }
            | ParseError::InvalidNumber { .. } => ErrorKind::SyntaxError,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ParseError::NotImplemented { .. } => Severity::Internal,
            _ => Severity::Error,
        }
    }
}

/// Parse a token sequence into a [`Program`].
pub fn parse(tokens: Vec<Token>) -> Result<Program, ParseError> {
    Parser::new(tokens).parse()
}

/// Recursive-descent parser over a token cursor.
///
/// Precedence, loosest first: equality (`==`), additive (`+`, `-`),
/// multiplicative (no operators yet), primary.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(mut self) -> Result<Program, ParseError> {
        let mut body = Vec::new();

        loop {
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::EndOfStatement => {
                    self.advance();
                }
                _ => body.push(self.parse_statement()?),
            }
        }

        trace!(statements = body.len(), "parsed program");
        Ok(Program { body })
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens
            .get(self.pos)
            .map_or(TokenKind::Eof, |token| token.kind)
    }

    /// Consume the current token. Past the end this keeps yielding `Eof`.
    fn advance(&mut self) -> Token {
        match self.tokens.get(self.pos) {
            Some(token) => {
                self.pos += 1;
                token.clone()
            }
            None => Token::eof(),
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, ParseError> {
        let token = self.advance();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(ParseError::UnexpectedToken {
                expected,
                found: token.text,
            })
        }
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        match self.peek_kind() {
            TokenKind::DataType => self.parse_declaration(),
            _ => Ok(Statement::Expression(self.parse_expression()?)),
        }
    }

    fn parse_declaration(&mut self) -> Result<Statement, ParseError> {
        let keyword = self.advance();
        let data_type =
            DataType::from_keyword(&keyword.text).ok_or_else(|| ParseError::UnexpectedToken {
                expected: "data type",
                found: keyword.text.clone(),
            })?;

        let identifier = self.advance();
        if identifier.kind != TokenKind::Identifier {
            return Err(ParseError::ExpectedIdentifier {
                found: identifier.text,
            });
        }

        let next = self.advance();
        match next.kind {
            TokenKind::EndOfStatement => Ok(Statement::VariableDeclaration {
                identifier: identifier.text,
                data_type,
                value: None,
            }),
            TokenKind::Assign => Ok(Statement::VariableDeclaration {
                identifier: identifier.text,
                data_type,
                value: Some(self.parse_expression()?),
            }),
            TokenKind::ParenOpen => self.parse_function_definition(identifier.text, data_type),
            _ => Err(ParseError::UnexpectedToken {
                expected: "'=', ';' or '('",
                found: next.text,
            }),
        }
    }

    /// Everything after `<type> <name> (`. Parameters are not supported yet.
    fn parse_function_definition(
        &mut self,
        identifier: String,
        return_type: DataType,
    ) -> Result<Statement, ParseError> {
        self.expect(TokenKind::ParenClose, "')'")?;
        self.expect(TokenKind::BraceOpen, "'{'")?;

        let mut body = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::BraceClose => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    return Err(ParseError::UnexpectedEof {
                        function: identifier,
                    });
                }
                TokenKind::EndOfStatement => {
                    self.advance();
                }
                _ => body.push(self.parse_statement()?),
            }
        }

        Ok(Statement::FunctionDefinition {
            identifier,
            return_type,
            body,
        })
    }

    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_equality()
    }

    fn parse_equality(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_additive()?;

        while self.peek_kind() == TokenKind::Equality {
            self.advance();
            let right = self.parse_additive()?;
            left = Expression::binary(BinaryOperator::Equal, left, right);
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let operator = match self.peek_kind() {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expression::binary(operator, left, right);
        }

        Ok(left)
    }

    // No multiplicative operators yet.
    fn parse_multiplicative(&mut self) -> Result<Expression, ParseError> {
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        match self.peek_kind() {
            TokenKind::Identifier => {
                let identifier = self.advance().text;
                if self.peek_kind() == TokenKind::Assign {
                    self.advance();
                    let value = self.parse_expression()?;
                    return Ok(Expression::assignment(identifier, value));
                }
                Ok(Expression::Identifier(identifier))
            }

            TokenKind::NumericLiteral => {
                let text = self.advance().text;
                let value = text
                    .parse::<BigUint>()
                    .map_err(|_| ParseError::InvalidNumber { text })?;
                Ok(Expression::NumericLiteral(value))
            }

            TokenKind::ParenOpen => {
                self.advance();
                let value = self.parse_expression()?;
                let close = self.advance();
                if close.kind != TokenKind::ParenClose {
                    return Err(ParseError::UnclosedParenthesis { found: close.text });
                }
                Ok(value)
            }

            _ => Err(ParseError::NotImplemented {
                found: self.advance().text,
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lexer::lex;

    fn parse_source(source: &str) -> Result<Program, ParseError> {
        parse(lex(source).unwrap())
    }

    fn single_expression(source: &str) -> Expression {
        let program = parse_source(source).unwrap();
        assert_eq!(program.body.len(), 1);
        match program.body.into_iter().next() {
            Some(Statement::Expression(expression)) => expression,
            other => panic!("Expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_program() {
        let program = parse_source("").unwrap();
        assert!(program.body.is_empty());
    }

    #[test]
    fn test_stray_semicolons_are_skipped() {
        let program = parse_source(";;1;;").unwrap();
        assert_eq!(
            program.body,
            vec![Statement::Expression(Expression::number(1u32))]
        );
    }

    #[test]
    fn test_declaration_with_initializer() {
        let program = parse_source("uint16 x = 1;").unwrap();
        assert_eq!(
            program.body,
            vec![Statement::VariableDeclaration {
                identifier: "x".to_string(),
                data_type: DataType::Uint16,
                value: Some(Expression::number(1u32)),
            }]
        );
    }

    #[test]
    fn test_declaration_without_initializer() {
        let program = parse_source("uint16 x; x;").unwrap();
        assert_eq!(
            program.body,
            vec![
                Statement::VariableDeclaration {
                    identifier: "x".to_string(),
                    data_type: DataType::Uint16,
                    value: None,
                },
                Statement::Expression(Expression::identifier("x")),
            ]
        );
    }

    #[test]
    fn test_declaration_requires_identifier() {
        let result = parse_source("uint16 = 4;");
        assert!(matches!(
            result,
            Err(ParseError::ExpectedIdentifier { ref found }) if found == "="
        ));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::SyntaxError);
    }

    #[test]
    fn test_declaration_rejects_other_follower() {
        let result = parse_source("uint16 x + 1;");
        assert!(matches!(
            result,
            Err(ParseError::UnexpectedToken { ref found, .. }) if found == "+"
        ));
    }

    #[test]
    fn test_declaration_at_end_of_input() {
        let result = parse_source("uint16 x");
        assert!(matches!(
            result,
            Err(ParseError::UnexpectedToken { ref found, .. }) if found == "EOF"
        ));
    }

    #[test]
    fn test_additive_is_left_associative() {
        assert_eq!(
            single_expression("1 - 2 + 3;"),
            Expression::binary(
                BinaryOperator::Add,
                Expression::binary(
                    BinaryOperator::Sub,
                    Expression::number(1u32),
                    Expression::number(2u32)
                ),
                Expression::number(3u32)
            )
        );
    }

    #[test]
    fn test_equality_binds_looser_than_additive() {
        assert_eq!(
            single_expression("1 + 2 == 3;"),
            Expression::binary(
                BinaryOperator::Equal,
                Expression::binary(
                    BinaryOperator::Add,
                    Expression::number(1u32),
                    Expression::number(2u32)
                ),
                Expression::number(3u32)
            )
        );
    }

    #[test]
    fn test_equality_is_left_associative() {
        assert_eq!(
            single_expression("a == b == c;"),
            Expression::binary(
                BinaryOperator::Equal,
                Expression::binary(
                    BinaryOperator::Equal,
                    Expression::identifier("a"),
                    Expression::identifier("b")
                ),
                Expression::identifier("c")
            )
        );
    }

    #[test]
    fn test_parentheses_override_precedence() {
        assert_eq!(
            single_expression("1 - (2 + 3);"),
            Expression::binary(
                BinaryOperator::Sub,
                Expression::number(1u32),
                Expression::binary(
                    BinaryOperator::Add,
                    Expression::number(2u32),
                    Expression::number(3u32)
                )
            )
        );
    }

    #[test]
    fn test_unclosed_parenthesis() {
        let result = parse_source("(1 + 2;");
        assert!(matches!(
            result,
            Err(ParseError::UnclosedParenthesis { ref found }) if found == ";"
        ));
    }

    #[test]
    fn test_assignment_takes_full_expression() {
        assert_eq!(
            single_expression("x = 1 + 2 == 3;"),
            Expression::assignment(
                "x",
                Expression::binary(
                    BinaryOperator::Equal,
                    Expression::binary(
                        BinaryOperator::Add,
                        Expression::number(1u32),
                        Expression::number(2u32)
                    ),
                    Expression::number(3u32)
                )
            )
        );
    }

    #[test]
    fn test_chained_assignment() {
        assert_eq!(
            single_expression("x = y = 2;"),
            Expression::assignment("x", Expression::assignment("y", Expression::number(2u32)))
        );
    }

    #[test]
    fn test_big_literal_is_not_truncated() {
        let digits = "1000000000000000000000000000000";
        assert_eq!(
            single_expression(&format!("{digits};")),
            Expression::NumericLiteral(digits.parse().unwrap())
        );
    }

    #[test]
    fn test_unexpected_primary_is_not_implemented() {
        let result = parse_source("1 + ;");
        let err = result.unwrap_err();
        assert!(matches!(err, ParseError::NotImplemented { ref found } if found == ";"));
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
        assert_eq!(err.severity(), Severity::Internal);
    }

    #[test]
    fn test_multiplication_is_not_parsed_yet() {
        let result = parse_source("2 * 3;");
        assert!(matches!(
            result,
            Err(ParseError::NotImplemented { ref found }) if found == "*"
        ));
    }

    #[test]
    fn test_function_definition() {
        let program = parse_source("void main() { uint16 x = 1; x + 2; }").unwrap();
        assert_eq!(
            program.body,
            vec![Statement::FunctionDefinition {
                identifier: "main".to_string(),
                return_type: DataType::Void,
                body: vec![
                    Statement::VariableDeclaration {
                        identifier: "x".to_string(),
                        data_type: DataType::Uint16,
                        value: Some(Expression::number(1u32)),
                    },
                    Statement::Expression(Expression::binary(
                        BinaryOperator::Add,
                        Expression::identifier("x"),
                        Expression::number(2u32)
                    )),
                ],
            }]
        );
    }

    #[test]
    fn test_nested_function_definition() {
        let program = parse_source("void outer() { void inner() { } }").unwrap();
        assert_eq!(
            program.body,
            vec![Statement::FunctionDefinition {
                identifier: "outer".to_string(),
                return_type: DataType::Void,
                body: vec![Statement::FunctionDefinition {
                    identifier: "inner".to_string(),
                    return_type: DataType::Void,
                    body: vec![],
                }],
            }]
        );
    }

    #[test]
    fn test_function_parameters_are_rejected() {
        let result = parse_source("void f(x) { }");
        assert!(matches!(
            result,
            Err(ParseError::UnexpectedToken { ref found, .. }) if found == "x"
        ));
    }

    #[test]
    fn test_unterminated_function_body() {
        let result = parse_source("void main() { 1;");
        assert!(matches!(
            result,
            Err(ParseError::UnexpectedEof { ref function }) if function == "main"
        ));
    }

    #[test]
    fn test_missing_eof_token_is_tolerated() {
        let tokens = vec![Token::new(TokenKind::NumericLiteral, "7")];
        let program = parse(tokens).unwrap();
        assert_eq!(
            program.body,
            vec![Statement::Expression(Expression::number(7u32))]
        );
    }

    #[test]
    fn test_invalid_number_token() {
        let tokens = vec![Token::new(TokenKind::NumericLiteral, "7a"), Token::eof()];
        assert!(matches!(
            parse(tokens),
            Err(ParseError::InvalidNumber { ref text }) if text == "7a"
        ));
    }
}

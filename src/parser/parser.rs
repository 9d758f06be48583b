use crate::error::CasError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::parser::tree::Node;

/// Binding power an atom-or-`(` lookahead is treated as having when it
/// triggers implicit multiplication (`2x`, `2(x + 1)`); this is exactly
/// `Multiply`'s own binding power (spec.md §9's "implicit multiplication
/// uses the `*` binding power").
const IMPLICIT_MULTIPLY: (u32, u32) = (30, 31);

/// A Pratt (precedence-climbing) parser producing a [`Node`] tree
/// (spec.md §4.2). Grounded on the precedence-climbing loop shape in
/// `examples/dxavvv-rust-calc/src/parser.rs` and on the generic
/// `prefix_op`/`infix_op`/binding-power driver in
/// `examples/other_examples/.../pratt.rs`, generalized to this grammar's
/// implicit-multiplication and `sqrt`/`=` rules.
pub struct Parser {
    lexer: Lexer,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Parser { lexer: Lexer::new(source) }
    }

    /// Parse a single expression (or equation, since `=` is just the
    /// lowest-binding binary operator) and require the whole input be
    /// consumed.
    pub fn parse(&mut self) -> Result<Node, CasError> {
        let node = self.parse_expression(0)?;
        let trailing = self.lexer.next()?;
        if trailing.kind != TokenKind::End {
            return Err(CasError::Parse(format!(
                "unexpected trailing token '{}'",
                trailing.lexeme
            )));
        }
        Ok(node)
    }

    fn parse_expression(&mut self, min_bp: u32) -> Result<Node, CasError> {
        let mut left = self.parse_prefix()?;

        loop {
            let lookahead = self.lexer.peek()?;

            match lookahead.kind {
                TokenKind::End | TokenKind::RParen => break,

                TokenKind::Number | TokenKind::Variable | TokenKind::LParen | TokenKind::Sqrt => {
                    // Juxtaposition: synthesize a `*` without consuming the
                    // lookahead.
                    let (lbp, rbp) = IMPLICIT_MULTIPLY;
                    if lbp < min_bp {
                        break;
                    }
                    let right = self.parse_expression(rbp)?;
                    left = Node::Binary(Token::multiply(), Box::new(left), Box::new(right));
                }

                _ => {
                    let Some((lbp, rbp)) = lookahead.kind.binary_binding_power() else {
                        break;
                    };
                    if lbp < min_bp {
                        break;
                    }
                    let op = self.lexer.next()?;
                    let right = self.parse_expression(rbp)?;
                    left = Node::Binary(op, Box::new(left), Box::new(right));
                }
            }
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Node, CasError> {
        let token = self.lexer.next()?;
        match token.kind {
            TokenKind::Number | TokenKind::Variable => Ok(Node::Atom(token)),

            TokenKind::LParen => {
                let inner = self.parse_expression(0)?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }

            TokenKind::Plus | TokenKind::Minus | TokenKind::Sqrt => {
                let rbp = token.kind.prefix_binding_power().expect("checked above");
                let operand = self.parse_expression(rbp)?;
                Ok(Node::Unary(token, Box::new(operand)))
            }

            _ => Err(CasError::Parse(format!(
                "unexpected token '{}' where an expression was expected",
                token.lexeme
            ))),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, CasError> {
        let token = self.lexer.next()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(CasError::Parse(format!(
                "expected {kind:?}, found '{}'",
                token.lexeme
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tree::render_root;

    fn parse_text(src: &str) -> String {
        let node = Parser::new(src).parse().expect("parse");
        render_root(&node)
    }

    #[test]
    fn precedence_climbs_multiply_over_add() {
        assert_eq!(parse_text("2 + 3 * 4"), "2 + 3*4");
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(parse_text("2 ^ 3 ^ 2"), "2^3^2");
    }

    #[test]
    fn implicit_multiplication_before_a_variable() {
        assert_eq!(parse_text("2x"), "2*x");
    }

    #[test]
    fn implicit_multiplication_before_a_parenthesis() {
        assert_eq!(parse_text("3(x + 1)"), "3*(x + 1)");
    }

    #[test]
    fn equals_has_the_lowest_binding_power() {
        assert_eq!(parse_text("x + 1 = 2 * x"), "x + 1 = 2*x");
    }

    #[test]
    fn unmatched_open_paren_is_a_parse_error() {
        let err = Parser::new("(3 + 2").parse().unwrap_err();
        assert!(matches!(err, CasError::Parse(_)));
    }

    #[test]
    fn trailing_garbage_is_a_parse_error() {
        let err = Parser::new("3 + 2)").parse().unwrap_err();
        assert!(matches!(err, CasError::Parse(_)));
    }
}

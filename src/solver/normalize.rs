//! Solver preprocessing (spec.md §4.6 step 1): rewrite every input equation
//! as `L - R = 0`, simplify, then reorder `v * k` to `k * v` so constants
//! consistently precede variables across every `*` in the working set.

use crate::config::Config;
use crate::error::CasError;
use crate::lexer::token::{Token, TokenKind};
use crate::parser::tree::Node;
use crate::simplifier;

/// `L = R` becomes `(L - R) = 0`, simplified to a fixpoint.
pub fn normalize(equation: &Node, config: &Config) -> Result<Node, CasError> {
    let (lhs, rhs) = equation.as_assign().ok_or(CasError::NotAnEquation)?;
    let difference = Node::Binary(Token::minus(), Box::new(lhs.clone()), Box::new(rhs.clone()));
    let zeroed = Node::Binary(Token::assign(), Box::new(difference), Box::new(Node::number(0.0)));
    let simplified = simplifier::simplify(zeroed, config)?;
    Ok(reorder_constants(simplified))
}

/// `x * 3 -> 3 * x`, recursively. Applied after simplification, since
/// `CombineLikeTerms` already produces `k * v` for every surviving
/// coefficient-bearing term and this only needs to catch what the parser
/// or a substitution introduced the other way around.
fn reorder_constants(node: Node) -> Node {
    match node {
        Node::Atom(t) => Node::Atom(t),
        Node::Unary(t, inner) => Node::Unary(t, Box::new(reorder_constants(*inner))),
        Node::Binary(t, l, r) => {
            let l = reorder_constants(*l);
            let r = reorder_constants(*r);
            if t.kind == TokenKind::Multiply {
                let l_is_number = matches!(&l, Node::Atom(lt) if lt.kind == TokenKind::Number);
                let r_is_number = matches!(&r, Node::Atom(rt) if rt.kind == TokenKind::Number);
                if r_is_number && !l_is_number {
                    return Node::Binary(t, Box::new(r), Box::new(l));
                }
            }
            Node::Binary(t, Box::new(l), Box::new(r))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{tree::render_root, Parser};

    fn parse(src: &str) -> Node {
        Parser::new(src).parse().expect("parse")
    }

    #[test]
    fn moves_everything_to_one_side_against_zero() {
        let config = Config::default();
        let result = normalize(&parse("x + 2 = 5"), &config).expect("normalize");
        assert_eq!(render_root(&result), "x - 3 = 0");
    }

    #[test]
    fn reorders_a_variable_times_constant() {
        let reordered = reorder_constants(parse("x * 3"));
        assert_eq!(render_root(&reordered), "3*x");
    }

    #[test]
    fn non_equation_is_rejected() {
        let config = Config::default();
        let err = normalize(&parse("x + 2"), &config).unwrap_err();
        assert_eq!(err, CasError::NotAnEquation);
    }
}

//! The isolator: given an equation `lhs = rhs` and a target variable,
//! repeatedly moves a non-target subterm from `lhs` to `rhs` with the
//! inverse operation, to a fixpoint (spec.md §4.5). Structured the same way
//! as the simplifier — an ordered list of passes run to a fixpoint under
//! the shared iteration cap — so the two modules read as siblings.

use log::trace;

use crate::config::Config;
use crate::error::CasError;
use crate::lexer::token::{Token, TokenKind};
use crate::parser::tree::Node;
use crate::utils::contains_var;

/// `+` inverts to `-` and back; `*` inverts to `/` and back. `^` and
/// `sqrt` have no entry (spec.md §9's "declared out of scope").
fn inverse(op: TokenKind) -> Option<TokenKind> {
    match op {
        TokenKind::Plus => Some(TokenKind::Minus),
        TokenKind::Minus => Some(TokenKind::Plus),
        TokenKind::Multiply => Some(TokenKind::Divide),
        TokenKind::Divide => Some(TokenKind::Multiply),
        _ => None,
    }
}

fn binary(kind: TokenKind, l: Node, r: Node) -> Node {
    let token = Token::new(kind, kind.operator_symbol());
    Node::Binary(token, Box::new(l), Box::new(r))
}

/// `lhs = A ⊕ B`, `⊕ ∈ {+, -}`: if one side is free of `v`, move it across
/// with the inverse operator.
fn transfer_additives(lhs: &Node, rhs: &Node, target: &str) -> Option<(Node, Node)> {
    let Node::Binary(t, a, b) = lhs else { return None };
    if !matches!(t.kind, TokenKind::Plus | TokenKind::Minus) {
        return None;
    }
    if !contains_var(a, target) {
        // `a` is the un-negated operand of both `a + b` and `a - b`, so
        // moving it away always subtracts it from `rhs`: `a + b = R` gives
        // `b = R - a`; `a - b = R` gives `-b = R - a` (the survivor `b`
        // additionally flips sign because it was being subtracted).
        let new_rhs = binary(TokenKind::Minus, rhs.clone(), (**a).clone());
        let new_lhs = if t.kind == TokenKind::Minus {
            Node::Unary(Token::minus(), b.clone())
        } else {
            (**b).clone()
        };
        return Some((new_lhs, new_rhs));
    }
    if !contains_var(b, target) {
        // `b` is added back when it was being subtracted: `a - b = R`
        // gives `a = R + b`; `a + b = R` gives `a = R - b`.
        let inv = inverse(t.kind)?;
        let new_rhs = binary(inv, rhs.clone(), (**b).clone());
        return Some(((**a).clone(), new_rhs));
    }
    None
}

/// `lhs = A ⊗ B`, `⊗ ∈ {*, /}`: if one side is free of `v`, move it across
/// with the inverse operator. Division's left/right asymmetry:
/// `A / B = rhs` moving `B` gives `A = rhs * B`; moving `A` (only sound
/// when `B` contains the target, i.e. `A` is the side without `v`) gives
/// `B = A / rhs`.
fn transfer_multiplicatives(lhs: &Node, rhs: &Node, target: &str) -> Option<(Node, Node)> {
    let Node::Binary(t, a, b) = lhs else { return None };
    if !matches!(t.kind, TokenKind::Multiply | TokenKind::Divide) {
        return None;
    }
    if !contains_var(a, target) {
        if t.kind == TokenKind::Divide {
            // a / B = rhs  =>  B = a / rhs
            let new_lhs = (**b).clone();
            let new_rhs = binary(TokenKind::Divide, (**a).clone(), rhs.clone());
            return Some((new_lhs, new_rhs));
        }
        // a * B = rhs  =>  B = rhs / a
        let new_rhs = binary(TokenKind::Divide, rhs.clone(), (**a).clone());
        return Some(((**b).clone(), new_rhs));
    }
    if !contains_var(b, target) {
        let inv = inverse(t.kind)?;
        // A ⊗ b = rhs  =>  A = rhs ⊗⁻¹ b
        let new_rhs = binary(inv, rhs.clone(), (**b).clone());
        return Some(((**a).clone(), new_rhs));
    }
    None
}

/// `lhs = Unary(Minus, inner)` with `inner` containing `v`: `lhs := inner`,
/// `rhs := -rhs`.
fn transfer_unary(lhs: &Node, rhs: &Node, target: &str) -> Option<(Node, Node)> {
    let Node::Unary(t, inner) = lhs else { return None };
    if t.kind != TokenKind::Minus || !contains_var(inner, target) {
        return None;
    }
    Some(((**inner).clone(), Node::Unary(Token::minus(), Box::new((*rhs).clone()))))
}

fn run_one_iteration(lhs: &Node, rhs: &Node, target: &str) -> Option<(Node, Node)> {
    if let Some(next) = transfer_additives(lhs, rhs, target) {
        trace!("TransferAdditives fired");
        return Some(next);
    }
    if let Some(next) = transfer_multiplicatives(lhs, rhs, target) {
        trace!("TransferMultiplicatives fired");
        return Some(next);
    }
    if let Some(next) = transfer_unary(lhs, rhs, target) {
        trace!("TransferUnary fired");
        return Some(next);
    }
    None
}

/// Isolate `target` in `equation` (which must be `=`-rooted): repeatedly
/// move non-target subterms from the left side to the right, to a
/// fixpoint bounded by `config.max_iterations`. If no pass fires and
/// `lhs` is not literally `Variable(target)`, the equation is returned
/// unchanged per spec.md §4.5 — callers must verify isolation by
/// structural inspection. If a pass is still reporting a change when the
/// cap runs out, that is rule oscillation rather than a legitimate
/// "nothing more to do," and this returns `NotConverged` instead
/// (spec.md §4.4/§4.5 share the same cap semantics).
///
/// The transfer passes only ever look at `lhs`'s own shape (spec.md §4.5);
/// they can get stuck behind multiplication that hasn't been distributed
/// yet, or behind a target occurrence that still lingers on `rhs` from the
/// input (e.g. `(x + 2) - (y - 3) = 2*(x + 5)`, where `x` starts out on
/// both sides). Running the simplifier over the whole equation before each
/// transfer attempt — spec.md §4.4's `EvaluateConstantBinary` and
/// `CombineLikeTerms` both already treat an assignment root as part of the
/// same additive chain as its two sides — both expands such multiplication
/// and, in the common linear case, consolidates every occurrence of
/// `target` onto one side on its own. This is the eager end of the
/// latitude spec.md §4.5 gives ("the simplifier is free to be run over the
/// resulting equation ... the equation solver does this explicitly").
pub fn isolate(equation: &Node, target: &str, config: &Config) -> Result<Node, CasError> {
    if equation.as_assign().is_none() {
        return Err(CasError::NotAnEquation);
    }
    let mut current = equation.clone();

    for _ in 0..config.max_iterations {
        current = crate::simplifier::simplify(current, config)?;
        let (lhs, rhs) = current.as_assign().expect("root stays Assign through every rewrite pass");
        match run_one_iteration(lhs, rhs, target) {
            Some((new_lhs, new_rhs)) => {
                current = Node::Binary(Token::assign(), Box::new(new_lhs), Box::new(new_rhs));
            }
            None => return Ok(current),
        }
    }

    Err(CasError::NotConverged)
}

/// Whether `equation`'s left side is now literally `Variable(target)` —
/// the success condition spec.md §4.5 asks callers to check structurally.
pub fn is_isolated(equation: &Node, target: &str) -> bool {
    matches!(equation.as_assign(), Some((lhs, rhs))
        if matches!(lhs, Node::Atom(t) if t.kind == TokenKind::Variable && t.lexeme == target)
        && !contains_var(rhs, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::parser::tree::render_root;
    use crate::simplifier;

    fn isolate_text(src: &str, var: &str) -> String {
        let config = Config::default();
        let equation = Parser::new(src).parse().expect("parse");
        let isolated = isolate(&equation, var, &config).expect("isolate");
        let simplified = simplifier::simplify(isolated, &config).expect("simplify");
        render_root(&simplified)
    }

    #[test]
    fn scenario_four() {
        assert_eq!(isolate_text("(x + 2) - (y - 3) = 2*(x + 5)", "x"), "x = -y - 5");
    }

    #[test]
    fn non_equation_is_rejected() {
        let expr = Parser::new("3 + 2").parse().expect("parse");
        let err = isolate(&expr, "x", &Config::default()).unwrap_err();
        assert_eq!(err, CasError::NotAnEquation);
    }

    #[test]
    fn simple_additive_isolation() {
        assert_eq!(isolate_text("x + 3 = 7", "x"), "x = 4");
    }

    #[test]
    fn exhausting_the_cap_while_a_pass_still_fires_is_not_converged() {
        let config = Config { max_iterations: 0, ..Config::default() };
        let equation = Parser::new("x + 3 = 7").parse().expect("parse");
        let err = isolate(&equation, "x", &config).unwrap_err();
        assert_eq!(err, CasError::NotConverged);
    }
}

//! Additive-chain flattening (spec.md §4.4.1). A maximal connected run of
//! `+`/`-`/`=` operators is walked and every leaf reachable through it is
//! recorded as a `(path, sign)` pair, where `path` is a sequence of
//! left/right steps from the chain root. See `SPEC_FULL.md` §4.7 for why a
//! path replaces the raw "leaf pointer" spec.md describes: `ReduceUnary`
//! always runs before anything that flattens, so a leaf is never itself a
//! multi-layer unary chain, and a single `Unary(Minus, _)` leaf can have its
//! sign read off directly instead of walked into.

use crate::lexer::token::TokenKind;
use crate::parser::tree::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Left,
    Right,
}

/// A leaf's path from the chain root, together with the chain's *ambient*
/// sign at that position (descent through `+` leaves both sides unchanged;
/// descent through `-` or `=` flips the right side; spec.md §4.4.1). This
/// is purely positional: it does not fold in the leaf node's own `Unary
/// (Minus, _)` wrapper, if it has one — [`numeric_leaf_value`] and the
/// simplifier's `term_shape` read that off the node itself instead, so a
/// leaf's *true* contribution is always `leaf.sign * numeric_leaf_value(
/// node)` (or the `term_shape` equivalent), with no double application of
/// the same minus. Keeping `sign` purely positional also means it never
/// changes as a leaf's own content gets rewritten in place, which a
/// leaf-node-dependent sign would.
pub struct Leaf {
    pub path: Vec<Step>,
    pub sign: f64,
}

pub fn flatten(root: &Node) -> Vec<Leaf> {
    let mut out = Vec::new();
    flatten_into(root, 1.0, Vec::new(), &mut out);
    out
}

fn flatten_into(node: &Node, sign: f64, path: Vec<Step>, out: &mut Vec<Leaf>) {
    match node {
        Node::Binary(t, l, r) if t.kind == TokenKind::Plus => {
            let mut lp = path.clone();
            lp.push(Step::Left);
            flatten_into(l, sign, lp, out);
            let mut rp = path;
            rp.push(Step::Right);
            flatten_into(r, sign, rp, out);
        }
        Node::Binary(t, l, r) if t.kind == TokenKind::Minus || t.kind == TokenKind::Assign => {
            let mut lp = path.clone();
            lp.push(Step::Left);
            flatten_into(l, sign, lp, out);
            let mut rp = path;
            rp.push(Step::Right);
            flatten_into(r, -sign, rp, out);
        }
        _ => out.push(Leaf { path, sign }),
    }
}

pub fn get<'a>(root: &'a Node, path: &[Step]) -> &'a Node {
    let mut cur = root;
    for step in path {
        cur = match (cur, step) {
            (Node::Binary(_, l, _), Step::Left) => l,
            (Node::Binary(_, _, r), Step::Right) => r,
            _ => unreachable!("flatten paths only ever descend through Binary nodes"),
        };
    }
    cur
}

pub fn get_mut<'a>(root: &'a mut Node, path: &[Step]) -> &'a mut Node {
    let mut cur = root;
    for step in path {
        cur = match (cur, step) {
            (Node::Binary(_, l, _), Step::Left) => l,
            (Node::Binary(_, _, r), Step::Right) => r,
            _ => unreachable!("flatten paths only ever descend through Binary nodes"),
        };
    }
    cur
}

/// If `node` is a `Number` atom, or a `Unary(Minus, _)` wrapping one, that
/// leaf's own signed value (the `Unary(Minus, _)` case negates). Combined
/// with [`Leaf::sign`], which carries only the chain's positional sign, a
/// leaf's total contribution to the chain's sum is always
/// `leaf.sign * numeric_leaf_value(node)`.
pub fn numeric_leaf_value(node: &Node) -> Option<f64> {
    match node {
        Node::Atom(t) if t.kind == TokenKind::Number => Some(t.numeric_value()),
        Node::Unary(t, inner) if t.kind == TokenKind::Minus => match inner.as_ref() {
            Node::Atom(t) if t.kind == TokenKind::Number => Some(-t.numeric_value()),
            _ => None,
        },
        _ => None,
    }
}

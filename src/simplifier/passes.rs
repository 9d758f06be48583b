//! The eight ordered rewrite passes (spec.md §4.4). Each pass is a single
//! post-order traversal that returns whether it changed anything; the
//! fixpoint driver in `simplifier/mod.rs` runs them in this exact order,
//! in a loop, until none report a change.
//!
//! Passes are free functions over `&mut Node` rather than a trait object
//! per pass — there is no need for dynamic dispatch since the driver always
//! runs the same fixed list, and a plain function list reads closer to the
//! rule table in spec.md §4.4 than an object hierarchy would.

use crate::error::CasError;
use crate::evaluator;
use crate::lexer::token::{Token, TokenKind};
use crate::parser::tree::Node;
use crate::simplifier::flatten::{self, Step};

fn is_additive(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Plus | TokenKind::Minus)
}

/// Post-order: rewrite both children first, then try the node-local rule.
/// `rule` reports whether it changed `node` itself; the return value is
/// "children changed OR rule changed".
fn transform_tree(node: &mut Node, rule: &mut dyn FnMut(&mut Node) -> bool) -> bool {
    let children_changed = match node {
        Node::Atom(_) => false,
        Node::Unary(_, inner) => transform_tree(inner, rule),
        Node::Binary(_, l, r) => {
            let l_changed = transform_tree(l, rule);
            let r_changed = transform_tree(r, rule);
            l_changed || r_changed
        }
    };
    let self_changed = rule(node);
    children_changed || self_changed
}

/// Collapse a run of unary `+`/`-` into at most one unary, by the parity
/// of `-` signs (`+x -> x`, `--x -> x`, `-+-x -> x`, `-+--x -> -x`).
pub fn reduce_unary(root: &mut Node) -> bool {
    transform_tree(root, &mut |node| {
        let Node::Unary(t, inner) = node else { return false };
        if t.kind != TokenKind::Plus && t.kind != TokenKind::Minus {
            return false;
        }

        // Walk down through a chain of Plus/Minus unaries, counting
        // minus-parity, until hitting a non-unary-sign base.
        let mut negative = t.kind == TokenKind::Minus;
        let mut base: &Node = inner;
        let mut layers = 1;
        loop {
            match base {
                Node::Unary(bt, binner) if bt.kind == TokenKind::Plus || bt.kind == TokenKind::Minus => {
                    if bt.kind == TokenKind::Minus {
                        negative = !negative;
                    }
                    base = binner;
                    layers += 1;
                }
                _ => break,
            }
        }
        if layers == 1 && !negative {
            // A single `+x` collapses to `x`, a single lone `-x` does not
            // (reinsertion invariant) — handled by the `layers == 1 &&
            // negative` no-op branch below.
            *node = base.clone();
            return true;
        }
        if layers == 1 {
            return false;
        }
        let new_node = if negative {
            Node::Unary(Token::minus(), Box::new(base.clone()))
        } else {
            base.clone()
        };
        *node = new_node;
        true
    })
}

/// `-(a ⊕ b) -> (-a) ⊕' b` for `⊕ ∈ {+, -}`, merging the distributed minus
/// into the inner operator's sign. Non-additive inner operators untouched.
pub fn distribute_minus_over_binary(root: &mut Node) -> bool {
    transform_tree(root, &mut |node| {
        let Node::Unary(t, inner) = node else { return false };
        if t.kind != TokenKind::Minus {
            return false;
        }
        let Node::Binary(bt, l, r) = inner.as_mut() else { return false };
        if !is_additive(bt.kind) {
            return false;
        }
        // ⊕ = '+'  =>  -(a+b) = (-a) - b
        // ⊕ = '-'  =>  -(a-b) = (-a) + b
        let new_op = if bt.kind == TokenKind::Plus { Token::minus() } else { Token::plus() };
        let new_left = Node::Unary(Token::minus(), l.clone());
        *node = Node::Binary(new_op, Box::new(new_left), r.clone());
        true
    })
}

/// `a ⊕ (±b) -> a ⊕' b` where `⊕'` merges the additive operator with the
/// right-side unary sign, when `⊕` is additive.
pub fn merge_binary_with_right_unary(root: &mut Node) -> bool {
    transform_tree(root, &mut |node| {
        let Node::Binary(t, _l, r) = node else { return false };
        if !is_additive(t.kind) {
            return false;
        }
        let Node::Unary(rt, rinner) = r.as_ref() else { return false };
        if rt.kind != TokenKind::Plus && rt.kind != TokenKind::Minus {
            return false;
        }
        let negated = rt.kind == TokenKind::Minus;
        let merged_is_minus = (t.kind == TokenKind::Minus) ^ negated;
        let new_right = (**rinner).clone();
        let new_op = if merged_is_minus { Token::minus() } else { Token::plus() };
        let Node::Binary(_, l, _) = node else { unreachable!() };
        *node = Node::Binary(new_op, l.clone(), Box::new(new_right));
        true
    })
}

/// `a * (b ⊕ c) -> (a*b) ⊕ (a*c)` and the symmetric left-distribution,
/// only when the sibling operator is additive.
pub fn distribute_multiply_over_additive(root: &mut Node) -> bool {
    transform_tree(root, &mut |node| {
        let Node::Binary(t, l, r) = node else { return false };
        if t.kind != TokenKind::Multiply {
            return false;
        }
        if let Node::Binary(rt, rl, rr) = r.as_ref() {
            if is_additive(rt.kind) {
                let a = l.as_ref().clone();
                let left = Node::Binary(Token::multiply(), Box::new(a.clone()), rl.clone());
                let right = Node::Binary(Token::multiply(), Box::new(a), rr.clone());
                *node = Node::Binary(Token::new(rt.kind, rt.lexeme.clone()), Box::new(left), Box::new(right));
                return true;
            }
        }
        if let Node::Binary(lt, ll, lr) = l.as_ref() {
            if is_additive(lt.kind) {
                let b = r.as_ref().clone();
                let left = Node::Binary(Token::multiply(), ll.clone(), Box::new(b.clone()));
                let right = Node::Binary(Token::multiply(), lr.clone(), Box::new(b));
                *node = Node::Binary(Token::new(lt.kind, lt.lexeme.clone()), Box::new(left), Box::new(right));
                return true;
            }
        }
        false
    })
}

/// Fold a binary node whose operands are both `Number` atoms; otherwise,
/// for an additive/assignment root, flatten and sum numeric leaves into one
/// representative.
pub fn evaluate_constant_binary(root: &mut Node) -> Result<bool, CasError> {
    evaluate_constant_binary_inner(root)
}

fn evaluate_constant_binary_inner(node: &mut Node) -> Result<bool, CasError> {
    let mut changed = false;
    match node {
        Node::Unary(_, inner) => {
            changed |= evaluate_constant_binary_inner(inner)?;
        }
        Node::Binary(_, l, r) => {
            changed |= evaluate_constant_binary_inner(l)?;
            changed |= evaluate_constant_binary_inner(r)?;
        }
        Node::Atom(_) => {}
    }

    if let Node::Binary(t, l, r) = node {
        if let (Node::Atom(lt), Node::Atom(rt)) = (l.as_ref(), r.as_ref()) {
            if lt.kind == TokenKind::Number && rt.kind == TokenKind::Number && evaluator::is_foldable(t.kind) {
                let value = evaluator::fold_binary(t.kind, lt.numeric_value(), rt.numeric_value())?;
                *node = Node::number(value);
                return Ok(true);
            }
        }
    }

    let is_additive_root = matches!(node, Node::Binary(t, ..) if is_additive(t.kind) || t.kind == TokenKind::Assign);
    if is_additive_root {
        changed |= fold_additive_chain(node);
    }

    Ok(changed)
}

/// Flatten the additive/assignment chain rooted at `node`, sum all numeric
/// leaves (assignment right-side contributions negated, per flatten's own
/// sign convention), zero every numeric leaf but one, and give the survivor
/// the total.
fn fold_additive_chain(node: &mut Node) -> bool {
    let leaves = flatten::flatten(node);
    let numeric: Vec<(&Vec<Step>, f64)> = leaves
        .iter()
        .filter_map(|leaf| {
            flatten::numeric_leaf_value(flatten::get(node, &leaf.path))
                .map(|v| (&leaf.path, leaf.sign * v))
        })
        .collect();

    if numeric.len() < 2 {
        return false;
    }

    let total: f64 = numeric.iter().map(|(_, v)| *v).sum();
    let representative_path = numeric[0].0.clone();
    let other_paths: Vec<Vec<Step>> = numeric[1..].iter().map(|(p, _)| (*p).clone()).collect();

    let leaf_sign = leaves.iter().find(|l| &l.path == &representative_path).map(|l| l.sign).unwrap_or(1.0);
    let representative_value = total / leaf_sign;
    let new_representative = if representative_value < 0.0 {
        Node::Unary(Token::minus(), Box::new(Node::number(-representative_value)))
    } else {
        Node::number(representative_value)
    };

    // A chain already settled into "one representative leaf plus zero
    // leaves" must not be reported as changed again, or the fixpoint
    // never closes once an equation's right side has folded down to `0`.
    let zero = Node::number(0.0);
    let already_settled = other_paths.iter().all(|p| flatten::get(node, p) == &zero)
        && flatten::get(node, &representative_path) == &new_representative;
    if already_settled {
        return false;
    }

    for path in &other_paths {
        *flatten::get_mut(node, path) = Node::number(0.0);
    }
    *flatten::get_mut(node, &representative_path) = new_representative;
    true
}

/// Identity/absorbing-constant rewrites. Assignment roots are exempt so a
/// literal zero on either side of `=` survives.
pub fn evaluate_special_cases(root: &mut Node) -> Result<bool, CasError> {
    let mut err = None;
    let changed = transform_tree(root, &mut |node| {
        if err.is_some() {
            return false;
        }
        let Node::Binary(t, l, r) = node else { return false };
        if t.kind == TokenKind::Assign {
            return false;
        }
        match t.kind {
            TokenKind::Plus => {
                if r.is_zero() {
                    *node = (**l).clone();
                    return true;
                }
                if l.is_zero() {
                    *node = (**r).clone();
                    return true;
                }
            }
            TokenKind::Minus => {
                if r.is_zero() {
                    *node = (**l).clone();
                    return true;
                }
                if l.is_zero() {
                    *node = Node::Unary(Token::minus(), r.clone());
                    return true;
                }
            }
            TokenKind::Multiply => {
                if l.is_zero() || r.is_zero() {
                    *node = Node::number(0.0);
                    return true;
                }
                if r.is_one() {
                    *node = (**l).clone();
                    return true;
                }
                if l.is_one() {
                    *node = (**r).clone();
                    return true;
                }
            }
            TokenKind::Divide => {
                if l.is_zero() {
                    *node = Node::number(0.0);
                    return true;
                }
                if r.is_zero() {
                    err = Some(CasError::DivByZero);
                    return false;
                }
                if r.is_one() {
                    *node = (**l).clone();
                    return true;
                }
            }
            _ => {}
        }
        false
    });
    match err {
        Some(e) => Err(e),
        None => Ok(changed),
    }
}

/// Any `Number` atom with a negative value becomes `Unary(Minus, |v|)`.
pub fn separate_into_unary(root: &mut Node) -> bool {
    transform_tree(root, &mut |node| {
        if let Node::Atom(t) = node {
            if t.kind == TokenKind::Number && t.numeric_value() < 0.0 {
                let magnitude = -t.numeric_value();
                *node = Node::Unary(Token::minus(), Box::new(Node::number(magnitude)));
                return true;
            }
        }
        false
    })
}

/// A term's syntactic "shape", ignoring its coefficient, used as the key
/// for grouping like terms within an additive chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TermShape {
    Variable(String),
    Other(Node),
}

/// Decompose a leaf node into `(coefficient, shape)`: `k*v`/`v*k` split out
/// the numeric factor, bare `v` has coefficient 1, anything else is its own
/// opaque shape with coefficient 1 (only ever merged with syntactically
/// identical occurrences).
fn term_shape(node: &Node) -> (f64, TermShape) {
    match node {
        Node::Atom(t) if t.kind == TokenKind::Variable => (1.0, TermShape::Variable(t.lexeme.clone())),
        Node::Unary(t, inner) if t.kind == TokenKind::Minus => {
            let (c, shape) = term_shape(inner);
            (-c, shape)
        }
        Node::Binary(t, l, r) if t.kind == TokenKind::Multiply => {
            if let Node::Atom(lt) = l.as_ref() {
                if lt.kind == TokenKind::Number {
                    let (c, shape) = term_shape(r);
                    return (lt.numeric_value() * c, shape);
                }
            }
            if let Node::Atom(rt) = r.as_ref() {
                if rt.kind == TokenKind::Number {
                    let (c, shape) = term_shape(l);
                    return (rt.numeric_value() * c, shape);
                }
            }
            (1.0, TermShape::Other(node.clone()))
        }
        other => (1.0, TermShape::Other(other.clone())),
    }
}

/// Coalesce multiples of the same variable term within a single
/// additive/assignment chain. Numeric leaves are left to
/// `EvaluateConstantBinary`.
pub fn combine_like_terms(node: &mut Node) -> bool {
    let is_additive_root = matches!(node, Node::Binary(t, ..) if is_additive(t.kind) || t.kind == TokenKind::Assign);
    let mut changed = false;
    match node {
        Node::Unary(_, inner) => changed |= combine_like_terms(inner),
        Node::Binary(_, l, r) => {
            changed |= combine_like_terms(l);
            changed |= combine_like_terms(r);
        }
        Node::Atom(_) => {}
    }

    if is_additive_root {
        changed |= combine_like_terms_chain(node);
    }
    changed
}

fn combine_like_terms_chain(node: &mut Node) -> bool {
    let leaves = flatten::flatten(node);
    // One entry per distinct shape: (shape, occurrences as (path, sign, coeff)).
    let mut groups: Vec<(TermShape, Vec<(Vec<Step>, f64, f64)>)> = Vec::new();

    for leaf in &leaves {
        let leaf_node = flatten::get(node, &leaf.path);
        if flatten::numeric_leaf_value(leaf_node).is_some() {
            continue; // numeric leaves are EvaluateConstantBinary's job
        }
        let (coeff, shape) = term_shape(leaf_node);
        if let Some((_, occurrences)) = groups.iter_mut().find(|(s, _)| *s == shape) {
            occurrences.push((leaf.path.clone(), leaf.sign, coeff));
        } else {
            groups.push((shape, vec![(leaf.path.clone(), leaf.sign, coeff)]));
        }
    }

    let mut changed = false;
    for (shape, occurrences) in &groups {
        if occurrences.len() < 2 {
            continue; // a single occurrence needs no combining
        }
        let total: f64 = occurrences.iter().map(|(_, sign, coeff)| sign * coeff).sum();
        let (rep_path, rep_sign, _) = &occurrences[0];

        for (path, ..) in &occurrences[1..] {
            *flatten::get_mut(node, path) = Node::number(0.0);
        }

        // The representative's own node value, before the chain's ambient
        // sign is applied: contribution = rep_sign * node_value = total.
        let node_value = total / rep_sign;
        let base = match shape {
            TermShape::Variable(name) => Node::variable(name.clone()),
            TermShape::Other(n) => n.clone(),
        };
        let magnitude = node_value.abs();
        let new_term = if magnitude == 0.0 {
            Node::number(0.0)
        } else if magnitude == 1.0 {
            base
        } else {
            Node::Binary(Token::multiply(), Box::new(Node::number(magnitude)), Box::new(base))
        };
        let new_term = if node_value < 0.0 && magnitude != 0.0 {
            Node::Unary(Token::minus(), Box::new(new_term))
        } else {
            new_term
        };
        *flatten::get_mut(node, rep_path) = new_term;
        changed = true;
    }

    changed
}

//! Small tree utilities shared by the isolator and the solver: variable
//! containment/counting, substitution, and the solver's human-readable step
//! log. None of this rewrites structure the way a simplifier pass does; it
//! only reads or does a single targeted in-place replacement.

use std::collections::HashSet;

use crate::lexer::token::TokenKind;
use crate::parser::tree::{render_root, Node};

/// Does `node` contain an occurrence of variable `name` anywhere in its
/// subtree?
pub fn contains_var(node: &Node, name: &str) -> bool {
    match node {
        Node::Atom(t) => t.kind == TokenKind::Variable && t.lexeme == name,
        Node::Unary(_, inner) => contains_var(inner, name),
        Node::Binary(_, l, r) => contains_var(l, name) || contains_var(r, name),
    }
}

/// The set of distinct variable names in `node`.
pub fn collect_vars(node: &Node) -> HashSet<String> {
    let mut out = HashSet::new();
    collect_vars_into(node, &mut out);
    out
}

fn collect_vars_into(node: &Node, out: &mut HashSet<String>) {
    match node {
        Node::Atom(t) if t.kind == TokenKind::Variable => {
            out.insert(t.lexeme.clone());
        }
        Node::Atom(_) => {}
        Node::Unary(_, inner) => collect_vars_into(inner, out),
        Node::Binary(_, l, r) => {
            collect_vars_into(l, out);
            collect_vars_into(r, out);
        }
    }
}

/// Total count of `Variable` token occurrences (a multiset size, as opposed
/// to [`collect_vars`]'s distinct-name set).
pub fn count_var_occurrences(node: &Node) -> usize {
    match node {
        Node::Atom(t) if t.kind == TokenKind::Variable => 1,
        Node::Atom(_) => 0,
        Node::Unary(_, inner) => count_var_occurrences(inner),
        Node::Binary(_, l, r) => count_var_occurrences(l) + count_var_occurrences(r),
    }
}

/// Replace every occurrence of variable `name` in `node` with a deep copy
/// of `replacement`, in place.
pub fn substitute_var(node: &mut Node, name: &str, replacement: &Node) {
    match node {
        Node::Atom(t) if t.kind == TokenKind::Variable && t.lexeme == name => {
            *node = replacement.clone();
        }
        Node::Atom(_) => {}
        Node::Unary(_, inner) => substitute_var(inner, name, replacement),
        Node::Binary(_, l, r) => {
            substitute_var(l, name, replacement);
            substitute_var(r, name, replacement);
        }
    }
}

/// Accumulates the solver's human-readable trace: each entry is
/// `"<stage>: <equation>"` with the trailing equation paren-stripped the
/// same way a top-level result is (spec.md §4.6 "step-string recording",
/// §6 "each step's trailing equation also paren-stripped"), capped the same
/// way the solver's own search is capped so a pathological run can't
/// produce an unbounded log.
#[derive(Debug, Default)]
pub struct StepLog {
    steps: Vec<String>,
    cap: usize,
}

impl StepLog {
    pub fn new(cap: usize) -> Self {
        StepLog { steps: Vec::new(), cap }
    }

    pub fn record(&mut self, stage: &str, equation: &Node) {
        if self.steps.len() >= self.cap {
            return;
        }
        self.steps.push(format!("{stage}: {}", render_root(equation)));
    }

    pub fn into_vec(self) -> Vec<String> {
        self.steps
    }
}

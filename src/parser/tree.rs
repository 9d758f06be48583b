use crate::lexer::token::{Token, TokenKind};

/// The term tree (spec.md §3). Every node owns its children outright; clone
/// is a deep copy and equality is structural, both by `#[derive]` since
/// `Token` itself already derives `PartialEq`/`Eq`/`Hash` over `(kind,
/// lexeme)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    /// Holds nothing beyond its token; the token kind must be `Number` or
    /// `Variable`.
    Atom(Token),
    /// One child; the token kind must be `Plus`, `Minus`, or `Sqrt` (the
    /// `Sqrt` extension is documented in `SPEC_FULL.md` §3).
    Unary(Token, Box<Node>),
    /// Left and right children; the token kind is any operator kind.
    Binary(Token, Box<Node>, Box<Node>),
}

impl Node {
    pub fn number(value: f64) -> Node {
        Node::Atom(Token::number(value))
    }

    pub fn variable(name: impl Into<String>) -> Node {
        Node::Atom(Token::variable(name))
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Node::Atom(t) if t.kind == TokenKind::Number && t.numeric_value() == 0.0)
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Node::Atom(t) if t.kind == TokenKind::Number && t.numeric_value() == 1.0)
    }

    pub fn as_assign(&self) -> Option<(&Node, &Node)> {
        match self {
            Node::Binary(t, l, r) if t.kind == TokenKind::Assign => Some((l, r)),
            _ => None,
        }
    }
}

/// Render a real the way spec.md §6 prescribes: whole numbers print without
/// a fractional part; everything else prints with up to three decimals,
/// trailing zeros (and a then-bare trailing dot) trimmed.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let mut s = format!("{value:.3}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

/// Precedence level used by [`render`] to decide whether a child needs
/// parentheses (spec.md §3's binding-power table, collapsed to one rank per
/// row: `=` lowest, then `+`/`-`, then `*`/`/`/`%`, then `^` highest).
fn precedence_level(kind: TokenKind) -> u32 {
    match kind {
        TokenKind::Assign => 1,
        TokenKind::Plus | TokenKind::Minus => 2,
        TokenKind::Multiply | TokenKind::Divide | TokenKind::Modulo => 3,
        TokenKind::Power => 4,
        other => panic!("{other:?} is not a binary operator"),
    }
}

/// `*`/`/`/`%`/`^` render with no surrounding spaces when nested under a
/// looser operator (`4*a`, `x^2`); `=`/`+`/`-` always keep spaces around
/// the operator.
fn is_tight(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Multiply | TokenKind::Divide | TokenKind::Modulo | TokenKind::Power)
}

/// The minimum precedence level a `Unary` operand must have to print
/// without parentheses. `+`/`-` bind just tighter than the additive level
/// (so `-4*a` stays bare but `-(a - 2)` keeps its parens); `sqrt` reads as
/// a function call and always parenthesizes a non-atomic operand.
fn unary_operand_min_level(kind: TokenKind) -> u32 {
    match kind {
        TokenKind::Plus | TokenKind::Minus => 3,
        TokenKind::Sqrt => u32::MAX,
        other => panic!("{other:?} is not a unary operator"),
    }
}

/// A node's own precedence level as seen from a parent deciding whether to
/// parenthesize it. Atoms and unary nodes never need parentheses imposed
/// from outside, so they report the highest possible level.
fn level_of(node: &Node) -> u32 {
    match node {
        Node::Binary(t, ..) => precedence_level(t.kind),
        _ => u32::MAX,
    }
}

/// Render `node` as a child that must bind at least as tightly as
/// `min_level`, adding parentheses only when its own level falls short.
fn render_child(node: &Node, min_level: u32) -> String {
    let text = render(node);
    if level_of(node) < min_level {
        format!("({text})")
    } else {
        text
    }
}

/// Canonical textual form (spec.md §3/§6): atoms bare, unary as
/// `<op><operand>` with no space, binary as `<left> <op> <right>` with
/// parentheses added around a child only where the binding-power table
/// requires them to preserve meaning. A node rendered on its own — as the
/// whole tree, or as any child that turns out not to need wrapping — never
/// carries redundant outer parentheses; this is what makes [`render_root`]
/// equivalent to `render` (spec.md §6's "outermost parentheses stripped
/// when they wrap the entire expression" falls out of this directly,
/// rather than needing a separate stripping step). This is load-bearing —
/// the solver uses it as a canonical key for already-seen equations.
pub fn render(node: &Node) -> String {
    match node {
        Node::Atom(t) if t.kind == TokenKind::Number => format_number(t.numeric_value()),
        Node::Atom(t) => t.lexeme.clone(),
        Node::Unary(t, inner) => {
            let min_level = unary_operand_min_level(t.kind);
            format!("{}{}", t.kind.operator_symbol(), render_child(inner, min_level))
        }
        Node::Binary(t, l, r) => {
            let level = precedence_level(t.kind);
            let (lbp, rbp) = t.kind.binary_binding_power().expect("binary token");
            let right_associative = rbp < lbp;
            let left_min = if right_associative { level + 1 } else { level };
            let right_min = if right_associative { level } else { level + 1 };
            let left_text = render_child(l, left_min);
            let right_text = render_child(r, right_min);
            let symbol = t.kind.operator_symbol();
            if is_tight(t.kind) {
                format!("{left_text}{symbol}{right_text}")
            } else {
                format!("{left_text} {symbol} {right_text}")
            }
        }
    }
}

/// Same as [`render`] — kept as a separate name because callers reach for
/// "the canonical text of a whole equation or expression" at the API
/// boundary (spec.md §6), while [`render`] is also the name used
/// recursively for every child. The two coincide because a precedence-aware
/// renderer never wraps its own top node in parentheses to begin with.
pub fn render_root(node: &Node) -> String {
    render(node)
}

use std::fmt;

/// The error taxonomy for the whole engine (spec.md §7). Every fallible
/// operation in this crate returns `Result<_, CasError>`; nothing is
/// retried and nothing is silently swallowed.
#[derive(Debug, Clone, PartialEq)]
pub enum CasError {
    /// An input byte could not be classified as digit, letter, operator,
    /// parenthesis, or whitespace.
    Lex(String),
    /// The token stream did not match the grammar (unexpected token,
    /// unmatched parenthesis).
    Parse(String),
    /// A top-level operation required an `=`-rooted tree and didn't get one.
    NotAnEquation,
    /// A literal division by zero was encountered during constant folding
    /// or identity reduction.
    DivByZero,
    /// A fixpoint exceeded its iteration cap.
    NotConverged,
    /// The solver needed a value for this variable but no equation defines it.
    CannotDerive(String),
    /// An operator has no rewrite rule in a context that required one.
    Unsupported(String),
}

impl fmt::Display for CasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CasError::Lex(msg) => write!(f, "lex error: {msg}"),
            CasError::Parse(msg) => write!(f, "parse error: {msg}"),
            CasError::NotAnEquation => write!(f, "expected an equation rooted at '='"),
            CasError::DivByZero => write!(f, "division by zero"),
            CasError::NotConverged => write!(f, "rewrite did not converge within the iteration cap"),
            CasError::CannotDerive(var) => write!(f, "cannot derive a value for '{var}'"),
            CasError::Unsupported(op) => write!(f, "unsupported operator in this context: '{op}'"),
        }
    }
}

impl std::error::Error for CasError {}

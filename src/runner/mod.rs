//! The three external entry points (spec.md §6): `simplify`, `isolate`, and
//! `solve`, each taking and returning plain text. A thin string-in/string-out
//! layer over parse-then-run, with no state of its own beyond what a single
//! call needs. No file or environment-variable reads live here (spec.md §6:
//! "No files are read. No environment variables are read.") — that's left
//! entirely to `main.rs`, the one binary-level concern allowed to touch
//! `std::env`/`std::fs`.

use crate::config::Config;
use crate::error::CasError;
use crate::isolator;
use crate::parser::tree::render_root;
use crate::parser::Parser;
use crate::simplifier;
use crate::solver::{self, SolveOutput};

/// Parse `expr`, simplify to a fixpoint, and render the result.
pub fn simplify(expr: &str, config: &Config) -> Result<String, CasError> {
    let node = Parser::new(expr).parse()?;
    let simplified = simplifier::simplify(node, config)?;
    Ok(render_root(&simplified))
}

/// Parse `equation`, isolate `variable`, and render the result. Fails with
/// `NotAnEquation` if `equation`'s root is not `=`, or `Unsupported` if no
/// pass can move `variable` fully onto the left side (e.g. it only occurs
/// under `^`, which the isolator declares out of scope) — spec.md §4.5
/// leaves this check to the caller, the same way `solver::derive` does it
/// internally.
pub fn isolate(equation: &str, variable: &str, config: &Config) -> Result<String, CasError> {
    let node = Parser::new(equation).parse()?;
    let isolated = isolator::isolate(&node, variable, config)?;
    let simplified = simplifier::simplify(isolated, config)?;
    if !isolator::is_isolated(&simplified, variable) {
        return Err(CasError::Unsupported(format!("cannot isolate '{variable}' in this equation")));
    }
    Ok(render_root(&simplified))
}

/// Parse every equation in `equations`, then solve for `variable`.
pub fn solve(equations: &[&str], variable: &str, config: &Config) -> Result<SolveOutput, CasError> {
    let nodes: Result<Vec<_>, CasError> = equations.iter().map(|src| Parser::new(src).parse()).collect();
    let nodes = nodes?;
    for node in &nodes {
        if node.as_assign().is_none() {
            return Err(CasError::NotAnEquation);
        }
    }
    solver::solve(&nodes, variable, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simplify_strips_outer_parens() {
        let config = Config::default();
        assert_eq!(simplify("2 + 3 * (4 - 1) - 4*(a - 2)", &config).unwrap(), "19 - 4*a");
    }

    #[test]
    fn isolate_rejects_non_equation() {
        let config = Config::default();
        let err = isolate("3 + 2", "x", &config).unwrap_err();
        assert_eq!(err, CasError::NotAnEquation);
    }

    #[test]
    fn isolate_reports_unsupported_when_no_pass_can_move_the_target() {
        let config = Config::default();
        let err = isolate("x^2 = 4", "x", &config).unwrap_err();
        assert!(matches!(err, CasError::Unsupported(_)));
    }

    #[test]
    fn solve_rejects_non_equation() {
        let config = Config::default();
        let err = solve(&["3 + 2"], "x", &config).unwrap_err();
        assert_eq!(err, CasError::NotAnEquation);
    }

    #[test]
    fn solve_two_equations() {
        let config = Config::default();
        let out = solve(&["x + y = 3", "x - y = 10"], "x", &config).unwrap();
        assert_eq!(out.result, "x = 6.5");
        assert!(!out.steps.is_empty());
    }
}

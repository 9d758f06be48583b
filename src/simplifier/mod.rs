//! The simplifier: a fixpoint of the eight ordered rewrite passes in
//! `passes.rs` (spec.md §4.4), run in order and repeated until a full
//! round leaves every pass reporting no change.

pub mod flatten;
pub mod passes;

use log::{debug, trace};

use crate::config::Config;
use crate::error::CasError;
use crate::parser::tree::Node;

/// Run every rewrite pass in spec.md §4.4's order once, returning whether
/// any pass reported a change.
fn run_one_iteration(node: &mut Node) -> Result<bool, CasError> {
    let mut changed = false;

    changed |= passes::reduce_unary(node);
    trace!("ReduceUnary changed={changed}");

    let step = passes::distribute_minus_over_binary(node);
    changed |= step;
    trace!("DistributeMinusOverBinary changed={step}");

    let step = passes::merge_binary_with_right_unary(node);
    changed |= step;
    trace!("MergeBinaryWithRightUnary changed={step}");

    let step = passes::distribute_multiply_over_additive(node);
    changed |= step;
    trace!("DistributeMultiplyOverAdditive changed={step}");

    let step = passes::evaluate_constant_binary(node)?;
    changed |= step;
    trace!("EvaluateConstantBinary changed={step}");

    let step = passes::evaluate_special_cases(node)?;
    changed |= step;
    trace!("EvaluateSpecialCases changed={step}");

    let step = passes::separate_into_unary(node);
    changed |= step;
    trace!("SeparateIntoUnary changed={step}");

    let step = passes::combine_like_terms(node);
    changed |= step;
    trace!("CombineLikeTerms changed={step}");

    Ok(changed)
}

/// Rewrite `node` to a fixpoint of the eight passes, failing with
/// `NotConverged` if no fixpoint is reached within `config.max_iterations`
/// (spec.md §4.4.2).
pub fn simplify(mut node: Node, config: &Config) -> Result<Node, CasError> {
    for iteration in 0..config.max_iterations {
        let changed = run_one_iteration(&mut node)?;
        debug!("simplify iteration {iteration} changed={changed}");
        if !changed {
            return Ok(node);
        }
    }
    Err(CasError::NotConverged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::parser::tree::render_root;

    fn simplify_text(src: &str) -> String {
        let node = Parser::new(src).parse().expect("parse");
        let simplified = simplify(node, &Config::default()).expect("simplify");
        render_root(&simplified)
    }

    #[test]
    fn scenario_one() {
        assert_eq!(simplify_text("2 + 3 * (4 - 1) - 4*(a - 2)"), "19 - 4*a");
    }

    #[test]
    fn scenario_two() {
        assert_eq!(simplify_text("-(3 + -(-2)) + +4 - -(-1)"), "-2");
    }

    #[test]
    fn scenario_three() {
        assert_eq!(simplify_text("2*x + 3*x - y + 4 - 1 + y - 2 + 3"), "5*x + 4");
    }

    #[test]
    fn reduce_unary_parity() {
        assert_eq!(simplify_text("+x"), "x");
        assert_eq!(simplify_text("--x"), "x");
        assert_eq!(simplify_text("-+-x"), "x");
        assert_eq!(simplify_text("-+--x"), "-x");
    }

    #[test]
    fn div_by_zero_is_an_error() {
        let node = Parser::new("1/0").parse().expect("parse");
        let err = simplify(node, &Config::default()).unwrap_err();
        assert_eq!(err, CasError::DivByZero);
    }

    #[test]
    fn idempotent_under_repeated_simplify() {
        let node = Parser::new("2 + 3 * (4 - 1) - 4*(a - 2)").parse().expect("parse");
        let once = simplify(node, &Config::default()).expect("simplify");
        let twice = simplify(once.clone(), &Config::default()).expect("simplify again");
        assert_eq!(render_root(&once), render_root(&twice));
    }
}

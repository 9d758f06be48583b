//! The equation solver: a best-first substitution search over a priority
//! queue of candidate equations (spec.md §4.6). Simplify and isolate are
//! used here purely as black boxes, the same way
//! `examples/yokurang-crafting-interpreters-rs`'s `interpreter` module
//! treats the `environment` module as a black box for variable storage —
//! the search loop never reaches into either's internals.

pub mod normalize;

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

use log::{debug, trace};

use crate::config::Config;
use crate::error::CasError;
use crate::isolator;
use crate::parser::tree::{render_root, Node};
use crate::simplifier;
use crate::utils::{collect_vars, contains_var, count_var_occurrences, substitute_var, StepLog};

/// `solve`'s return value (spec.md §6): the resolved equation's text and
/// the human-readable trace of how it was reached.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutput {
    pub result: String,
    pub steps: Vec<String>,
}

struct QueueEntry {
    equation: Node,
    distinct_vars: usize,
    occurrences: usize,
    order: usize,
    /// `var -> canonical text of the isolated form already substituted for
    /// it on this path`, so a path never substitutes the same derivation
    /// for the same variable twice and cycles forever.
    used: HashMap<String, String>,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.distinct_vars == other.distinct_vars && self.occurrences == other.occurrences && self.order == other.order
    }
}
impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Fewer distinct variables wins; ties broken by fewer total occurrences;
/// ties broken by insertion order (spec.md §4.6 step 4, and §5's
/// reproducibility requirement that ties break by insertion order).
impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distinct_vars
            .cmp(&other.distinct_vars)
            .then(self.occurrences.cmp(&other.occurrences))
            .then(self.order.cmp(&other.order))
    }
}

/// The growing set of known equations, indexed by the variables they
/// mention, so a derivation for `u` can look up every other equation that
/// might define it (spec.md §4.6 step 2). Newly derived equations are
/// folded back in as they're produced, per the same step.
#[derive(Default)]
struct EquationIndex {
    pool: Vec<Node>,
    by_var: HashMap<String, Vec<usize>>,
}

impl EquationIndex {
    fn insert(&mut self, equation: Node) -> usize {
        let id = self.pool.len();
        for var in collect_vars(&equation) {
            self.by_var.entry(var).or_default().push(id);
        }
        self.pool.push(equation);
        id
    }

    fn equations_for(&self, var: &str) -> impl Iterator<Item = (usize, &Node)> {
        self.by_var.get(var).into_iter().flatten().map(|&id| (id, &self.pool[id]))
    }
}

fn entry_key(node: &Node, order: usize, used: HashMap<String, String>) -> QueueEntry {
    QueueEntry {
        distinct_vars: collect_vars(node).len(),
        occurrences: count_var_occurrences(node),
        order,
        equation: node.clone(),
        used,
    }
}

/// Try to isolate `var` out of `source` and confirm the isolation actually
/// succeeded (spec.md §4.5: callers must verify structurally).
fn derive(source: &Node, var: &str, config: &Config) -> Result<Option<Node>, CasError> {
    let isolated = isolator::isolate(source, var, config)?;
    let simplified = simplifier::simplify(isolated, config)?;
    if isolator::is_isolated(&simplified, var) {
        Ok(Some(simplified))
    } else {
        Ok(None)
    }
}

/// Solve for `target` given `equations`, each `=`-rooted (spec.md §4.6).
pub fn solve(equations: &[Node], target: &str, config: &Config) -> Result<SolveOutput, CasError> {
    let mut steps = StepLog::new(config.max_iterations_execute_steps);
    let mut index = EquationIndex::default();
    let mut heap: BinaryHeap<Reverse<QueueEntry>> = BinaryHeap::new();
    let mut order_counter = 0usize;

    for equation in equations {
        let normalized = normalize::normalize(equation, config)?;
        steps.record("normalize", &normalized);
        let id = index.insert(normalized.clone());
        if collect_vars(&index.pool[id]).contains(target) {
            heap.push(Reverse(entry_key(&index.pool[id], order_counter, HashMap::new())));
            order_counter += 1;
        }
    }

    if !index.by_var.contains_key(target) {
        return Err(CasError::CannotDerive(target.to_string()));
    }

    let mut visited: HashSet<String> = HashSet::new();
    let mut best_distinct = usize::MAX;
    let mut since_improvement = 0usize;
    let mut pops = 0usize;

    while let Some(Reverse(entry)) = heap.pop() {
        pops += 1;
        if pops > config.max_iterations_converge_solve {
            return Err(CasError::NotConverged);
        }

        let key = render_root(&entry.equation);
        if visited.contains(&key) {
            continue;
        }
        visited.insert(key);

        if entry.distinct_vars < best_distinct {
            best_distinct = entry.distinct_vars;
            since_improvement = 0;
        } else {
            since_improvement += 1;
            if since_improvement > config.max_iterations_without_improvement {
                return Err(CasError::NotConverged);
            }
        }

        trace!("pop distinct={} occurrences={}", entry.distinct_vars, entry.occurrences);
        steps.record("consider", &entry.equation);

        if entry.distinct_vars == 1 && contains_var(&entry.equation, target) {
            let isolated = isolator::isolate(&entry.equation, target, config)?;
            let result = simplifier::simplify(isolated, config)?;
            if !isolator::is_isolated(&result, target) {
                continue;
            }
            steps.record("isolate", &result);
            debug!("solved for '{target}' after {pops} pops");
            return Ok(SolveOutput { result: render_root(&result), steps: steps.into_vec() });
        }

        if entry.distinct_vars == 1 {
            // The one variable present is some `u != target`: derive its
            // value and fold it into every equation that still mentions
            // the real target, hoping to shrink one of those down to a
            // single occurrence of `target` itself.
            let u = collect_vars(&entry.equation).into_iter().next().expect("distinct_vars == 1");
            let Some(derived) = derive(&entry.equation, &u, config)? else { continue };
            let (_, value) = derived.as_assign().expect("derive() only returns isolated equations");
            steps.record("isolate", &derived);
            index.insert(derived.clone());

            let previous_candidates: Vec<(usize, Node)> =
                index.equations_for(target).map(|(id, eq)| (id, eq.clone())).collect();
            for (_, candidate) in previous_candidates {
                if !contains_var(&candidate, &u) {
                    continue;
                }
                let previous_distinct = collect_vars(&candidate).len();
                let mut substituted = candidate.clone();
                substitute_var(&mut substituted, &u, value);
                let substituted = simplifier::simplify(substituted, config)?;
                let new_distinct = collect_vars(&substituted).len();
                if new_distinct >= previous_distinct {
                    continue; // spec.md §4.6 step 6: push only on strict improvement
                }
                steps.record("substitute", &substituted);
                let mut used = entry.used.clone();
                used.insert(u.clone(), render_root(value));
                index.insert(substituted.clone());
                heap.push(Reverse(entry_key(&substituted, order_counter, used)));
                order_counter += 1;
            }
            continue;
        }

        // More than one variable remains: for each non-target variable in
        // this entry, pull in a derivation from some other equation and
        // substitute it in, bounded so the search doesn't blow up.
        let vars_here: Vec<String> = collect_vars(&entry.equation).into_iter().filter(|v| v != target).collect();
        let previous_distinct = entry.distinct_vars;

        for u in vars_here {
            let candidates: Vec<(usize, Node)> = index
                .equations_for(&u)
                .map(|(id, eq)| (id, eq.clone()))
                .filter(|(_, other)| render_root(other) != render_root(&entry.equation))
                .collect();
            if candidates.is_empty() {
                return Err(CasError::CannotDerive(u));
            }
            for (_, other) in candidates {
                let Some(derived) = derive(&other, &u, config)? else { continue };
                let (_, value) = derived.as_assign().expect("derive() only returns isolated equations");
                let value_text = render_root(value);
                if entry.used.get(&u) == Some(&value_text) {
                    continue; // already used this exact substitution on this path
                }

                steps.record("isolate", &derived);
                index.insert(derived.clone());

                let mut substituted = entry.equation.clone();
                substitute_var(&mut substituted, &u, value);
                let substituted = simplifier::simplify(substituted, config)?;
                let new_distinct = collect_vars(&substituted).len();
                let limit = (previous_distinct as f64) * config.limit_ratio_new_distinct_vars;
                if (new_distinct as f64) > limit {
                    continue;
                }

                steps.record("substitute", &substituted);
                let mut used = entry.used.clone();
                used.insert(u.clone(), value_text);
                index.insert(substituted.clone());
                heap.push(Reverse(entry_key(&substituted, order_counter, used)));
                order_counter += 1;
            }
        }
    }

    Err(CasError::NotConverged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn parse_all(sources: &[&str]) -> Vec<Node> {
        sources.iter().map(|s| Parser::new(s).parse().expect("parse")).collect()
    }

    #[test]
    fn scenario_five_two_equations() {
        let config = Config::default();
        let equations = parse_all(&["x + y = 3", "x - y = 10"]);
        let result = solve(&equations, "x", &config).expect("solve");
        assert_eq!(result.result, "x = 6.5");
    }

    #[test]
    fn scenario_six_chained_substitution() {
        let config = Config::default();
        let equations = parse_all(&["x + a = b*c", "a = b + 2", "c = 3", "b = 4"]);
        let result = solve(&equations, "x", &config).expect("solve");
        assert_eq!(result.result, "x = 6");
    }

    #[test]
    fn cannot_derive_missing_variable() {
        // "x" is present, but solving for it needs "y" eliminated first, and
        // no other equation defines "y".
        let config = Config::default();
        let equations = parse_all(&["x + y = 1"]);
        let err = solve(&equations, "x", &config).unwrap_err();
        assert_eq!(err, CasError::CannotDerive("y".to_string()));
    }
}

/// Process-wide tunable limits (spec.md §6). This is a plain value, not a
/// singleton: spec.md §9 is explicit that the configuration record should be
/// threaded through as an explicit parameter rather than hidden behind a
/// global. Every constructor in `simplifier`, `isolator`, and `solver` takes
/// a `&Config`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Cap on simplifier/isolator rewrite fixpoint iterations.
    pub max_iterations: usize,
    /// Cap on steps recorded while replaying a solve for its step log.
    pub max_iterations_execute_steps: usize,
    /// Cap on total priority-queue pops during equation solving.
    pub max_iterations_converge_solve: usize,
    /// Cap on pops since the last strict improvement in best-known
    /// distinct-variable count before giving up.
    pub max_iterations_without_improvement: usize,
    /// A substitution is only pushed if the distinct-variable count grows
    /// by at most this ratio relative to the previous entry.
    pub limit_ratio_new_distinct_vars: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_iterations: 100,
            max_iterations_execute_steps: 100,
            max_iterations_converge_solve: 1000,
            max_iterations_without_improvement: 100,
            limit_ratio_new_distinct_vars: 1.2,
        }
    }
}

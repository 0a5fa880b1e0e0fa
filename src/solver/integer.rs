use super::{check_columns, into_solution, Covering, Solution, Solver};
use crate::pattern::Pattern;
use crate::Result;

/// Upper bound on how often a single pattern can be used.
const MAX_USAGE: i32 = 9999;

/// Solves the covering problem with integer usages using branch and bound.
///
/// Each jumbo used adds `1 / patterns.len()` to the objective, so among plans with the same waste
/// the one slitting fewer jumbos wins. This tie-breaker is not part of the reported waste.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntegerSolver;

impl IntegerSolver {
    /// Create an integer solver.
    pub fn new() -> Self {
        IntegerSolver
    }
}

impl Solver for IntegerSolver {
    fn name(&self) -> &'static str {
        "integer"
    }

    fn solve(
        &self,
        coefficients: &[f64],
        patterns: &[Pattern],
        widths: &[u32],
        demand: &[u32],
    ) -> Result<Solution> {
        check_columns(coefficients, patterns, widths, demand)?;

        let penalty = 1.0 / patterns.len().max(1) as f64;
        let used = Covering::new(coefficients, patterns, demand, |problem, c| {
            problem.add_integer_var(c + penalty, (0, MAX_USAGE))
        })
        .solve(self.name(), f64::round)?;

        Ok(into_solution(coefficients, patterns, used))
    }
}

use super::{check_columns, into_solution, Covering, Solution, Solver};
use crate::pattern::Pattern;
use crate::Result;

/// Solves the continuous relaxation with the simplex method. Usages may be fractional.
#[derive(Clone, Copy, Debug, Default)]
pub struct RelaxedSolver;

impl RelaxedSolver {
    /// Create a relaxed solver.
    pub fn new() -> Self {
        RelaxedSolver
    }
}

impl Solver for RelaxedSolver {
    fn name(&self) -> &'static str {
        "relaxed"
    }

    fn solve(
        &self,
        coefficients: &[f64],
        patterns: &[Pattern],
        widths: &[u32],
        demand: &[u32],
    ) -> Result<Solution> {
        check_columns(coefficients, patterns, widths, demand)?;

        let used = Covering::new(coefficients, patterns, demand, |problem, c| {
            problem.add_var(c, (0.0, f64::INFINITY))
        })
        .solve(self.name(), |usage| usage)?;

        Ok(into_solution(coefficients, patterns, used))
    }
}

//! Selection of patterns: covering linear programs over a pool of candidate patterns.
//!
//! Every solver uses the same formulation. Variable `x_j` is how many jumbos are slit with
//! pattern `j`. For every width `i` the patterns must supply at least the demand,
//! `sum_j x_j * patterns[j][i] >= demand[i]`, and the objective `sum_j coefficients[j] * x_j`
//! is minimized. Over-supply is allowed.

mod integer;
mod relaxed;

pub use integer::IntegerSolver;
pub use relaxed::RelaxedSolver;

use crate::pattern::Pattern;
use crate::{Error, Result};
use microlp::{ComparisonOp, OptimizationDirection, Problem, Variable};
use uuid::Uuid;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A pattern selected by a solver, and how many jumbos to slit with it.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct PatternUsage {
    /// Number of jumbos slit with this pattern. Fractional for relaxed solutions.
    pub usage: f64,

    /// The pattern.
    pub pattern: Pattern,
}

/// The outcome of one solve.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug)]
pub struct Solution {
    id: Uuid,
    waste: f64,
    patterns: Vec<PatternUsage>,
}

impl Solution {
    pub(crate) fn new(waste: f64, patterns: Vec<PatternUsage>) -> Self {
        Self {
            id: Uuid::new_v4(),
            waste,
            patterns,
        }
    }

    /// Identifier of this solution, unique per solve.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Objective value of the solve: the total weighted waste of the selected patterns.
    pub fn waste(&self) -> f64 {
        self.waste
    }

    /// Selected patterns. Patterns the solver didn't use are left out.
    pub fn patterns(&self) -> &[PatternUsage] {
        &self.patterns
    }

    /// Number of distinct patterns selected.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Total number of pieces of the `i`th width the selected patterns produce.
    pub fn supplied(&self, i: usize) -> f64 {
        self.patterns
            .iter()
            .map(|p| p.usage * p.pattern.counts().get(i).copied().unwrap_or(0) as f64)
            .sum()
    }
}

/// Chooses how often to use each candidate pattern so that demand is covered at the lowest cost.
pub trait Solver {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Solve the covering problem.
    ///
    /// `coefficients` and `patterns` are index-aligned columns, and every pattern as well as
    /// `demand` are indexed like `widths`.
    fn solve(
        &self,
        coefficients: &[f64],
        patterns: &[Pattern],
        widths: &[u32],
        demand: &[u32],
    ) -> Result<Solution>;
}

/// Values below this are treated as an unused pattern.
const USAGE_EPSILON: f64 = 1e-9;

/// Checks that the inputs of a solve line up, and that every demanded width appears in at least
/// one pattern.
fn check_columns(
    coefficients: &[f64],
    patterns: &[Pattern],
    widths: &[u32],
    demand: &[u32],
) -> Result<()> {
    if coefficients.len() != patterns.len() {
        return Err(Error::LengthMismatch {
            name: "coefficients",
            expected: patterns.len(),
            found: coefficients.len(),
        });
    }
    if demand.len() != widths.len() {
        return Err(Error::LengthMismatch {
            name: "demand",
            expected: widths.len(),
            found: demand.len(),
        });
    }
    if let Some(pattern) = patterns.iter().find(|p| p.len() != widths.len()) {
        return Err(Error::LengthMismatch {
            name: "pattern",
            expected: widths.len(),
            found: pattern.len(),
        });
    }

    for (index, (&width, &quantity)) in widths.iter().zip(demand).enumerate() {
        if quantity > 0 && patterns.iter().all(|p| p.counts()[index] == 0) {
            return Err(Error::UncoverableWidth { index, width });
        }
    }

    Ok(())
}

/// The covering program, with one variable per pattern.
struct Covering {
    problem: Problem,
    vars: Vec<Variable>,
}

impl Covering {
    /// Builds the covering constraints. `add_var` creates the variable of column `j` with the
    /// given objective coefficient.
    fn new<F>(coefficients: &[f64], patterns: &[Pattern], demand: &[u32], mut add_var: F) -> Self
    where
        F: FnMut(&mut Problem, f64) -> Variable,
    {
        let mut problem = Problem::new(OptimizationDirection::Minimize);
        let vars: Vec<Variable> = coefficients
            .iter()
            .map(|&c| add_var(&mut problem, c))
            .collect();

        for (i, &quantity) in demand.iter().enumerate() {
            if quantity == 0 {
                continue;
            }
            let terms: Vec<(Variable, f64)> = patterns
                .iter()
                .zip(&vars)
                .filter(|(p, _)| p.counts()[i] > 0)
                .map(|(p, &var)| (var, p.counts()[i] as f64))
                .collect();
            problem.add_constraint(terms, ComparisonOp::Ge, quantity as f64);
        }

        Self { problem, vars }
    }

    /// Solves the program and returns the index and value of every used column. `round` is
    /// applied to each value before it is checked for usage.
    fn solve(self, solver: &'static str, round: fn(f64) -> f64) -> Result<Vec<(usize, f64)>> {
        if self.vars.is_empty() {
            return Ok(Vec::new());
        }

        let solution = self
            .problem
            .solve()
            .map_err(|source| Error::NoOptimalSolution { solver, source })?;

        Ok(self
            .vars
            .iter()
            .enumerate()
            .map(|(j, &var)| (j, round(solution[var])))
            .filter(|&(_, usage)| usage > USAGE_EPSILON)
            .collect())
    }
}

/// Builds a solution from the used columns. The waste is weighed with `coefficients`, so any
/// extra objective terms a solver added don't show up in it.
fn into_solution(coefficients: &[f64], patterns: &[Pattern], used: Vec<(usize, f64)>) -> Solution {
    let waste: f64 = used.iter().map(|&(j, usage)| coefficients[j] * usage).sum();
    let patterns = used
        .into_iter()
        .map(|(j, usage)| PatternUsage {
            usage,
            pattern: patterns[j].clone(),
        })
        .collect();
    Solution::new(waste, patterns)
}

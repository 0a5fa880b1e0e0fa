//! slit-optimizer-1d computes slitting plans for jumbo rolls: which patterns of narrow widths to
//! cut from a fixed-width jumbo, and how many times to run each one, so that the demand for every
//! width is covered with as little trim waste as possible.
//! Candidate patterns come from heuristic generators (greedy, genetic and firefly search), and a
//! pipeline of linear and integer programs selects among them.

#![deny(missing_docs)]

mod generator;
mod history;
mod pattern;
mod pipeline;
mod solver;

#[cfg(test)]
mod tests;

pub use generator::{
    FireflyGenerator, GeneratedPattern, GeneticGenerator, GreedyGenerator, PatternGenerator,
};
pub use history::History;
pub use pattern::{Instance, Pattern};
pub use pipeline::SolverPipeline;
pub use solver::{IntegerSolver, PatternUsage, RelaxedSolver, Solution, Solver};

use fnv::FnvHashMap;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A width that needs to be slit from the jumbo, together with how many pieces of it are needed.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WidthDemand {
    /// Width of the piece.
    pub width: u32,

    /// Number of pieces of this width that are required.
    pub quantity: u32,
}

/// Limits of the slitting machine.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SetupLimits {
    /// Usable width of the jumbo roll.
    pub max_jumbo_length: u32,

    /// Maximum number of pieces a single pattern may contain.
    pub max_knives: u32,
}

/// Demand rows and setup limits for one optimization.
///
/// Rows are kept as they were added, so the same width may appear on several rows. Quantities of
/// equal widths are summed when the demand is turned into an [`Instance`].
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug)]
pub struct Demand {
    rows: Vec<WidthDemand>,
    limits: SetupLimits,
}

impl Demand {
    /// Create an empty demand for a machine with the given limits.
    pub fn new(limits: SetupLimits) -> Self {
        Self {
            rows: Vec::new(),
            limits,
        }
    }

    /// Add a demand row.
    pub fn add_width(&mut self, width_demand: WidthDemand) -> &mut Self {
        self.rows.push(width_demand);
        self
    }

    /// Add several demand rows.
    pub fn add_widths<I>(&mut self, width_demands: I) -> &mut Self
    where
        I: IntoIterator<Item = WidthDemand>,
    {
        width_demands.into_iter().for_each(|wd| {
            self.add_width(wd);
        });
        self
    }

    /// Replace the setup limits.
    pub fn set_limits(&mut self, limits: SetupLimits) -> &mut Self {
        self.limits = limits;
        self
    }

    /// The setup limits.
    pub fn limits(&self) -> SetupLimits {
        self.limits
    }

    /// The demand rows in insertion order.
    pub fn rows(&self) -> &[WidthDemand] {
        &self.rows
    }

    /// One width per demand row, in insertion order.
    pub fn raw_widths(&self) -> Vec<u32> {
        self.rows.iter().map(|row| row.width).collect()
    }

    /// Total quantity per unique width.
    pub fn unique_demand(&self) -> FnvHashMap<u32, u32> {
        let mut unique: FnvHashMap<u32, u32> = FnvHashMap::default();
        for row in &self.rows {
            *unique.entry(row.width).or_insert(0) += row.quantity;
        }
        unique
    }
}

/// Error while optimizing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The demand or the setup limits can't be optimized.
    #[error("invalid demand: {0}")]
    InvalidDemand(String),

    /// Solver inputs that should be index-aligned have different lengths.
    #[error("{name} has {found} entries, expected {expected}")]
    LengthMismatch {
        /// Which input is misaligned.
        name: &'static str,
        /// Expected number of entries.
        expected: usize,
        /// Actual number of entries.
        found: usize,
    },

    /// No candidate pattern contains a width that has demand, so the demand can't be covered.
    #[error("no pattern supplies width {width} (index {index})")]
    UncoverableWidth {
        /// Index of the width in the instance's width ordering.
        index: usize,
        /// The width that can't be covered.
        width: u32,
    },

    /// The solver didn't find an optimal solution.
    #[error("{solver} solver found no optimal solution: {source}")]
    NoOptimalSolution {
        /// Name of the solver that failed.
        solver: &'static str,
        /// Error reported by the LP backend.
        #[source]
        source: microlp::Error,
    },

    /// A heuristic generator gave up without producing a valid population.
    #[error("{generator} generator did not converge after {attempts} attempts")]
    ConvergenceFailure {
        /// Name of the generator that gave up.
        generator: &'static str,
        /// Number of attempts that were made.
        attempts: usize,
    },

    /// The pipeline was run without any solver stage.
    #[error("pipeline has no solver stages")]
    NoSolverStages,
}

impl Error {
    /// Returns whether this error means the selected patterns can't cover the demand, as opposed
    /// to invalid input or a generator failure.
    pub fn is_infeasible(&self) -> bool {
        matches!(
            self,
            Error::UncoverableWidth { .. } | Error::NoOptimalSolution { .. }
        )
    }
}

type Result<T> = std::result::Result<T, Error>;

//! Heuristics that propose candidate slitting patterns.

mod firefly;
mod genetic;
mod greedy;

pub use firefly::FireflyGenerator;
pub use genetic::GeneticGenerator;
pub use greedy::GreedyGenerator;

use crate::pattern::{Instance, Pattern};
use crate::Result;
use rand::rngs::StdRng;

/// A pattern proposed by a [`PatternGenerator`] and the jumbo length it leaves unused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedPattern {
    /// The proposed pattern, indexed by the instance's width ordering.
    pub pattern: Pattern,

    /// Unused jumbo length.
    pub waste: u32,
}

impl GeneratedPattern {
    /// The pattern without any pieces, which wastes the whole jumbo.
    pub(crate) fn empty(instance: &Instance) -> Self {
        Self {
            pattern: Pattern::zeros(instance.len()),
            waste: instance.max_jumbo_length(),
        }
    }
}

/// Proposes one candidate pattern per call.
///
/// Implementations keep no state between calls; all randomness comes from `rng`. Returned
/// patterns have one entry per unique width of `instance`, fit within the jumbo, and use at most
/// `max_knives` pieces.
pub trait PatternGenerator {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Generate one pattern.
    fn generate_pattern(&self, instance: &Instance, rng: &mut StdRng) -> Result<GeneratedPattern>;
}

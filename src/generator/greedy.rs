use super::{GeneratedPattern, PatternGenerator};
use crate::pattern::Instance;
use crate::Result;
use rand::prelude::*;
use rand::seq::SliceRandom;
use smallvec::SmallVec;

const DEFAULT_KNIFE_CAP: u32 = 9;

/// Fills a jumbo with the demand rows in random order, taking every width that still fits.
#[derive(Clone, Debug)]
pub struct GreedyGenerator {
    knife_cap: u32,
}

impl Default for GreedyGenerator {
    fn default() -> Self {
        Self {
            knife_cap: DEFAULT_KNIFE_CAP,
        }
    }
}

impl GreedyGenerator {
    /// Create a greedy generator with the default knife cap of 9.
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the maximum number of pieces the generator places, regardless of the machine's knife
    /// limit. The lower of the two applies.
    pub fn set_knife_cap(&mut self, knife_cap: u32) -> &mut Self {
        self.knife_cap = knife_cap;
        self
    }
}

impl PatternGenerator for GreedyGenerator {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn generate_pattern(&self, instance: &Instance, rng: &mut StdRng) -> Result<GeneratedPattern> {
        let knives = self.knife_cap.min(instance.max_knives()) as usize;
        if knives == 0 {
            return Ok(GeneratedPattern::empty(instance));
        }

        let mut widths = instance.raw_widths().to_vec();
        widths.shuffle(rng);

        let mut remaining = instance.max_jumbo_length();
        let mut accepted: SmallVec<[u32; 16]> = SmallVec::new();
        for width in widths {
            if accepted.len() == knives {
                break;
            }
            if width <= remaining {
                accepted.push(width);
                remaining -= width;
            }
        }

        let pattern = instance.pattern_from_widths(accepted);
        log::trace!("greedy pattern {:?} wastes {}", pattern.counts(), remaining);

        Ok(GeneratedPattern {
            pattern,
            waste: remaining,
        })
    }
}

use super::{GeneratedPattern, PatternGenerator};
use crate::pattern::{Instance, Pattern};
use crate::Result;
use rand::prelude::*;

const DEFAULT_POPULATION_SIZE: usize = 50;
const DEFAULT_GENERATIONS: usize = 20;
const DEFAULT_BASE_ATTRACTIVENESS: f64 = 1.0;
const DEFAULT_ABSORPTION: f64 = 0.2;

#[derive(Clone, Debug)]
struct Firefly {
    pattern: Pattern,
    intensity: f64,
    used_length: u64,
}

impl Firefly {
    fn new(pattern: Pattern, instance: &Instance) -> Self {
        let mut firefly = Self {
            pattern,
            intensity: 0.0,
            used_length: 0,
        };
        firefly.update_intensity(instance);
        firefly
    }

    fn update_intensity(&mut self, instance: &Instance) {
        let max_jumbo_length = instance.max_jumbo_length() as f64;
        let max_knives = instance.max_knives();
        let used = instance.used_length(&self.pattern);
        let knives = self.pattern.knives();
        self.used_length = used;

        self.intensity = if knives > max_knives {
            0.0
        } else if used as f64 > max_jumbo_length {
            // Overfull patterns still glow a little, more so when they are nearly feasible and
            // mix several widths.
            let diversity = self.pattern.counts().iter().filter(|&&c| c > 0).count() as f64;
            (used as f64 / (used as f64 - max_jumbo_length)) * (diversity / max_knives as f64)
        } else {
            used as f64
        };
    }

    fn is_feasible(&self, instance: &Instance) -> bool {
        self.used_length <= instance.max_jumbo_length() as u64
            && self.pattern.knives() <= instance.max_knives()
    }

    fn hamming_distance(&self, other: &Pattern) -> usize {
        self.pattern
            .counts()
            .iter()
            .zip(other.counts())
            .filter(|(a, b)| a != b)
            .count()
    }
}

/// Firefly search over count vectors.
///
/// Each firefly moves towards every brighter one, copying its counts with a probability that
/// decays with the squared Hamming distance between them. Brightness is the used jumbo length
/// for feasible patterns. The brightest feasible firefly seen is returned.
#[derive(Clone, Debug)]
pub struct FireflyGenerator {
    population_size: usize,
    generations: usize,
    base_attractiveness: f64,
    absorption: f64,
}

impl Default for FireflyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_POPULATION_SIZE, DEFAULT_GENERATIONS)
    }
}

impl FireflyGenerator {
    /// Create a firefly generator.
    pub fn new(population_size: usize, generations: usize) -> Self {
        Self {
            population_size: population_size.max(1),
            generations,
            base_attractiveness: DEFAULT_BASE_ATTRACTIVENESS,
            absorption: DEFAULT_ABSORPTION,
        }
    }

    /// Set the number of generations.
    pub fn set_generations(&mut self, generations: usize) -> &mut Self {
        self.generations = generations;
        self
    }

    /// Set the attractiveness at distance zero (`beta0`) and how fast it decays with distance
    /// (`gamma`).
    pub fn set_attractiveness(&mut self, beta0: f64, gamma: f64) -> &mut Self {
        self.base_attractiveness = beta0;
        self.absorption = gamma;
        self
    }

    fn attractiveness(&self, distance: usize) -> f64 {
        let distance = distance as f64;
        self.base_attractiveness * (-self.absorption * distance * distance).exp()
    }

    fn random_firefly<R>(&self, instance: &Instance, rng: &mut R) -> Firefly
    where
        R: Rng + ?Sized,
    {
        let widths = instance.widths();
        let max_jumbo_length = instance.max_jumbo_length() as u64;
        let max_knives = instance.max_knives();

        let mut pattern = Pattern::zeros(instance.len());
        let mut remaining_indexes: Vec<usize> = (0..widths.len()).collect();
        let mut used = 0u64;
        let mut knives = 0u32;

        for _ in 0..max_knives {
            if remaining_indexes.is_empty() {
                break;
            }
            let index = remaining_indexes.swap_remove(rng.gen_range(0..remaining_indexes.len()));
            let amount = rng.gen_range(0..=max_knives - knives);
            let length = amount as u64 * widths[index] as u64;
            if used + length > max_jumbo_length {
                break;
            }
            pattern.counts_mut()[index] = amount;
            used += length;
            knives += amount;
        }

        Firefly::new(pattern, instance)
    }

    /// Moves `firefly` towards a brighter one. Entries that already match are kept.
    fn approach<R>(&self, firefly: &mut Firefly, brighter: &Pattern, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let attractiveness = self.attractiveness(firefly.hamming_distance(brighter));
        for (count, &other) in firefly.pattern.counts_mut().iter_mut().zip(brighter.counts()) {
            if *count != other && rng.gen::<f64>() < attractiveness {
                *count = other;
            }
        }
    }
}

/// Replaces `best` with the brightest feasible firefly of `population` if that one outshines it.
fn keep_brightest(instance: &Instance, population: &[Firefly], best: &mut Option<Firefly>) {
    let brightest = population
        .iter()
        .filter(|f| f.is_feasible(instance))
        .max_by(|a, b| a.intensity.total_cmp(&b.intensity));
    if let Some(brightest) = brightest {
        let brighter = match best {
            Some(current) => brightest.intensity > current.intensity,
            None => true,
        };
        if brighter {
            *best = Some(brightest.clone());
        }
    }
}

impl PatternGenerator for FireflyGenerator {
    fn name(&self) -> &'static str {
        "firefly"
    }

    fn generate_pattern(&self, instance: &Instance, rng: &mut StdRng) -> Result<GeneratedPattern> {
        if instance.max_knives() == 0 {
            return Ok(GeneratedPattern::empty(instance));
        }

        let mut population: Vec<Firefly> = (0..self.population_size)
            .map(|_| self.random_firefly(instance, rng))
            .collect();

        let mut best: Option<Firefly> = None;
        keep_brightest(instance, &population, &mut best);

        for generation in 0..self.generations {
            for i in 0..population.len() {
                for j in 0..population.len() {
                    if population[j].intensity <= population[i].intensity {
                        continue;
                    }
                    let brighter = population[j].pattern.clone();
                    self.approach(&mut population[i], &brighter, rng);
                    population[i].update_intensity(instance);
                }
            }
            keep_brightest(instance, &population, &mut best);
            log::trace!(
                "firefly generation {}: best intensity {}",
                generation,
                best.as_ref().map_or(0.0, |b| b.intensity)
            );
        }

        // Seeds never overflow the jumbo, so there is always a feasible firefly.
        let best = best.unwrap_or_else(|| Firefly::new(Pattern::zeros(instance.len()), instance));
        let waste = (instance.max_jumbo_length() as u64 - best.used_length) as u32;
        log::debug!("firefly pattern {:?} wastes {}", best.pattern.counts(), waste);

        Ok(GeneratedPattern {
            pattern: best.pattern,
            waste,
        })
    }
}

use super::{GeneratedPattern, PatternGenerator};
use crate::pattern::Instance;
use crate::{Error, Result};
use rand::prelude::*;
use smallvec::SmallVec;
use std::cmp;

const DEFAULT_GENERATIONS: usize = 10;
const DEFAULT_MAX_RETRIES: usize = 10_000;

/// Fitness of a chromosome that is empty or longer than the jumbo.
const INVALID_FITNESS: i64 = -1;

/// Widths laid out on a jumbo, in cutting order.
type Chromosome = SmallVec<[u32; 16]>;

#[derive(Clone, Debug)]
struct Individual {
    widths: Chromosome,
    fitness: i64,
}

impl Individual {
    fn new(widths: Chromosome, max_jumbo_length: u32) -> Self {
        let used: u64 = widths.iter().map(|&w| w as u64).sum();
        let fitness = if widths.is_empty() || used > max_jumbo_length as u64 {
            INVALID_FITNESS
        } else {
            used as i64
        };
        Self { widths, fitness }
    }

    fn is_valid(&self) -> bool {
        self.fitness != INVALID_FITNESS
    }

    /// Single-point crossover. The split point is within both parents, so each child takes the
    /// length of the parent that supplies its tail.
    fn crossover<R>(&self, other: &Individual, max_jumbo_length: u32, rng: &mut R) -> [Self; 2]
    where
        R: Rng + ?Sized,
    {
        let split = rng.gen_range(0..=cmp::min(self.widths.len(), other.widths.len()));

        let first = self.widths[..split]
            .iter()
            .chain(other.widths[split..].iter())
            .copied()
            .collect();
        let second = other.widths[..split]
            .iter()
            .chain(self.widths[split..].iter())
            .copied()
            .collect();

        [
            Individual::new(first, max_jumbo_length),
            Individual::new(second, max_jumbo_length),
        ]
    }
}

/// Evolves a population of width sequences towards the fullest jumbo.
///
/// Each generation keeps the fittest tenth of the population and refills the rest with crossover
/// children of those elites. Children that don't fit the jumbo are rejected, and the generation
/// fails with [`Error::ConvergenceFailure`] once more than `max_retries` of them have been
/// rejected.
#[derive(Clone, Debug)]
pub struct GeneticGenerator {
    population_size: usize,
    generations: usize,
    max_retries: usize,
}

impl GeneticGenerator {
    /// Create a genetic generator with the given population size.
    pub fn new(population_size: usize) -> Self {
        Self {
            population_size: cmp::max(population_size, 1),
            generations: DEFAULT_GENERATIONS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Set the number of selection and crossover rounds after the initial population.
    pub fn set_generations(&mut self, generations: usize) -> &mut Self {
        self.generations = generations;
        self
    }

    /// Set how many invalid children a generation may reject before giving up.
    pub fn set_max_retries(&mut self, max_retries: usize) -> &mut Self {
        self.max_retries = max_retries;
        self
    }

    fn elite_size(&self) -> usize {
        cmp::max(self.population_size / 10, 1)
    }

    fn random_individual<R>(&self, instance: &Instance, rng: &mut R) -> Individual
    where
        R: Rng + ?Sized,
    {
        let max_jumbo_length = instance.max_jumbo_length();
        let mut widths = Chromosome::new();
        let mut sum = 0u64;
        for _ in 0..instance.max_knives() {
            let width = match instance.widths().choose(rng) {
                Some(&width) => width,
                None => break,
            };
            if sum + width as u64 > max_jumbo_length as u64 {
                break;
            }
            widths.push(width);
            sum += width as u64;
        }
        Individual::new(widths, max_jumbo_length)
    }

    fn select_elite(&self, mut population: Vec<Individual>) -> Vec<Individual> {
        population.sort_by_key(|individual| cmp::Reverse(individual.fitness));
        population.truncate(self.elite_size());
        population
    }

    fn breed<R>(
        &self,
        elite: &[Individual],
        max_jumbo_length: u32,
        rng: &mut R,
    ) -> Result<Vec<Individual>>
    where
        R: Rng + ?Sized,
    {
        let mut population: Vec<Individual> = Vec::with_capacity(self.population_size);
        population.extend(elite.iter().filter(|i| i.is_valid()).cloned());

        let mut rejected = 0;
        while population.len() < self.population_size {
            let (first, second) = match (elite.choose(rng), elite.choose(rng)) {
                (Some(first), Some(second)) => (first, second),
                _ => break,
            };

            for child in first.crossover(second, max_jumbo_length, rng) {
                if !child.is_valid() {
                    rejected += 1;
                } else if population.len() < self.population_size {
                    population.push(child);
                }
            }

            if rejected > self.max_retries {
                return Err(Error::ConvergenceFailure {
                    generator: self.name(),
                    attempts: rejected,
                });
            }
        }

        Ok(population)
    }
}

impl PatternGenerator for GeneticGenerator {
    fn name(&self) -> &'static str {
        "genetic"
    }

    fn generate_pattern(&self, instance: &Instance, rng: &mut StdRng) -> Result<GeneratedPattern> {
        if instance.max_knives() == 0 {
            return Ok(GeneratedPattern::empty(instance));
        }

        let max_jumbo_length = instance.max_jumbo_length();
        let mut population: Vec<Individual> = (0..self.population_size)
            .map(|_| self.random_individual(instance, rng))
            .collect();

        for generation in 0..cmp::max(self.generations, 1) {
            let elite = self.select_elite(population);
            population = self.breed(&elite, max_jumbo_length, rng)?;
            log::trace!(
                "genetic generation {}: best fitness {}",
                generation,
                population.iter().map(|i| i.fitness).max().unwrap_or(INVALID_FITNESS)
            );
        }

        let best = population
            .into_iter()
            .max_by_key(|individual| individual.fitness)
            .filter(Individual::is_valid)
            .ok_or(Error::ConvergenceFailure {
                generator: self.name(),
                attempts: 0,
            })?;

        let pattern = instance.pattern_from_widths(best.widths.iter().copied());
        let waste = max_jumbo_length - best.fitness as u32;
        log::debug!("genetic pattern {:?} wastes {}", pattern.counts(), waste);

        Ok(GeneratedPattern { pattern, waste })
    }
}

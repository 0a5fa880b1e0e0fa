use crate::generator::PatternGenerator;
use crate::pattern::{Instance, Pattern};
use crate::solver::{Solution, Solver};
use crate::{Demand, Error, Result};
use rand::prelude::*;

const DEFAULT_MAX_RETRIES: usize = 10;

/// Counts finished units of work and reports them as a whole percentage.
struct Progress<'f, F>
where
    F: FnMut(u8),
{
    completed: usize,
    total: usize,
    callback: &'f mut F,
}

impl<'f, F> Progress<'f, F>
where
    F: FnMut(u8),
{
    fn new(total: usize, callback: &'f mut F) -> Self {
        Self {
            completed: 0,
            total,
            callback,
        }
    }

    fn advance(&mut self) {
        self.completed += 1;
        let percent = if self.total == 0 {
            100.0
        } else {
            (100.0 * self.completed as f64 / self.total as f64).round()
        };
        (self.callback)(percent.min(100.0) as u8);
    }
}

/// Generates a pool of candidate patterns and selects among them with a chain of solvers.
///
/// The first solver works on the whole pool, weighing each pattern by the waste its generator
/// reported. Every following solver only sees the patterns the previous one selected, weighed by
/// their recomputed waste.
pub struct SolverPipeline<'a> {
    demand: &'a Demand,
    generator: Box<dyn PatternGenerator + 'a>,
    solvers: Vec<Box<dyn Solver + 'a>>,
    random_seed: u64,
    retry_on_failure: bool,
    max_retries: usize,
}

impl<'a> SolverPipeline<'a> {
    /// Create a pipeline that draws candidate patterns for `demand` from `generator`.
    pub fn new<G>(demand: &'a Demand, generator: G) -> Self
    where
        G: PatternGenerator + 'a,
    {
        Self {
            demand,
            generator: Box::new(generator),
            solvers: Vec::new(),
            random_seed: Default::default(),
            retry_on_failure: false,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Append a solver stage.
    pub fn add_solver<S>(&mut self, solver: S) -> &mut Self
    where
        S: Solver + 'a,
    {
        self.solvers.push(Box::new(solver));
        self
    }

    /// Set the random seed used by the pattern generator. Using the same random seed will give
    /// you the same pool of patterns for the same input.
    pub fn set_random_seed(&mut self, seed: u64) -> &mut Self {
        self.random_seed = seed;
        self
    }

    /// Set whether a run that ends up infeasible is retried with a freshly generated pool.
    pub fn retry_on_failure(&mut self, retry: bool) -> &mut Self {
        self.retry_on_failure = retry;
        self
    }

    /// Set how many times an infeasible run is retried when retrying is enabled.
    pub fn set_max_retries(&mut self, max_retries: usize) -> &mut Self {
        self.max_retries = max_retries;
        self
    }

    /// Generate `iterations` candidate patterns and run every solver stage over them.
    ///
    /// `progress_callback` receives the completed percentage after every generated pattern and
    /// every solver stage.
    pub fn run<F>(&self, iterations: usize, mut progress_callback: F) -> Result<Solution>
    where
        F: FnMut(u8),
    {
        if self.solvers.is_empty() {
            return Err(Error::NoSolverStages);
        }

        let instance = Instance::new(self.demand)?;
        let mut rng: StdRng = SeedableRng::seed_from_u64(self.random_seed);
        log::info!(
            "running {} generator for {} patterns over {} widths with {} solver stages",
            self.generator.name(),
            iterations,
            instance.len(),
            self.solvers.len()
        );

        let mut retries = 0;
        loop {
            match self.run_once(&instance, iterations, &mut rng, &mut progress_callback) {
                Err(e)
                    if self.retry_on_failure && e.is_infeasible() && retries < self.max_retries =>
                {
                    retries += 1;
                    log::warn!("{}; retrying ({}/{})", e, retries, self.max_retries);
                }
                result => return result,
            }
        }
    }

    fn run_once<F>(
        &self,
        instance: &Instance,
        iterations: usize,
        rng: &mut StdRng,
        progress_callback: &mut F,
    ) -> Result<Solution>
    where
        F: FnMut(u8),
    {
        let mut progress = Progress::new(iterations + self.solvers.len(), progress_callback);

        let mut coefficients = Vec::with_capacity(iterations);
        let mut patterns = Vec::with_capacity(iterations);
        for i in 0..iterations {
            let generated = self
                .generator
                .generate_pattern(instance, rng)
                .map_err(|e| {
                    log::error!(
                        "{} generator failed on pattern {}: {}",
                        self.generator.name(),
                        i,
                        e
                    );
                    e
                })?;
            coefficients.push(generated.waste as f64);
            patterns.push(generated.pattern);
            progress.advance();
        }

        let mut solution: Option<Solution> = None;
        for (stage, solver) in self.solvers.iter().enumerate() {
            if let Some(previous) = solution.take() {
                (coefficients, patterns) = retained_columns(instance, &previous);
            }

            let result = solver
                .solve(&coefficients, &patterns, instance.widths(), instance.demand())
                .map_err(|e| {
                    log::error!("stage {} ({} solver) failed: {}", stage, solver.name(), e);
                    e
                })?;
            log::debug!(
                "stage {} ({} solver) kept {} of {} patterns with waste {}",
                stage,
                solver.name(),
                result.pattern_count(),
                patterns.len(),
                result.waste()
            );

            solution = Some(result);
            progress.advance();
        }

        // There is at least one stage, checked in `run`.
        let solution = solution.ok_or(Error::NoSolverStages)?;
        log::info!(
            "solution {} uses {} patterns with waste {}",
            solution.id(),
            solution.pattern_count(),
            solution.waste()
        );
        Ok(solution)
    }
}

/// The patterns a solution selected, each weighed by the jumbo length it actually leaves unused.
fn retained_columns(instance: &Instance, solution: &Solution) -> (Vec<f64>, Vec<Pattern>) {
    solution
        .patterns()
        .iter()
        .map(|usage| {
            let waste =
                instance.max_jumbo_length() as f64 - instance.used_length(&usage.pattern) as f64;
            (waste, usage.pattern.clone())
        })
        .unzip()
}

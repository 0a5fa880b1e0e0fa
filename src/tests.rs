use super::*;

static SCENARIO_WIDTHS: &[WidthDemand] = &[
    WidthDemand {
        width: 100,
        quantity: 5,
    },
    WidthDemand {
        width: 150,
        quantity: 3,
    },
];

static PAIRED_WIDTHS: &[WidthDemand] = &[
    WidthDemand {
        width: 100,
        quantity: 4,
    },
    WidthDemand {
        width: 200,
        quantity: 4,
    },
];

static MIXED_WIDTHS: &[WidthDemand] = &[
    WidthDemand {
        width: 400,
        quantity: 3,
    },
    WidthDemand {
        width: 300,
        quantity: 4,
    },
    WidthDemand {
        width: 250,
        quantity: 2,
    },
    WidthDemand {
        width: 120,
        quantity: 6,
    },
];

fn build_demand(max_jumbo_length: u32, max_knives: u32, rows: &[WidthDemand]) -> Demand {
    let mut demand = Demand::new(SetupLimits {
        max_jumbo_length,
        max_knives,
    });
    demand.add_widths(rows.iter().copied());
    demand
}

fn sanity_check_solution(solution: &Solution, demand: &Demand) {
    let instance = Instance::new(demand).unwrap();

    for usage in solution.patterns() {
        assert!(usage.usage > 0.0);
        assert!(
            instance.is_feasible(&usage.pattern),
            "pattern {:?} doesn't fit the jumbo",
            usage.pattern
        );
    }

    // Every width has to be supplied at least as often as it's demanded.
    for (i, &quantity) in instance.demand().iter().enumerate() {
        assert!(
            solution.supplied(i) + 1e-6 >= quantity as f64,
            "width {} supplied {} times, demanded {}",
            instance.widths()[i],
            solution.supplied(i),
            quantity
        );
    }

    assert!(solution.waste() >= -1e-6);
}

fn is_integral(solution: &Solution) -> bool {
    solution
        .patterns()
        .iter()
        .all(|usage| (usage.usage - usage.usage.round()).abs() < 1e-9)
}

#[test]
fn optimize_greedy_scenario() {
    let demand = build_demand(300, 3, SCENARIO_WIDTHS);

    let solution = SolverPipeline::new(&demand, GreedyGenerator::new())
        .add_solver(RelaxedSolver::new())
        .add_solver(IntegerSolver::new())
        .run(20, |_| {})
        .unwrap();

    sanity_check_solution(&solution, &demand);
    assert!(is_integral(&solution));

    // Five jumbos of one 100 and one 150 each.
    assert!(solution.waste() <= 250.0 + 1e-6);
}

#[test]
fn optimize_genetic_scenario() {
    let demand = build_demand(300, 3, SCENARIO_WIDTHS);

    let solution = SolverPipeline::new(&demand, GeneticGenerator::new(40))
        .add_solver(RelaxedSolver::new())
        .add_solver(IntegerSolver::new())
        .set_random_seed(3)
        .retry_on_failure(true)
        .run(30, |_| {})
        .unwrap();

    sanity_check_solution(&solution, &demand);
    assert!(is_integral(&solution));
    assert!(solution.waste() <= 250.0 + 1e-6);
}

#[test]
fn optimize_every_generator_covers_demand() {
    let demand = build_demand(300, 2, PAIRED_WIDTHS);

    let greedy = SolverPipeline::new(&demand, GreedyGenerator::new())
        .add_solver(RelaxedSolver::new())
        .add_solver(IntegerSolver::new())
        .run(10, |_| {})
        .unwrap();
    let genetic = SolverPipeline::new(&demand, GeneticGenerator::new(30))
        .add_solver(RelaxedSolver::new())
        .add_solver(IntegerSolver::new())
        .run(10, |_| {})
        .unwrap();
    let firefly = SolverPipeline::new(&demand, FireflyGenerator::new(50, 5))
        .add_solver(RelaxedSolver::new())
        .add_solver(IntegerSolver::new())
        .run(10, |_| {})
        .unwrap();

    for solution in [&greedy, &genetic, &firefly] {
        sanity_check_solution(solution, &demand);
        assert!(is_integral(solution));
        // One 100 and one 200 fill the jumbo exactly.
        assert!(solution.waste().abs() < 1e-6, "waste {}", solution.waste());
    }
}

#[test]
fn optimize_integer_stage_never_beats_relaxation() {
    let demand = build_demand(1000, 3, MIXED_WIDTHS);

    let relaxed = SolverPipeline::new(&demand, GreedyGenerator::new())
        .add_solver(RelaxedSolver::new())
        .set_random_seed(11)
        .run(30, |_| {})
        .unwrap();
    let integer = SolverPipeline::new(&demand, GreedyGenerator::new())
        .add_solver(RelaxedSolver::new())
        .add_solver(IntegerSolver::new())
        .set_random_seed(11)
        .run(30, |_| {})
        .unwrap();

    sanity_check_solution(&relaxed, &demand);
    sanity_check_solution(&integer, &demand);
    assert!(is_integral(&integer));
    assert!(integer.waste() + 1e-6 >= relaxed.waste());
    // The integer stage only chooses among the patterns the relaxation kept.
    assert!(integer
        .patterns()
        .iter()
        .all(|usage| relaxed.patterns().iter().any(|r| r.pattern == usage.pattern)));
}

#[test]
fn optimize_same_seed_same_plan() {
    let demand = build_demand(1000, 3, MIXED_WIDTHS);
    let run = || {
        SolverPipeline::new(&demand, GreedyGenerator::new())
            .add_solver(RelaxedSolver::new())
            .add_solver(IntegerSolver::new())
            .set_random_seed(5)
            .run(25, |_| {})
            .unwrap()
    };

    let first = run();
    let second = run();

    assert!((first.waste() - second.waste()).abs() < 1e-6);
    assert_eq!(first.patterns(), second.patterns());
    assert_ne!(first.id(), second.id());
}

#[test]
fn optimize_no_knives() {
    let demand = build_demand(300, 0, SCENARIO_WIDTHS);

    let result = SolverPipeline::new(&demand, GreedyGenerator::new())
        .add_solver(RelaxedSolver::new())
        .run(5, |_| {});

    assert!(
        matches!(
            result,
            Err(Error::UncoverableWidth {
                index: 0,
                width: 100
            })
        ),
        "should have returned Error::UncoverableWidth"
    );
}

#[test]
fn optimize_nothing_fits_the_jumbo() {
    let demand = build_demand(
        100,
        3,
        &[
            WidthDemand {
                width: 150,
                quantity: 2,
            },
            WidthDemand {
                width: 200,
                quantity: 1,
            },
        ],
    );
    let mut generator = GeneticGenerator::new(20);
    generator.set_max_retries(50);
    let mut progress_calls = 0;

    let result = SolverPipeline::new(&demand, generator)
        .add_solver(RelaxedSolver::new())
        .retry_on_failure(true)
        .run(5, |_| progress_calls += 1);

    assert!(
        matches!(
            result,
            Err(Error::ConvergenceFailure {
                generator: "genetic",
                ..
            })
        ),
        "should have returned Error::ConvergenceFailure"
    );
    // Generator failures are not retried.
    assert_eq!(progress_calls, 0);
}

#[test]
fn optimize_nothing_fits_without_rejection_loop() {
    let demand = build_demand(
        100,
        3,
        &[
            WidthDemand {
                width: 150,
                quantity: 2,
            },
            WidthDemand {
                width: 200,
                quantity: 1,
            },
        ],
    );

    let greedy = SolverPipeline::new(&demand, GreedyGenerator::new())
        .add_solver(RelaxedSolver::new())
        .run(5, |_| {});
    let firefly = SolverPipeline::new(&demand, FireflyGenerator::new(10, 3))
        .add_solver(RelaxedSolver::new())
        .run(5, |_| {});

    for result in [greedy, firefly] {
        assert!(
            matches!(
                result,
                Err(Error::UncoverableWidth {
                    index: 0,
                    width: 150
                })
            ),
            "should have returned Error::UncoverableWidth"
        );
    }
}

#[test]
fn optimize_invalid_demand() {
    let empty = build_demand(300, 3, &[]);
    let result = SolverPipeline::new(&empty, GreedyGenerator::new())
        .add_solver(RelaxedSolver::new())
        .run(5, |_| {});
    assert!(matches!(result, Err(Error::InvalidDemand(_))));

    let no_jumbo = build_demand(0, 3, SCENARIO_WIDTHS);
    let result = SolverPipeline::new(&no_jumbo, GreedyGenerator::new())
        .add_solver(RelaxedSolver::new())
        .run(5, |_| {});
    assert!(matches!(result, Err(Error::InvalidDemand(_))));
}

#[test]
fn optimize_progress() {
    let demand = build_demand(300, 2, PAIRED_WIDTHS);
    let mut reported = Vec::new();

    SolverPipeline::new(&demand, FireflyGenerator::new(20, 3))
        .add_solver(RelaxedSolver::new())
        .add_solver(IntegerSolver::new())
        .run(48, |percent| reported.push(percent))
        .unwrap();

    assert_eq!(reported.len(), 50);
    assert_eq!(reported[0], 2);
    assert_eq!(reported[24], 50);
    assert_eq!(*reported.last().unwrap(), 100);
}

#[test]
fn optimize_duplicate_widths_are_merged() {
    let mut demand = build_demand(300, 3, SCENARIO_WIDTHS);
    demand.add_width(WidthDemand {
        width: 100,
        quantity: 2,
    });

    let instance = Instance::new(&demand).unwrap();
    assert_eq!(instance.widths(), &[100, 150]);
    assert_eq!(instance.demand(), &[7, 3]);

    let solution = SolverPipeline::new(&demand, GeneticGenerator::new(30))
        .add_solver(RelaxedSolver::new())
        .add_solver(IntegerSolver::new())
        .retry_on_failure(true)
        .run(30, |_| {})
        .unwrap();

    sanity_check_solution(&solution, &demand);
    assert!(solution.supplied(0) >= 7.0 - 1e-6);
}

#[test]
fn history_keeps_best_plan() {
    let demand = build_demand(1000, 3, MIXED_WIDTHS);
    let mut history = History::with_capacity(3);
    let mut ids = Vec::new();

    for seed in 0..5 {
        let solution = SolverPipeline::new(&demand, GreedyGenerator::new())
            .add_solver(RelaxedSolver::new())
            .add_solver(IntegerSolver::new())
            .set_random_seed(seed)
            .run(20, |_| {})
            .unwrap();
        ids.push(solution.id());
        history.push(solution);
    }

    assert_eq!(history.len(), 3);
    assert!(history.find_by_id(ids[0]).is_none());
    assert!(history.find_by_id(ids[4]).is_some());

    let candidate = SolverPipeline::new(&demand, GreedyGenerator::new())
        .add_solver(RelaxedSolver::new())
        .add_solver(IntegerSolver::new())
        .set_random_seed(99)
        .run(20, |_| {})
        .unwrap();
    let best = history.best_by_waste(&candidate);

    assert!(best.waste() <= candidate.waste());
    assert!(history.iter().all(|s| best.waste() <= s.waste()));
}

use crate::solver::Solution;
use std::collections::VecDeque;
use uuid::Uuid;

const DEFAULT_CAPACITY: usize = 50;

/// Bounded record of past solutions, oldest first.
///
/// Pushing into a full history drops its oldest solution. A `History` is a plain value owned by
/// the caller; wrap it in a lock to share it between threads.
#[derive(Clone, Debug)]
pub struct History {
    solutions: VecDeque<Solution>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl History {
    /// Create a history that keeps the last 50 solutions.
    pub fn new() -> Self {
        Default::default()
    }

    /// Create a history that keeps the last `capacity` solutions.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            solutions: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a solution, dropping the oldest one if the history is full.
    pub fn push(&mut self, solution: Solution) {
        if self.capacity == 0 {
            return;
        }
        while self.solutions.len() >= self.capacity {
            self.solutions.pop_front();
        }
        self.solutions.push_back(solution);
    }

    /// Number of recorded solutions.
    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    /// Returns whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Recorded solutions, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Solution> {
        self.solutions.iter()
    }

    /// The solution with the least waste among `candidate` and the history. `candidate` wins
    /// ties.
    pub fn best_by_waste<'a>(&'a self, candidate: &'a Solution) -> &'a Solution {
        self.solutions.iter().fold(candidate, |best, solution| {
            if solution.waste() < best.waste() {
                solution
            } else {
                best
            }
        })
    }

    /// The solution with the fewest distinct patterns among `candidate` and the history.
    /// `candidate` wins ties.
    pub fn best_by_pattern_count<'a>(&'a self, candidate: &'a Solution) -> &'a Solution {
        self.solutions.iter().fold(candidate, |best, solution| {
            if solution.pattern_count() < best.pattern_count() {
                solution
            } else {
                best
            }
        })
    }

    /// Look up a recorded solution.
    pub fn find_by_id(&self, id: Uuid) -> Option<&Solution> {
        self.solutions.iter().find(|solution| solution.id() == id)
    }
}

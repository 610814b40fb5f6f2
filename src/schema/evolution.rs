//! Progress and result types reported by the evolution engine.

use serde::{Deserialize, Serialize};

/// How a candidate came to occupy its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Origin {
    /// Randomized at initialization.
    #[default]
    Initial,
    /// One-point crossover of two parents.
    OnePointCrossover,
    /// Uniform (per-gene) crossover of two parents.
    UniformCrossover,
    /// Small positional/colour disturbance of the previous occupant.
    DisturbMutation,
    /// Coarse re-randomization of the previous occupant.
    ResetMutation,
}

/// Number of slots refilled by each operator during one generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorCounts {
    pub one_point: usize,
    pub uniform: usize,
    pub disturb: usize,
    pub reset: usize,
}

impl OperatorCounts {
    pub fn record(&mut self, origin: Origin) {
        match origin {
            Origin::Initial => {}
            Origin::OnePointCrossover => self.one_point += 1,
            Origin::UniformCrossover => self.uniform += 1,
            Origin::DisturbMutation => self.disturb += 1,
            Origin::ResetMutation => self.reset += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.one_point + self.uniform + self.disturb + self.reset
    }
}

/// Summary of one completed generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Generations completed so far, including this one.
    pub generation: u64,
    /// Lowest fitness in the population.
    pub best_fitness: u64,
    /// Mean fitness across the population.
    pub mean_fitness: f64,
    /// Highest fitness in the population.
    pub worst_fitness: u64,
    /// Operators applied this generation.
    pub operators: OperatorCounts,
}

/// Reason evolution stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Reached maximum generations.
    MaxGenerations,
    /// Best fitness reached the target.
    TargetReached,
    /// Cancelled from outside.
    Cancelled,
}

/// Final result of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Generations completed.
    pub generations: u64,
    /// Best fitness achieved.
    pub best_fitness: u64,
    /// Fitness evaluations performed, including the initial population.
    pub total_evaluations: u64,
    /// Wall-clock time in seconds.
    pub elapsed_seconds: f64,
    /// Why the loop ended.
    pub stop_reason: StopReason,
}

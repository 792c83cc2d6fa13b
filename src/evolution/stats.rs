//! Aggregate statistics of a scored generation.

use crate::error::{GpError, Result};
use crate::fitness::FitnessEvaluator;
use crate::individual::Individual;

/// Aggregates computed by a stats pass. `best` and `worst` are member indices.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationStats {
    pub best: usize,
    pub worst: usize,
    pub size: usize,
    pub adjusted_fitness_sum: f64,
    pub total_depth: usize,
    pub deepest_depth: usize,
}

impl PopulationStats {
    /// Aggregates already scored members whose depth is cached.
    ///
    /// Every member takes part in the best/worst comparison, including the one
    /// that sets the deepest depth.
    ///
    /// # Errors
    ///
    /// Returns `GpError::EmptyPopulation` for no members and `GpError::IllegalState`
    /// if a member is unscored.
    pub fn compute(members: &[Individual], evaluator: &FitnessEvaluator) -> Result<Self> {
        let first = members.first().ok_or(GpError::EmptyPopulation)?;
        let mut stats = Self {
            best: 0,
            worst: 0,
            size: members.len(),
            adjusted_fitness_sum: 0.0,
            total_depth: 0,
            deepest_depth: 0,
        };
        let mut best = first;
        let mut worst = first;

        for (index, member) in members.iter().enumerate() {
            let depth = member.cached_depth().unwrap_or(0);
            stats.total_depth += depth;
            stats.deepest_depth = stats.deepest_depth.max(depth);

            stats.adjusted_fitness_sum += member.adjusted_fitness()?;
            if evaluator.is_better(member, best)? {
                best = member;
                stats.best = index;
            }
            if !evaluator.is_better(member, worst)? {
                worst = member;
                stats.worst = index;
            }
        }
        Ok(stats)
    }

    pub fn average_adjusted_fitness(&self) -> f64 {
        if self.size == 0 {
            return 0.0;
        }
        self.adjusted_fitness_sum / self.size as f64
    }

    pub fn average_depth(&self) -> f64 {
        if self.size == 0 {
            return 0.0;
        }
        self.total_depth as f64 / self.size as f64
    }
}

//! # FitnessProportionateSelection
//!
//! Rejection sampling biased towards fit members. Each attempt draws a uniform
//! candidate and a threshold `r` uniform in `[0, average adjusted fitness]`; the
//! candidate is accepted when
//!
//! ```text
//! r <= adjusted(candidate) / adjusted_sum * (1 - selectivity)
//! ```
//!
//! A normalized fitness that is not finite counts as zero. Higher selectivity
//! rejects more candidates and so favours the fit ones more strongly.
//!
//! Sampling gives up after `max_attempts` draws per member of the population,
//! failing with `GpError::MaxAttemptsReached`.

use crate::error::{GpError, Result};
use crate::evolution::stats::PopulationStats;
use crate::individual::Individual;
use crate::rng::RandomNumberGenerator;
use crate::selection::selection_strategy::SelectionStrategy;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct FitnessProportionateSelection {
    selectivity: f64,
    max_attempts: usize,
}

impl FitnessProportionateSelection {
    /// Creates a new strategy.
    ///
    /// # Arguments
    ///
    /// * `selectivity` - Bias towards fit members, in `[0, 1)`.
    /// * `max_attempts` - Draws allowed per population member before giving up.
    ///
    /// # Errors
    ///
    /// Returns `GpError::Configuration` if `selectivity` is outside `[0, 1)` or
    /// `max_attempts` is zero.
    pub fn new(selectivity: f64, max_attempts: usize) -> Result<Self> {
        if !(0.0..1.0).contains(&selectivity) {
            return Err(GpError::Configuration(format!(
                "Selectivity must be in [0, 1), got {}",
                selectivity
            )));
        }
        if max_attempts == 0 {
            return Err(GpError::Configuration(
                "Selection needs at least one attempt".to_string(),
            ));
        }
        Ok(Self {
            selectivity,
            max_attempts,
        })
    }

    pub fn selectivity(&self) -> f64 {
        self.selectivity
    }

    fn normalized_fitness(member: &Individual, adjusted_fitness_sum: f64) -> Result<f64> {
        let normalized = member.adjusted_fitness()? / adjusted_fitness_sum;
        Ok(if normalized.is_finite() { normalized } else { 0.0 })
    }
}

impl SelectionStrategy for FitnessProportionateSelection {
    fn select(
        &self,
        members: &[Individual],
        stats: &PopulationStats,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        if members.is_empty() {
            return Err(GpError::EmptyPopulation);
        }

        let average = stats.adjusted_fitness_sum / members.len() as f64;
        let acceptance_scale = 1.0 - self.selectivity;
        let attempts = self.max_attempts.saturating_mul(members.len());

        for _ in 0..attempts {
            let candidate = rng.index(members.len())?;
            let r = rng.uniform_inclusive(average);
            let normalized = Self::normalized_fitness(&members[candidate], stats.adjusted_fitness_sum)?;
            if r <= normalized * acceptance_scale {
                return Ok(candidate);
            }
        }

        Err(GpError::MaxAttemptsReached(format!(
            "Fitness-proportionate selection rejected {} candidates",
            attempts
        )))
    }
}

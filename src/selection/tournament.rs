//! # TournamentSelection
//!
//! Draws `tournament_size` members uniformly at random with replacement and returns
//! the one with the highest adjusted fitness. Ties go to the participant drawn
//! first.
//!
//! A tournament of size 1 is uniform random selection; larger tournaments increase
//! the selection pressure.
//!
//! ## Example
//!
//! ```rust
//! use genprog::selection::TournamentSelection;
//!
//! let selection = TournamentSelection::new(3).unwrap();
//! assert_eq!(selection.tournament_size(), 3);
//! assert!(TournamentSelection::new(0).is_err());
//! ```

use crate::error::{GpError, Result};
use crate::evolution::stats::PopulationStats;
use crate::individual::Individual;
use crate::rng::RandomNumberGenerator;
use crate::selection::selection_strategy::SelectionStrategy;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct TournamentSelection {
    tournament_size: usize,
}

impl TournamentSelection {
    /// Creates a new TournamentSelection strategy with the specified tournament size.
    ///
    /// # Errors
    ///
    /// Returns `GpError::Configuration` if `tournament_size` is 0.
    pub fn new(tournament_size: usize) -> Result<Self> {
        if tournament_size < 1 {
            return Err(GpError::Configuration(
                "Tournament size must be at least 1".to_string(),
            ));
        }
        Ok(Self { tournament_size })
    }

    pub fn tournament_size(&self) -> usize {
        self.tournament_size
    }

    /// Runs a single tournament and returns the winner together with every participant drawn.
    fn run_tournament(
        &self,
        members: &[Individual],
        rng: &mut RandomNumberGenerator,
    ) -> Result<(usize, Vec<usize>)> {
        let mut participants = Vec::with_capacity(self.tournament_size);
        for _ in 0..self.tournament_size {
            participants.push(rng.index(members.len())?);
        }

        let mut best_idx = participants[0];
        let mut best_fitness = members[best_idx].adjusted_fitness()?;
        for &idx in &participants[1..] {
            let current_fitness = members[idx].adjusted_fitness()?;
            if current_fitness > best_fitness {
                best_idx = idx;
                best_fitness = current_fitness;
            }
        }

        Ok((best_idx, participants))
    }
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self { tournament_size: 2 }
    }
}

impl SelectionStrategy for TournamentSelection {
    fn select(
        &self,
        members: &[Individual],
        _stats: &PopulationStats,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        if members.is_empty() {
            return Err(GpError::EmptyPopulation);
        }
        let (winner, _) = self.run_tournament(members, rng)?;
        Ok(winner)
    }
}

//! Genetic operator scheduling.
//!
//! `next()` draws `rnd` uniformly in `[0, 1)` and walks the cumulative operator
//! probabilities in a fixed order: crossover, context-sensitive crossover,
//! mutation, replication. The first threshold with `rnd <= cumulative` wins.

use std::fmt;

use crate::error::{GpError, Result};
use crate::evolution::options::OperatorProbabilities;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneticOperator {
    Crossover,
    ContextSensitiveCrossover,
    Mutation,
    Replication,
}

impl GeneticOperator {
    /// Operators in threshold order.
    pub const ALL: [GeneticOperator; 4] = [
        GeneticOperator::Crossover,
        GeneticOperator::ContextSensitiveCrossover,
        GeneticOperator::Mutation,
        GeneticOperator::Replication,
    ];

    /// Picks the operator for the draw `rnd`.
    ///
    /// # Errors
    ///
    /// Returns `GpError::GeneticOperation` if `rnd` lies above every cumulative
    /// threshold, which only happens when the probabilities do not sum to 1.0.
    pub fn choose(rnd: f64, probabilities: &OperatorProbabilities) -> Result<Self> {
        let mut cumulative = 0.0;
        for operator in Self::ALL {
            cumulative += operator.probability(probabilities);
            if rnd <= cumulative {
                return Ok(operator);
            }
        }
        Err(GpError::GeneticOperation(format!(
            "Draw {} exceeds every operator threshold (sum {})",
            rnd, cumulative
        )))
    }

    pub fn probability(&self, probabilities: &OperatorProbabilities) -> f64 {
        match self {
            GeneticOperator::Crossover => probabilities.crossover,
            GeneticOperator::ContextSensitiveCrossover => probabilities.cs_crossover,
            GeneticOperator::Mutation => probabilities.mutate,
            GeneticOperator::Replication => probabilities.replicate,
        }
    }

    /// Number of parents the operator selects.
    pub fn parent_count(&self) -> usize {
        match self {
            GeneticOperator::Crossover | GeneticOperator::ContextSensitiveCrossover => 2,
            GeneticOperator::Mutation | GeneticOperator::Replication => 1,
        }
    }
}

impl fmt::Display for GeneticOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeneticOperator::Crossover => "crossover",
            GeneticOperator::ContextSensitiveCrossover => "cs-crossover",
            GeneticOperator::Mutation => "mutation",
            GeneticOperator::Replication => "replication",
        };
        f.write_str(name)
    }
}

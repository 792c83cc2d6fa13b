//! Per-generation bookkeeping handed back to callers and observers.

use crate::evolution::operator::GeneticOperator;
use crate::expression::Expression;

/// What happened while one generation was being filled.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Generation number of the population this report produced.
    pub generation: usize,
    /// Forced copies of the previous best.
    pub elites: usize,
    pub crossovers: usize,
    pub cs_crossovers: usize,
    pub mutations: usize,
    pub replications: usize,
    /// Operator attempts dropped because of an invalid evaluation.
    pub skipped: usize,
}

impl GenerationReport {
    pub fn new(generation: usize) -> Self {
        Self {
            generation,
            ..Self::default()
        }
    }

    pub fn record(&mut self, operator: GeneticOperator) {
        *self.counter(operator) += 1;
    }

    pub fn count(&self, operator: GeneticOperator) -> usize {
        match operator {
            GeneticOperator::Crossover => self.crossovers,
            GeneticOperator::ContextSensitiveCrossover => self.cs_crossovers,
            GeneticOperator::Mutation => self.mutations,
            GeneticOperator::Replication => self.replications,
        }
    }

    /// Successful operator applications, elitism excluded.
    pub fn applied(&self) -> usize {
        self.crossovers + self.cs_crossovers + self.mutations + self.replications
    }

    fn counter(&mut self, operator: GeneticOperator) -> &mut usize {
        match operator {
            GeneticOperator::Crossover => &mut self.crossovers,
            GeneticOperator::ContextSensitiveCrossover => &mut self.cs_crossovers,
            GeneticOperator::Mutation => &mut self.mutations,
            GeneticOperator::Replication => &mut self.replications,
        }
    }
}

/// A snapshot of a freshly scored generation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSummary {
    pub generation: usize,
    pub best_expression: Expression,
    pub best_raw_fitness: f64,
    pub best_hits: usize,
    pub case_count: usize,
    pub average_adjusted_fitness: f64,
    pub average_depth: f64,
    pub deepest_depth: usize,
    /// `None` for the initial generation.
    pub report: Option<GenerationReport>,
}

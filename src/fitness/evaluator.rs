//! # FitnessEvaluator
//!
//! Scores an individual against every test case: raw fitness is the sum of the
//! per-case deviances, and a case is a hit when its deviance is within the
//! configured precision.
//!
//! An `InvalidEvaluation` on any case aborts the loop and punishes the individual
//! with [`PUNISHMENT_FITNESS`] and zero hits. Punishment is not an error: the
//! program simply ranks as (nearly) the worst of its generation.

use tracing::debug;

use crate::engine::ExpressionEngine;
use crate::error::{GpError, Result};
use crate::fitness::{DevianceStrategy, TestCases};
use crate::individual::Individual;

/// Raw fitness given to an individual that cannot be evaluated.
pub const PUNISHMENT_FITNESS: f64 = 999_999.0;

#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    cases: TestCases,
    deviance: DevianceStrategy,
    precision: f64,
}

impl FitnessEvaluator {
    pub fn new(cases: TestCases, deviance: DevianceStrategy, precision: f64) -> Self {
        Self {
            cases,
            deviance,
            precision,
        }
    }

    pub fn cases(&self) -> &TestCases {
        &self.cases
    }

    /// Total number of test cases; a perfect program scores this many hits.
    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }

    pub fn deviance(&self) -> &DevianceStrategy {
        &self.deviance
    }

    /// Sets raw fitness and hits on `individual`.
    ///
    /// # Errors
    ///
    /// Only fatal errors are returned; `InvalidEvaluation` punishes the individual.
    pub fn evaluate(
        &self,
        engine: &mut dyn ExpressionEngine,
        individual: &mut Individual,
    ) -> Result<()> {
        match self.score(engine, individual) {
            Ok((raw_fitness, hits)) => {
                individual.set_fitness(raw_fitness, hits);
                Ok(())
            }
            Err(e) if e.is_recoverable() => {
                debug!(expression = %individual.expression(), error = %e, "Punishing individual");
                self.punish(individual);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn score(
        &self,
        engine: &mut dyn ExpressionEngine,
        individual: &Individual,
    ) -> Result<(f64, usize)> {
        let mut raw_fitness = 0.0;
        let mut hits = 0;
        for case_index in 0..self.cases.len() {
            let deviance = self
                .deviance
                .calculate(engine, &self.cases, individual, case_index)?;
            raw_fitness += deviance;
            if deviance <= self.precision {
                hits += 1;
            }
        }
        if !raw_fitness.is_finite() {
            return Err(GpError::InvalidEvaluation(format!(
                "Raw fitness of {} overflows to {}",
                individual.expression(),
                raw_fitness
            )));
        }
        Ok((raw_fitness, hits))
    }

    /// Marks `individual` as unevaluable.
    pub fn punish(&self, individual: &mut Individual) {
        individual.set_fitness(PUNISHMENT_FITNESS, 0);
    }

    /// Whether `a` has strictly lower raw fitness than `b`.
    ///
    /// # Errors
    ///
    /// Returns `GpError::IllegalState` if either individual is unscored.
    pub fn is_better(&self, a: &Individual, b: &Individual) -> Result<bool> {
        Ok(raw_fitness_of(a)? < raw_fitness_of(b)?)
    }

    /// The fitter of two individuals; ties favour `a`.
    pub fn best<'a>(&self, a: &'a Individual, b: &'a Individual) -> Result<&'a Individual> {
        Ok(if self.is_better(b, a)? { b } else { a })
    }

    /// The less fit of two individuals; ties favour `b`.
    pub fn worst<'a>(&self, a: &'a Individual, b: &'a Individual) -> Result<&'a Individual> {
        Ok(if self.is_better(b, a)? { a } else { b })
    }
}

fn raw_fitness_of(individual: &Individual) -> Result<f64> {
    individual.raw_fitness().ok_or_else(|| {
        GpError::IllegalState(format!(
            "{} has not been evaluated",
            individual.expression()
        ))
    })
}

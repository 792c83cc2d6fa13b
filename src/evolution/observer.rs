//! # PopulationObserver
//!
//! Lifecycle hooks for presentation layers such as progress bars or console
//! statistics. The population calls the observer at fixed points and never
//! depends on what it does; every method has an empty default.
//!
//! [`TracingObserver`] is the default observer. It emits `tracing` events whose
//! volume follows the configured [`LogLevel`]:
//!
//! - `Verbose`: every created and evaluated individual, every operator
//!   application, plus the `Minimal` events.
//! - `Minimal`: one event per generation and one when a solution is found.
//! - `None`: nothing.

use tracing::{debug, info};

use crate::error::GpError;
use crate::evolution::operator::GeneticOperator;
use crate::evolution::options::LogLevel;
use crate::evolution::report::GenerationSummary;
use crate::individual::Individual;

pub trait PopulationObserver {
    /// A new individual joined the generation being built.
    fn on_individual_created(&mut self, _individual: &Individual) {}

    /// The stats pass scored the member at `index`.
    fn on_individual_evaluated(&mut self, _index: usize, _individual: &Individual) {}

    /// An operator produced `children` new members.
    fn on_operator_applied(&mut self, _operator: GeneticOperator, _children: usize) {}

    /// An operator attempt was dropped because of an invalid evaluation.
    fn on_attempt_skipped(&mut self, _operator: GeneticOperator, _error: &GpError) {}

    fn on_generation_complete(&mut self, _summary: &GenerationSummary) {}

    fn on_solution_found(&mut self, _solution: &Individual, _generation: usize) {}
}

/// An observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PopulationObserver for NoopObserver {}

/// Reports lifecycle events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver {
    level: LogLevel,
}

impl TracingObserver {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    fn verbose(&self) -> bool {
        self.level == LogLevel::Verbose
    }

    fn enabled(&self) -> bool {
        self.level != LogLevel::None
    }
}

impl PopulationObserver for TracingObserver {
    fn on_individual_created(&mut self, individual: &Individual) {
        if self.verbose() {
            debug!(expression = %individual.expression(), "Individual created");
        }
    }

    fn on_individual_evaluated(&mut self, index: usize, individual: &Individual) {
        if self.verbose() {
            debug!(
                index,
                expression = %individual.expression(),
                raw_fitness = ?individual.raw_fitness(),
                hits = ?individual.hits(),
                "Individual evaluated"
            );
        }
    }

    fn on_operator_applied(&mut self, operator: GeneticOperator, children: usize) {
        if self.verbose() {
            debug!(%operator, children, "Operator applied");
        }
    }

    fn on_attempt_skipped(&mut self, operator: GeneticOperator, error: &GpError) {
        if self.verbose() {
            debug!(%operator, %error, "Operator attempt skipped");
        }
    }

    fn on_generation_complete(&mut self, summary: &GenerationSummary) {
        if !self.enabled() {
            return;
        }
        info!(
            generation = summary.generation,
            best_raw_fitness = summary.best_raw_fitness,
            best_hits = summary.best_hits,
            case_count = summary.case_count,
            "Generation complete"
        );
        if self.verbose() {
            info!(
                generation = summary.generation,
                best = %summary.best_expression,
                average_adjusted_fitness = summary.average_adjusted_fitness,
                average_depth = summary.average_depth,
                deepest_depth = summary.deepest_depth,
                skipped = summary.report.as_ref().map_or(0, |r| r.skipped),
                "Generation statistics"
            );
        }
    }

    fn on_solution_found(&mut self, solution: &Individual, generation: usize) {
        if self.enabled() {
            info!(generation, solution = %solution.expression(), "Solution found");
        }
    }
}

//! # Population
//!
//! The `Population` owns the members of the current generation and drives the
//! run. Its lifecycle is a small state machine:
//!
//! ```text
//! Empty --populate()--> Scored --next()--> Scored (generation + 1) --breed()--> Terminated
//!                         ^
//!   load() --> Populated -+- recompute_stats()
//! ```
//!
//! Every structural change clears the cached [`PopulationStats`]; they come back
//! only through an explicit stats pass, which scores every member, queries its
//! depth and aggregates best, worst, adjusted-fitness sum and depths.
//!
//! `next()` builds the following generation:
//!
//! 1. `force_best` clones of the current best are added first.
//! 2. While the generation is short, a uniform draw picks an operator by
//!    cumulative probability, parents are selected, the operator is applied and as
//!    many children as fit are appended.
//! 3. An attempt that fails with `InvalidEvaluation` is dropped and counted in the
//!    [`GenerationReport`]. More than `retry_limit` consecutive drops abort the run.
//! 4. The stats pass scores the new generation. Only when it succeeds does the new
//!    generation replace the old one with the generation counter incremented.
//!
//! `breed()` calls `next()` until the best member hits every test case, or until
//! `max_generations` is reached when one is configured.
//!
//! Populations are assembled by [`PopulationBuilder`](crate::evolution::PopulationBuilder).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::engine::ExpressionEngine;
use crate::error::{GpError, OptionExt, Result};
use crate::evolution::observer::PopulationObserver;
use crate::evolution::operator::GeneticOperator;
use crate::evolution::options::RunConfig;
use crate::evolution::report::{GenerationReport, GenerationSummary};
use crate::evolution::stats::PopulationStats;
use crate::fitness::{CustomDeviance, FitnessEvaluator};
use crate::individual::{GeneticContext, Individual};
use crate::persistence;
use crate::rng::RandomNumberGenerator;
use crate::selection::SelectionStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulationState {
    /// No members yet.
    Empty,
    /// Members exist but the stats are stale.
    Populated,
    /// Members are scored and the stats are current.
    Scored,
    /// `breed()` found a solution.
    Terminated,
}

/// The result of a `breed()` call.
#[derive(Debug, Clone, PartialEq)]
pub struct BreedOutcome {
    pub best: Individual,
    pub generation: usize,
    /// Whether `best` hits every test case.
    pub solved: bool,
    /// Where the solution was written, when an output directory is configured.
    pub solution_path: Option<PathBuf>,
}

pub struct Population<E: ExpressionEngine> {
    config: RunConfig,
    engine: E,
    evaluator: FitnessEvaluator,
    selection: Box<dyn SelectionStrategy>,
    observer: Box<dyn PopulationObserver>,
    deviance_registry: HashMap<String, Arc<dyn CustomDeviance>>,
    rng: RandomNumberGenerator,
    members: Vec<Individual>,
    generation: usize,
    stats: Option<PopulationStats>,
    terminated: bool,
}

impl<E: ExpressionEngine> Population<E> {
    pub(crate) fn new(
        config: RunConfig,
        engine: E,
        evaluator: FitnessEvaluator,
        selection: Box<dyn SelectionStrategy>,
        observer: Box<dyn PopulationObserver>,
        deviance_registry: HashMap<String, Arc<dyn CustomDeviance>>,
        rng: RandomNumberGenerator,
    ) -> Self {
        Self {
            config,
            engine,
            evaluator,
            selection,
            observer,
            deviance_registry,
            rng,
            members: Vec::new(),
            generation: 0,
            stats: None,
            terminated: false,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable access to the engine session, e.g. to load further definitions.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    pub fn members(&self) -> &[Individual] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn case_count(&self) -> usize {
        self.evaluator.case_count()
    }

    /// The current aggregates, or `None` while they are stale.
    pub fn stats(&self) -> Option<&PopulationStats> {
        self.stats.as_ref()
    }

    /// The best member, if the stats are current.
    pub fn best(&self) -> Option<&Individual> {
        self.stats.as_ref().map(|s| &self.members[s.best])
    }

    /// The worst member, if the stats are current.
    pub fn worst(&self) -> Option<&Individual> {
        self.stats.as_ref().map(|s| &self.members[s.worst])
    }

    pub fn state(&self) -> PopulationState {
        if self.members.is_empty() {
            PopulationState::Empty
        } else if self.terminated {
            PopulationState::Terminated
        } else if self.stats.is_some() {
            PopulationState::Scored
        } else {
            PopulationState::Populated
        }
    }

    /// Changes the configuration before the population is filled.
    ///
    /// The closure works on a copy; the copy replaces the configuration only if it
    /// validates. Selection and deviance strategies are rebuilt from it, and a new
    /// seed reseeds the random source.
    ///
    /// # Errors
    ///
    /// Returns `GpError::IllegalState` once the population has members, and the
    /// validation error of the modified configuration otherwise.
    pub fn reconfigure<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut RunConfig),
    {
        if !self.members.is_empty() {
            return Err(GpError::IllegalState(
                "The configuration is frozen once the population has members".to_string(),
            ));
        }
        let mut candidate = self.config.clone();
        f(&mut candidate);
        candidate.validate()?;

        let selection = candidate
            .get_selection()
            .build_strategy(candidate.get_retry_limit())?;
        let evaluator = super::builder::evaluator_for(
            &candidate,
            self.evaluator.cases().clone(),
            &self.deviance_registry,
        )?;
        if candidate.get_seed() != self.config.get_seed() {
            if let Some(seed) = candidate.get_seed() {
                self.rng = RandomNumberGenerator::from_seed(seed);
            }
        }

        self.selection = selection;
        self.evaluator = evaluator;
        self.config = candidate;
        Ok(())
    }

    /// Fills the population with random programs and scores it.
    ///
    /// # Errors
    ///
    /// Returns `GpError::IllegalState` if no population size is configured, and
    /// propagates fatal engine errors and exhausted retries.
    pub fn populate(&mut self) -> Result<()> {
        let size = self.config.get_population_size().ok_or_else_gp(|| {
            GpError::IllegalState("populate() requires a population size".to_string())
        })?;

        self.members.clear();
        self.stats = None;
        self.generation = 0;
        self.terminated = false;
        self.members.reserve(size);

        let depth = self.config.get_initial_depth();
        for _ in 0..size {
            let mut ctx = GeneticContext::new(&mut self.engine, &self.config, &mut self.rng);
            let individual = Individual::randomize(&mut ctx, depth)?;
            self.observer.on_individual_created(&individual);
            self.members.push(individual);
        }
        info!(size, depth, "Population created");

        self.score_generation(None)
    }

    /// Runs the stats pass: scores every member, caches depths and aggregates.
    ///
    /// # Errors
    ///
    /// Returns `GpError::EmptyPopulation` if there are no members; fatal engine
    /// errors are propagated.
    pub fn recompute_stats(&mut self) -> Result<()> {
        self.stats = None;
        if self.members.is_empty() {
            return Err(GpError::EmptyPopulation);
        }

        for (index, member) in self.members.iter_mut().enumerate() {
            self.evaluator.evaluate(&mut self.engine, member)?;
            match member.depth(&mut self.engine) {
                Ok(_) => {}
                Err(e) if e.is_recoverable() => {
                    debug!(expression = %member.expression(), error = %e, "Depth unavailable");
                }
                Err(e) => return Err(e),
            }
            self.observer.on_individual_evaluated(index, member);
        }

        self.stats = Some(PopulationStats::compute(&self.members, &self.evaluator)?);
        Ok(())
    }

    /// Replaces the population with its next generation.
    ///
    /// The new generation is committed only once it has been scored. On any error
    /// the previous generation, its number and its stats stay in place.
    ///
    /// # Errors
    ///
    /// - `GpError::IllegalState` if the stats are stale or no size is configured.
    /// - `GpError::GeneticOperation` if the operator draw falls through every threshold.
    /// - `GpError::MaxAttemptsReached` after `retry_limit` consecutive dropped attempts.
    pub fn next(&mut self) -> Result<GenerationReport> {
        let stats = self.current_stats()?.clone();
        let size = self.config.get_population_size().ok_or_else_gp(|| {
            GpError::IllegalState("next() requires a population size".to_string())
        })?;
        let retry_limit = self.config.get_retry_limit();

        let mut report = GenerationReport::new(self.generation + 1);
        let mut offspring = Vec::with_capacity(size);

        for _ in 0..self.config.get_force_best().min(size) {
            let elite = self.members[stats.best].clone();
            self.observer.on_individual_created(&elite);
            offspring.push(elite);
            report.elites += 1;
        }

        let mut consecutive_skips = 0;
        while offspring.len() < size {
            let rnd = self.rng.uniform();
            let operator = GeneticOperator::choose(rnd, self.config.get_probabilities())?;

            match self.apply_operator(operator, &stats) {
                Ok(children) => {
                    consecutive_skips = 0;
                    let room = size - offspring.len();
                    let added = children.len().min(room);
                    for child in children.into_iter().take(room) {
                        self.observer.on_individual_created(&child);
                        offspring.push(child);
                    }
                    report.record(operator);
                    self.observer.on_operator_applied(operator, added);
                }
                Err(e) if e.is_recoverable() => {
                    report.skipped += 1;
                    consecutive_skips += 1;
                    self.observer.on_attempt_skipped(operator, &e);
                    if consecutive_skips >= retry_limit {
                        return Err(GpError::MaxAttemptsReached(format!(
                            "{} consecutive operator attempts failed in generation {}",
                            consecutive_skips,
                            self.generation + 1
                        )));
                    }
                }
                Err(e) => return Err(e),
            }
        }

        let previous = std::mem::replace(&mut self.members, offspring);
        self.generation += 1;
        self.stats = None;
        debug!(
            generation = self.generation,
            skipped = report.skipped,
            "Generation filled"
        );

        if let Err(e) = self.score_generation(Some(report.clone())) {
            self.members = previous;
            self.generation -= 1;
            self.stats = Some(stats);
            return Err(e);
        }
        Ok(report)
    }

    /// Advances generations until the best member hits every test case.
    ///
    /// Stale stats are recomputed first. When a solution is found it is written to
    /// the configured output directory and reported to the observer. With
    /// `max_generations` set, the run stops unsolved at that generation.
    ///
    /// # Errors
    ///
    /// Returns `GpError::IllegalState` on an empty population, and every fatal
    /// error of `next()`. After such an error the population still holds the last
    /// scored generation.
    pub fn breed(&mut self) -> Result<BreedOutcome> {
        if self.members.is_empty() {
            return Err(GpError::IllegalState(
                "breed() requires a populated population".to_string(),
            ));
        }
        if self.stats.is_none() {
            self.recompute_stats()?;
        }
        info!(
            generation = self.generation,
            case_count = self.case_count(),
            "Breeding started"
        );

        loop {
            let best = self.current_best()?;
            if best.hits() == Some(self.case_count()) {
                return self.finish_solved();
            }
            if let Some(max) = self.config.get_max_generations() {
                if self.generation >= max {
                    warn!(generation = self.generation, "Generation limit reached without a solution");
                    return Ok(BreedOutcome {
                        best: best.clone(),
                        generation: self.generation,
                        solved: false,
                        solution_path: None,
                    });
                }
            }
            self.next()?;
        }
    }

    /// Writes the generation dump and stats CSV into the configured output directory.
    ///
    /// # Errors
    ///
    /// Returns `GpError::IllegalState` if no output directory is configured or the
    /// members are unscored.
    pub fn save(&self) -> Result<(PathBuf, PathBuf)> {
        let dir = self.config.get_output_dir().ok_or_else_gp(|| {
            GpError::IllegalState("save() requires an output directory".to_string())
        })?;
        self.save_to(dir)
    }

    /// Writes the generation dump and stats CSV into `dir`.
    pub fn save_to(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        let run_name = self.config.get_run_name();
        let generation_path =
            persistence::generation_path(dir, run_name, self.config.get_solution_extension());
        let stats_path = persistence::stats_path(dir, run_name);

        persistence::write_stats(&stats_path, &self.members)?;
        persistence::write_generation(&generation_path, &self.members)?;
        info!(
            generation = self.generation,
            path = %generation_path.display(),
            "Population saved"
        );
        Ok((generation_path, stats_path))
    }

    /// Replaces the members with the expressions of a generation dump.
    ///
    /// The stats are stale afterwards. When no population size is configured the
    /// loaded size becomes the population size. A dump smaller than the configured
    /// size is accepted; the next generation is filled back up to the full size.
    ///
    /// # Errors
    ///
    /// Returns `GpError::EmptyPopulation` for an empty dump, and
    /// `GpError::Configuration` if the dump holds more members than the configured
    /// population size or the loaded size cannot hold `force_best` elites. The
    /// population is unchanged on error.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let members = persistence::read_generation(path.as_ref())?;
        if members.is_empty() {
            return Err(GpError::EmptyPopulation);
        }
        match self.config.get_population_size() {
            Some(size) if members.len() > size => {
                return Err(GpError::Configuration(format!(
                    "Generation dump holds {} members but the population size is {}",
                    members.len(),
                    size
                )));
            }
            Some(_) => {}
            None => {
                let mut config = self.config.clone();
                config.set_population_size(members.len());
                config.validate()?;
                self.config = config;
            }
        }

        let loaded = members.len();
        self.members = members;
        self.generation = 0;
        self.stats = None;
        self.terminated = false;
        info!(loaded, path = %path.as_ref().display(), "Population loaded");
        Ok(loaded)
    }

    fn current_stats(&self) -> Result<&PopulationStats> {
        self.stats.as_ref().ok_or_else_gp(|| {
            GpError::IllegalState(
                "Population statistics are stale; populate() or recompute_stats() first"
                    .to_string(),
            )
        })
    }

    fn current_best(&self) -> Result<&Individual> {
        let stats = self.current_stats()?;
        Ok(&self.members[stats.best])
    }

    fn apply_operator(
        &mut self,
        operator: GeneticOperator,
        stats: &PopulationStats,
    ) -> Result<Vec<Individual>> {
        let first = self.selection.select(&self.members, stats, &mut self.rng)?;
        let second = if operator.parent_count() == 2 {
            self.selection.select(&self.members, stats, &mut self.rng)?
        } else {
            first
        };

        let parent = &self.members[first];
        let mate = &self.members[second];
        let mut ctx = GeneticContext::new(&mut self.engine, &self.config, &mut self.rng);

        let children = match operator {
            GeneticOperator::Crossover => {
                let (a, b) = parent.crossover(mate, &mut ctx)?;
                vec![a, b]
            }
            GeneticOperator::ContextSensitiveCrossover => {
                let (a, b) = parent.context_sensitive_crossover(mate, &mut ctx)?;
                vec![a, b]
            }
            GeneticOperator::Mutation => vec![parent.mutate(&mut ctx)?],
            GeneticOperator::Replication => vec![parent.replicate()],
        };
        Ok(children)
    }

    fn score_generation(&mut self, report: Option<GenerationReport>) -> Result<()> {
        self.recompute_stats()?;
        let summary = self.summary(report)?;
        self.observer.on_generation_complete(&summary);
        Ok(())
    }

    fn summary(&self, report: Option<GenerationReport>) -> Result<GenerationSummary> {
        let stats = self.current_stats()?;
        let best = &self.members[stats.best];
        Ok(GenerationSummary {
            generation: self.generation,
            best_expression: best.expression().clone(),
            best_raw_fitness: best.raw_fitness().unwrap_or_default(),
            best_hits: best.hits().unwrap_or_default(),
            case_count: self.case_count(),
            average_adjusted_fitness: stats.average_adjusted_fitness(),
            average_depth: stats.average_depth(),
            deepest_depth: stats.deepest_depth,
            report,
        })
    }

    fn finish_solved(&mut self) -> Result<BreedOutcome> {
        let best = self.current_best()?.clone();
        let solution_path = match self.config.get_output_dir() {
            Some(dir) => {
                let path = persistence::solution_path(
                    dir,
                    self.config.get_run_name(),
                    self.config.get_solution_extension(),
                );
                persistence::write_solution(&path, &best)?;
                Some(path)
            }
            None => None,
        };

        self.terminated = true;
        self.observer.on_solution_found(&best, self.generation);
        Ok(BreedOutcome {
            best,
            generation: self.generation,
            solved: true,
            solution_path,
        })
    }
}

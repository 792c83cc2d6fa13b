//! # RunConfig
//!
//! The `RunConfig` struct holds every parameter of a run: population size, depth
//! bounds, operator probabilities, vocabulary, selection and deviance methods,
//! hit precision and elitism count, plus the ambient settings for persistence,
//! retries, seeding and logging.
//!
//! A configuration is built once, validated, and then frozen inside a
//! [`Population`](crate::evolution::Population). It can only be changed again
//! through [`Population::reconfigure`](crate::evolution::Population::reconfigure)
//! while the population is still empty.
//!
//! ## Example
//!
//! ```rust
//! use genprog::evolution::options::{LogLevel, OperatorProbabilities, RunConfig};
//! use genprog::selection::SelectionMethod;
//! use genprog::vocabulary::Vocabulary;
//!
//! let config = RunConfig::builder()
//!     .population_size(200)
//!     .vocabulary(Vocabulary::from_lists("INPUT1, CONSTANT-SYNTHESIS", "sin", "+,-,*"))
//!     .probabilities(OperatorProbabilities::new(0.8, 0.0, 0.1, 0.1))
//!     .selection("TOURNAMENT=4".parse::<SelectionMethod>().unwrap())
//!     .log_level(LogLevel::None)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.get_population_size(), Some(200));
//! assert_eq!(config.get_max_depth(), 100);
//! ```
//!
//! ## Defaults
//!
//! | Parameter          | Default                      |
//! |--------------------|------------------------------|
//! | initial depth      | 10                           |
//! | max depth          | 100                          |
//! | probabilities      | crossover 0.85, cs 0, mutate 0.05, replicate 0.1 |
//! | selection          | `FITNESS-PROPORTIONATE=0.9`  |
//! | deviance           | `OUTPUT`                     |
//! | precision          | 0.0001                       |
//! | force best         | 0                            |
//! | run name           | `run`                        |
//! | solution extension | `lsp`                        |
//! | retry limit        | 10 000                       |
//! | log level          | `Minimal`                    |

use std::path::{Path, PathBuf};

use crate::error::{GpError, Result};
use crate::expression::Expression;
use crate::fitness::DevianceMethod;
use crate::selection::SelectionMethod;
use crate::vocabulary::Vocabulary;

/// Allowed distance between the probability sum and 1.0.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Verbose,
    #[default]
    Minimal,
    None,
}

/// Probabilities of the four genetic operators. They must sum to 1.0.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatorProbabilities {
    pub crossover: f64,
    pub cs_crossover: f64,
    pub mutate: f64,
    pub replicate: f64,
}

impl OperatorProbabilities {
    pub fn new(crossover: f64, cs_crossover: f64, mutate: f64, replicate: f64) -> Self {
        Self {
            crossover,
            cs_crossover,
            mutate,
            replicate,
        }
    }

    pub fn sum(&self) -> f64 {
        self.crossover + self.cs_crossover + self.mutate + self.replicate
    }

    /// # Errors
    ///
    /// Returns `GpError::Configuration` if a probability is negative or not finite,
    /// or if the sum differs from 1.0 by more than [`PROBABILITY_TOLERANCE`].
    pub fn validate(&self) -> Result<()> {
        let all = [self.crossover, self.cs_crossover, self.mutate, self.replicate];
        if all.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(GpError::Configuration(format!(
                "Operator probabilities must be finite and non-negative: {:?}",
                self
            )));
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(GpError::Configuration(format!(
                "Operator probabilities must sum to 1.0, got {}",
                sum
            )));
        }
        Ok(())
    }
}

impl Default for OperatorProbabilities {
    fn default() -> Self {
        Self::new(0.85, 0.0, 0.05, 0.1)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    population_size: Option<usize>,
    initial_depth: usize,
    max_depth: usize,
    probabilities: OperatorProbabilities,
    vocabulary: Vocabulary,
    selection: SelectionMethod,
    deviance: DevianceMethod,
    precision: f64,
    force_best: usize,
    run_name: String,
    output_dir: Option<PathBuf>,
    solution_extension: String,
    retry_limit: usize,
    max_generations: Option<usize>,
    seed: Option<u64>,
    log_level: LogLevel,
    output_expression: Option<Expression>,
    definitions_file: Option<PathBuf>,
}

impl RunConfig {
    /// Returns a builder for creating a `RunConfig` instance.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// Checks every invariant of the configuration.
    ///
    /// # Errors
    ///
    /// Returns `GpError::Configuration` describing the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == Some(0) {
            return Err(GpError::Configuration(
                "Population size must be positive".to_string(),
            ));
        }
        if self.initial_depth > self.max_depth {
            return Err(GpError::Configuration(format!(
                "Initial depth ({}) exceeds max depth ({})",
                self.initial_depth, self.max_depth
            )));
        }
        self.probabilities.validate()?;
        self.vocabulary.validate()?;
        self.selection.validate()?;
        if !(self.precision.is_finite() && self.precision > 0.0) {
            return Err(GpError::Configuration(format!(
                "Precision must be positive, got {}",
                self.precision
            )));
        }
        if let Some(size) = self.population_size {
            if self.force_best >= size {
                return Err(GpError::Configuration(format!(
                    "Force-best count ({}) must be smaller than the population size ({})",
                    self.force_best, size
                )));
            }
        }
        if self.retry_limit == 0 {
            return Err(GpError::Configuration(
                "Retry limit must be at least 1".to_string(),
            ));
        }
        if self.run_name.trim().is_empty() {
            return Err(GpError::Configuration(
                "Run name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_population_size(&self) -> Option<usize> {
        self.population_size
    }

    pub fn get_initial_depth(&self) -> usize {
        self.initial_depth
    }

    pub fn get_max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn get_probabilities(&self) -> &OperatorProbabilities {
        &self.probabilities
    }

    pub fn get_vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn get_selection(&self) -> &SelectionMethod {
        &self.selection
    }

    pub fn get_deviance(&self) -> &DevianceMethod {
        &self.deviance
    }

    pub fn get_precision(&self) -> f64 {
        self.precision
    }

    pub fn get_force_best(&self) -> usize {
        self.force_best
    }

    pub fn get_run_name(&self) -> &str {
        &self.run_name
    }

    pub fn get_output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn get_solution_extension(&self) -> &str {
        &self.solution_extension
    }

    /// Upper bound for every retry loop of the run.
    pub fn get_retry_limit(&self) -> usize {
        self.retry_limit
    }

    pub fn get_max_generations(&self) -> Option<usize> {
        self.max_generations
    }

    pub fn get_seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn get_log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn get_output_expression(&self) -> Option<&Expression> {
        self.output_expression.as_ref()
    }

    pub fn get_definitions_file(&self) -> Option<&Path> {
        self.definitions_file.as_deref()
    }

    pub fn set_population_size(&mut self, population_size: usize) {
        self.population_size = Some(population_size);
    }

    pub fn set_initial_depth(&mut self, initial_depth: usize) {
        self.initial_depth = initial_depth;
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    pub fn set_probabilities(&mut self, probabilities: OperatorProbabilities) {
        self.probabilities = probabilities;
    }

    pub fn set_vocabulary(&mut self, vocabulary: Vocabulary) {
        self.vocabulary = vocabulary;
    }

    pub fn set_selection(&mut self, selection: SelectionMethod) {
        self.selection = selection;
    }

    pub fn set_deviance(&mut self, deviance: DevianceMethod) {
        self.deviance = deviance;
    }

    pub fn set_precision(&mut self, precision: f64) {
        self.precision = precision;
    }

    pub fn set_force_best(&mut self, force_best: usize) {
        self.force_best = force_best;
    }

    pub fn set_run_name(&mut self, run_name: impl Into<String>) {
        self.run_name = run_name.into();
    }

    pub fn set_output_dir(&mut self, output_dir: Option<PathBuf>) {
        self.output_dir = output_dir;
    }

    pub fn set_solution_extension(&mut self, extension: impl Into<String>) {
        self.solution_extension = extension.into();
    }

    pub fn set_retry_limit(&mut self, retry_limit: usize) {
        self.retry_limit = retry_limit;
    }

    pub fn set_max_generations(&mut self, max_generations: Option<usize>) {
        self.max_generations = max_generations;
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    pub fn set_log_level(&mut self, log_level: LogLevel) {
        self.log_level = log_level;
    }

    pub fn set_output_expression(&mut self, expression: Option<Expression>) {
        self.output_expression = expression;
    }

    pub fn set_definitions_file(&mut self, path: Option<PathBuf>) {
        self.definitions_file = path;
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            population_size: None,
            initial_depth: 10,
            max_depth: 100,
            probabilities: OperatorProbabilities::default(),
            vocabulary: Vocabulary::default(),
            selection: SelectionMethod::default(),
            deviance: DevianceMethod::default(),
            precision: 0.0001,
            force_best: 0,
            run_name: "run".to_string(),
            output_dir: None,
            solution_extension: "lsp".to_string(),
            retry_limit: 10_000,
            max_generations: None,
            seed: None,
            log_level: LogLevel::default(),
            output_expression: None,
            definitions_file: None,
        }
    }
}

/// Builder for `RunConfig`.
///
/// Provides a fluent interface for constructing `RunConfig` instances. Unset
/// fields keep their defaults.
#[derive(Debug, Clone, Default)]
pub struct RunConfigBuilder {
    population_size: Option<usize>,
    initial_depth: Option<usize>,
    max_depth: Option<usize>,
    probabilities: Option<OperatorProbabilities>,
    vocabulary: Option<Vocabulary>,
    selection: Option<SelectionMethod>,
    deviance: Option<DevianceMethod>,
    precision: Option<f64>,
    force_best: Option<usize>,
    run_name: Option<String>,
    output_dir: Option<PathBuf>,
    solution_extension: Option<String>,
    retry_limit: Option<usize>,
    max_generations: Option<usize>,
    seed: Option<u64>,
    log_level: Option<LogLevel>,
    output_expression: Option<Expression>,
    definitions_file: Option<PathBuf>,
}

impl RunConfigBuilder {
    pub fn population_size(mut self, value: usize) -> Self {
        self.population_size = Some(value);
        self
    }

    pub fn initial_depth(mut self, value: usize) -> Self {
        self.initial_depth = Some(value);
        self
    }

    pub fn max_depth(mut self, value: usize) -> Self {
        self.max_depth = Some(value);
        self
    }

    pub fn probabilities(mut self, value: OperatorProbabilities) -> Self {
        self.probabilities = Some(value);
        self
    }

    pub fn vocabulary(mut self, value: Vocabulary) -> Self {
        self.vocabulary = Some(value);
        self
    }

    pub fn selection(mut self, value: SelectionMethod) -> Self {
        self.selection = Some(value);
        self
    }

    pub fn deviance(mut self, value: DevianceMethod) -> Self {
        self.deviance = Some(value);
        self
    }

    pub fn precision(mut self, value: f64) -> Self {
        self.precision = Some(value);
        self
    }

    pub fn force_best(mut self, value: usize) -> Self {
        self.force_best = Some(value);
        self
    }

    pub fn run_name(mut self, value: impl Into<String>) -> Self {
        self.run_name = Some(value.into());
        self
    }

    /// Directory receiving the solution, generation dump and stats files.
    pub fn output_dir(mut self, value: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(value.into());
        self
    }

    pub fn solution_extension(mut self, value: impl Into<String>) -> Self {
        self.solution_extension = Some(value.into());
        self
    }

    pub fn retry_limit(mut self, value: usize) -> Self {
        self.retry_limit = Some(value);
        self
    }

    pub fn max_generations(mut self, value: usize) -> Self {
        self.max_generations = Some(value);
        self
    }

    pub fn seed(mut self, value: u64) -> Self {
        self.seed = Some(value);
        self
    }

    pub fn log_level(mut self, value: LogLevel) -> Self {
        self.log_level = Some(value);
        self
    }

    /// Target expression whose values on the inputs become the expected outputs.
    pub fn output_expression(mut self, value: impl Into<Expression>) -> Self {
        self.output_expression = Some(value.into());
        self
    }

    /// Source file loaded into the engine session before the run.
    pub fn definitions_file(mut self, value: impl Into<PathBuf>) -> Self {
        self.definitions_file = Some(value.into());
        self
    }

    /// Builds and validates the `RunConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns `GpError::Configuration` if the resulting configuration is invalid.
    pub fn build(self) -> Result<RunConfig> {
        let defaults = RunConfig::default();
        let config = RunConfig {
            population_size: self.population_size,
            initial_depth: self.initial_depth.unwrap_or(defaults.initial_depth),
            max_depth: self.max_depth.unwrap_or(defaults.max_depth),
            probabilities: self.probabilities.unwrap_or(defaults.probabilities),
            vocabulary: self.vocabulary.unwrap_or(defaults.vocabulary),
            selection: self.selection.unwrap_or(defaults.selection),
            deviance: self.deviance.unwrap_or(defaults.deviance),
            precision: self.precision.unwrap_or(defaults.precision),
            force_best: self.force_best.unwrap_or(defaults.force_best),
            run_name: self.run_name.unwrap_or(defaults.run_name),
            output_dir: self.output_dir,
            solution_extension: self
                .solution_extension
                .unwrap_or(defaults.solution_extension),
            retry_limit: self.retry_limit.unwrap_or(defaults.retry_limit),
            max_generations: self.max_generations,
            seed: self.seed,
            log_level: self.log_level.unwrap_or(defaults.log_level),
            output_expression: self.output_expression,
            definitions_file: self.definitions_file,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary() -> Vocabulary {
        Vocabulary::from_lists("X", "", "+")
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::builder().vocabulary(vocabulary()).build().unwrap();
        assert_eq!(config.get_population_size(), None);
        assert_eq!(config.get_initial_depth(), 10);
        assert_eq!(config.get_max_depth(), 100);
        assert_eq!(config.get_probabilities(), &OperatorProbabilities::new(0.85, 0.0, 0.05, 0.1));
        assert_eq!(
            config.get_selection(),
            &SelectionMethod::FitnessProportionate { selectivity: 0.9 }
        );
        assert_eq!(config.get_deviance(), &DevianceMethod::Output);
        assert_eq!(config.get_precision(), 0.0001);
        assert_eq!(config.get_force_best(), 0);
        assert_eq!(config.get_run_name(), "run");
        assert_eq!(config.get_solution_extension(), "lsp");
        assert_eq!(config.get_retry_limit(), 10_000);
        assert_eq!(config.get_log_level(), LogLevel::Minimal);
    }

    #[test]
    fn test_probability_sum_is_enforced() {
        let result = RunConfig::builder()
            .vocabulary(vocabulary())
            .probabilities(OperatorProbabilities::new(0.5, 0.3, 0.15, 0.1))
            .build();
        assert!(matches!(result, Err(GpError::Configuration(_))));

        let result = RunConfig::builder()
            .vocabulary(vocabulary())
            .probabilities(OperatorProbabilities::new(0.5, 0.3, 0.15, 0.05))
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_negative_probability_is_rejected() {
        let result = RunConfig::builder()
            .vocabulary(vocabulary())
            .probabilities(OperatorProbabilities::new(1.2, -0.2, 0.0, 0.0))
            .build();
        assert!(matches!(result, Err(GpError::Configuration(_))));
    }

    #[test]
    fn test_depth_order_is_enforced() {
        let result = RunConfig::builder()
            .vocabulary(vocabulary())
            .initial_depth(12)
            .max_depth(6)
            .build();
        assert!(matches!(result, Err(GpError::Configuration(_))));
    }

    #[test]
    fn test_force_best_must_be_below_population_size() {
        let result = RunConfig::builder()
            .vocabulary(vocabulary())
            .population_size(5)
            .force_best(5)
            .build();
        assert!(matches!(result, Err(GpError::Configuration(_))));
    }

    #[test]
    fn test_precision_and_vocabulary_are_checked() {
        assert!(RunConfig::builder()
            .vocabulary(vocabulary())
            .precision(0.0)
            .build()
            .is_err());
        assert!(RunConfig::builder().build().is_err());
    }

    #[test]
    fn test_setters() {
        let mut config = RunConfig::builder().vocabulary(vocabulary()).build().unwrap();
        config.set_population_size(40);
        config.set_force_best(2);
        config.set_selection(SelectionMethod::Tournament { size: 3 });
        config.set_output_dir(Some(PathBuf::from("out")));
        assert!(config.validate().is_ok());
        assert_eq!(config.get_output_dir(), Some(Path::new("out")));

        config.set_force_best(40);
        assert!(config.validate().is_err());
    }
}

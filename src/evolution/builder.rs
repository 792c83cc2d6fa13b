use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    engine::ExpressionEngine,
    error::{GpError, Result},
    evolution::observer::{PopulationObserver, TracingObserver},
    evolution::options::RunConfig,
    evolution::Population,
    fitness::{CustomDeviance, FitnessEvaluator, TestCases},
    persistence,
    rng::RandomNumberGenerator,
};

/// Assembles a [`Population`] from a configuration, an engine session and test cases.
///
/// `build()` validates the configuration, loads definitions into the engine,
/// generates expected outputs when an output expression is configured, resolves
/// the selection and deviance keywords and seeds the random source.
///
/// # Example
///
/// ```rust
/// use genprog::engine::ScriptedEngine;
/// use genprog::evolution::{options::RunConfig, PopulationBuilder};
/// use genprog::fitness::TestCases;
/// use genprog::vocabulary::Vocabulary;
///
/// let config = RunConfig::builder()
///     .population_size(4)
///     .vocabulary(Vocabulary::from_lists("X", "", "+"))
///     .seed(7)
///     .build()
///     .unwrap();
/// let cases = TestCases::new(vec![vec![1.0], vec![2.0]], Some(vec![1.0, 2.0])).unwrap();
///
/// let mut population = PopulationBuilder::new()
///     .with_config(config)
///     .with_engine(ScriptedEngine::new("X"))
///     .with_cases(cases)
///     .build()
///     .unwrap();
///
/// population.populate().unwrap();
/// let outcome = population.breed().unwrap();
/// assert!(outcome.solved);
/// ```
pub struct PopulationBuilder<E>
where
    E: ExpressionEngine,
{
    config: Option<RunConfig>,
    engine: Option<E>,
    cases: Option<TestCases>,
    custom_deviances: HashMap<String, Arc<dyn CustomDeviance>>,
    observer: Option<Box<dyn PopulationObserver>>,
    rng: Option<RandomNumberGenerator>,
    definitions: Vec<String>,
}

impl<E> PopulationBuilder<E>
where
    E: ExpressionEngine,
{
    pub fn new() -> Self {
        Self {
            config: None,
            engine: None,
            cases: None,
            custom_deviances: HashMap::new(),
            observer: None,
            rng: None,
            definitions: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_engine(mut self, engine: E) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn with_cases(mut self, cases: TestCases) -> Self {
        self.cases = Some(cases);
        self
    }

    /// Registers a deviance strategy selectable as `CUSTOM=<name>`.
    pub fn with_custom_deviance<D>(mut self, name: impl Into<String>, deviance: D) -> Self
    where
        D: CustomDeviance + 'static,
    {
        self.custom_deviances.insert(name.into(), Arc::new(deviance));
        self
    }

    /// Replaces the default [`TracingObserver`].
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: PopulationObserver + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Uses `rng` instead of seeding one from the configuration.
    pub fn with_rng(mut self, rng: RandomNumberGenerator) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Queues definitions loaded into the engine after the configured definitions file.
    pub fn with_definitions(mut self, source: impl Into<String>) -> Self {
        self.definitions.push(source.into());
        self
    }

    pub fn build(self) -> Result<Population<E>> {
        let config = self
            .config
            .ok_or_else(|| GpError::Configuration("Run configuration not specified".to_string()))?;
        config.validate()?;

        let mut engine = self
            .engine
            .ok_or_else(|| GpError::Configuration("Expression engine not specified".to_string()))?;

        let mut cases = self
            .cases
            .ok_or_else(|| GpError::Configuration("Test cases not specified".to_string()))?;

        if let Some(path) = config.get_definitions_file() {
            let source = persistence::read_definitions(path)?;
            engine.load_definitions(&source)?;
            debug!(path = %path.display(), "Definitions file loaded");
        }
        for source in &self.definitions {
            engine.load_definitions(source)?;
        }

        if let Some(target) = config.get_output_expression() {
            cases.generate_outputs(&mut engine, target)?;
            info!(expression = %target, cases = cases.len(), "Expected outputs generated");
        }

        let evaluator = evaluator_for(&config, cases, &self.custom_deviances)?;
        let selection = config
            .get_selection()
            .build_strategy(config.get_retry_limit())?;
        let observer = self
            .observer
            .unwrap_or_else(|| Box::new(TracingObserver::new(config.get_log_level())));
        let rng = match (self.rng, config.get_seed()) {
            (Some(rng), _) => rng,
            (None, Some(seed)) => RandomNumberGenerator::from_seed(seed),
            (None, None) => RandomNumberGenerator::new(),
        };

        Ok(Population::new(
            config,
            engine,
            evaluator,
            selection,
            observer,
            self.custom_deviances,
            rng,
        ))
    }
}

impl<E> Default for PopulationBuilder<E>
where
    E: ExpressionEngine,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves the configured deviance and pairs it with the test cases.
pub(crate) fn evaluator_for(
    config: &RunConfig,
    cases: TestCases,
    registry: &HashMap<String, Arc<dyn CustomDeviance>>,
) -> Result<FitnessEvaluator> {
    let method = config.get_deviance();
    if method.needs_outputs() && !cases.has_outputs() {
        return Err(GpError::Configuration(format!(
            "Deviance method {} needs expected outputs or an output expression",
            method
        )));
    }
    let deviance = method.resolve(registry)?;
    Ok(FitnessEvaluator::new(cases, deviance, config.get_precision()))
}

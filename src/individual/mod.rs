//! # Individual
//!
//! An `Individual` is one candidate program in the population. It owns an opaque
//! [`Expression`] handle plus the statistics computed for it: raw fitness and hits
//! (set only by the [`FitnessEvaluator`](crate::fitness::FitnessEvaluator)) and the
//! cached structural depth.
//!
//! The genetic operators never touch the expression tree themselves. They pick
//! random branch points, ask the [`ExpressionEngine`] for the transformation and
//! apply local policies:
//!
//! - `randomize` retries recoverable engine failures up to the configured retry limit.
//! - `crossover` and `context_sensitive_crossover` replace a child deeper than the
//!   maximum depth with a copy of the corresponding parent.
//! - `context_sensitive_crossover` falls back to standard crossover when the branch
//!   path does not exist in the mate or the engine reports an invalid evaluation.
//! - `randomize` and `mutate` run constant synthesis on the result.
//!
//! ## Example
//!
//! ```rust
//! use genprog::engine::ScriptedEngine;
//! use genprog::evolution::options::RunConfig;
//! use genprog::individual::{GeneticContext, Individual};
//! use genprog::rng::RandomNumberGenerator;
//! use genprog::vocabulary::Vocabulary;
//!
//! let config = RunConfig::builder()
//!     .vocabulary(Vocabulary::from_lists("X", "", "+"))
//!     .build()
//!     .unwrap();
//! let mut engine = ScriptedEngine::new("(+ X X)");
//! let mut rng = RandomNumberGenerator::from_seed(1);
//! let mut ctx = GeneticContext::new(&mut engine, &config, &mut rng);
//!
//! let program = Individual::randomize(&mut ctx, 3).unwrap();
//! assert_eq!(program.expression().as_str(), "(+ X X)");
//! assert!(program.raw_fitness().is_none());
//! ```

pub mod synthesis;

use tracing::debug;

use crate::engine::ExpressionEngine;
use crate::error::{GpError, Result};
use crate::evolution::options::RunConfig;
use crate::expression::Expression;
use crate::rng::RandomNumberGenerator;

pub use synthesis::synthesize_constants;

/// Everything a genetic operator borrows while it runs.
pub struct GeneticContext<'a> {
    pub engine: &'a mut dyn ExpressionEngine,
    pub config: &'a RunConfig,
    pub rng: &'a mut RandomNumberGenerator,
}

impl<'a> GeneticContext<'a> {
    pub fn new(
        engine: &'a mut dyn ExpressionEngine,
        config: &'a RunConfig,
        rng: &'a mut RandomNumberGenerator,
    ) -> Self {
        Self {
            engine,
            config,
            rng,
        }
    }
}

/// A candidate program with its cached statistics.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    expression: Expression,
    raw_fitness: Option<f64>,
    hits: Option<usize>,
    depth: Option<usize>,
}

impl Individual {
    /// Creates an unscored individual around an expression.
    pub fn new(expression: impl Into<Expression>) -> Self {
        Self {
            expression: expression.into(),
            raw_fitness: None,
            hits: None,
            depth: None,
        }
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Replaces the expression and resets every cached statistic.
    pub fn set_expression(&mut self, expression: impl Into<Expression>) {
        self.expression = expression.into();
        self.raw_fitness = None;
        self.hits = None;
        self.depth = None;
    }

    pub fn raw_fitness(&self) -> Option<f64> {
        self.raw_fitness
    }

    pub fn hits(&self) -> Option<usize> {
        self.hits
    }

    /// Records the result of a fitness evaluation.
    pub fn set_fitness(&mut self, raw_fitness: f64, hits: usize) {
        self.raw_fitness = Some(raw_fitness);
        self.hits = Some(hits);
    }

    /// Whether raw fitness and hits have been computed.
    pub fn is_scored(&self) -> bool {
        self.raw_fitness.is_some() && self.hits.is_some()
    }

    /// Returns `1 / (1 + |raw fitness|)`, which lies in `(0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns `GpError::IllegalState` if the individual has not been evaluated.
    pub fn adjusted_fitness(&self) -> Result<f64> {
        let raw = self.raw_fitness.ok_or_else(|| {
            GpError::IllegalState(format!(
                "Adjusted fitness requested before raw fitness was set for {}",
                self.expression
            ))
        })?;
        Ok(1.0 / (1.0 + raw.abs()))
    }

    /// The cached depth, if it has been queried since the expression last changed.
    pub fn cached_depth(&self) -> Option<usize> {
        self.depth
    }

    /// Returns the structural depth, asking the engine only on a cache miss.
    pub fn depth(&mut self, engine: &mut dyn ExpressionEngine) -> Result<usize> {
        if let Some(depth) = self.depth {
            return Ok(depth);
        }
        let depth = engine.depth(&self.expression)?;
        self.depth = Some(depth);
        Ok(depth)
    }

    /// Generates a random program no deeper than `depth`.
    ///
    /// # Errors
    ///
    /// Returns `GpError::MaxAttemptsReached` if the engine keeps reporting invalid
    /// evaluations for `retry_limit` consecutive attempts. Fatal engine errors are
    /// returned as is.
    pub fn randomize(ctx: &mut GeneticContext<'_>, depth: usize) -> Result<Self> {
        let limit = ctx.config.get_retry_limit();
        for attempt in 1..=limit {
            match ctx
                .engine
                .random_program(depth, ctx.config.get_vocabulary())
            {
                Ok(program) => {
                    let text = synthesize_constants(program.as_str(), ctx.rng);
                    return Ok(Self::new(text));
                }
                Err(e) if e.is_recoverable() => {
                    debug!(attempt, error = %e, "Discarding invalid random program");
                }
                Err(e) => return Err(e),
            }
        }
        Err(GpError::MaxAttemptsReached(format!(
            "No valid random program of depth {} after {} attempts",
            depth, limit
        )))
    }

    /// Standard subtree crossover with `mate` at uniformly chosen branch points.
    pub fn crossover(&self, mate: &Individual, ctx: &mut GeneticContext<'_>) -> Result<(Self, Self)> {
        let branch1 = random_branch(ctx, &self.expression)?;
        let branch2 = random_branch(ctx, &mate.expression)?;
        let (first, second) =
            ctx.engine
                .crossover_at(&self.expression, &mate.expression, branch1, branch2)?;
        Ok((
            self.depth_capped(first, ctx)?,
            mate.depth_capped(second, ctx)?,
        ))
    }

    /// Crossover restricted to the same structural location in both parents.
    ///
    /// Falls back to [`Individual::crossover`] when the chosen path does not exist
    /// in `mate` or the engine reports an invalid evaluation.
    pub fn context_sensitive_crossover(
        &self,
        mate: &Individual,
        ctx: &mut GeneticContext<'_>,
    ) -> Result<(Self, Self)> {
        match self.try_context_sensitive_crossover(mate, ctx) {
            Ok(Some(children)) => Ok(children),
            Ok(None) => {
                debug!("Path not present in mate, using standard crossover");
                self.crossover(mate, ctx)
            }
            Err(e) if e.is_recoverable() => {
                debug!(error = %e, "Context-sensitive crossover failed, using standard crossover");
                self.crossover(mate, ctx)
            }
            Err(e) => Err(e),
        }
    }

    fn try_context_sensitive_crossover(
        &self,
        mate: &Individual,
        ctx: &mut GeneticContext<'_>,
    ) -> Result<Option<(Self, Self)>> {
        let branch = random_branch(ctx, &self.expression)?;
        let path = ctx.engine.tree_path(branch, &self.expression)?;
        if !ctx.engine.path_exists(&mate.expression, &path)? {
            return Ok(None);
        }
        let (first, second) =
            ctx.engine
                .context_sensitive_crossover_at(&self.expression, &mate.expression, &path)?;
        Ok(Some((
            self.depth_capped(first, ctx)?,
            mate.depth_capped(second, ctx)?,
        )))
    }

    /// Structural mutation bounded by the configured maximum depth.
    pub fn mutate(&self, ctx: &mut GeneticContext<'_>) -> Result<Self> {
        let mutant = ctx.engine.mutate(
            &self.expression,
            ctx.config.get_max_depth(),
            ctx.config.get_vocabulary(),
        )?;
        let text = synthesize_constants(mutant.as_str(), ctx.rng);
        Ok(Self::new(text))
    }

    /// An unscored copy with the same expression.
    pub fn replicate(&self) -> Self {
        Self {
            expression: self.expression.clone(),
            raw_fitness: None,
            hits: None,
            depth: self.depth,
        }
    }

    /// Wraps a crossover child, substituting a copy of `self` when the child is too deep.
    fn depth_capped(&self, child: Expression, ctx: &mut GeneticContext<'_>) -> Result<Self> {
        let depth = ctx.engine.depth(&child)?;
        if depth > ctx.config.get_max_depth() {
            debug!(depth, max_depth = ctx.config.get_max_depth(), "Child too deep, keeping parent");
            return Ok(self.replicate());
        }
        let mut individual = Self::new(child);
        individual.depth = Some(depth);
        Ok(individual)
    }
}

/// Draws a uniform branch index in `[0, flat_count)`.
fn random_branch(ctx: &mut GeneticContext<'_>, expression: &Expression) -> Result<usize> {
    let count = ctx.engine.flat_count(expression)?;
    if count == 0 {
        return Err(GpError::InvalidEvaluation(format!(
            "{} has no branch points",
            expression
        )));
    }
    ctx.rng.index(count)
}

//! # ScriptedEngine
//!
//! A deterministic, in-memory [`ExpressionEngine`] whose answers are scripted up
//! front. It is meant for exercising the evolutionary core without a real
//! expression engine session: tests, benchmarks, and hosts validating their
//! configuration.
//!
//! Behavior:
//!
//! - `random_program` pops queued programs, then repeats the fallback program. The
//!   first `n` calls can be made to fail with `InvalidEvaluation`.
//! - `mutate` pops queued mutants, then returns the parent unchanged.
//! - `crossover_at` and `context_sensitive_crossover_at` swap the two parents.
//!   The first `n` context-sensitive calls can be made to fail with
//!   `InvalidEvaluation`.
//! - `depth` is the parenthesis nesting of the deepest atom, `flat_count` the
//!   number of atoms plus lists.
//! - `evaluate` runs a pluggable closure. The default understands numeric
//!   literals, `X` / `INPUT<n>` bound to the input vector, and `NAUGHTY`, which
//!   always fails with `InvalidEvaluation`.
//!
//! ## Example
//!
//! ```rust
//! use genprog::engine::{ExpressionEngine, ScriptedEngine};
//! use genprog::expression::Expression;
//!
//! let mut engine = ScriptedEngine::new("X");
//! let value = engine.evaluate(&Expression::from("X"), Some(&[2.5])).unwrap();
//! assert_eq!(value, 2.5);
//! ```

use std::collections::VecDeque;
use std::fmt;

use super::ExpressionEngine;
use crate::error::{GpError, Result};
use crate::expression::{Expression, TreePath};
use crate::vocabulary::Vocabulary;

/// Closure used by [`ScriptedEngine`] to evaluate expression text on an optional input vector.
pub type EvaluateFn = Box<dyn FnMut(&str, Option<&[f64]>) -> Result<f64>>;

/// Number of times each engine query has been answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineCalls {
    pub evaluate: usize,
    pub random_program: usize,
    pub crossover: usize,
    pub context_sensitive_crossover: usize,
    pub mutate: usize,
    pub load_definitions: usize,
}

pub struct ScriptedEngine {
    programs: VecDeque<Expression>,
    fallback_program: Expression,
    mutations: VecDeque<Expression>,
    failing_random_programs: usize,
    failing_context_crossovers: usize,
    compatible_paths: bool,
    evaluator: EvaluateFn,
    definitions: Vec<String>,
    calls: EngineCalls,
}

impl ScriptedEngine {
    /// Creates an engine whose random programs are all `fallback_program`.
    pub fn new(fallback_program: impl Into<Expression>) -> Self {
        Self {
            programs: VecDeque::new(),
            fallback_program: fallback_program.into(),
            mutations: VecDeque::new(),
            failing_random_programs: 0,
            failing_context_crossovers: 0,
            compatible_paths: true,
            evaluator: Box::new(evaluate_literal),
            definitions: Vec::new(),
            calls: EngineCalls::default(),
        }
    }

    /// Queues programs returned by `random_program` before the fallback.
    pub fn with_programs<I>(mut self, programs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Expression>,
    {
        self.programs.extend(programs.into_iter().map(Into::into));
        self
    }

    /// Queues mutants returned by `mutate` before it starts echoing its input.
    pub fn with_mutations<I>(mut self, mutations: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Expression>,
    {
        self.mutations.extend(mutations.into_iter().map(Into::into));
        self
    }

    /// Makes the first `count` calls to `random_program` fail with `InvalidEvaluation`.
    pub fn with_failing_random_programs(mut self, count: usize) -> Self {
        self.failing_random_programs = count;
        self
    }

    /// Makes the first `count` calls to `context_sensitive_crossover_at` fail with
    /// `InvalidEvaluation`.
    pub fn with_failing_context_crossovers(mut self, count: usize) -> Self {
        self.failing_context_crossovers = count;
        self
    }

    /// Sets the answer of every `path_exists` query.
    pub fn with_compatible_paths(mut self, compatible: bool) -> Self {
        self.compatible_paths = compatible;
        self
    }

    /// Replaces the evaluation closure.
    pub fn with_evaluator<F>(mut self, evaluator: F) -> Self
    where
        F: FnMut(&str, Option<&[f64]>) -> Result<f64> + 'static,
    {
        self.evaluator = Box::new(evaluator);
        self
    }

    pub fn calls(&self) -> EngineCalls {
        self.calls
    }

    /// Definitions loaded into this session, in load order.
    pub fn definitions(&self) -> &[String] {
        &self.definitions
    }
}

impl fmt::Debug for ScriptedEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedEngine")
            .field("programs", &self.programs)
            .field("fallback_program", &self.fallback_program)
            .field("mutations", &self.mutations)
            .field("failing_random_programs", &self.failing_random_programs)
            .field("failing_context_crossovers", &self.failing_context_crossovers)
            .field("compatible_paths", &self.compatible_paths)
            .field("definitions", &self.definitions)
            .field("calls", &self.calls)
            .finish_non_exhaustive()
    }
}

impl ExpressionEngine for ScriptedEngine {
    fn evaluate(&mut self, expression: &Expression, input: Option<&[f64]>) -> Result<f64> {
        self.calls.evaluate += 1;
        (self.evaluator)(expression.as_str(), input)
    }

    fn random_program(&mut self, _max_depth: usize, _vocabulary: &Vocabulary) -> Result<Expression> {
        self.calls.random_program += 1;
        if self.failing_random_programs > 0 {
            self.failing_random_programs -= 1;
            return Err(GpError::InvalidEvaluation(
                "scripted random program failure".to_string(),
            ));
        }
        Ok(self
            .programs
            .pop_front()
            .unwrap_or_else(|| self.fallback_program.clone()))
    }

    fn flat_count(&mut self, expression: &Expression) -> Result<usize> {
        let text = expression.as_str();
        let lists = text.matches('(').count();
        let atoms = text
            .split(|c: char| c == '(' || c == ')' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .count();
        Ok(lists + atoms)
    }

    fn depth(&mut self, expression: &Expression) -> Result<usize> {
        Ok(nesting_depth(expression.as_str()))
    }

    fn tree_path(&mut self, branch: usize, _expression: &Expression) -> Result<TreePath> {
        Ok(TreePath::new(format!("({})", branch)))
    }

    fn path_exists(&mut self, _expression: &Expression, _path: &TreePath) -> Result<bool> {
        Ok(self.compatible_paths)
    }

    fn crossover_at(
        &mut self,
        first: &Expression,
        second: &Expression,
        _branch1: usize,
        _branch2: usize,
    ) -> Result<(Expression, Expression)> {
        self.calls.crossover += 1;
        Ok((second.clone(), first.clone()))
    }

    fn context_sensitive_crossover_at(
        &mut self,
        first: &Expression,
        second: &Expression,
        _path: &TreePath,
    ) -> Result<(Expression, Expression)> {
        self.calls.context_sensitive_crossover += 1;
        if self.failing_context_crossovers > 0 {
            self.failing_context_crossovers -= 1;
            return Err(GpError::InvalidEvaluation(
                "scripted context-sensitive crossover failure".to_string(),
            ));
        }
        Ok((second.clone(), first.clone()))
    }

    fn mutate(
        &mut self,
        expression: &Expression,
        _max_depth: usize,
        _vocabulary: &Vocabulary,
    ) -> Result<Expression> {
        self.calls.mutate += 1;
        Ok(self
            .mutations
            .pop_front()
            .unwrap_or_else(|| expression.clone()))
    }

    fn load_definitions(&mut self, source: &str) -> Result<()> {
        self.calls.load_definitions += 1;
        self.definitions.push(source.to_string());
        Ok(())
    }
}

/// Parenthesis nesting of the deepest atom; a bare atom has depth 1.
fn nesting_depth(text: &str) -> usize {
    let mut level = 0usize;
    let mut deepest = 0usize;
    for ch in text.chars() {
        match ch {
            '(' => {
                level += 1;
                deepest = deepest.max(level);
            }
            ')' => level = level.saturating_sub(1),
            c if c.is_whitespace() => {}
            _ => deepest = deepest.max(level + 1),
        }
    }
    deepest
}

fn evaluate_literal(text: &str, input: Option<&[f64]>) -> Result<f64> {
    let text = text.trim();
    if text == "NAUGHTY" {
        return Err(GpError::InvalidEvaluation(format!(
            "floating point overflow in {}",
            text
        )));
    }

    let position = if text == "X" {
        Some(1)
    } else {
        text.strip_prefix("INPUT").and_then(|n| n.parse::<usize>().ok())
    };
    if let Some(position) = position {
        return input
            .and_then(|values| values.get(position.wrapping_sub(1)))
            .copied()
            .ok_or_else(|| GpError::Engine(format!("unbound variable {}", text)));
    }

    text.parse::<f64>()
        .map_err(|_| GpError::Engine(format!("cannot evaluate {}", text)))
}

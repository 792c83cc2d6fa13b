//! # Expression Engine
//!
//! The `ExpressionEngine` trait is the contract between the evolutionary core and
//! the external engine that owns the expression trees. The core never builds,
//! recombines or walks a tree itself; it only asks the engine to.
//!
//! An engine is a single long-lived session. Every query is a blocking
//! request/response, and definitions loaded into the session are never retracted.
//!
//! Any method may fail with [`GpError::InvalidEvaluation`](crate::error::GpError::InvalidEvaluation)
//! when the underlying numeric evaluation overflows or underflows. Callers decide
//! how to absorb it. Failures of the session itself should be reported as
//! [`GpError::Engine`](crate::error::GpError::Engine), which aborts the run.
//!
//! [`ScriptedEngine`] is a deterministic in-memory implementation for tests and
//! benchmarks.

pub mod scripted;

use crate::error::Result;
use crate::expression::{Expression, TreePath};
use crate::vocabulary::Vocabulary;

pub use scripted::ScriptedEngine;

/// The operations the core requires from an expression engine session.
pub trait ExpressionEngine {
    /// Evaluates an expression, binding the input vector first when one is given.
    fn evaluate(&mut self, expression: &Expression, input: Option<&[f64]>) -> Result<f64>;

    /// Generates a random expression no deeper than `max_depth`.
    fn random_program(&mut self, max_depth: usize, vocabulary: &Vocabulary) -> Result<Expression>;

    /// Counts the valid crossover/mutation points of an expression.
    fn flat_count(&mut self, expression: &Expression) -> Result<usize>;

    /// Structural depth of an expression.
    fn depth(&mut self, expression: &Expression) -> Result<usize>;

    /// Resolves the structural path of a branch.
    fn tree_path(&mut self, branch: usize, expression: &Expression) -> Result<TreePath>;

    /// Whether `path` addresses a branch of `expression`.
    fn path_exists(&mut self, expression: &Expression, path: &TreePath) -> Result<bool>;

    /// Swaps the subtrees at `branch1` of `first` and `branch2` of `second`.
    fn crossover_at(
        &mut self,
        first: &Expression,
        second: &Expression,
        branch1: usize,
        branch2: usize,
    ) -> Result<(Expression, Expression)>;

    /// Swaps the subtrees found at the same structural `path` in both parents.
    fn context_sensitive_crossover_at(
        &mut self,
        first: &Expression,
        second: &Expression,
        path: &TreePath,
    ) -> Result<(Expression, Expression)>;

    /// Structurally mutates an expression, keeping it within `max_depth`.
    fn mutate(
        &mut self,
        expression: &Expression,
        max_depth: usize,
        vocabulary: &Vocabulary,
    ) -> Result<Expression>;

    /// Extends the session with host definitions (functions, constants).
    fn load_definitions(&mut self, source: &str) -> Result<()>;
}

impl<E: ExpressionEngine + ?Sized> ExpressionEngine for Box<E> {
    fn evaluate(&mut self, expression: &Expression, input: Option<&[f64]>) -> Result<f64> {
        (**self).evaluate(expression, input)
    }

    fn random_program(&mut self, max_depth: usize, vocabulary: &Vocabulary) -> Result<Expression> {
        (**self).random_program(max_depth, vocabulary)
    }

    fn flat_count(&mut self, expression: &Expression) -> Result<usize> {
        (**self).flat_count(expression)
    }

    fn depth(&mut self, expression: &Expression) -> Result<usize> {
        (**self).depth(expression)
    }

    fn tree_path(&mut self, branch: usize, expression: &Expression) -> Result<TreePath> {
        (**self).tree_path(branch, expression)
    }

    fn path_exists(&mut self, expression: &Expression, path: &TreePath) -> Result<bool> {
        (**self).path_exists(expression, path)
    }

    fn crossover_at(
        &mut self,
        first: &Expression,
        second: &Expression,
        branch1: usize,
        branch2: usize,
    ) -> Result<(Expression, Expression)> {
        (**self).crossover_at(first, second, branch1, branch2)
    }

    fn context_sensitive_crossover_at(
        &mut self,
        first: &Expression,
        second: &Expression,
        path: &TreePath,
    ) -> Result<(Expression, Expression)> {
        (**self).context_sensitive_crossover_at(first, second, path)
    }

    fn mutate(
        &mut self,
        expression: &Expression,
        max_depth: usize,
        vocabulary: &Vocabulary,
    ) -> Result<Expression> {
        (**self).mutate(expression, max_depth, vocabulary)
    }

    fn load_definitions(&mut self, source: &str) -> Result<()> {
        (**self).load_definitions(source)
    }
}

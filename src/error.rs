//! # Error Types
//!
//! This module defines the error type used throughout the genetic programming
//! engine. The variants follow the way a run treats a failure:
//!
//! - [`GpError::InvalidEvaluation`] is the only recoverable variant. It signals a
//!   numerically undefined evaluation (overflow/underflow) and is absorbed locally:
//!   the fitness evaluator punishes the individual, the population drops the failed
//!   operator attempt, and random program generation retries.
//! - Every other variant is fatal and aborts the run with the offending context.
//!
//! ## Example
//!
//! ```rust
//! use genprog::error::{GpError, OptionExt, Result, ResultExt};
//!
//! fn first_input(path: &str) -> Result<f64> {
//!     let text = std::fs::read_to_string(path).context(format!("Failed to read {}", path))?;
//!     text.split(',')
//!         .next()
//!         .and_then(|value| value.trim().parse().ok())
//!         .ok_or_else_gp(|| GpError::Parse(format!("{} holds no numeric vector", path)))
//! }
//!
//! match first_input("/no/such/inputs.txt") {
//!     Err(e) => assert!(!e.is_recoverable()),
//!     Ok(_) => unreachable!(),
//! }
//! ```

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Represents errors that can occur while evolving a population of programs.
#[derive(Error, Debug)]
pub enum GpError {
    /// An expression evaluation was numerically undefined (overflow/underflow).
    ///
    /// This is the only recoverable variant.
    #[error("Invalid evaluation: {0}")]
    InvalidEvaluation(String),

    /// An operation was invoked before its prerequisite state was established.
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// An unrecognized configuration keyword or method name was supplied.
    #[error("Bad parameter: {0}")]
    BadParameter(String),

    /// The cumulative operator-probability selection fell through every branch.
    #[error("Genetic operation error: {0}")]
    GeneticOperation(String),

    /// A configuration value violates an invariant.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An operation required a non-empty population.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// A bounded retry loop gave up.
    #[error("Maximum attempts reached: {0}")]
    MaxAttemptsReached(String),

    /// A persisted artifact could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The expression engine session failed for a reason other than a numeric fault.
    #[error("Expression engine error: {0}")]
    Engine(String),

    /// A file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A foreign error wrapped with context.
    #[error("{0}")]
    Other(String),
}

impl GpError {
    /// Returns `true` for failures the engine absorbs locally instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GpError::InvalidEvaluation(_))
    }
}

/// A specialized Result type for genetic programming operations.
pub type Result<T> = std::result::Result<T, GpError>;

/// Wraps foreign errors into `GpError::Other`, prefixed with a context message.
pub trait ResultExt<T, E> {
    /// Adds context to an error, converting it to a `GpError`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| GpError::Other(format!("{}: {}", context, e)))
    }
}

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, GpError>` using a closure to
    /// generate the error.
    fn ok_or_else_gp<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GpError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_gp<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GpError,
    {
        self.ok_or_else(err_fn)
    }
}

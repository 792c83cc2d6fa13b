//! # Deviance
//!
//! Deviance is the per-case error of a program. Three strategies exist:
//!
//! - `Output`: `|expected[i] - evaluate(expr, input[i])|`.
//! - `ExternalFunction(name)`: `|evaluate("(<name> <expr>)", input[i])|`, which hands
//!   scoring to a function defined in the engine session.
//! - `Custom`: a host-registered [`CustomDeviance`].
//!
//! Configuration refers to a strategy by keyword through [`DevianceMethod`]:
//! `OUTPUT`, `LISP-FUNCTION=<name>` or `CUSTOM=<name>`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::engine::ExpressionEngine;
use crate::error::{GpError, OptionExt, Result};
use crate::fitness::TestCases;
use crate::individual::Individual;

/// A host-supplied deviance measure.
///
/// Implementations must return `GpError::InvalidEvaluation` when the program cannot
/// be evaluated on the case; the evaluator then punishes the individual.
pub trait CustomDeviance: fmt::Debug {
    fn calculate(
        &self,
        engine: &mut dyn ExpressionEngine,
        cases: &TestCases,
        individual: &Individual,
        case_index: usize,
    ) -> Result<f64>;
}

/// The keyword form of a deviance strategy, as it appears in configuration.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DevianceMethod {
    #[default]
    Output,
    ExternalFunction(String),
    Custom(String),
}

impl DevianceMethod {
    /// Resolves the keyword into a runnable strategy.
    ///
    /// # Errors
    ///
    /// Returns `GpError::BadParameter` if a custom name is not in `registry`.
    pub fn resolve(
        &self,
        registry: &HashMap<String, Arc<dyn CustomDeviance>>,
    ) -> Result<DevianceStrategy> {
        match self {
            DevianceMethod::Output => Ok(DevianceStrategy::Output),
            DevianceMethod::ExternalFunction(name) => {
                Ok(DevianceStrategy::ExternalFunction(name.clone()))
            }
            DevianceMethod::Custom(name) => registry
                .get(name)
                .cloned()
                .map(DevianceStrategy::Custom)
                .ok_or_else_gp(|| {
                    GpError::BadParameter(format!("No custom deviance registered as '{}'", name))
                }),
        }
    }

    /// Whether the strategy compares against expected outputs.
    pub fn needs_outputs(&self) -> bool {
        matches!(self, DevianceMethod::Output)
    }
}

impl FromStr for DevianceMethod {
    type Err = GpError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (keyword, argument) = match s.split_once('=') {
            Some((keyword, argument)) => (keyword.trim(), Some(argument.trim())),
            None => (s, None),
        };
        let name = |argument: Option<&str>| match argument {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => Err(GpError::BadParameter(format!(
                "Deviance method '{}' requires a function name",
                s
            ))),
        };

        match keyword.to_ascii_uppercase().as_str() {
            "OUTPUT" if argument.is_none() => Ok(DevianceMethod::Output),
            "LISP-FUNCTION" => Ok(DevianceMethod::ExternalFunction(name(argument)?)),
            "CUSTOM" => Ok(DevianceMethod::Custom(name(argument)?)),
            _ => Err(GpError::BadParameter(format!(
                "Unknown deviance method '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for DevianceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DevianceMethod::Output => write!(f, "OUTPUT"),
            DevianceMethod::ExternalFunction(name) => write!(f, "LISP-FUNCTION={}", name),
            DevianceMethod::Custom(name) => write!(f, "CUSTOM={}", name),
        }
    }
}

/// A resolved deviance strategy.
#[derive(Debug, Clone)]
pub enum DevianceStrategy {
    Output,
    ExternalFunction(String),
    Custom(Arc<dyn CustomDeviance>),
}

impl DevianceStrategy {
    /// Computes the deviance of `individual` on case `case_index`.
    ///
    /// # Errors
    ///
    /// Returns `GpError::InvalidEvaluation` if the evaluation fails numerically or
    /// yields a non-finite deviance, and `GpError::IllegalState` if `case_index` is
    /// out of range or the output strategy has no expected output for it.
    pub fn calculate(
        &self,
        engine: &mut dyn ExpressionEngine,
        cases: &TestCases,
        individual: &Individual,
        case_index: usize,
    ) -> Result<f64> {
        let input = cases.input(case_index).ok_or_else_gp(|| {
            GpError::IllegalState(format!("No test case at index {}", case_index))
        })?;

        let deviance = match self {
            DevianceStrategy::Output => {
                let expected = cases.output(case_index).ok_or_else_gp(|| {
                    GpError::IllegalState(format!(
                        "No expected output for test case {}",
                        case_index
                    ))
                })?;
                let actual = engine.evaluate(individual.expression(), Some(input))?;
                (expected - actual).abs()
            }
            DevianceStrategy::ExternalFunction(name) => {
                let call = individual.expression().call_with(name);
                engine.evaluate(&call, Some(input))?.abs()
            }
            DevianceStrategy::Custom(custom) => {
                custom.calculate(engine, cases, individual, case_index)?
            }
        };

        if !deviance.is_finite() {
            return Err(GpError::InvalidEvaluation(format!(
                "Non-finite deviance {} for {} on case {}",
                deviance,
                individual.expression(),
                case_index
            )));
        }
        Ok(deviance)
    }
}

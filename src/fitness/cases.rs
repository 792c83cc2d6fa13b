//! Test cases a program is scored against.

use crate::engine::ExpressionEngine;
use crate::error::{GpError, Result};
use crate::expression::Expression;

/// Input vectors and, when the deviance needs them, the expected outputs.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TestCases {
    inputs: Vec<Vec<f64>>,
    outputs: Option<Vec<f64>>,
}

impl TestCases {
    /// Creates a set of test cases.
    ///
    /// # Errors
    ///
    /// Returns `GpError::Configuration` if there are no inputs or if the outputs
    /// do not line up with the inputs.
    pub fn new(inputs: Vec<Vec<f64>>, outputs: Option<Vec<f64>>) -> Result<Self> {
        if inputs.is_empty() {
            return Err(GpError::Configuration(
                "At least one input case is required".to_string(),
            ));
        }
        if let Some(outputs) = &outputs {
            if outputs.len() != inputs.len() {
                return Err(GpError::Configuration(format!(
                    "Output count ({}) doesn't match input count ({})",
                    outputs.len(),
                    inputs.len()
                )));
            }
        }
        Ok(Self { inputs, outputs })
    }

    /// Creates test cases without expected outputs.
    pub fn from_inputs(inputs: Vec<Vec<f64>>) -> Result<Self> {
        Self::new(inputs, None)
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn inputs(&self) -> &[Vec<f64>] {
        &self.inputs
    }

    pub fn input(&self, index: usize) -> Option<&[f64]> {
        self.inputs.get(index).map(Vec::as_slice)
    }

    pub fn outputs(&self) -> Option<&[f64]> {
        self.outputs.as_deref()
    }

    pub fn output(&self, index: usize) -> Option<f64> {
        self.outputs.as_ref().and_then(|o| o.get(index)).copied()
    }

    pub fn has_outputs(&self) -> bool {
        self.outputs.is_some()
    }

    /// Replaces the expected outputs with the values of `target` on every input.
    ///
    /// # Errors
    ///
    /// Any evaluation failure, including `InvalidEvaluation`, is returned: a target
    /// that cannot be evaluated on its own inputs is a configuration problem.
    pub fn generate_outputs(
        &mut self,
        engine: &mut dyn ExpressionEngine,
        target: &Expression,
    ) -> Result<()> {
        let outputs = self
            .inputs
            .iter()
            .map(|input| engine.evaluate(target, Some(input)))
            .collect::<Result<Vec<f64>>>()?;
        self.outputs = Some(outputs);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ScriptedEngine;

    #[test]
    fn test_rejects_empty_inputs() {
        assert!(matches!(
            TestCases::from_inputs(Vec::new()),
            Err(GpError::Configuration(_))
        ));
    }

    #[test]
    fn test_rejects_mismatched_outputs() {
        let result = TestCases::new(vec![vec![0.0], vec![1.0]], Some(vec![0.0]));
        assert!(matches!(result, Err(GpError::Configuration(_))));
    }

    #[test]
    fn test_accessors() {
        let cases = TestCases::new(vec![vec![0.0], vec![1.0, 2.0]], Some(vec![0.0, 2.0])).unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases.input(1), Some(&[1.0, 2.0][..]));
        assert_eq!(cases.output(1), Some(2.0));
        assert_eq!(cases.output(2), None);
    }

    #[test]
    fn test_generate_outputs() {
        let mut engine = ScriptedEngine::new("X").with_evaluator(|_, input| {
            let x = input.map(|v| v[0]).unwrap_or(0.0);
            Ok(x * x)
        });
        let mut cases = TestCases::from_inputs(vec![vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        assert!(!cases.has_outputs());

        cases
            .generate_outputs(&mut engine, &Expression::from("(* X X)"))
            .unwrap();
        assert_eq!(cases.outputs(), Some(&[1.0, 4.0, 9.0][..]));
    }
}

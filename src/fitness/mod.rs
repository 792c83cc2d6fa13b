//! Fitness evaluation: test cases, deviance strategies and the evaluator that
//! aggregates them into raw fitness and hits.

pub mod cases;
pub mod deviance;
pub mod evaluator;

pub use cases::TestCases;
pub use deviance::{CustomDeviance, DevianceMethod, DevianceStrategy};
pub use evaluator::{FitnessEvaluator, PUNISHMENT_FITNESS};

pub mod engine;
pub mod error;
pub mod evolution;
pub mod expression;
pub mod fitness;
pub mod individual;
pub mod persistence;
pub mod rng;
pub mod selection;
pub mod vocabulary;

// Re-export commonly used types for convenience
pub use engine::{ExpressionEngine, ScriptedEngine};
pub use error::{GpError, OptionExt, Result, ResultExt};
pub use evolution::{
    BreedOutcome, GeneticOperator, LogLevel, OperatorProbabilities, Population,
    PopulationBuilder, PopulationObserver, RunConfig,
};
pub use expression::Expression;
pub use fitness::{CustomDeviance, DevianceMethod, FitnessEvaluator, TestCases};
pub use individual::Individual;
pub use selection::{SelectionMethod, SelectionStrategy};
pub use vocabulary::Vocabulary;

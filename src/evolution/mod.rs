pub mod builder;
pub mod observer;
pub mod operator;
pub mod options;
pub mod population;
pub mod report;
pub mod stats;

pub use builder::PopulationBuilder;
pub use observer::{NoopObserver, PopulationObserver, TracingObserver};
pub use operator::GeneticOperator;
pub use options::{LogLevel, OperatorProbabilities, RunConfig, RunConfigBuilder};
pub use population::{BreedOutcome, Population, PopulationState};
pub use report::{GenerationReport, GenerationSummary};
pub use stats::PopulationStats;

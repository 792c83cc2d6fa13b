//! Parent selection.
//!
//! Two strategies are available, chosen by keyword at configuration time:
//! `FITNESS-PROPORTIONATE=<selectivity>` and `TOURNAMENT=<size>`.

pub mod proportionate;
pub mod selection_strategy;
pub mod tournament;

pub use proportionate::FitnessProportionateSelection;
pub use selection_strategy::{SelectionMethod, SelectionStrategy};
pub use tournament::TournamentSelection;

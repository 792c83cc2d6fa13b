use std::fmt::{self, Debug};
use std::str::FromStr;

use crate::error::{GpError, Result};
use crate::evolution::stats::PopulationStats;
use crate::individual::Individual;
use crate::rng::RandomNumberGenerator;
use crate::selection::{FitnessProportionateSelection, TournamentSelection};

/// Trait for parent selection strategies.
///
/// A strategy picks one member of a scored generation. It must return a valid
/// index into `members` and must not modify the population.
///
/// # Examples
///
/// ```
/// use genprog::evolution::stats::PopulationStats;
/// use genprog::individual::Individual;
/// use genprog::rng::RandomNumberGenerator;
/// use genprog::selection::{SelectionStrategy, TournamentSelection};
///
/// let mut members = vec![Individual::new("A"), Individual::new("B")];
/// members[0].set_fitness(4.0, 0);
/// members[1].set_fitness(0.0, 1);
/// let stats = PopulationStats {
///     best: 1,
///     worst: 0,
///     size: 2,
///     adjusted_fitness_sum: 1.2,
///     total_depth: 2,
///     deepest_depth: 1,
/// };
///
/// let selection = TournamentSelection::new(8).unwrap();
/// let mut rng = RandomNumberGenerator::from_seed(3);
/// let winner = selection.select(&members, &stats, &mut rng).unwrap();
/// assert!(winner < members.len());
/// ```
pub trait SelectionStrategy: Debug {
    /// Selects a member and returns its index.
    ///
    /// # Arguments
    ///
    /// * `members` - The scored members of the current generation.
    /// * `stats` - The aggregates of the same generation.
    /// * `rng` - The run's random source.
    ///
    /// # Errors
    ///
    /// Returns `GpError::EmptyPopulation` if `members` is empty, or
    /// `GpError::IllegalState` if a sampled member is unscored.
    fn select(
        &self,
        members: &[Individual],
        stats: &PopulationStats,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize>;
}

/// The keyword form of a selection strategy, as it appears in configuration.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionMethod {
    FitnessProportionate { selectivity: f64 },
    Tournament { size: usize },
}

impl SelectionMethod {
    /// Checks the parameter range of the method.
    ///
    /// # Errors
    ///
    /// Returns `GpError::Configuration` if the selectivity is outside `[0, 1)` or
    /// the tournament size is zero.
    pub fn validate(&self) -> Result<()> {
        match *self {
            SelectionMethod::FitnessProportionate { selectivity } => {
                if !(0.0..1.0).contains(&selectivity) {
                    return Err(GpError::Configuration(format!(
                        "Selectivity must be in [0, 1), got {}",
                        selectivity
                    )));
                }
            }
            SelectionMethod::Tournament { size } => {
                if size < 1 {
                    return Err(GpError::Configuration(
                        "Tournament size must be at least 1".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Builds the strategy. `retry_limit` bounds fitness-proportionate rejection sampling.
    pub fn build_strategy(&self, retry_limit: usize) -> Result<Box<dyn SelectionStrategy>> {
        match *self {
            SelectionMethod::FitnessProportionate { selectivity } => Ok(Box::new(
                FitnessProportionateSelection::new(selectivity, retry_limit)?,
            )),
            SelectionMethod::Tournament { size } => Ok(Box::new(TournamentSelection::new(size)?)),
        }
    }
}

impl Default for SelectionMethod {
    fn default() -> Self {
        SelectionMethod::FitnessProportionate { selectivity: 0.9 }
    }
}

impl FromStr for SelectionMethod {
    type Err = GpError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let bad = || GpError::BadParameter(format!("Unknown selection method '{}'", s));
        let (keyword, value) = s.split_once('=').ok_or_else(bad)?;
        let value = value.trim();

        match keyword.trim().to_ascii_uppercase().as_str() {
            "FITNESS-PROPORTIONATE" => value
                .parse::<f64>()
                .map(|selectivity| SelectionMethod::FitnessProportionate { selectivity })
                .map_err(|_| bad()),
            "TOURNAMENT" => value
                .parse::<usize>()
                .map(|size| SelectionMethod::Tournament { size })
                .map_err(|_| bad()),
            _ => Err(bad()),
        }
    }
}

impl fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMethod::FitnessProportionate { selectivity } => {
                write!(f, "FITNESS-PROPORTIONATE={}", selectivity)
            }
            SelectionMethod::Tournament { size } => write!(f, "TOURNAMENT={}", size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(
            "FITNESS-PROPORTIONATE=0.9".parse::<SelectionMethod>().unwrap(),
            SelectionMethod::FitnessProportionate { selectivity: 0.9 }
        );
        assert_eq!(
            "tournament=7".parse::<SelectionMethod>().unwrap(),
            SelectionMethod::Tournament { size: 7 }
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        for bad in ["ROULETTE=2", "TOURNAMENT", "TOURNAMENT=big", "FITNESS-PROPORTIONATE=", ""] {
            assert!(
                matches!(bad.parse::<SelectionMethod>(), Err(GpError::BadParameter(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_validate_ranges() {
        assert!(SelectionMethod::default().validate().is_ok());
        assert!(SelectionMethod::FitnessProportionate { selectivity: 1.0 }
            .validate()
            .is_err());
        assert!(SelectionMethod::FitnessProportionate { selectivity: -0.1 }
            .validate()
            .is_err());
        assert!(SelectionMethod::Tournament { size: 0 }.validate().is_err());
    }

    #[test]
    fn test_display_round_trips_keyword() {
        let method = SelectionMethod::Tournament { size: 4 };
        assert_eq!(method.to_string(), "TOURNAMENT=4");
        assert_eq!(method.to_string().parse::<SelectionMethod>().unwrap(), method);
    }
}

//! # RandomNumberGenerator
//!
//! The `RandomNumberGenerator` struct is the single random source of a run. Every
//! stochastic decision (operator choice, parent selection, branch points, constant
//! synthesis) draws from it, so a seeded generator makes a run reproducible given a
//! deterministic expression engine.
//!
//! ## Example
//!
//! ```rust
//! use genprog::rng::RandomNumberGenerator;
//!
//! let mut rng = RandomNumberGenerator::from_seed(7);
//! let rnd = rng.uniform();
//! assert!((0.0..1.0).contains(&rnd));
//! ```

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Exp1};

use crate::error::{GpError, Result};

/// A wrapper around the `rand` crate's `StdRng` with the draws the engine needs.
#[derive(Debug, Clone)]
pub struct RandomNumberGenerator {
    pub rng: StdRng,
}

impl RandomNumberGenerator {
    /// Creates a new `RandomNumberGenerator` instance seeded from the system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a new `RandomNumberGenerator` instance with a specific seed.
    ///
    /// This is useful for reproducible runs, tests and benchmarks.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draws a uniform value in `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Draws a uniform value in `[0, upper]`.
    ///
    /// Returns `0.0` when `upper` is not a positive finite number.
    pub fn uniform_inclusive(&mut self, upper: f64) -> f64 {
        if !(upper.is_finite() && upper > 0.0) {
            return 0.0;
        }
        self.rng.gen_range(0.0..=upper)
    }

    /// Draws a uniform index in `[0, len)`.
    ///
    /// # Errors
    ///
    /// Returns `GpError::IllegalState` if `len` is zero.
    pub fn index(&mut self, len: usize) -> Result<usize> {
        if len == 0 {
            return Err(GpError::IllegalState(
                "Cannot draw an index from an empty range".to_string(),
            ));
        }
        Ok(self.rng.gen_range(0..len))
    }

    /// Draws a value with a uniformly chosen sign and an `Exponential(rate = 1)` magnitude.
    pub fn signed_exponential(&mut self) -> f64 {
        let magnitude: f64 = Exp1.sample(&mut self.rng);
        if self.rng.gen_bool(0.5) {
            magnitude
        } else {
            -magnitude
        }
    }
}

impl Default for RandomNumberGenerator {
    fn default() -> Self {
        Self::new()
    }
}

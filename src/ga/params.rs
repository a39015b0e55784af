use serde::{Deserialize, Serialize};

use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, validate_range, Validate};

/// Genetic-algorithm hyperparameters for community detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaParams {
    /// Individuals per generation.
    pub population: usize,
    /// Generations to run.
    pub generations: usize,
    /// Order of the power mean in the Community Score.
    pub r: f64,
    /// Probability that two parents actually interbreed.
    pub crossover_rate: f64,
    /// Probability that a child gene is re-pointed at another neighbor.
    pub mutation_rate: f64,
    /// Fraction of the population carried over unchanged each generation.
    pub elite_fraction: f64,
}

impl Default for GaParams {
    fn default() -> Self {
        Self {
            population: 300,
            generations: 60,
            r: 1.5,
            crossover_rate: 0.7,
            mutation_rate: 0.2,
            elite_fraction: 0.1,
        }
    }
}

impl Validate for GaParams {
    fn validate(&self) -> Result<()> {
        validate_positive_number("population", self.population, 2)?;
        validate_positive_number("generations", self.generations, 1)?;
        validate_range("r", self.r, 0.1, 10.0)?;
        validate_range("crossover_rate", self.crossover_rate, 0.0, 1.0)?;
        validate_range("mutation_rate", self.mutation_rate, 0.0, 1.0)?;
        // Strictly below 1 so the breeding pool is never empty.
        validate_range("elite_fraction", self.elite_fraction, 0.0, 0.99)?;
        Ok(())
    }
}

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ga::GaParams;
use crate::utils::error::{EgonetError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range, Validate,
};

/// TOML description of a hyperparameter sweep: which adjacency file to
/// analyze and the grid of GA parameters to evaluate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    pub sweep: SweepMeta,
    pub input: InputConfig,
    pub grid: GridConfig,
    pub run: Option<RunConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepMeta {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub adjacency_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub population: Vec<usize>,
    pub generations: Vec<usize>,
    pub crossover_rate: Vec<f64>,
    pub mutation_rate: Vec<f64>,
    #[serde(default = "default_r")]
    pub r: f64,
    #[serde(default = "default_elite_fraction")]
    pub elite_fraction: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub workers: Option<usize>,
    pub output_path: Option<String>,
    pub seed: Option<u64>,
}

fn default_r() -> f64 {
    1.5
}

fn default_elite_fraction() -> f64 {
    0.1
}

impl SweepConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EgonetError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);
        toml::from_str(&processed).map_err(|e| EgonetError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR_NAME}` with the environment value; unknown variables
    /// are left as-is so validation can report them.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").expect("static pattern");

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn workers(&self) -> usize {
        self.run.as_ref().and_then(|r| r.workers).unwrap_or(6)
    }

    pub fn output_path(&self) -> &str {
        self.run
            .as_ref()
            .and_then(|r| r.output_path.as_deref())
            .unwrap_or("./output")
    }

    pub fn seed(&self) -> Option<u64> {
        self.run.as_ref().and_then(|r| r.seed)
    }

    /// Cartesian product of the grid axes.
    pub fn combinations(&self) -> Vec<GaParams> {
        let mut combos = Vec::new();
        for &population in &self.grid.population {
            for &generations in &self.grid.generations {
                for &crossover_rate in &self.grid.crossover_rate {
                    for &mutation_rate in &self.grid.mutation_rate {
                        combos.push(GaParams {
                            population,
                            generations,
                            r: self.grid.r,
                            crossover_rate,
                            mutation_rate,
                            elite_fraction: self.grid.elite_fraction,
                        });
                    }
                }
            }
        }
        combos
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("sweep.name", &self.sweep.name)?;
        validate_path("input.adjacency_file", &self.input.adjacency_file)?;
        validate_path("run.output_path", self.output_path())?;
        validate_positive_number("run.workers", self.workers(), 1)?;

        let axes = [
            ("grid.population", self.grid.population.len()),
            ("grid.generations", self.grid.generations.len()),
            ("grid.crossover_rate", self.grid.crossover_rate.len()),
            ("grid.mutation_rate", self.grid.mutation_rate.len()),
        ];
        for (field, len) in axes {
            if len == 0 {
                return Err(EgonetError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: "[]".to_string(),
                    reason: "Grid axis cannot be empty".to_string(),
                });
            }
        }

        for &population in &self.grid.population {
            validate_positive_number("grid.population", population, 2)?;
        }
        for &generations in &self.grid.generations {
            validate_positive_number("grid.generations", generations, 1)?;
        }
        for &rate in &self.grid.crossover_rate {
            validate_range("grid.crossover_rate", rate, 0.0, 1.0)?;
        }
        for &rate in &self.grid.mutation_rate {
            validate_range("grid.mutation_rate", rate, 0.0, 1.0)?;
        }
        validate_range("grid.r", self.grid.r, 0.1, 10.0)?;
        validate_range("grid.elite_fraction", self.grid.elite_fraction, 0.0, 0.99)?;

        Ok(())
    }
}

impl Validate for SweepConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC_TOML: &str = r#"
[sweep]
name = "grid-search"
description = "GA hyperparameter analysis"

[input]
adjacency_file = "friends.json"

[grid]
population = [300, 400, 500]
generations = [30, 40]
crossover_rate = [0.7, 0.8]
mutation_rate = [0.2, 0.3]

[run]
workers = 6
seed = 42
"#;

    #[test]
    fn test_parse_basic_config() {
        let config = SweepConfig::from_toml_str(BASIC_TOML).unwrap();

        assert_eq!(config.sweep.name, "grid-search");
        assert_eq!(config.input.adjacency_file, "friends.json");
        assert_eq!(config.workers(), 6);
        assert_eq!(config.seed(), Some(42));
        assert_eq!(config.output_path(), "./output");
        // Grid defaults apply when omitted.
        assert_eq!(config.grid.r, 1.5);
        assert_eq!(config.grid.elite_fraction, 0.1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_combinations_are_cartesian_product() {
        let config = SweepConfig::from_toml_str(BASIC_TOML).unwrap();
        let combos = config.combinations();
        assert_eq!(combos.len(), 3 * 2 * 2 * 2);
        assert!(combos
            .iter()
            .any(|p| p.population == 500 && p.generations == 40 && p.mutation_rate == 0.3));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SWEEP_TEST_INPUT", "custom.json");

        let toml_content = r#"
[sweep]
name = "env-test"

[input]
adjacency_file = "${SWEEP_TEST_INPUT}"

[grid]
population = [10]
generations = [2]
crossover_rate = [0.7]
mutation_rate = [0.2]
"#;

        let config = SweepConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.input.adjacency_file, "custom.json");

        std::env::remove_var("SWEEP_TEST_INPUT");
    }

    #[test]
    fn test_empty_axis_rejected() {
        let toml_content = r#"
[sweep]
name = "bad"

[input]
adjacency_file = "friends.json"

[grid]
population = []
generations = [30]
crossover_rate = [0.7]
mutation_rate = [0.2]
"#;

        let config = SweepConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_rate_rejected() {
        let toml_content = r#"
[sweep]
name = "bad"

[input]
adjacency_file = "friends.json"

[grid]
population = [10]
generations = [5]
crossover_rate = [1.7]
mutation_rate = [0.2]
"#;

        let config = SweepConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC_TOML.as_bytes()).unwrap();

        let config = SweepConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.sweep.name, "grid-search");
    }
}

use crate::genomics::TraitSchema;
use crate::operators::{ConfigError, ConfigIssues, FitnessType};

use serde::{Deserialize, Serialize};

/// Configuration of an experiment run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Name used in logs.
    pub name: String,
    /// Number of generations to run.
    pub iterations: usize,
    /// How the best genome is tracked across generations.
    pub fitness_type: FitnessType,
    /// Traits carried by every genome. Those flagged as settings
    /// are published from the best genome after each generation.
    pub traits: TraitSchema,
}

impl ExperimentConfig {
    /// Returns a "zero-valued" configuration.
    ///
    /// # Note
    /// Zero iterations do not validate; set them before running.
    pub fn zero() -> ExperimentConfig {
        ExperimentConfig {
            name: String::new(),
            iterations: 0,
            fitness_type: FitnessType::Absolute,
            traits: TraitSchema::default(),
        }
    }

    /// Checks that at least one iteration is requested and that
    /// trait names are unique.
    ///
    /// # Examples
    /// ```
    /// use evoneat::experiment::ExperimentConfig;
    ///
    /// assert!(ExperimentConfig::zero().validate().is_err());
    /// let config = ExperimentConfig {
    ///     name: "xor".into(),
    ///     iterations: 100,
    ///     ..ExperimentConfig::zero()
    /// };
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        if self.iterations == 0 {
            issues.push("iterations must be at least 1");
        }
        for (i, t) in self.traits.iter().enumerate() {
            if self.traits.index_of(&t.name) != Some(i) {
                issues.push(format_args!("trait name {} is not unique", t.name));
            }
        }
        issues.finish()
    }
}

use crate::operators::{ConfigError, ConfigIssues};

use serde::{Deserialize, Serialize};

/// Configuration of threshold-based speciation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciaterConfig {
    /// Compatibility distance below which a genome
    /// joins a species.
    pub compatibility_threshold: f64,
}

impl SpeciaterConfig {
    /// Returns a "zero-valued" configuration.
    pub const fn zero() -> SpeciaterConfig {
        SpeciaterConfig {
            compatibility_threshold: 0.0,
        }
    }

    /// Checks that the threshold is positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        if self.compatibility_threshold <= 0.0 || self.compatibility_threshold.is_nan() {
            issues.push(format_args!(
                "compatibility_threshold must be positive, got {}",
                self.compatibility_threshold
            ));
        }
        issues.finish()
    }
}

/// Configuration of the species-count control loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DynamicSpeciaterConfig {
    /// Species count the threshold is steered towards.
    pub target_number_of_species: usize,
    /// Amount the threshold moves after each speciation.
    pub compatibility_modifier: f64,
    /// Lowest value the threshold may be lowered to.
    pub compatibility_threshold_floor: f64,
}

impl DynamicSpeciaterConfig {
    /// Returns a "zero-valued" configuration, with
    /// the threshold floor at the classic 0.3.
    pub const fn zero() -> DynamicSpeciaterConfig {
        DynamicSpeciaterConfig {
            target_number_of_species: 0,
            compatibility_modifier: 0.0,
            compatibility_threshold_floor: 0.3,
        }
    }

    /// Checks the modifier and the floor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        issues.non_negative("compatibility_modifier", self.compatibility_modifier);
        issues.non_negative(
            "compatibility_threshold_floor",
            self.compatibility_threshold_floor,
        );
        if self.target_number_of_species == 0 {
            issues.push("target_number_of_species must be at least 1");
        }
        issues.finish()
    }
}

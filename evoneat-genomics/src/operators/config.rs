use crate::genomics::ActivationType;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::fmt;

/// An error type listing every problem found
/// while validating a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid configuration: {}", .issues.join("; "))]
pub struct ConfigError {
    pub issues: Vec<String>,
}

/// Accumulates configuration problems so they
/// can be reported all at once.
#[derive(Debug, Default)]
pub struct ConfigIssues(Vec<String>);

impl ConfigIssues {
    /// Creates an empty issue list.
    pub fn new() -> ConfigIssues {
        ConfigIssues::default()
    }

    /// Records an issue.
    pub fn push(&mut self, issue: impl fmt::Display) {
        self.0.push(issue.to_string());
    }

    /// Records an issue if `value` is not a probability.
    pub fn probability(&mut self, name: &str, value: f64) {
        if !(0.0..=1.0).contains(&value) {
            self.push(format_args!("{} must be in [0, 1], got {}", name, value));
        }
    }

    /// Records an issue if `value` is negative.
    pub fn non_negative(&mut self, name: &str, value: f64) {
        if value < 0.0 || value.is_nan() {
            self.push(format_args!("{} must be non-negative, got {}", name, value));
        }
    }

    /// Absorbs the issues of a nested configuration.
    pub fn merge(&mut self, result: Result<(), ConfigError>) {
        if let Err(e) = result {
            self.0.extend(e.issues);
        }
    }

    /// Returns `Ok` if no issue was recorded.
    pub fn finish(self) -> Result<(), ConfigError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ConfigError { issues: self.0 })
        }
    }
}

/// How population improvement is judged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitnessType {
    /// Fitness is an absolute measure; higher is always better
    /// and the best genome ever seen is kept.
    Absolute,
    /// Fitness is only meaningful relative to the rest of the
    /// current population, as in coevolution or novelty search.
    Relative,
}

/// Coefficients of the compatibility distance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparerConfig {
    /// Weight of excess genes in the distance.
    pub excess_coefficient: f64,
    /// Weight of disjoint genes in the distance.
    pub disjoint_coefficient: f64,
    /// Weight of the mean weight difference of matching genes.
    pub weight_coefficient: f64,
}

impl ComparerConfig {
    /// Returns a "zero-valued" configuration.
    pub const fn zero() -> ComparerConfig {
        ComparerConfig {
            excess_coefficient: 0.0,
            disjoint_coefficient: 0.0,
            weight_coefficient: 0.0,
        }
    }

    /// Checks that all coefficients are non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        issues.non_negative("excess_coefficient", self.excess_coefficient);
        issues.non_negative("disjoint_coefficient", self.disjoint_coefficient);
        issues.non_negative("weight_coefficient", self.weight_coefficient);
        issues.finish()
    }
}

/// Configuration of crossover.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrosserConfig {
    /// Chance a disabled connection of the offspring is re-enabled.
    pub enable_probability: f64,
    /// Chance that matching genes (and traits of equally fit parents)
    /// are averaged, instead of copied from a randomly chosen parent.
    pub mate_by_averaging_probability: f64,
}

impl CrosserConfig {
    /// Returns a "zero-valued" configuration.
    pub const fn zero() -> CrosserConfig {
        CrosserConfig {
            enable_probability: 0.0,
            mate_by_averaging_probability: 0.0,
        }
    }

    /// Checks that all probabilities lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        issues.probability("enable_probability", self.enable_probability);
        issues.probability(
            "mate_by_averaging_probability",
            self.mate_by_averaging_probability,
        );
        issues.finish()
    }
}

/// Configuration of connection weight mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    /// Chance each connection's weight is mutated.
    pub mutate_weight_probability: f64,
    /// Chance a mutated weight is replaced rather than perturbed.
    pub replace_weight_probability: f64,
    /// Magnitude bound of replacement weights.
    pub weight_range: f64,
}

impl WeightConfig {
    /// Returns a "zero-valued" configuration.
    pub const fn zero() -> WeightConfig {
        WeightConfig {
            mutate_weight_probability: 0.0,
            replace_weight_probability: 0.0,
            weight_range: 0.0,
        }
    }

    /// Checks probabilities and the weight range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        issues.probability("mutate_weight_probability", self.mutate_weight_probability);
        issues.probability(
            "replace_weight_probability",
            self.replace_weight_probability,
        );
        issues.non_negative("weight_range", self.weight_range);
        issues.finish()
    }
}

/// Configuration of trait mutation.
///
/// Setting traits and plain traits are mutated
/// with independent probabilities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraitConfig {
    /// Chance each plain trait is mutated.
    pub mutate_trait_probability: f64,
    /// Chance a mutated plain trait is replaced rather than perturbed.
    pub replace_trait_probability: f64,
    /// Chance each setting trait is mutated.
    pub mutate_setting_probability: f64,
    /// Chance a mutated setting trait is replaced rather than perturbed.
    pub replace_setting_probability: f64,
}

impl TraitConfig {
    /// Returns a "zero-valued" configuration.
    pub const fn zero() -> TraitConfig {
        TraitConfig {
            mutate_trait_probability: 0.0,
            replace_trait_probability: 0.0,
            mutate_setting_probability: 0.0,
            replace_setting_probability: 0.0,
        }
    }

    /// Checks that all probabilities lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        issues.probability("mutate_trait_probability", self.mutate_trait_probability);
        issues.probability("replace_trait_probability", self.replace_trait_probability);
        issues.probability(
            "mutate_setting_probability",
            self.mutate_setting_probability,
        );
        issues.probability(
            "replace_setting_probability",
            self.replace_setting_probability,
        );
        issues.finish()
    }
}

/// Configuration of topology-growing mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComplexifyConfig {
    /// Chance of a node addition.
    pub add_node_probability: f64,
    /// Chance of a connection addition, tried only if
    /// no node addition was attempted.
    pub add_conn_probability: f64,
    /// Whether connections may point backwards or sideways.
    pub allow_recurrent: bool,
    /// Activation function of new hidden nodes.
    pub hidden_activation: ActivationType,
    /// Magnitude bound of new connection weights.
    pub weight_range: f64,
}

impl ComplexifyConfig {
    /// Returns a "zero-valued" configuration. New hidden
    /// nodes default to [`SteepenedSigmoid`].
    ///
    /// [`SteepenedSigmoid`]: crate::genomics::ActivationType::SteepenedSigmoid
    ///
    /// # Examples
    /// ```
    /// use evoneat_genomics::operators::ComplexifyConfig;
    ///
    /// let config = ComplexifyConfig {
    ///     add_conn_probability: 0.3,
    ///     weight_range: 2.5,
    ///     ..ComplexifyConfig::zero()
    /// };
    /// assert!(config.validate().is_ok());
    /// ```
    pub const fn zero() -> ComplexifyConfig {
        ComplexifyConfig {
            add_node_probability: 0.0,
            add_conn_probability: 0.0,
            allow_recurrent: false,
            hidden_activation: ActivationType::SteepenedSigmoid,
            weight_range: 0.0,
        }
    }

    /// Checks probabilities and the weight range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        issues.probability("add_node_probability", self.add_node_probability);
        issues.probability("add_conn_probability", self.add_conn_probability);
        issues.non_negative("weight_range", self.weight_range);
        issues.finish()
    }
}

/// Configuration of topology-shrinking mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PruningConfig {
    /// Chance of a node deletion.
    pub del_node_probability: f64,
    /// Chance of a connection deletion, tried only if
    /// no node deletion was attempted.
    pub del_conn_probability: f64,
}

impl PruningConfig {
    /// Returns a "zero-valued" configuration.
    pub const fn zero() -> PruningConfig {
        PruningConfig {
            del_node_probability: 0.0,
            del_conn_probability: 0.0,
        }
    }

    /// Checks that all probabilities lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        issues.probability("del_node_probability", self.del_node_probability);
        issues.probability("del_conn_probability", self.del_conn_probability);
        issues.finish()
    }
}

/// Configuration of phased search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhasedConfig {
    /// Offset above the mean population complexity
    /// at which pruning may begin.
    pub pruning_phase_threshold: f64,
    /// Generations without a drop in mean population
    /// complexity before pruning ends.
    pub max_mpc_age: usize,
    /// Generations without improvement required
    /// before pruning may begin.
    pub max_improvement_age: usize,
    /// How improvement is measured across the population.
    pub improvement_type: FitnessType,
}

impl PhasedConfig {
    /// Returns a "zero-valued" configuration.
    pub const fn zero() -> PhasedConfig {
        PhasedConfig {
            pruning_phase_threshold: 0.0,
            max_mpc_age: 0,
            max_improvement_age: 0,
            improvement_type: FitnessType::Absolute,
        }
    }

    /// Checks that the threshold is positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        if self.pruning_phase_threshold <= 0.0 || self.pruning_phase_threshold.is_nan() {
            issues.push(format_args!(
                "pruning_phase_threshold must be positive, got {}",
                self.pruning_phase_threshold
            ));
        }
        issues.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_configs_validate() {
        assert!(ComparerConfig::zero().validate().is_ok());
        assert!(CrosserConfig::zero().validate().is_ok());
        assert!(WeightConfig::zero().validate().is_ok());
        assert!(TraitConfig::zero().validate().is_ok());
        assert!(ComplexifyConfig::zero().validate().is_ok());
        assert!(PruningConfig::zero().validate().is_ok());
    }

    #[test]
    fn all_issues_reported() {
        let config = CrosserConfig {
            enable_probability: 1.5,
            mate_by_averaging_probability: -0.1,
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.issues.len(), 2);
        assert!(err.to_string().contains("enable_probability"));
    }

    #[test]
    fn phased_threshold_must_be_positive() {
        assert!(PhasedConfig::zero().validate().is_err());
        assert!(PhasedConfig {
            pruning_phase_threshold: 30.0,
            ..PhasedConfig::zero()
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn configs_round_trip_through_json() {
        let config = ComplexifyConfig {
            add_node_probability: 0.03,
            allow_recurrent: true,
            ..ComplexifyConfig::zero()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(
            serde_json::from_str::<ComplexifyConfig>(&json).unwrap(),
            config
        );
    }
}

use crate::genomics::{ActivationType, Genome, TraitSchema};
use crate::operators::{ConfigError, ConfigIssues};

use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Configuration data for population generation
/// and evolution.
///
/// # Note
/// All quantities expressing probabilities
/// should be in the range [0.0, 1.0]. [`validate`]
/// reports any that are not.
///
/// [`validate`]: GeneratorConfig::validate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Size of the population.
    pub population_size: NonZeroUsize,
    /// Number of input nodes of the seed genome.
    pub num_inputs: usize,
    /// Number of output nodes of the seed genome.
    pub num_outputs: usize,
    /// Activation function of the seed genome's outputs.
    pub output_activation: ActivationType,
    /// Magnitude bound of the seed genome's weights.
    pub weight_range: f64,
    /// Traits carried by every genome.
    pub traits: TraitSchema,
    /// Top % of each species which can participate
    /// in mating.
    pub survival_threshold: f64,
    /// Chance that offspring will be the result
    /// of asexual reproduction.
    pub mutate_only_probability: f64,
    /// Chance that the second parent is drawn from
    /// the whole population instead of the first
    /// parent's species.
    pub interspecies_mating_rate: f64,
    /// Number of generations without improvement
    /// a species survives.
    pub max_stagnation: usize,
    /// Species younger than this have their share
    /// of offspring boosted.
    pub young_age: usize,
    /// Species older than this have their share
    /// of offspring penalized.
    pub old_age: usize,
    /// Genome the first generation is cloned from. If absent,
    /// a fully connected network without hidden nodes is built
    /// from the input and output counts.
    pub seed: Option<Genome>,
}

impl GeneratorConfig {
    /// Returns a "zero-valued" default configuration.
    /// All values are 0, empty, or in the case of
    /// `NonZeroUsize`s, 1. Youth and old age limits
    /// default to 10 and 30 generations.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to abbreviate configuration
    /// instantiation, or to fill in unused values.
    ///
    /// # Examples
    /// ```
    /// use evoneat::generation::GeneratorConfig;
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneratorConfig {
    ///     population_size: NonZeroUsize::new(150).unwrap(),
    ///     num_inputs: 2,
    ///     num_outputs: 1,
    ///     weight_range: 2.5,
    ///     survival_threshold: 0.2,
    ///     ..GeneratorConfig::zero()
    /// };
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn zero() -> GeneratorConfig {
        GeneratorConfig {
            population_size: NonZeroUsize::MIN,
            num_inputs: 0,
            num_outputs: 0,
            output_activation: ActivationType::SteepenedSigmoid,
            weight_range: 0.0,
            traits: TraitSchema::default(),
            survival_threshold: 0.0,
            mutate_only_probability: 0.0,
            interspecies_mating_rate: 0.0,
            max_stagnation: 0,
            young_age: 10,
            old_age: 30,
            seed: None,
        }
    }

    /// Checks the configuration, reporting every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        issues.probability("survival_threshold", self.survival_threshold);
        issues.probability("mutate_only_probability", self.mutate_only_probability);
        issues.probability("interspecies_mating_rate", self.interspecies_mating_rate);
        if self.young_age > self.old_age {
            issues.push(format_args!(
                "young_age ({}) must not exceed old_age ({})",
                self.young_age, self.old_age
            ));
        }
        for t in self.traits.iter() {
            if t.min > t.max || t.min.is_nan() || t.max.is_nan() {
                issues.push(format_args!(
                    "trait {} has an invalid range [{}, {}]",
                    t.name, t.min, t.max
                ));
            }
        }
        match &self.seed {
            Some(seed) => {
                if let Err(e) = seed.validate() {
                    issues.push(format_args!("invalid seed genome: {}", e));
                }
                if let Err(e) = seed.validate_traits(&self.traits) {
                    issues.push(format_args!("invalid seed genome: {}", e));
                }
            }
            None => {
                if self.num_inputs == 0 {
                    issues.push("num_inputs must be at least 1");
                }
                if self.num_outputs == 0 {
                    issues.push("num_outputs must be at least 1");
                }
                if self.weight_range <= 0.0 || self.weight_range.is_nan() {
                    issues.push(format_args!(
                        "weight_range must be positive, got {}",
                        self.weight_range
                    ));
                }
                if self.output_activation == ActivationType::Direct {
                    issues.push("output_activation must not be Direct");
                }
            }
        }
        issues.finish()
    }
}

/// Configuration of steady-state replacement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RealTimeConfig {
    /// Fraction of the population too young
    /// to be considered for replacement.
    pub ineligible_percent: f64,
    /// Number of ticks a genome must live before
    /// it may be replaced.
    pub minimum_time_alive: usize,
}

impl RealTimeConfig {
    /// Returns a "zero-valued" configuration.
    pub const fn zero() -> RealTimeConfig {
        RealTimeConfig {
            ineligible_percent: 0.0,
            minimum_time_alive: 0,
        }
    }

    /// Checks the ineligible fraction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        if self.ineligible_percent <= 0.0 || self.ineligible_percent > 1.0 {
            issues.push(format_args!(
                "ineligible_percent must be in (0, 1], got {}",
                self.ineligible_percent
            ));
        }
        issues.finish()
    }
}

use super::{ClassicSpeciater, DynamicSpeciaterConfig, Speciater};
use crate::genomics::Genome;
use crate::operators::{ConfigError, ConfigIssues};
use crate::populations::{EvolutionError, Species};

use log::debug;

/// A [`ClassicSpeciater`] whose compatibility threshold is steered
/// after every speciation so the species count drifts towards a
/// target: lowered when there are too few species, raised when
/// there are too many.
pub struct DynamicSpeciater {
    config: DynamicSpeciaterConfig,
    classic: ClassicSpeciater,
}

impl DynamicSpeciater {
    /// Wraps `classic`, whose configured threshold is the starting point.
    pub fn new(config: DynamicSpeciaterConfig, classic: ClassicSpeciater) -> DynamicSpeciater {
        DynamicSpeciater { config, classic }
    }

    /// Returns the threshold the next speciation will use.
    pub fn compatibility_threshold(&self) -> f64 {
        self.classic.compatibility_threshold()
    }
}

impl Speciater for DynamicSpeciater {
    fn speciate(
        &mut self,
        current: &[Species],
        genomes: &mut [Genome],
    ) -> Result<Vec<Species>, EvolutionError> {
        let next = self.classic.speciate(current, genomes)?;

        let threshold = self.classic.compatibility_threshold();
        let target = self.config.target_number_of_species;
        let adjusted = if next.len() < target {
            (threshold - self.config.compatibility_modifier)
                .max(self.config.compatibility_threshold_floor)
        } else if next.len() > target {
            threshold + self.config.compatibility_modifier
        } else {
            threshold
        };
        if adjusted != threshold {
            debug!(
                "{} species for a target of {}: compatibility threshold {:.3} -> {:.3}",
                next.len(),
                target,
                threshold,
                adjusted
            );
            self.classic.set_compatibility_threshold(adjusted);
        }
        Ok(next)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        issues.merge(self.config.validate());
        issues.merge(self.classic.validate());
        issues.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speciation::SpeciaterConfig;
    use crate::testing::{comparer, genome_with_weight};

    fn speciater(threshold: f64) -> DynamicSpeciater {
        DynamicSpeciater::new(
            DynamicSpeciaterConfig {
                target_number_of_species: 5,
                compatibility_modifier: 0.25,
                ..DynamicSpeciaterConfig::zero()
            },
            ClassicSpeciater::new(
                SpeciaterConfig {
                    compatibility_threshold: threshold,
                },
                comparer(),
            ),
        )
    }

    fn spread(count: usize) -> Vec<Genome> {
        (0..count).map(|i| genome_with_weight(i, i as f64 * 10.0)).collect()
    }

    #[test]
    fn too_many_species_raises_threshold() {
        let mut speciater = speciater(1.0);
        let species = speciater.speciate(&[], &mut spread(8)).unwrap();
        assert_eq!(species.len(), 8);
        assert_eq!(speciater.compatibility_threshold(), 1.25);
    }

    #[test]
    fn too_few_species_lowers_threshold() {
        let mut speciater = speciater(1.0);
        speciater.speciate(&[], &mut spread(2)).unwrap();
        assert_eq!(speciater.compatibility_threshold(), 0.75);
    }

    #[test]
    fn threshold_floored() {
        let mut speciater = speciater(0.4);
        speciater.speciate(&[], &mut spread(2)).unwrap();
        assert_eq!(speciater.compatibility_threshold(), 0.3);
    }

    #[test]
    fn on_target_unchanged() {
        let mut speciater = speciater(1.0);
        speciater.speciate(&[], &mut spread(5)).unwrap();
        assert_eq!(speciater.compatibility_threshold(), 1.0);
    }

    #[test]
    fn validation_reaches_classic_config() {
        assert!(speciater(1.0).validate().is_ok());
        let mut invalid = speciater(-1.0);
        invalid.config.target_number_of_species = 0;
        assert_eq!(invalid.validate().unwrap_err().issues.len(), 2);
    }
}

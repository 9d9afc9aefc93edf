use crate::genomics::{Genome, GenomicsError, TraitSchema};
use crate::operators::{ConfigError, ConfigIssues, Mutator, TraitConfig};

use rand::{thread_rng, Rng};
use rand_distr::StandardNormal;

/// Perturbs or replaces trait values, always keeping
/// them within their trait's range.
#[derive(Clone, Debug)]
pub struct TraitMutator {
    config: TraitConfig,
    schema: TraitSchema,
}

impl TraitMutator {
    /// Creates a trait mutator for genomes following `schema`.
    pub fn new(config: TraitConfig, schema: TraitSchema) -> TraitMutator {
        TraitMutator { config, schema }
    }
}

impl Mutator for TraitMutator {
    fn mutate(&self, genome: &mut Genome) -> Result<(), GenomicsError> {
        genome.validate_traits(&self.schema)?;
        let mut rng = thread_rng();
        for (value, t) in genome.traits_mut().iter_mut().zip(self.schema.iter()) {
            let (mutate, replace) = if t.is_setting {
                (
                    self.config.mutate_setting_probability,
                    self.config.replace_setting_probability,
                )
            } else {
                (
                    self.config.mutate_trait_probability,
                    self.config.replace_trait_probability,
                )
            };
            if rng.gen::<f64>() >= mutate {
                continue;
            }
            if rng.gen::<f64>() < replace {
                *value = t.random_value();
            } else {
                let noise: f64 = rng.sample(StandardNormal);
                *value = t.clamp(*value + noise);
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        issues.merge(self.config.validate());
        for t in self.schema.iter() {
            if t.min > t.max {
                issues.push(format_args!(
                    "trait {} has min {} above max {}",
                    t.name, t.min, t.max
                ));
            }
        }
        issues.finish()
    }
}

use crate::genomics::{Genome, GenomicsError};
use crate::operators::{ConfigError, Mutator, WeightConfig};

use rand::{thread_rng, Rng};
use rand_distr::StandardNormal;

/// Perturbs or replaces connection weights.
///
/// Perturbed weights are not clamped, so they
/// may drift beyond the replacement range.
#[derive(Clone, Debug)]
pub struct WeightMutator {
    config: WeightConfig,
}

impl WeightMutator {
    /// Creates a weight mutator with the given configuration.
    pub fn new(config: WeightConfig) -> WeightMutator {
        WeightMutator { config }
    }
}

impl Mutator for WeightMutator {
    fn mutate(&self, genome: &mut Genome) -> Result<(), GenomicsError> {
        let mut rng = thread_rng();
        let range = self.config.weight_range.abs();
        for conn in genome.connections_mut() {
            if rng.gen::<f64>() >= self.config.mutate_weight_probability {
                continue;
            }
            if rng.gen::<f64>() < self.config.replace_weight_probability {
                conn.set_weight((rng.gen::<f64>() * 2.0 - 1.0) * range);
            } else {
                let noise: f64 = rng.sample(StandardNormal);
                conn.set_weight(conn.weight() + noise);
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()
    }
}

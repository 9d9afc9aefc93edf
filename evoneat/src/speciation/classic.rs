use super::{Speciater, SpeciaterConfig};
use crate::genomics::Genome;
use crate::operators::{Comparer, ConfigError, ConfigIssues};
use crate::populations::{EvolutionError, Species};

use log::debug;

use std::sync::Arc;

/// Threshold-based speciation against each species' example genome.
///
/// Genomes are tested in order against the species in order, and
/// join the first one closer than the compatibility threshold.
/// Species that end up empty are dropped, and species indices are
/// compacted so they stay contiguous.
pub struct ClassicSpeciater {
    config: SpeciaterConfig,
    comparer: Arc<dyn Comparer>,
}

impl ClassicSpeciater {
    /// Creates a speciater measuring distances with `comparer`.
    pub fn new(config: SpeciaterConfig, comparer: Arc<dyn Comparer>) -> ClassicSpeciater {
        ClassicSpeciater { config, comparer }
    }

    /// Returns the current compatibility threshold.
    pub fn compatibility_threshold(&self) -> f64 {
        self.config.compatibility_threshold
    }

    pub(super) fn set_compatibility_threshold(&mut self, threshold: f64) {
        self.config.compatibility_threshold = threshold;
    }
}

impl Speciater for ClassicSpeciater {
    fn speciate(
        &mut self,
        current: &[Species],
        genomes: &mut [Genome],
    ) -> Result<Vec<Species>, EvolutionError> {
        let mut next: Vec<Species> = current
            .iter()
            .cloned()
            .map(|mut s| {
                s.grow_older();
                s
            })
            .collect();
        let mut counts = vec![0usize; next.len()];

        for genome in genomes.iter_mut() {
            let found = next.iter().position(|species| {
                self.comparer.compare(genome, species.example())
                    < self.config.compatibility_threshold
            });
            match found {
                Some(idx) => {
                    genome.set_species_idx(idx);
                    counts[idx] += 1;
                }
                None => {
                    genome.set_species_idx(next.len());
                    counts.push(1);
                    next.push(Species::new(genome.clone()));
                }
            }
        }

        // Compact away species no genome joined.
        let mut remap = Vec::with_capacity(next.len());
        let mut kept = 0;
        for &count in &counts {
            remap.push(kept);
            if count > 0 {
                kept += 1;
            }
        }
        let founded = next.len() - current.len();
        let mut idx = 0;
        next.retain(|_| {
            idx += 1;
            counts[idx - 1] > 0
        });
        for genome in genomes.iter_mut() {
            genome.set_species_idx(remap[genome.species_idx()]);
        }
        debug!(
            "speciation: {} species ({} founded, {} emptied)",
            next.len(),
            founded,
            counts.len() - next.len()
        );
        Ok(next)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        issues.merge(self.config.validate());
        issues.merge(self.comparer.validate());
        issues.finish()
    }
}

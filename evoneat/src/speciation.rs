//! Partitioning of genomes into species.

mod classic;
mod config;
mod dynamic;

pub use classic::ClassicSpeciater;
pub use config::{DynamicSpeciaterConfig, SpeciaterConfig};
pub use dynamic::DynamicSpeciater;

use crate::genomics::Genome;
use crate::operators::ConfigError;
use crate::populations::{EvolutionError, Species};

/// Assigns genomes to species.
pub trait Speciater: Send {
    /// Assigns every genome in `genomes` to a species, setting its
    /// species index, and returns the resulting species list.
    ///
    /// Species in `current` are carried forward, one generation older,
    /// as long as at least one genome joins them. Genomes matching no
    /// species found new ones.
    fn speciate(
        &mut self,
        current: &[Species],
        genomes: &mut [Genome],
    ) -> Result<Vec<Species>, EvolutionError>;

    /// Checks the speciater's configuration, reporting
    /// every problem found.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

impl<S: Speciater + ?Sized> Speciater for Box<S> {
    fn speciate(
        &mut self,
        current: &[Species],
        genomes: &mut [Genome],
    ) -> Result<Vec<Species>, EvolutionError> {
        (**self).speciate(current, genomes)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        (**self).validate()
    }
}

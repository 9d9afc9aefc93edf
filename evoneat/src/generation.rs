//! Producing each population from the previous one.
//!
//! Generators receive the evaluated population of the current
//! generation and return the next one. Given an empty population,
//! they return the first generation instead.

mod classic;
mod common;
mod config;
mod offspring_factory;
mod realtime;
mod seed;

pub use classic::ClassicGenerator;
pub use config::{GeneratorConfig, RealTimeConfig};
pub use realtime::RealTimeGenerator;

use crate::genomics::TraitSchema;
use crate::operators::ConfigError;
use crate::populations::{EvolutionError, Population};

/// Produces successive populations.
pub trait Generator: Send {
    /// Returns the population following `current`, or the first
    /// generation if `current` is empty.
    ///
    /// # Errors
    /// Fails if a genetic operator breaks a genome, or if `current`
    /// is inconsistent. The run cannot continue after either.
    fn generate(&mut self, current: &Population) -> Result<Population, EvolutionError>;

    /// Checks the configuration of the generator and of every
    /// operator it breeds with, reporting every problem found.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Returns the trait schema genomes are created with, if known.
    fn trait_schema(&self) -> Option<&TraitSchema> {
        None
    }
}

impl<G: Generator + ?Sized> Generator for Box<G> {
    fn generate(&mut self, current: &Population) -> Result<Population, EvolutionError> {
        (**self).generate(current)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        (**self).validate()
    }

    fn trait_schema(&self) -> Option<&TraitSchema> {
        (**self).trait_schema()
    }
}

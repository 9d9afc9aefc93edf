//! Genetic operators: compatibility comparison,
//! recombination and the mutator family.

mod comparer;
mod config;
mod crosser;
mod mutators;

pub use comparer::ClassicComparer;
pub use config::{
    ComparerConfig, ComplexifyConfig, ConfigError, ConfigIssues, CrosserConfig, FitnessType,
    PhasedConfig, PruningConfig, TraitConfig, WeightConfig,
};
pub use crosser::ClassicCrosser;
pub use mutators::{
    ClassicMutator, Complexify, Phased, Phase, Pruning, TraitMutator, WeightMutator,
};

use crate::genomics::{Genome, GenomicsError};

use std::sync::Arc;

/// Measures how structurally and parametrically
/// different two genomes are.
pub trait Comparer: Send + Sync {
    /// Returns the compatibility distance between `a` and `b`.
    /// The result is non-negative and zero for a genome
    /// compared with itself.
    fn compare(&self, a: &Genome, b: &Genome) -> f64;

    /// Checks the operator's configuration, reporting
    /// every problem found.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Recombines two parents into a new genome.
pub trait Crosser: Send + Sync {
    /// Returns an offspring of `a` and `b`. Neither parent is
    /// modified. The offspring's id and birth are left for the
    /// caller to assign.
    ///
    /// # Errors
    /// Returns an error if the offspring references a node
    /// found in neither parent.
    fn cross(&self, a: &Genome, b: &Genome) -> Result<Genome, GenomicsError>;

    /// Checks the operator's configuration, reporting
    /// every problem found.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Modifies a genome in place.
///
/// Mutators are shared across the threads producing offspring, so
/// [`mutate`] takes `&self`. Population-level bookkeeping happens
/// once per generation, sequentially, through [`set_population`].
///
/// [`mutate`]: Mutator::mutate
/// [`set_population`]: Mutator::set_population
pub trait Mutator: Send + Sync {
    /// Mutates `genome`.
    ///
    /// # Errors
    /// Returns an error if a structural mutation left the
    /// genome in an invalid state.
    fn mutate(&self, genome: &mut Genome) -> Result<(), GenomicsError>;

    /// Observes the population about to reproduce.
    fn set_population(&mut self, _genomes: &[Genome]) {}

    /// Returns whether sexual reproduction is currently allowed.
    fn allows_crossover(&self) -> bool {
        true
    }

    /// Checks the operator's configuration, reporting
    /// every problem found.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

impl<C: Comparer + ?Sized> Comparer for Arc<C> {
    fn compare(&self, a: &Genome, b: &Genome) -> f64 {
        (**self).compare(a, b)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        (**self).validate()
    }
}

impl<C: Crosser + ?Sized> Crosser for Box<C> {
    fn cross(&self, a: &Genome, b: &Genome) -> Result<Genome, GenomicsError> {
        (**self).cross(a, b)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        (**self).validate()
    }
}

impl<M: Mutator + ?Sized> Mutator for Box<M> {
    fn mutate(&self, genome: &mut Genome) -> Result<(), GenomicsError> {
        (**self).mutate(genome)
    }

    fn set_population(&mut self, genomes: &[Genome]) {
        (**self).set_population(genomes)
    }

    fn allows_crossover(&self) -> bool {
        (**self).allows_crossover()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        (**self).validate()
    }
}

use super::common::{allot_offspring, create_pool, preserve_elites, purge_species};
use super::offspring_factory::OffspringFactory;
use super::seed::first_generation;
use super::{Generator, GeneratorConfig};
use crate::genomics::{History, TraitSchema};
use crate::operators::{ConfigError, ConfigIssues, Crosser, Mutator};
use crate::populations::{EvolutionError, Population};
use crate::speciation::Speciater;

use log::debug;

use std::sync::Arc;

/// Generational NEAT reproduction.
///
/// Every species is allotted a number of offspring in proportion
/// to its age-adjusted shared improvement. Species stagnant for
/// too long are dropped, unless they hold the fittest genome. Only
/// the top of each species may reproduce, and the best member of
/// every species with at least 5 survivors is carried over as is.
/// Everything else in the next generation is new offspring.
pub struct ClassicGenerator {
    config: GeneratorConfig,
    history: Arc<History>,
    crosser: Box<dyn Crosser>,
    mutator: Box<dyn Mutator>,
    speciater: Box<dyn Speciater>,
}

impl ClassicGenerator {
    /// Creates a generator breeding with the given operators. The
    /// `history` must be the one shared by the mutator.
    pub fn new(
        config: GeneratorConfig,
        history: Arc<History>,
        crosser: Box<dyn Crosser>,
        mutator: Box<dyn Mutator>,
        speciater: Box<dyn Speciater>,
    ) -> ClassicGenerator {
        ClassicGenerator {
            config,
            history,
            crosser,
            mutator,
            speciater,
        }
    }

    /// Returns the generator's configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn generate_next(&mut self, current: &Population) -> Result<Population, EvolutionError> {
        self.mutator.set_population(current.genomes());
        let generation = current.generation() + 1;

        let mut species = current.species().to_vec();
        let mut pool = create_pool(current)?;
        purge_species(&self.config, &mut species, &mut pool);
        if pool.is_empty() {
            return Err(EvolutionError::NoSpecies);
        }

        let mut counts = allot_offspring(&self.config, &species, &pool);
        let mut genomes = preserve_elites(&pool, &mut counts);
        let elites = genomes.len();
        let factory = OffspringFactory::new(
            &pool,
            &self.history,
            self.crosser.as_ref(),
            self.mutator.as_ref(),
            self.config.mutate_only_probability,
            self.config.interspecies_mating_rate,
            generation,
        );
        genomes.extend(factory.generate_offspring(&counts)?);

        let species = self.speciater.speciate(&species, &mut genomes)?;
        debug!(
            "generation {}: {} elites, {} offspring from {} species, {} species after speciation",
            generation,
            elites,
            genomes.len() - elites,
            pool.len(),
            species.len()
        );
        Ok(Population::new(generation, species, genomes))
    }
}

impl Generator for ClassicGenerator {
    fn generate(&mut self, current: &Population) -> Result<Population, EvolutionError> {
        if current.is_empty() {
            first_generation(&self.config, &self.history, self.mutator.as_ref())
        } else {
            self.generate_next(current)
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        issues.merge(self.config.validate());
        issues.merge(self.crosser.validate());
        issues.merge(self.mutator.validate());
        issues.merge(self.speciater.validate());
        issues.finish()
    }

    fn trait_schema(&self) -> Option<&TraitSchema> {
        Some(&self.config.traits)
    }
}

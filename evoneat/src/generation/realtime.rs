use super::common::{create_pool, purge_species, Group};
use super::offspring_factory::OffspringFactory;
use super::seed::first_generation;
use super::{Generator, GeneratorConfig, RealTimeConfig};
use crate::genomics::{Genome, History, TraitSchema};
use crate::operators::{ConfigError, ConfigIssues, Crosser, Mutator};
use crate::populations::{EvolutionError, Population};
use crate::speciation::Speciater;

use log::{debug, warn};
use rand::prelude::*;

use std::sync::Arc;

/// Steady-state (rtNEAT) reproduction: instead of replacing the
/// whole population, a single genome is replaced once every few
/// calls, and the population is otherwise returned unchanged.
///
/// The replacement interval, in calls, is
/// `minimum_time_alive / (population_size * ineligible_percent)`.
/// On a replacement call the genome with the worst shared improvement
/// among those eligible is removed, stagnant species are purged,
/// a parent species is picked by roulette over the species' shared
/// improvements, and the single offspring is added to the remaining
/// population. A genome is eligible once `birth * interval` exceeds
/// `minimum_time_alive`, so members of the first generation never are.
pub struct RealTimeGenerator {
    config: GeneratorConfig,
    real_time: RealTimeConfig,
    history: Arc<History>,
    crosser: Box<dyn Crosser>,
    mutator: Box<dyn Mutator>,
    speciater: Box<dyn Speciater>,
    tick: usize,
}

impl RealTimeGenerator {
    /// Creates a generator breeding with the given operators. The
    /// `history` must be the one shared by the mutator.
    pub fn new(
        config: GeneratorConfig,
        real_time: RealTimeConfig,
        history: Arc<History>,
        crosser: Box<dyn Crosser>,
        mutator: Box<dyn Mutator>,
        speciater: Box<dyn Speciater>,
    ) -> RealTimeGenerator {
        RealTimeGenerator {
            config,
            real_time,
            history,
            crosser,
            mutator,
            speciater,
            tick: 0,
        }
    }

    /// Returns the number of calls since the first generation.
    pub fn tick(&self) -> usize {
        self.tick
    }

    /// Returns the number of calls between replacements, at least 1.
    pub fn interval(&self) -> usize {
        let interval = self.real_time.minimum_time_alive as f64
            / (self.config.population_size.get() as f64 * self.real_time.ineligible_percent);
        (interval as usize).max(1)
    }

    fn replace(&mut self, current: &Population) -> Result<Population, EvolutionError> {
        let interval = self.interval();
        let mut pool = create_pool(current)?;
        if !remove_worst(&mut pool, interval, self.real_time.minimum_time_alive) {
            warn!(
                "tick {}: no genome old enough to be replaced, skipping",
                self.tick
            );
            return Ok(current.clone());
        }
        self.mutator.set_population(current.genomes());

        let mut genomes: Vec<Genome> = pool
            .iter()
            .flat_map(|g| g.members.iter().cloned())
            .collect();
        let mut species = current.species().to_vec();
        purge_species(&self.config, &mut species, &mut pool);
        if pool.is_empty() {
            return Err(EvolutionError::NoSpecies);
        }

        let mut counts = vec![0; pool.len()];
        counts[pick_species(&mut thread_rng(), &pool)] = 1;
        let generation = current.generation() + 1;
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
            "tick {}: replaced one genome, {} species",
            self.tick,
            species.len()
        );
        Ok(Population::new(generation, species, genomes))
    }
}

impl Generator for RealTimeGenerator {
    fn generate(&mut self, current: &Population) -> Result<Population, EvolutionError> {
        if current.is_empty() {
            self.tick = 0;
            return first_generation(&self.config, &self.history, self.mutator.as_ref());
        }
        self.tick += 1;
        if self.tick % self.interval() != 0 {
            return Ok(current.clone());
        }
        self.replace(current)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        issues.merge(self.config.validate());
        issues.merge(self.real_time.validate());
        issues.merge(self.crosser.validate());
        issues.merge(self.mutator.validate());
        issues.merge(self.speciater.validate());
        issues.finish()
    }

    fn trait_schema(&self) -> Option<&TraitSchema> {
        Some(&self.config.traits)
    }
}

/// Removes the eligible genome with the lowest shared improvement,
/// scanning each species from its worst member up. Returns `false`
/// if no genome is eligible.
fn remove_worst(pool: &mut Vec<Group>, interval: usize, minimum_time_alive: usize) -> bool {
    let mut worst = f64::INFINITY;
    let mut found = None;
    for (i, group) in pool.iter().enumerate() {
        let size = group.members.len() as f64;
        for (j, genome) in group.members.iter().enumerate().rev() {
            let shared = genome.improvement() / size;
            if genome.birth() * interval > minimum_time_alive && shared < worst {
                worst = shared;
                found = Some((i, j));
                break;
            }
        }
    }
    match found {
        Some((i, j)) => {
            pool[i].members.remove(j);
            if pool[i].members.is_empty() {
                pool.remove(i);
            }
            true
        }
        None => false,
    }
}

/// Roulette selection over the species' shared improvements.
fn pick_species(rng: &mut impl Rng, pool: &[Group]) -> usize {
    let scores: Vec<f64> = pool.iter().map(|g| g.improvement().max(0.0)).collect();
    let total: f64 = scores.iter().sum();
    if total <= 0.0 {
        return rng.gen_range(0..pool.len());
    }
    let target = rng.gen::<f64>() * total;
    let mut sum = 0.0;
    for (i, score) in scores.iter().enumerate() {
        sum += score;
        if sum > target {
            return i;
        }
    }
    pool.len() - 1
}

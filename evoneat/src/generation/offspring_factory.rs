use super::common::Group;
use crate::genomics::{Genome, History};
use crate::operators::{Crosser, Mutator};
use crate::populations::EvolutionError;
use crate::GenomeId;

use log::trace;
use rand::prelude::*;
use rayon::prelude::*;

/// Auxiliary type for offspring generation.
/// Chooses parents from a purged pool and breeds
/// the allotted offspring of each species.
///
/// Parents and ids are drawn sequentially; crossover
/// and mutation run in parallel.
pub(super) struct OffspringFactory<'a> {
    pool: &'a [Group],
    history: &'a History,
    crosser: &'a dyn Crosser,
    mutator: &'a dyn Mutator,
    mutate_only_probability: f64,
    interspecies_mating_rate: f64,
    generation: usize,
}

impl<'a> OffspringFactory<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        pool: &'a [Group],
        history: &'a History,
        crosser: &'a dyn Crosser,
        mutator: &'a dyn Mutator,
        mutate_only_probability: f64,
        interspecies_mating_rate: f64,
        generation: usize,
    ) -> OffspringFactory<'a> {
        OffspringFactory {
            pool,
            history,
            crosser,
            mutator,
            mutate_only_probability,
            interspecies_mating_rate,
            generation,
        }
    }

    /// Breeds `counts[i]` offspring from the `i`th pooled species.
    pub(super) fn generate_offspring(&self, counts: &[usize]) -> Result<Vec<Genome>, EvolutionError> {
        let cross = self.mutator.allows_crossover();
        let mut rng = thread_rng();
        let mut plans: Vec<(&Genome, &Genome, GenomeId)> =
            Vec::with_capacity(counts.iter().sum());
        for (group, &count) in self.pool.iter().zip(counts) {
            for _ in 0..count {
                if let Some((parent1, parent2)) = self.choose_parents(&mut rng, group, cross) {
                    plans.push((parent1, parent2, self.history.next_id()));
                }
            }
        }

        let offspring = plans
            .into_par_iter()
            .map(|(parent1, parent2, id)| self.breed(parent1, parent2, id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(offspring)
    }

    /// Picks the first parent from the species, and the second either
    /// as the first again (asexual reproduction), from the species, or
    /// from the whole pool.
    fn choose_parents(
        &self,
        rng: &mut impl Rng,
        group: &'a Group,
        cross: bool,
    ) -> Option<(&'a Genome, &'a Genome)> {
        let parent1 = group.members.choose(rng)?;
        if !cross || rng.gen::<f64>() < self.mutate_only_probability {
            return Some((parent1, parent1));
        }
        let parent2 = if rng.gen::<f64>() < self.interspecies_mating_rate {
            self.pool.iter().flat_map(|g| g.members.iter()).choose(rng)?
        } else {
            group.members.choose(rng)?
        };
        Some((parent1, parent2))
    }

    fn breed(&self, parent1: &Genome, parent2: &Genome, id: GenomeId) -> Result<Genome, EvolutionError> {
        let mut child = if parent1.id() == parent2.id() {
            parent1.clone()
        } else {
            self.crosser.cross(parent1, parent2)?
        };
        child.set_id(id);
        child.set_birth(self.generation);
        child.set_species_idx(parent1.species_idx());
        child.set_fitness(0.0);
        child.set_improvement(0.0);
        self.mutator.mutate(&mut child)?;
        trace!(
            "genome {} bred from {} and {} ({} genes)",
            id,
            parent1.id(),
            parent2.id(),
            child.complexity()
        );
        Ok(child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{ClassicCrosser, CrosserConfig};
    use crate::testing::{history, scored, Unchanged};

    fn group(species: usize, ids: std::ops::Range<usize>) -> Group {
        Group {
            species,
            members: ids.map(|id| scored(id, species, id as f64, 0.0)).collect(),
        }
    }

    #[test]
    fn allotted_counts_bred() {
        let pool = vec![group(0, 0..3), group(1, 3..5)];
        let history = history();
        let crosser = ClassicCrosser::new(CrosserConfig::zero());
        let factory = OffspringFactory::new(&pool, &history, &crosser, &Unchanged, 0.5, 0.0, 7);

        let offspring = factory.generate_offspring(&[4, 2]).unwrap();
        assert_eq!(offspring.len(), 6);
        assert!(offspring.iter().all(|g| g.birth() == 7 && g.fitness() == 0.0));
        assert_eq!(
            offspring.iter().map(|g| g.species_idx()).collect::<Vec<_>>(),
            vec![0, 0, 0, 0, 1, 1]
        );
        assert_eq!(
            offspring.iter().map(|g| g.id()).collect::<Vec<_>>(),
            (100..106).collect::<Vec<_>>()
        );
    }

    #[test]
    fn mutate_only_copies_a_parent() {
        let pool = vec![group(0, 0..3)];
        let history = history();
        let crosser = ClassicCrosser::new(CrosserConfig::zero());
        let factory = OffspringFactory::new(&pool, &history, &crosser, &Unchanged, 1.0, 0.0, 1);

        for child in factory.generate_offspring(&[5]).unwrap() {
            assert_eq!(child.connections(), pool[0].members[0].connections());
        }
    }
}

use super::GeneratorConfig;
use crate::genomics::Genome;
use crate::populations::{EvolutionError, Population, Species};

use log::debug;

/// The members of one species, best first.
#[derive(Clone, Debug)]
pub(super) struct Group {
    pub(super) species: usize,
    pub(super) members: Vec<Genome>,
}

impl Group {
    /// Mean improvement of the members. With species membership
    /// standing in for the sharing function, this is the species'
    /// fitness-sharing score.
    pub(super) fn improvement(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        self.members.iter().map(Genome::improvement).sum::<f64>() / self.members.len() as f64
    }

    /// The shared score scaled by the species' age bracket.
    pub(super) fn adjusted_improvement(&self, species: &Species, config: &GeneratorConfig) -> f64 {
        self.improvement() * species.age_multiplier(config.young_age, config.old_age)
    }
}

/// Groups the population's genomes by species, sorting each group
/// by decreasing improvement, then increasing complexity. Species
/// without members are left out.
pub(super) fn create_pool(population: &Population) -> Result<Vec<Group>, EvolutionError> {
    let mut groups: Vec<Group> = (0..population.species().len())
        .map(|species| Group {
            species,
            members: vec![],
        })
        .collect();
    for genome in population.genomes() {
        groups
            .get_mut(genome.species_idx())
            .ok_or(EvolutionError::UnknownSpecies(genome.id(), genome.species_idx()))?
            .members
            .push(genome.clone());
    }
    groups.retain(|g| !g.members.is_empty());
    for group in &mut groups {
        group.members.sort_by(|a, b| {
            b.improvement()
                .total_cmp(&a.improvement())
                .then_with(|| a.complexity().cmp(&b.complexity()))
        });
    }
    Ok(groups)
}

/// Updates every pooled species' stagnation, removes species stagnant
/// for longer than allowed unless they hold the fittest genome, and
/// trims the rest to their surviving fraction.
pub(super) fn purge_species(config: &GeneratorConfig, species: &mut [Species], pool: &mut Vec<Group>) {
    let best = pool
        .iter()
        .flat_map(|g| g.members.iter().map(move |m| (g.species, m.fitness())))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(idx, _)| idx);

    for group in pool.iter() {
        species[group.species].record_score(group.improvement());
    }

    let before = pool.len();
    pool.retain(|g| {
        species[g.species].stagnation() <= config.max_stagnation || Some(g.species) == best
    });
    if pool.len() < before {
        debug!("purged {} stagnant species", before - pool.len());
    }

    for group in pool.iter_mut() {
        let survivors = ((group.members.len() as f64 * config.survival_threshold) as usize).max(1);
        group.members.truncate(survivors);
    }
}

/// Splits the slots left after reserving one per species among the
/// pooled species, in proportion to their age-adjusted shared scores.
/// Counts are rounded up, then the largest are decremented until the
/// total matches exactly.
pub(super) fn allot_offspring(config: &GeneratorConfig, species: &[Species], pool: &[Group]) -> Vec<usize> {
    let available = config.population_size.get().saturating_sub(pool.len());
    if pool.is_empty() {
        return vec![];
    }
    let scores: Vec<f64> = pool
        .iter()
        .map(|g| g.adjusted_improvement(&species[g.species], config).max(0.0))
        .collect();
    let total: f64 = scores.iter().sum();

    let mut counts: Vec<usize> = if total > 0.0 {
        scores
            .iter()
            .map(|s| (s / total * available as f64).ceil() as usize)
            .collect()
    } else {
        // No species is doing better than any other.
        let share = available / pool.len();
        let remainder = available % pool.len();
        (0..pool.len())
            .map(|i| share + usize::from(i < remainder))
            .collect()
    };

    let mut allotted: usize = counts.iter().sum();
    while allotted > available {
        if let Some(largest) = counts.iter_mut().max_by_key(|c| **c) {
            *largest -= 1;
            allotted -= 1;
        }
    }
    while allotted < available {
        if let Some(i) = (0..counts.len()).max_by(|&a, &b| scores[a].total_cmp(&scores[b])) {
            counts[i] += 1;
            allotted += 1;
        }
    }
    counts
}

/// Reserves one slot per species: species with at least 5 survivors
/// carry their best member over unchanged, smaller ones receive an
/// extra offspring instead. Returns the carried over elites.
pub(super) fn preserve_elites(pool: &[Group], counts: &mut [usize]) -> Vec<Genome> {
    let mut elites = vec![];
    for (group, count) in pool.iter().zip(counts.iter_mut()) {
        if group.members.len() < 5 {
            *count += 1;
        } else {
            elites.push(group.members[0].clone());
        }
    }
    elites
}

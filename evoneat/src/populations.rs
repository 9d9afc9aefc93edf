//! Populations of genomes grouped into species.

mod errors;
pub mod logging;
mod species;

pub use errors::EvolutionError;
pub use species::Species;

use crate::genomics::Genome;

use serde::{Deserialize, Serialize};

/// A generation of genomes and the species they belong to.
///
/// Every genome's [`species_idx`] indexes into [`species`].
///
/// [`species_idx`]: Genome::species_idx
/// [`species`]: Population::species
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Population {
    generation: usize,
    species: Vec<Species>,
    genomes: Vec<Genome>,
}

impl Population {
    /// Creates a population from its parts.
    pub fn new(generation: usize, species: Vec<Species>, genomes: Vec<Genome>) -> Population {
        Population {
            generation,
            species,
            genomes,
        }
    }

    /// Returns the population's generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns the population's species.
    pub fn species(&self) -> &[Species] {
        &self.species
    }

    /// Returns the population's genomes.
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Returns the population's genomes mutably.
    pub fn genomes_mut(&mut self) -> &mut [Genome] {
        &mut self.genomes
    }

    /// Returns whether the population holds no genomes.
    /// An empty population is the starting point of every run.
    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// Returns an iterator over the members of species `idx`.
    pub fn species_members(&self, idx: usize) -> impl Iterator<Item = &Genome> {
        self.genomes.iter().filter(move |g| g.species_idx() == idx)
    }

    /// Returns the genome with the highest fitness, if any.
    ///
    /// # Examples
    /// ```
    /// use evoneat::genomics::Genome;
    /// use evoneat::populations::Population;
    ///
    /// let mut a = Genome::new(0);
    /// let mut b = Genome::new(1);
    /// a.set_fitness(1.0);
    /// b.set_fitness(2.0);
    /// let population = Population::new(0, vec![], vec![a, b]);
    ///
    /// assert_eq!(population.champion().map(|g| g.id()), Some(1));
    /// ```
    pub fn champion(&self) -> Option<&Genome> {
        self.genomes
            .iter()
            .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))
    }

    /// Returns the mean complexity of the population's genomes.
    pub fn mean_complexity(&self) -> f64 {
        if self.genomes.is_empty() {
            return 0.0;
        }
        self.genomes.iter().map(|g| g.complexity() as f64).sum::<f64>() / self.genomes.len() as f64
    }

    /// Sorts genomes by descending fitness.
    pub fn sort_by_fitness(&mut self) {
        self.genomes
            .sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
    }

    /// Splits the population into its parts.
    pub fn into_parts(self) -> (usize, Vec<Species>, Vec<Genome>) {
        (self.generation, self.species, self.genomes)
    }
}

use super::{Population, Species};

use crate::experiment::{BoxError, Visualizer};
use crate::genomics::Genome;

use log::info;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use std::fmt;

/// Defines different possible reporting levels for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportingLevel {
    /// Clones the entire population.
    AllGenomes,
    /// Clones species and their champions.
    SpeciesChampions,
    /// Clones only the population champion.
    PopulationChampion,
    /// Clones no genomes.
    NoGenomes,
}

/// A snapshot of a population.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Log {
    pub generation_number: usize,
    pub generation_sample: GenerationMemberRecord,
    pub species_count: usize,
    pub genome_stats: Vec<(String, Stats)>,
}

impl fmt::Display for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "generation {}: {} species", self.generation_number, self.species_count)?;
        for (name, stats) in &self.genome_stats {
            writeln!(f, "\t{}: {}", name, stats)?;
        }
        Ok(())
    }
}

/// A struct for reporting basic statistical data.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub maximum: f64,
    pub minimum: f64,
    pub mean: f64,
    pub median: f64,
}

impl Stats {
    /// Returns statistics about numbers in a sequence.
    /// An empty sequence yields all zeroes.
    ///
    /// # Examples
    /// ```
    /// use evoneat::populations::logging::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied());
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    /// ```
    pub fn from(data: impl Iterator<Item = f64>) -> Stats {
        let mut data: Vec<f64> = data.collect();
        if data.is_empty() {
            return Stats {
                maximum: 0.0,
                minimum: 0.0,
                mean: 0.0,
                median: 0.0,
            };
        }
        data.sort_unstable_by(f64::total_cmp);
        let mid = data.len() / 2;
        let median = if data.len() % 2 == 0 {
            (data[mid - 1] + data[mid]) / 2.0
        } else {
            data[mid]
        };
        Stats {
            maximum: data[data.len() - 1],
            minimum: data[0],
            mean: data.iter().sum::<f64>() / data.len() as f64,
            median,
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "max {:.4}, min {:.4}, mean {:.4}, median {:.4}",
            self.maximum, self.minimum, self.mean, self.median
        )
    }
}

/// A reporting-level dependant store
/// of genomes from a population.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GenerationMemberRecord {
    /// Species index, genomes and stagnation level.
    Species(Vec<(usize, Vec<Genome>, usize)>),
    /// Only species index, species champions, and stagnation level.
    SpeciesChampions(Vec<(usize, Genome, usize)>),
    /// Only population champion.
    PopulationChampion(Genome),
    /// Empty.
    None,
}

/// A log of the evolution of a population over time.
///
/// As a [`Visualizer`], it takes a snapshot of every population
/// an experiment reports, recording fitness, improvement and
/// complexity statistics.
#[derive(Debug)]
pub struct EvolutionLogger {
    reporting_level: ReportingLevel,
    logs: Mutex<Vec<Log>>,
}

impl EvolutionLogger {
    /// Returns a logger with the appropiate reporting level.
    ///
    /// # Examples
    /// ```
    /// use evoneat::populations::logging::{EvolutionLogger, ReportingLevel};
    ///
    /// let logger = EvolutionLogger::new(ReportingLevel::NoGenomes);
    /// assert!(logger.logs().is_empty());
    /// ```
    pub fn new(reporting_level: ReportingLevel) -> EvolutionLogger {
        EvolutionLogger {
            reporting_level,
            logs: Mutex::new(vec![]),
        }
    }

    /// Stores a snapshot of a population.
    ///
    /// # Examples
    /// ```
    /// use evoneat::genomics::Genome;
    /// use evoneat::populations::logging::{EvolutionLogger, ReportingLevel};
    /// use evoneat::populations::{Population, Species};
    ///
    /// let mut genome = Genome::new(0);
    /// genome.set_fitness(2.0);
    /// let population = Population::new(3, vec![Species::new(genome.clone())], vec![genome]);
    ///
    /// let logger = EvolutionLogger::new(ReportingLevel::PopulationChampion);
    /// logger.log(&population);
    ///
    /// let logs = logger.logs();
    /// assert_eq!(logs[0].generation_number, 3);
    /// assert_eq!(logs[0].genome_stats[0].1.maximum, 2.0);
    /// ```
    pub fn log(&self, population: &Population) {
        let genomes = population.genomes();
        let genome_stats = vec![
            (
                String::from("fitness"),
                Stats::from(genomes.iter().map(Genome::fitness)),
            ),
            (
                String::from("improvement"),
                Stats::from(genomes.iter().map(Genome::improvement)),
            ),
            (
                String::from("complexity"),
                Stats::from(genomes.iter().map(|g| g.complexity() as f64)),
            ),
        ];
        let generation_sample = match self.reporting_level {
            ReportingLevel::AllGenomes => GenerationMemberRecord::Species(
                species_with_index(population)
                    .map(|(i, s)| (i, population.species_members(i).cloned().collect(), s.stagnation()))
                    .collect(),
            ),
            ReportingLevel::SpeciesChampions => GenerationMemberRecord::SpeciesChampions(
                species_with_index(population)
                    .filter_map(|(i, s)| {
                        population
                            .species_members(i)
                            .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))
                            .map(|champion| (i, champion.clone(), s.stagnation()))
                    })
                    .collect(),
            ),
            ReportingLevel::PopulationChampion => match population.champion() {
                Some(champion) => GenerationMemberRecord::PopulationChampion(champion.clone()),
                None => GenerationMemberRecord::None,
            },
            ReportingLevel::NoGenomes => GenerationMemberRecord::None,
        };
        let log = Log {
            generation_number: population.generation(),
            generation_sample,
            species_count: population.species().len(),
            genome_stats,
        };
        info!("{}", log);
        self.logs.lock().push(log);
    }

    /// Returns a copy of all logged snapshots, oldest first.
    pub fn logs(&self) -> Vec<Log> {
        self.logs.lock().clone()
    }

    /// Returns the number of logged snapshots.
    pub fn len(&self) -> usize {
        self.logs.lock().len()
    }

    /// Returns whether nothing has been logged yet.
    pub fn is_empty(&self) -> bool {
        self.logs.lock().is_empty()
    }
}

impl Visualizer for EvolutionLogger {
    fn visualize(&self, population: &Population) -> Result<(), BoxError> {
        self.log(population);
        Ok(())
    }
}

fn species_with_index(population: &Population) -> impl Iterator<Item = (usize, &Species)> {
    population.species().iter().enumerate()
}

use crate::experiment::{BoxError, Evaluation, Phenome, Searcher};
use crate::operators::{ConfigError, ConfigIssues};
use crate::GenomeId;

use log::debug;
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::collections::BTreeMap;
use std::sync::Arc;

const STATE_KEY: &str = "novelty-behaviors";

/// Configuration of novelty scoring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoveltyConfig {
    /// Number of nearest behaviours novelty is averaged over.
    pub nearest_neighbors: usize,
    /// Novelty above which a behaviour is archived.
    pub archive_threshold: f64,
}

impl NoveltyConfig {
    /// Returns a "zero-valued" configuration.
    pub const fn zero() -> NoveltyConfig {
        NoveltyConfig {
            nearest_neighbors: 0,
            archive_threshold: 0.0,
        }
    }

    /// Checks that at least one neighbour is considered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        if self.nearest_neighbors == 0 {
            issues.push("nearest_neighbors must be at least 1");
        }
        issues.non_negative("archive_threshold", self.archive_threshold);
        issues.finish()
    }
}

/// A behaviour characterization and the genome that showed it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BehaviorRecord {
    pub id: GenomeId,
    pub behavior: Vec<f64>,
}

/// Novelty search, as a decorator over another searcher.
///
/// Every successful evaluation must carry a behaviour. Its improvement is
/// replaced by its novelty: the mean Euclidean distance to the
/// nearest behaviours among the rest of the generation and the
/// archive. Behaviours more novel than the archive threshold are
/// archived, and the archive is kept in the experiment state.
/// Fitness is left untouched.
pub struct NoveltySearcher<S> {
    config: NoveltyConfig,
    inner: S,
    archive: Mutex<Vec<BehaviorRecord>>,
}

impl<S: Searcher> NoveltySearcher<S> {
    /// Wraps `inner` with an empty archive.
    pub fn new(config: NoveltyConfig, inner: S) -> NoveltySearcher<S> {
        NoveltySearcher {
            config,
            inner,
            archive: Mutex::new(vec![]),
        }
    }

    /// Returns a copy of the archived behaviours.
    pub fn archive(&self) -> Vec<BehaviorRecord> {
        self.archive.lock().clone()
    }
}

impl<S: Searcher> Searcher for NoveltySearcher<S> {
    fn search(&mut self, phenomes: &[Arc<dyn Phenome>]) -> Result<Vec<Evaluation>, BoxError> {
        let evaluations = self.inner.search(phenomes)?;

        let mut records = self.archive.lock().clone();
        let offset = records.len();
        let mut positions = Vec::with_capacity(evaluations.len());
        for evaluation in &evaluations {
            if evaluation.error.is_some() {
                positions.push(None);
                continue;
            }
            let behavior = evaluation
                .behavior
                .clone()
                .ok_or_else(|| format!("evaluation of genome {} has no behavior", evaluation.id))?;
            positions.push(Some(records.len()));
            records.push(BehaviorRecord {
                id: evaluation.id,
                behavior,
            });
        }

        let k = self.config.nearest_neighbors;
        let threshold = self.config.archive_threshold;
        let archive = &self.archive;
        let records = &records;
        let scored: Vec<Evaluation> = evaluations
            .into_par_iter()
            .zip(positions)
            .map(|(mut evaluation, position)| {
                // Failed evaluations pass through unscored.
                if let Some(own) = position {
                    let novelty = novelty(records, own, k);
                    if novelty > threshold {
                        archive.lock().push(records[own].clone());
                    }
                    evaluation.improvement = Some(novelty);
                }
                evaluation
            })
            .collect();
        let archived = self.archive.lock().len();
        debug!(
            "novelty archive: {} behaviours ({} added)",
            archived,
            archived - offset
        );
        Ok(scored)
    }

    fn setup(&mut self) -> Result<(), BoxError> {
        self.inner.setup()
    }

    fn takedown(&mut self) -> Result<(), BoxError> {
        self.inner.takedown()
    }

    fn set_phenomes(&mut self, phenomes: &[Arc<dyn Phenome>]) -> Result<(), BoxError> {
        self.inner.set_phenomes(phenomes)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        issues.merge(self.config.validate());
        issues.merge(self.inner.validate());
        issues.finish()
    }

    fn save_state(&self, components: &mut BTreeMap<String, Value>) {
        if let Ok(value) = serde_json::to_value(&*self.archive.lock()) {
            components.insert(STATE_KEY.to_string(), value);
        }
        self.inner.save_state(components);
    }

    fn load_state(&mut self, components: &BTreeMap<String, Value>) -> Result<(), BoxError> {
        if let Some(value) = components.get(STATE_KEY) {
            *self.archive.lock() = serde_json::from_value(value.clone())?;
        }
        self.inner.load_state(components)
    }
}

/// Mean distance from `records[own]` to its `k` nearest neighbours,
/// or to all other records if there are fewer than `k`.
fn novelty(records: &[BehaviorRecord], own: usize, k: usize) -> f64 {
    let behavior = &records[own].behavior;
    let mut distances: Vec<f64> = records
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != own)
        .map(|(_, r)| distance(behavior, &r.behavior))
        .collect();
    distances.sort_unstable_by(f64::total_cmp);
    let nearest = &distances[..k.min(distances.len())];
    if nearest.is_empty() {
        return 0.0;
    }
    nearest.iter().sum::<f64>() / nearest.len() as f64
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::searchers::SerialSearcher;
    use crate::experiment::Evaluator;
    use crate::testing::{network, Echo, WeightSum};

    fn searcher(archive_threshold: f64) -> NoveltySearcher<SerialSearcher<Echo>> {
        NoveltySearcher::new(
            NoveltyConfig {
                nearest_neighbors: 2,
                archive_threshold,
            },
            SerialSearcher::new(Echo),
        )
    }

    fn line() -> Vec<Arc<dyn Phenome>> {
        vec![network(0, &[0.0]), network(1, &[1.0]), network(2, &[3.0])]
    }

    #[test]
    fn novelty_of_nearest_neighbors() {
        let evaluations = searcher(10.0).search(&line()).unwrap();
        assert_eq!(
            evaluations.iter().map(|e| e.improvement()).collect::<Vec<_>>(),
            vec![2.0, 1.5, 2.5]
        );
        // Fitness is not replaced.
        assert_eq!(evaluations[2].fitness, 3.0);
    }

    #[test]
    fn novel_behaviors_archived() {
        let mut searcher = searcher(1.8);
        searcher.search(&line()).unwrap();
        let mut archived: Vec<_> = searcher.archive().iter().map(|r| r.id).collect();
        archived.sort_unstable();
        assert_eq!(archived, vec![0, 2]);

        // Scored against the archive alone.
        let evaluations = searcher.search(&[network(3, &[0.1])]).unwrap();
        assert!((evaluations[0].improvement() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn archive_survives_restore() {
        let mut searcher = searcher(0.0);
        searcher.search(&line()).unwrap();
        let mut components = BTreeMap::new();
        searcher.save_state(&mut components);

        let mut restored = NoveltySearcher::new(NoveltyConfig::zero(), SerialSearcher::new(Echo));
        restored.load_state(&components).unwrap();
        let key = |r: &BehaviorRecord| r.id;
        let mut expected = searcher.archive();
        let mut actual = restored.archive();
        expected.sort_by_key(key);
        actual.sort_by_key(key);
        assert_eq!(actual, expected);
        assert_eq!(actual.len(), 3);
    }

    #[test]
    fn behavior_required() {
        let mut searcher = NoveltySearcher::new(
            NoveltyConfig {
                nearest_neighbors: 1,
                archive_threshold: 0.0,
            },
            SerialSearcher::new(WeightSum::default()),
        );
        assert!(searcher.search(&line()).is_err());
    }

    /// Echoes outputs as behaviour, failing genomes with odd ids.
    struct FailOdd;

    impl Evaluator for FailOdd {
        fn evaluate(&self, phenome: &dyn Phenome) -> Evaluation {
            if phenome.id() % 2 == 1 {
                return Evaluation::failed(phenome.id(), "odd genome");
            }
            Echo.evaluate(phenome)
        }
    }

    #[test]
    fn failed_evaluations_pass_through() {
        let mut searcher = NoveltySearcher::new(
            NoveltyConfig {
                nearest_neighbors: 2,
                archive_threshold: 10.0,
            },
            SerialSearcher::new(FailOdd),
        );
        let evaluations = searcher.search(&line()).unwrap();
        assert_eq!(evaluations.len(), 3);
        assert!(evaluations[1].error.is_some());
        assert_eq!(evaluations[1].improvement, None);
        // Only the successful behaviours are compared.
        assert_eq!(evaluations[0].improvement, Some(3.0));
        assert_eq!(evaluations[2].improvement, Some(3.0));
    }

    #[test]
    fn validation_checks_config() {
        assert!(searcher(1.0).validate().is_ok());
        let invalid = NoveltySearcher::new(NoveltyConfig::zero(), SerialSearcher::new(Echo));
        assert!(invalid.validate().is_err());
    }
}

//! The generational loop and the collaborators it drives.
//!
//! An [`Experiment`] owns a [`Generator`] producing populations, a
//! [`Decoder`] turning genomes into phenomes, and a [`Searcher`]
//! evaluating them. Each iteration advances the population, decodes
//! the genomes not seen in the previous generation, evaluates every
//! phenome, and writes fitness back onto the genomes.
//!
//! [`Generator`]: crate::generation::Generator

mod config;
mod contracts;
mod errors;
mod state;

pub use config::ExperimentConfig;
pub use contracts::{
    Archiver, Decoder, Evaluation, Evaluator, NullArchiver, NullVisualizer, Phenome, Restorer,
    Searcher, Visualizer,
};
pub use errors::{BoxError, ExperimentError, GenomeError};
pub use state::ExperimentState;

use crate::generation::Generator;
use crate::genomics::{Genome, History};
use crate::operators::{ConfigError, ConfigIssues, FitnessType};
use crate::populations::Population;
use crate::GenomeId;

use ahash::RandomState;
use log::{debug, info, warn};
use rayon::prelude::*;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Where an experiment is in its run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExperimentPhase {
    /// Not yet run, or validating its configuration.
    Initializing,
    /// Producing the next population.
    Advancing,
    /// Decoding and evaluating the population.
    Evaluating,
    /// Taking the final archive and visualization.
    Archiving,
    /// Ended early because an evaluation reached the goal.
    Stopped,
    /// Ran every configured iteration.
    Done,
}

/// A NEAT run.
pub struct Experiment {
    config: ExperimentConfig,
    history: Arc<History>,
    decoder: Box<dyn Decoder>,
    generator: Box<dyn Generator>,
    searcher: Box<dyn Searcher>,
    archiver: Box<dyn Archiver>,
    visualizer: Box<dyn Visualizer>,
    state: ExperimentState,
    cache: HashMap<GenomeId, Arc<dyn Phenome>, RandomState>,
    phase: ExperimentPhase,
}

impl Experiment {
    /// Creates an experiment that neither archives nor visualizes.
    /// The `history` must be the one shared by the generator's
    /// operators.
    pub fn new(
        config: ExperimentConfig,
        history: Arc<History>,
        decoder: impl Decoder + 'static,
        generator: impl Generator + 'static,
        searcher: impl Searcher + 'static,
    ) -> Experiment {
        Experiment {
            config,
            history,
            decoder: Box::new(decoder),
            generator: Box::new(generator),
            searcher: Box::new(searcher),
            archiver: Box::new(NullArchiver),
            visualizer: Box::new(NullVisualizer),
            state: ExperimentState::default(),
            cache: HashMap::default(),
            phase: ExperimentPhase::Initializing,
        }
    }

    /// Archives state with `archiver`.
    pub fn with_archiver(mut self, archiver: impl Archiver + 'static) -> Experiment {
        self.archiver = Box::new(archiver);
        self
    }

    /// Reports on every generation with `visualizer`.
    pub fn with_visualizer(mut self, visualizer: impl Visualizer + 'static) -> Experiment {
        self.visualizer = Box::new(visualizer);
        self
    }

    /// Returns the experiment's configuration.
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Returns the innovation history shared with the generator.
    pub fn history(&self) -> &Arc<History> {
        &self.history
    }

    /// Returns the experiment's resumable state.
    pub fn state(&self) -> &ExperimentState {
        &self.state
    }

    /// Returns the current population.
    pub fn population(&self) -> &Population {
        &self.state.population
    }

    /// Returns the best genome found so far.
    pub fn best(&self) -> Option<&Genome> {
        self.state.best.as_ref()
    }

    /// Returns the values of the best genome's setting traits.
    pub fn settings(&self) -> &BTreeMap<String, f64> {
        &self.state.settings
    }

    /// Returns the number of completed iterations.
    pub fn iteration(&self) -> usize {
        self.state.iteration
    }

    /// Returns whether an evaluation reached the goal.
    pub fn stopped(&self) -> bool {
        self.state.stopped
    }

    /// Returns where the experiment is in its run.
    pub fn phase(&self) -> ExperimentPhase {
        self.phase
    }

    /// Replaces the experiment's state with the one loaded by
    /// `restorer`, and primes the innovation history so that no
    /// id or innovation in it is handed out again.
    ///
    /// # Errors
    /// Fails if the restorer fails, or if the searcher rejects
    /// its saved state.
    pub fn restore(&mut self, restorer: &dyn Restorer) -> Result<(), ExperimentError> {
        let mut state = ExperimentState::default();
        restorer
            .restore(&mut state)
            .map_err(ExperimentError::Restore)?;
        self.history.load(
            state
                .population
                .genomes()
                .iter()
                .chain(state.population.species().iter().map(|s| s.example()))
                .chain(state.best.iter()),
        );
        self.searcher
            .load_state(&state.components)
            .map_err(ExperimentError::Restore)?;
        debug!(
            "{}: restored at iteration {} with {} genomes",
            self.config.name,
            state.iteration,
            state.population.genomes().len()
        );
        self.state = state;
        self.cache.clear();
        self.phase = ExperimentPhase::Initializing;
        Ok(())
    }

    /// Checks the experiment's configuration together with those of
    /// the generator, its operators and the searcher, reporting every
    /// problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        issues.merge(self.config.validate());
        issues.merge(self.generator.validate());
        issues.merge(self.searcher.validate());
        if let Some(schema) = self.generator.trait_schema() {
            if *schema != self.config.traits {
                issues.push("experiment traits differ from the generator's trait schema");
            }
        }
        issues.finish()
    }

    /// Validates the configuration and runs iterations until the
    /// configured count is reached or an evaluation reaches the goal.
    /// The final state is then archived and visualized.
    ///
    /// # Errors
    /// Any error ends the run. Failures of single genomes are reported
    /// once their generation is complete and the final state has been
    /// archived and visualized. Other errors end the run immediately.
    pub fn run(&mut self) -> Result<(), ExperimentError> {
        self.phase = ExperimentPhase::Initializing;
        self.validate()?;
        let mut failures = vec![];
        while self.state.iteration < self.config.iterations && !self.state.stopped {
            match self.step() {
                Ok(_) => {}
                Err(ExperimentError::Genomes(errors)) => {
                    failures = errors;
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        self.finish()?;
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ExperimentError::Genomes(failures))
        }
    }

    /// Runs a single iteration, returning whether an evaluation
    /// reached the goal.
    ///
    /// # Errors
    /// Genome-level failures are collected and returned together
    /// after the generation's fitness has been written back and the
    /// population sorted. Any other error is returned immediately.
    pub fn step(&mut self) -> Result<bool, ExperimentError> {
        self.phase = ExperimentPhase::Advancing;
        self.advance()?;

        self.phase = ExperimentPhase::Evaluating;
        let mut failures = self.update_cache();
        let stop = self.search(&mut failures)?;
        self.state.iteration += 1;
        self.state.stopped = stop;

        info!(
            "{}: iteration {}, generation {}, best fitness {:.4}, {} species",
            self.config.name,
            self.state.iteration,
            self.state.population.generation(),
            self.state.best.as_ref().map_or(f64::NAN, Genome::fitness),
            self.state.population.species().len()
        );
        if failures.is_empty() {
            Ok(stop)
        } else {
            warn!(
                "{}: {} genome(s) failed in generation {}",
                self.config.name,
                failures.len(),
                self.state.population.generation()
            );
            Err(ExperimentError::Genomes(failures))
        }
    }

    fn finish(&mut self) -> Result<(), ExperimentError> {
        self.phase = ExperimentPhase::Archiving;
        self.archive()?;
        self.visualizer
            .visualize(&self.state.population)
            .map_err(ExperimentError::Visualize)?;
        self.phase = if self.state.stopped {
            ExperimentPhase::Stopped
        } else {
            ExperimentPhase::Done
        };
        info!("{}", self);
        Ok(())
    }

    fn archive(&mut self) -> Result<(), ExperimentError> {
        self.searcher.save_state(&mut self.state.components);
        self.archiver
            .archive(&self.state)
            .map_err(ExperimentError::Archive)
    }

    /// Replaces the population with the next one. When the generation
    /// number moves forward, the outgoing population is visualized and
    /// archived first, and the best genome's settings published.
    fn advance(&mut self) -> Result<(), ExperimentError> {
        let next = self.generator.generate(&self.state.population)?;
        if next.generation() > self.state.population.generation() {
            self.visualizer
                .visualize(&self.state.population)
                .map_err(ExperimentError::Visualize)?;
            self.archive()?;
            self.update_settings();
        }
        self.state.population = next;
        Ok(())
    }

    fn update_settings(&mut self) {
        let best = match &self.state.best {
            Some(best) => best,
            None => return,
        };
        for (t, value) in self.config.traits.iter().zip(best.traits()) {
            if t.is_setting {
                self.state.settings.insert(t.name.clone(), *value);
            }
        }
    }

    /// Rebuilds the phenome cache, keeping phenomes of genomes that
    /// survived from the previous generation and decoding the rest
    /// in parallel.
    fn update_cache(&mut self) -> Vec<GenomeError> {
        let old = std::mem::take(&mut self.cache);
        let genomes = self.state.population.genomes();
        let mut cache: HashMap<GenomeId, Arc<dyn Phenome>, RandomState> =
            HashMap::with_capacity_and_hasher(genomes.len(), RandomState::new());
        let mut pending = Vec::new();
        for genome in genomes {
            match old.get(&genome.id()) {
                Some(phenome) => {
                    cache.insert(genome.id(), Arc::clone(phenome));
                }
                None => pending.push(genome),
            }
        }

        let decoder = &self.decoder;
        let decoded: Vec<(GenomeId, Result<Arc<dyn Phenome>, BoxError>)> = pending
            .par_iter()
            .map(|genome| (genome.id(), decoder.decode(genome)))
            .collect();

        let reused = cache.len();
        let mut failures = vec![];
        for (id, result) in decoded {
            match result {
                Ok(phenome) => {
                    cache.insert(id, phenome);
                }
                Err(e) => failures.push(GenomeError::Decode {
                    id,
                    reason: e.to_string(),
                }),
            }
        }
        debug!(
            "phenome cache: {} reused, {} decoded, {} failed",
            reused,
            cache.len() - reused,
            failures.len()
        );
        self.cache = cache;
        failures
    }

    /// Evaluates every cached phenome and writes the results back onto
    /// the genomes, then sorts the population by decreasing fitness.
    fn search(&mut self, failures: &mut Vec<GenomeError>) -> Result<bool, ExperimentError> {
        let mut phenomes: Vec<Arc<dyn Phenome>> = self.cache.values().cloned().collect();
        phenomes.sort_by_key(|p| p.id());

        self.searcher
            .set_phenomes(&phenomes)
            .map_err(ExperimentError::Search)?;
        self.searcher.setup().map_err(ExperimentError::Search)?;
        let evaluations = self
            .searcher
            .search(&phenomes)
            .map_err(ExperimentError::Search)?;
        self.searcher.takedown().map_err(ExperimentError::Search)?;

        let genomes = self.state.population.genomes_mut();
        let index: HashMap<GenomeId, usize, RandomState> =
            genomes.iter().enumerate().map(|(i, g)| (g.id(), i)).collect();
        let mut stop = false;
        let mut fittest: Option<usize> = None;
        let mut evaluation_failed = false;
        for evaluation in &evaluations {
            if let Some(reason) = &evaluation.error {
                evaluation_failed = true;
                failures.push(GenomeError::Evaluate {
                    id: evaluation.id,
                    reason: reason.clone(),
                });
            }
            let i = match index.get(&evaluation.id) {
                Some(&i) => i,
                None => continue,
            };
            genomes[i].set_fitness(evaluation.fitness);
            genomes[i].set_improvement(evaluation.improvement());
            if fittest.map_or(true, |f| genomes[i].fitness() > genomes[f].fitness()) {
                fittest = Some(i);
            }
            stop |= evaluation.stop;
        }

        if let (false, Some(i)) = (evaluation_failed, fittest) {
            let candidate = &genomes[i];
            let replace = match (self.config.fitness_type, &self.state.best) {
                (FitnessType::Absolute, Some(best)) => candidate.fitness() > best.fitness(),
                _ => true,
            };
            if replace {
                self.state.best = Some(candidate.clone());
            }
        }

        self.state.population.sort_by_fitness();
        Ok(stop)
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "experiment {} at iteration {}", self.config.name, self.state.iteration)?;
        match &self.state.best {
            Some(best) => write!(
                f,
                " has best genome {} with fitness {}",
                best.id(),
                best.fitness()
            ),
            None => write!(f, " has no best genome"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{ClassicGenerator, GeneratorConfig};
    use crate::genomics::{Trait, TraitSchema};
    use crate::operators::{ClassicCrosser, CrosserConfig, WeightConfig, WeightMutator};
    use crate::populations::Species;
    use crate::searchers::{ConcurrentSearcher, SerialSearcher};
    use crate::speciation::{ClassicSpeciater, SpeciaterConfig};
    use crate::testing::{comparer, genome_with_weight, history, WeightDecoder, WeightSum};

    use std::num::NonZeroUsize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn traits() -> TraitSchema {
        TraitSchema(vec![Trait {
            name: "rate".into(),
            min: 0.25,
            max: 0.25,
            is_setting: true,
        }])
    }

    fn generator_config() -> GeneratorConfig {
        GeneratorConfig {
            population_size: NonZeroUsize::new(10).unwrap(),
            num_inputs: 2,
            num_outputs: 1,
            weight_range: 1.0,
            traits: traits(),
            survival_threshold: 0.5,
            mutate_only_probability: 0.5,
            max_stagnation: 15,
            ..GeneratorConfig::zero()
        }
    }

    fn weights() -> WeightConfig {
        WeightConfig {
            mutate_weight_probability: 0.5,
            replace_weight_probability: 0.1,
            weight_range: 1.0,
        }
    }

    fn generator_with(
        history: Arc<History>,
        config: GeneratorConfig,
        weights: WeightConfig,
        compatibility_threshold: f64,
    ) -> ClassicGenerator {
        ClassicGenerator::new(
            config,
            history,
            Box::new(ClassicCrosser::new(CrosserConfig::zero())),
            Box::new(WeightMutator::new(weights)),
            Box::new(ClassicSpeciater::new(
                SpeciaterConfig {
                    compatibility_threshold,
                },
                comparer(),
            )),
        )
    }

    fn generator(history: Arc<History>) -> ClassicGenerator {
        generator_with(history, generator_config(), weights(), 100.0)
    }

    fn experiment(
        iterations: usize,
        decoder: WeightDecoder,
        evaluator: impl Evaluator + 'static,
    ) -> Experiment {
        let _ = env_logger::builder().is_test(true).try_init();
        let history = history();
        Experiment::new(
            ExperimentConfig {
                name: "test".into(),
                iterations,
                traits: traits(),
                ..ExperimentConfig::zero()
            },
            history.clone(),
            decoder,
            generator(history),
            SerialSearcher::new(evaluator),
        )
    }

    #[derive(Default)]
    struct Calls {
        archived: AtomicUsize,
        visualized: AtomicUsize,
    }

    impl Archiver for Calls {
        fn archive(&self, _state: &ExperimentState) -> Result<(), BoxError> {
            self.archived.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    impl Visualizer for Calls {
        fn visualize(&self, _population: &Population) -> Result<(), BoxError> {
            self.visualized.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    /// Fitness falls by one every generation.
    #[derive(Default)]
    struct Declining {
        round: usize,
    }

    impl Evaluator for Declining {
        fn evaluate(&self, phenome: &dyn Phenome) -> Evaluation {
            Evaluation::new(phenome.id(), 10.0 - self.round as f64)
        }

        fn setup(&mut self) -> Result<(), BoxError> {
            self.round += 1;
            Ok(())
        }
    }

    #[test]
    fn runs_every_iteration() {
        let calls = Arc::new(Calls::default());
        let mut experiment = experiment(3, WeightDecoder::default(), WeightSum::default())
            .with_archiver(calls.clone())
            .with_visualizer(calls.clone());
        experiment.run().unwrap();

        assert_eq!(experiment.phase(), ExperimentPhase::Done);
        assert_eq!(experiment.iteration(), 3);
        assert!(!experiment.stopped());
        assert_eq!(experiment.population().generation(), 2);
        assert_eq!(experiment.population().genomes().len(), 10);
        assert!(experiment.best().is_some());
        // Twice on generation changes, once at the end.
        assert_eq!(calls.archived.load(Ordering::Relaxed), 3);
        assert_eq!(calls.visualized.load(Ordering::Relaxed), 3);
        assert_eq!(experiment.settings().get("rate"), Some(&0.25));
    }

    #[test]
    fn population_sorted_by_fitness() {
        let mut experiment = experiment(1, WeightDecoder::default(), WeightSum::default());
        experiment.step().unwrap();
        let fitness: Vec<f64> = experiment
            .population()
            .genomes()
            .iter()
            .map(Genome::fitness)
            .collect();
        assert!(fitness.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(experiment.best().map(Genome::fitness), Some(fitness[0]));
    }

    #[test]
    fn stop_flag_ends_run() {
        let mut experiment = experiment(10, WeightDecoder::default(), WeightSum { stop_at: 0.0 });
        experiment.run().unwrap();
        assert_eq!(experiment.phase(), ExperimentPhase::Stopped);
        assert!(experiment.stopped());
        assert_eq!(experiment.iteration(), 1);
    }

    #[test]
    fn invalid_config_rejected_before_running() {
        let mut experiment = experiment(0, WeightDecoder::default(), WeightSum::default());
        assert!(matches!(experiment.run(), Err(ExperimentError::Config(_))));
        assert!(experiment.population().is_empty());
    }

    #[test]
    fn decode_failures_aggregated() {
        let decoder = WeightDecoder {
            reject_odd: true,
            ..WeightDecoder::default()
        };
        let mut experiment = experiment(1, decoder, WeightSum::default());
        let failures = match experiment.step() {
            Err(ExperimentError::Genomes(failures)) => failures,
            other => panic!("expected genome failures, got {:?}", other),
        };
        assert_eq!(failures.len(), 5);
        assert!(failures
            .iter()
            .all(|f| matches!(f, GenomeError::Decode { id, .. } if id % 2 == 1)));

        // The rest of the generation was evaluated and sorted.
        let genomes = experiment.population().genomes();
        assert_eq!(genomes.len(), 10);
        assert!(genomes[..5].iter().all(|g| g.id() % 2 == 0));
        assert_eq!(experiment.iteration(), 1);
    }

    #[test]
    fn run_archives_before_reporting_genome_failures() {
        let decoder = WeightDecoder {
            reject_odd: true,
            ..WeightDecoder::default()
        };
        let calls = Arc::new(Calls::default());
        let mut experiment = experiment(3, decoder, WeightSum::default())
            .with_archiver(calls.clone())
            .with_visualizer(calls.clone());
        match experiment.run() {
            Err(ExperimentError::Genomes(failures)) => assert_eq!(failures.len(), 5),
            other => panic!("expected genome failures, got {:?}", other),
        }
        assert_eq!(experiment.iteration(), 1);
        assert_eq!(calls.archived.load(Ordering::Relaxed), 1);
        assert_eq!(calls.visualized.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn operator_configs_validated_before_running() {
        let history = history();
        let generator = generator_with(
            history.clone(),
            GeneratorConfig {
                survival_threshold: 5.0,
                mutate_only_probability: 3.0,
                interspecies_mating_rate: -2.0,
                ..generator_config()
            },
            WeightConfig {
                mutate_weight_probability: 7.0,
                replace_weight_probability: -3.0,
                weight_range: 1.0,
            },
            -1.0,
        );
        let mut experiment = Experiment::new(
            ExperimentConfig {
                name: "invalid".into(),
                iterations: 3,
                traits: traits(),
                ..ExperimentConfig::zero()
            },
            history,
            WeightDecoder::default(),
            generator,
            SerialSearcher::new(WeightSum::default()),
        );
        match experiment.run() {
            Err(ExperimentError::Config(e)) => assert_eq!(e.issues.len(), 6),
            other => panic!("expected a configuration error, got {:?}", other),
        }
        assert_eq!(experiment.iteration(), 0);
        assert!(experiment.population().is_empty());
    }

    #[test]
    fn survival_threshold_out_of_range() {
        let history = history();
        let generator = generator_with(
            history.clone(),
            GeneratorConfig {
                survival_threshold: 5.0,
                ..generator_config()
            },
            weights(),
            100.0,
        );
        let mut experiment = Experiment::new(
            ExperimentConfig {
                name: "survival".into(),
                iterations: 3,
                traits: traits(),
                ..ExperimentConfig::zero()
            },
            history,
            WeightDecoder::default(),
            generator,
            SerialSearcher::new(WeightSum::default()),
        );
        assert!(matches!(experiment.run(), Err(ExperimentError::Config(_))));
    }

    #[test]
    fn trait_schemas_must_agree() {
        let history = history();
        let mut experiment = Experiment::new(
            ExperimentConfig {
                name: "traits".into(),
                iterations: 1,
                ..ExperimentConfig::zero()
            },
            history.clone(),
            WeightDecoder::default(),
            generator(history),
            SerialSearcher::new(WeightSum::default()),
        );
        let err = experiment.validate().unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert!(matches!(experiment.run(), Err(ExperimentError::Config(_))));
    }

    #[test]
    fn surviving_phenomes_reused() {
        let decoder = WeightDecoder::default();
        let decoded = decoder.decoded.clone();
        let mut experiment = experiment(2, decoder, WeightSum::default());
        experiment.step().unwrap();
        assert_eq!(decoded.load(Ordering::Relaxed), 10);
        // One elite carries over from the single species.
        experiment.step().unwrap();
        assert_eq!(decoded.load(Ordering::Relaxed), 19);
    }

    #[test]
    fn absolute_fitness_keeps_best_ever() {
        let mut experiment = experiment(3, WeightDecoder::default(), Declining::default());
        experiment.run().unwrap();
        assert_eq!(experiment.best().map(Genome::fitness), Some(9.0));
    }

    #[test]
    fn relative_fitness_takes_latest_best() {
        let history = history();
        let mut experiment = Experiment::new(
            ExperimentConfig {
                name: "relative".into(),
                iterations: 3,
                fitness_type: FitnessType::Relative,
                traits: traits(),
            },
            history.clone(),
            WeightDecoder::default(),
            generator(history),
            ConcurrentSearcher::new(Declining::default()),
        );
        experiment.run().unwrap();
        assert_eq!(experiment.best().map(Genome::fitness), Some(7.0));
    }

    struct Snapshot(ExperimentState);

    impl Restorer for Snapshot {
        fn restore(&self, state: &mut ExperimentState) -> Result<(), BoxError> {
            *state = self.0.clone();
            Ok(())
        }
    }

    #[test]
    fn restore_primes_history() {
        let mut genome = genome_with_weight(500, 0.5);
        genome.set_traits(vec![0.25]);
        let state = ExperimentState {
            iteration: 4,
            population: Population::new(
                4,
                vec![Species::new(genome.clone())],
                (0..10)
                    .map(|i| {
                        let mut g = genome.clone();
                        g.set_id(500 + i);
                        g
                    })
                    .collect(),
            ),
            ..ExperimentState::default()
        };

        let mut experiment = experiment(6, WeightDecoder::default(), WeightSum::default());
        experiment.restore(&Snapshot(state)).unwrap();
        assert_eq!(experiment.iteration(), 4);
        assert!(experiment.history().ids().peek() >= 510);

        experiment.run().unwrap();
        assert_eq!(experiment.iteration(), 6);
        assert_eq!(experiment.population().generation(), 6);
        // Offspring ids continue past the restored ones.
        assert!(experiment.population().genomes().iter().all(|g| g.id() >= 500));
    }
}

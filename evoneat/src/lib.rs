//! An implementation of NeuroEvolution of Augmenting Topologies,
//! following the 2002 paper: <http://nn.cs.utexas.edu/keyword?stanley:ec02>
//!
//! Besides generational NEAT, it supports phased search (alternating
//! complexification and pruning), dynamic compatibility thresholds,
//! real-time replacement of single genomes, and novelty search.
//!
//! Genomes, innovation history and genetic operators live in the
//! [`evoneat-genomics`](https://crates.io/crates/evoneat-genomics) crate
//! and are re-exported here. This crate groups genomes into species,
//! breeds new generations, and drives user-supplied decoders and
//! evaluators through an [`Experiment`].
//!
//! [`Experiment`]: crate::experiment::Experiment
//!
//! # Example usage: maximizing connection weights
//! ```
//! use evoneat::experiment::{
//!     BoxError, Decoder, Evaluation, Evaluator, Experiment, ExperimentConfig, Phenome,
//! };
//! use evoneat::generation::{ClassicGenerator, GeneratorConfig};
//! use evoneat::genomics::{Genome, History, IdSequence};
//! use evoneat::operators::{
//!     ClassicComparer, ClassicCrosser, ComparerConfig, CrosserConfig, WeightConfig,
//!     WeightMutator,
//! };
//! use evoneat::searchers::ConcurrentSearcher;
//! use evoneat::speciation::{ClassicSpeciater, SpeciaterConfig};
//! use evoneat::GenomeId;
//! use std::num::NonZeroUsize;
//! use std::sync::Arc;
//!
//! struct Weights(GenomeId, Vec<f64>);
//!
//! impl Phenome for Weights {
//!     fn id(&self) -> GenomeId {
//!         self.0
//!     }
//!
//!     fn traits(&self) -> &[f64] {
//!         &[]
//!     }
//!
//!     fn activate(&self, _inputs: &[f64]) -> Result<Vec<f64>, BoxError> {
//!         Ok(self.1.clone())
//!     }
//! }
//!
//! struct WeightDecoder;
//!
//! impl Decoder for WeightDecoder {
//!     fn decode(&self, genome: &Genome) -> Result<Arc<dyn Phenome>, BoxError> {
//!         let weights = genome.enabled_connections().map(|c| c.weight()).collect();
//!         Ok(Arc::new(Weights(genome.id(), weights)))
//!     }
//! }
//!
//! struct WeightSum;
//!
//! impl Evaluator for WeightSum {
//!     fn evaluate(&self, phenome: &dyn Phenome) -> Evaluation {
//!         match phenome.activate(&[]) {
//!             Ok(outputs) => Evaluation::new(phenome.id(), outputs.iter().sum()),
//!             Err(e) => Evaluation::failed(phenome.id(), e),
//!         }
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let history = Arc::new(History::new(Arc::new(IdSequence::new())));
//!     let generator = ClassicGenerator::new(
//!         GeneratorConfig {
//!             population_size: NonZeroUsize::new(50).unwrap(),
//!             num_inputs: 2,
//!             num_outputs: 1,
//!             weight_range: 1.0,
//!             survival_threshold: 0.2,
//!             mutate_only_probability: 0.25,
//!             interspecies_mating_rate: 0.001,
//!             max_stagnation: 15,
//!             ..GeneratorConfig::zero()
//!         },
//!         history.clone(),
//!         Box::new(ClassicCrosser::new(CrosserConfig::zero())),
//!         Box::new(WeightMutator::new(WeightConfig {
//!             mutate_weight_probability: 0.8,
//!             replace_weight_probability: 0.1,
//!             weight_range: 1.0,
//!         })),
//!         Box::new(ClassicSpeciater::new(
//!             SpeciaterConfig {
//!                 compatibility_threshold: 3.0,
//!             },
//!             Arc::new(ClassicComparer::new(ComparerConfig {
//!                 excess_coefficient: 1.0,
//!                 disjoint_coefficient: 1.0,
//!                 weight_coefficient: 0.4,
//!             })),
//!         )),
//!     );
//!
//!     let mut experiment = Experiment::new(
//!         ExperimentConfig {
//!             name: "weights".into(),
//!             iterations: 10,
//!             ..ExperimentConfig::zero()
//!         },
//!         history,
//!         WeightDecoder,
//!         generator,
//!         ConcurrentSearcher::new(WeightSum),
//!     );
//!     experiment.run()?;
//!
//!     assert_eq!(experiment.iteration(), 10);
//!     println!("{}", experiment);
//!     Ok(())
//! }
//! ```

pub mod experiment;
pub mod generation;
pub mod populations;
pub mod searchers;
pub mod speciation;

#[cfg(test)]
mod testing;

pub use evoneat_genomics::{genomics, operators, GenomeId, Innovation};

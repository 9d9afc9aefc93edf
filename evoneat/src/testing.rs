//! Builders shared by the crate's unit tests.

use crate::experiment::{BoxError, Decoder, Evaluation, Evaluator, Phenome};
use crate::genomics::{
    ActivationType, Connection, Genome, GenomicsError, History, IdSequence, NeuronType, Node,
    Position,
};
use crate::operators::{ClassicComparer, Comparer, ComparerConfig, Mutator};
use crate::GenomeId;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Comparer with unit coefficients, so the distance between two
/// genomes sharing every gene is their mean weight difference.
pub(crate) fn comparer() -> Arc<dyn Comparer> {
    Arc::new(ClassicComparer::new(ComparerConfig {
        excess_coefficient: 1.0,
        disjoint_coefficient: 1.0,
        weight_coefficient: 1.0,
    }))
}

/// A single input wired to a single output with the given weight.
pub(crate) fn genome_with_weight(id: GenomeId, weight: f64) -> Genome {
    let mut genome = Genome::new(id);
    genome
        .add_node(Node::new(
            0,
            NeuronType::Input,
            ActivationType::Direct,
            Position::new(0.5, 0.0),
        ))
        .unwrap();
    genome
        .add_node(Node::new(
            1,
            NeuronType::Output,
            ActivationType::Sigmoid,
            Position::new(0.5, 1.0),
        ))
        .unwrap();
    genome
        .add_connection(Connection::new(2, 0, 1, weight))
        .unwrap();
    genome
}

/// Genome with the given fitness, improvement and species.
pub(crate) fn scored(id: GenomeId, species_idx: usize, fitness: f64, improvement: f64) -> Genome {
    let mut genome = genome_with_weight(id, 0.0);
    genome.set_species_idx(species_idx);
    genome.set_fitness(fitness);
    genome.set_improvement(improvement);
    genome
}

/// A history whose sequence starts past the ids used by the builders above.
pub(crate) fn history() -> Arc<History> {
    Arc::new(History::new(Arc::new(IdSequence::starting_at(100))))
}

/// Mutator that leaves genomes untouched.
#[derive(Clone, Debug, Default)]
pub(crate) struct Unchanged;

impl Mutator for Unchanged {
    fn mutate(&self, _: &mut Genome) -> Result<(), GenomicsError> {
        Ok(())
    }
}

/// A phenome whose outputs are its weights scaled by the inputs.
#[derive(Clone, Debug)]
pub(crate) struct Network {
    id: GenomeId,
    traits: Vec<f64>,
    weights: Vec<f64>,
}

impl Phenome for Network {
    fn id(&self) -> GenomeId {
        self.id
    }

    fn traits(&self) -> &[f64] {
        &self.traits
    }

    fn activate(&self, inputs: &[f64]) -> Result<Vec<f64>, BoxError> {
        if inputs.is_empty() {
            return Err("no inputs".into());
        }
        Ok(self
            .weights
            .iter()
            .zip(inputs.iter().cycle())
            .map(|(w, i)| w * i)
            .collect())
    }
}

pub(crate) fn network(id: GenomeId, weights: &[f64]) -> Arc<dyn Phenome> {
    Arc::new(Network {
        id,
        traits: vec![],
        weights: weights.to_vec(),
    })
}

/// Decodes genomes into [`Network`]s of their enabled weights,
/// counting decodes. Genomes with odd ids are optionally rejected.
#[derive(Debug, Default)]
pub(crate) struct WeightDecoder {
    pub(crate) decoded: Arc<AtomicUsize>,
    pub(crate) reject_odd: bool,
}

impl Decoder for WeightDecoder {
    fn decode(&self, genome: &Genome) -> Result<Arc<dyn Phenome>, BoxError> {
        self.decoded.fetch_add(1, Ordering::Relaxed);
        if self.reject_odd && genome.id() % 2 == 1 {
            return Err("odd genome".into());
        }
        Ok(Arc::new(Network {
            id: genome.id(),
            traits: genome.traits().to_vec(),
            weights: genome
                .connections_by_innovation()
                .into_iter()
                .filter(|c| c.enabled())
                .map(|c| c.weight())
                .collect(),
        }))
    }
}

/// Fitness is the sum of absolute outputs for unit inputs. The goal
/// is reached once fitness reaches `stop_at`.
#[derive(Debug)]
pub(crate) struct WeightSum {
    pub(crate) stop_at: f64,
}

impl Default for WeightSum {
    fn default() -> WeightSum {
        WeightSum {
            stop_at: f64::INFINITY,
        }
    }
}

impl Evaluator for WeightSum {
    fn evaluate(&self, phenome: &dyn Phenome) -> Evaluation {
        match phenome.activate(&[1.0]) {
            Ok(outputs) => {
                let fitness: f64 = outputs.iter().map(|o| o.abs()).sum();
                let evaluation = Evaluation::new(phenome.id(), fitness);
                if fitness >= self.stop_at {
                    evaluation.stopping()
                } else {
                    evaluation
                }
            }
            Err(e) => Evaluation::failed(phenome.id(), e),
        }
    }
}

/// Like [`WeightSum`], also reporting the outputs as behaviour.
#[derive(Debug, Default)]
pub(crate) struct Echo;

impl Evaluator for Echo {
    fn evaluate(&self, phenome: &dyn Phenome) -> Evaluation {
        match phenome.activate(&[1.0]) {
            Ok(outputs) => Evaluation::new(phenome.id(), outputs.iter().map(|o| o.abs()).sum())
                .with_behavior(outputs),
            Err(e) => Evaluation::failed(phenome.id(), e),
        }
    }
}

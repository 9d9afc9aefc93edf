use super::GeneratorConfig;
use crate::genomics::{
    ActivationType, Connection, Genome, GenomicsError, History, NeuronType, Node, Position,
};
use crate::operators::Mutator;
use crate::populations::{EvolutionError, Population, Species};

use log::debug;
use rand::{thread_rng, Rng};
use rayon::prelude::*;

/// Builds generation 0: copies of the seed genome with fresh ids,
/// each mutated independently, all in a single species founded
/// by the seed.
pub(super) fn first_generation(
    config: &GeneratorConfig,
    history: &History,
    mutator: &dyn Mutator,
) -> Result<Population, EvolutionError> {
    let seed = seed_genome(config, history)?;
    let mut genomes: Vec<Genome> = (0..config.population_size.get())
        .map(|_| {
            let mut genome = seed.clone();
            genome.set_id(history.next_id());
            genome.set_species_idx(0);
            genome.set_birth(0);
            genome
        })
        .collect();
    genomes
        .par_iter_mut()
        .try_for_each(|genome| mutator.mutate(genome))?;
    debug!(
        "seeded {} genomes from a genome with {} genes",
        genomes.len(),
        seed.complexity()
    );
    Ok(Population::new(0, vec![Species::new(seed)], genomes))
}

/// Returns the genome the first generation is cloned from.
///
/// Without a configured seed, this is a bias node and the inputs on
/// the bottom row, the outputs on the top row, and every bias or
/// input node connected to every output. All genes are marked through
/// `history`, so seeding twice yields the same innovation numbers.
pub(super) fn seed_genome(config: &GeneratorConfig, history: &History) -> Result<Genome, GenomicsError> {
    if let Some(seed) = &config.seed {
        history.load(std::iter::once(seed));
        return Ok(seed.clone());
    }

    let mut rng = thread_rng();
    let mut genome = Genome::new(0);
    let mut sources = Vec::with_capacity(1 + config.num_inputs);
    let mut targets = Vec::with_capacity(config.num_outputs);

    let bias = Position::new(0.0, 0.0);
    let id = history.mark_node(bias);
    genome.add_node(Node::new(id, NeuronType::Bias, ActivationType::Direct, bias))?;
    sources.push(id);

    let n = config.num_inputs as f64;
    for i in 0..config.num_inputs {
        let position = Position::new((i + 1) as f64 / n, 0.0);
        let id = history.mark_node(position);
        genome.add_node(Node::new(id, NeuronType::Input, ActivationType::Direct, position))?;
        sources.push(id);
    }

    for i in 0..config.num_outputs {
        let x = if config.num_outputs > 1 {
            i as f64 / (config.num_outputs - 1) as f64
        } else {
            0.5
        };
        let position = Position::new(x, 1.0);
        let id = history.mark_node(position);
        genome.add_node(Node::new(id, NeuronType::Output, config.output_activation, position))?;
        targets.push(id);
    }

    for &source in &sources {
        for &target in &targets {
            let weight = (rng.gen::<f64>() * 2.0 - 1.0) * config.weight_range;
            let id = history.mark_connection(source, target);
            genome.add_connection(Connection::new(id, source, target, weight))?;
        }
    }

    genome.set_traits(config.traits.random_values());
    Ok(genome)
}

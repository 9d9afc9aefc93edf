use crate::genomics::{Connection, Genome, GenomicsError, History, NeuronType, Node};
use crate::operators::{ComplexifyConfig, ConfigError, Mutator};
use crate::Innovation;

use log::trace;
use rand::seq::{IteratorRandom, SliceRandom};
use rand::{thread_rng, Rng};

use std::sync::Arc;

/// Grows genome topology by splitting connections
/// with new nodes, or by adding new connections.
///
/// At most one structural change is made per call.
#[derive(Clone, Debug)]
pub struct Complexify {
    config: ComplexifyConfig,
    history: Arc<History>,
}

impl Complexify {
    /// Creates a complexifying mutator marking
    /// new genes through `history`.
    pub fn new(config: ComplexifyConfig, history: Arc<History>) -> Complexify {
        Complexify { config, history }
    }

    /// Splits a random connection with a new hidden node. The split
    /// connection is disabled, and replaced by a connection into the
    /// new node with weight 1 and one out of it with the old weight.
    ///
    /// Connections whose midpoint is already occupied by a node are
    /// never split. Returns whether the genome was changed.
    pub fn add_node(&self, genome: &mut Genome) -> Result<bool, GenomicsError> {
        let mut rng = thread_rng();
        let mut candidates: Vec<&Connection> = genome.connections().iter().collect();
        candidates.shuffle(&mut rng);

        let split = candidates.into_iter().find_map(|conn| {
            let source = genome.node(conn.source())?;
            let target = genome.node(conn.target())?;
            let position = source.position().midpoint(&target.position());
            let occupied = genome
                .nodes()
                .iter()
                .any(|n| n.position().key() == position.key());
            (!occupied).then(|| (conn.id(), conn.source(), conn.target(), conn.weight(), position))
        });
        let (split_id, source, target, weight, position) = match split {
            Some(split) => split,
            None => return Ok(false),
        };

        let node_id = self.history.mark_node(position);
        let into_id = self.history.mark_connection(source, node_id);
        let out_of_id = self.history.mark_connection(node_id, target);
        if genome.contains_node(node_id)
            || genome.connection(into_id).is_some()
            || genome.connection(out_of_id).is_some()
        {
            // A pruned splice already reuses one of these innovation numbers.
            trace!("genome {}: node split of {} collides, skipped", genome.id(), split_id);
            return Ok(false);
        }

        if let Some(split) = genome.connection_mut(split_id) {
            split.set_enabled(false);
        }
        genome.add_node(Node::new(
            node_id,
            NeuronType::Hidden,
            self.config.hidden_activation,
            position,
        ))?;
        genome.add_connection(Connection::new(into_id, source, node_id, 1.0))?;
        genome.add_connection(Connection::new(out_of_id, node_id, target, weight))?;
        trace!(
            "genome {}: split connection {} with node {}",
            genome.id(),
            split_id,
            node_id
        );
        Ok(true)
    }

    /// Connects a random pair of unconnected nodes. Returns whether
    /// the genome was changed.
    ///
    /// Connections into bias or input nodes, between output nodes,
    /// and self-loops are never created. Unless recurrence is allowed,
    /// the target must also lie on a strictly higher layer than the source.
    pub fn add_connection(&self, genome: &mut Genome) -> Result<bool, GenomicsError> {
        let mut rng = thread_rng();
        let candidate = self.candidate_pairs(genome).choose(&mut rng);
        let (source, target) = match candidate {
            Some(pair) => pair,
            None => return Ok(false),
        };

        let id = self.history.mark_connection(source, target);
        if genome.connection(id).is_some() {
            trace!("genome {}: connection {} collides, skipped", genome.id(), id);
            return Ok(false);
        }
        let range = self.config.weight_range.abs();
        let weight = (rng.gen::<f64>() * 2.0 - 1.0) * range;
        genome.add_connection(Connection::new(id, source, target, weight))?;
        trace!(
            "genome {}: connected {} -> {} as {}",
            genome.id(),
            source,
            target,
            id
        );
        Ok(true)
    }

    fn candidate_pairs<'a>(
        &'a self,
        genome: &'a Genome,
    ) -> impl Iterator<Item = (Innovation, Innovation)> + 'a {
        let nodes = genome.nodes();
        nodes.iter().flat_map(move |source| {
            nodes.iter().filter_map(move |target| {
                self.is_legal(source, target, genome)
                    .then(|| (source.id(), target.id()))
            })
        })
    }

    fn is_legal(&self, source: &Node, target: &Node, genome: &Genome) -> bool {
        if source.id() == target.id() {
            return false;
        }
        match (source.neuron_type(), target.neuron_type()) {
            (_, NeuronType::Bias | NeuronType::Input) => return false,
            (NeuronType::Output, NeuronType::Output) => return false,
            _ => {}
        }
        if !self.config.allow_recurrent && target.position().y <= source.position().y {
            return false;
        }
        genome.connection_between(source.id(), target.id()).is_none()
    }
}

impl Mutator for Complexify {
    fn mutate(&self, genome: &mut Genome) -> Result<(), GenomicsError> {
        let mut rng = thread_rng();
        if rng.gen::<f64>() < self.config.add_node_probability {
            self.add_node(genome)?;
        } else if rng.gen::<f64>() < self.config.add_conn_probability {
            self.add_connection(genome)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()
    }
}

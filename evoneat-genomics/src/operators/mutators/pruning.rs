use crate::genomics::{Genome, GenomicsError, NeuronType};
use crate::operators::{ConfigError, Mutator, PruningConfig};
use crate::Innovation;

use log::trace;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};

/// Shrinks genome topology by deleting hidden nodes or connections.
///
/// At most one structural change is made per call.
#[derive(Clone, Debug)]
pub struct Pruning {
    config: PruningConfig,
}

impl Pruning {
    /// Creates a pruning mutator with the given configuration.
    pub fn new(config: PruningConfig) -> Pruning {
        Pruning { config }
    }

    /// Deletes a random hidden node with at most one incoming or at most
    /// one outgoing connection. Returns whether the genome was changed.
    ///
    /// A dead-end node is removed along with its connections. Otherwise
    /// the node is bypassed: every incoming connection is redirected to
    /// the targets of the outgoing ones, and every outgoing connection
    /// is redirected from the sources of the incoming ones.
    pub fn delete_node(&self, genome: &mut Genome) -> Result<bool, GenomicsError> {
        let mut rng = thread_rng();
        let eligible: Vec<(Innovation, Vec<Innovation>, Vec<Innovation>)> = genome
            .nodes()
            .iter()
            .filter(|n| n.neuron_type() == NeuronType::Hidden)
            .map(|n| {
                let id = n.id();
                let incoming = genome
                    .incoming(id)
                    .filter(|c| c.source() != id)
                    .map(|c| c.id())
                    .collect::<Vec<_>>();
                let outgoing = genome
                    .outgoing(id)
                    .filter(|c| c.target() != id)
                    .map(|c| c.id())
                    .collect::<Vec<_>>();
                (id, incoming, outgoing)
            })
            .filter(|(_, incoming, outgoing)| incoming.len() <= 1 || outgoing.len() <= 1)
            .collect();
        let (node, incoming, outgoing) = match eligible.choose(&mut rng) {
            Some(choice) => choice.clone(),
            None => return Ok(false),
        };

        if outgoing.is_empty() || incoming.is_empty() {
            for id in incoming.iter().chain(outgoing.iter()) {
                genome.remove_connection(*id);
            }
        } else {
            for &into in &incoming {
                for &out_of in &outgoing {
                    let source = genome.connection(into).map(|c| c.source());
                    let target = genome.connection(out_of).map(|c| c.target());
                    if let (Some(source), Some(target)) = (source, target) {
                        if let Some(c) = genome.connection_mut(into) {
                            c.set_target(target);
                        }
                        if let Some(c) = genome.connection_mut(out_of) {
                            c.set_source(source);
                        }
                    }
                }
            }
        }
        // Self-loops disappear with the node.
        let loops: Vec<Innovation> = genome.outgoing(node).map(|c| c.id()).collect();
        for id in loops {
            genome.remove_connection(id);
        }
        genome.remove_node(node);
        trace!("genome {}: deleted node {}", genome.id(), node);
        Ok(true)
    }

    /// Deletes a random connection, along with any hidden endpoint
    /// left without connections. Returns whether the genome was changed.
    pub fn delete_connection(&self, genome: &mut Genome) -> Result<bool, GenomicsError> {
        let mut rng = thread_rng();
        let chosen = genome.connections().choose(&mut rng).map(|c| c.id());
        let removed = match chosen.and_then(|id| genome.remove_connection(id)) {
            Some(conn) => conn,
            None => return Ok(false),
        };
        for endpoint in [removed.source(), removed.target()] {
            let orphaned = genome
                .node(endpoint)
                .map_or(false, |n| n.neuron_type() == NeuronType::Hidden)
                && genome.incoming(endpoint).next().is_none()
                && genome.outgoing(endpoint).next().is_none();
            if orphaned {
                genome.remove_node(endpoint);
            }
        }
        trace!("genome {}: deleted connection {}", genome.id(), removed.id());
        Ok(true)
    }
}

impl Mutator for Pruning {
    fn mutate(&self, genome: &mut Genome) -> Result<(), GenomicsError> {
        let mut rng = thread_rng();
        if rng.gen::<f64>() < self.config.del_node_probability {
            self.delete_node(genome)?;
        } else if rng.gen::<f64>() < self.config.del_conn_probability {
            self.delete_connection(genome)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::tests::{build, seed};

    fn pruning() -> Pruning {
        Pruning::new(PruningConfig::zero())
    }

    #[test]
    fn delete_node_without_hidden() {
        let mut genome = seed(0);
        assert!(!pruning().delete_node(&mut genome).unwrap());
        assert_eq!(genome, seed(0));
    }

    #[test]
    fn delete_dead_end_node() {
        let mut genome = build(
            0,
            &[
                (0, NeuronType::Input, 0.0, 0.0),
                (1, NeuronType::Input, 1.0, 0.0),
                (2, NeuronType::Hidden, 0.5, 0.5),
                (3, NeuronType::Output, 0.5, 1.0),
            ],
            &[(4, 0, 2, 1.0), (5, 1, 2, 1.0), (6, 0, 3, 1.0)],
        );
        assert!(pruning().delete_node(&mut genome).unwrap());
        assert!(!genome.contains_node(2));
        assert_eq!(
            genome.connections().iter().map(|c| c.id()).collect::<Vec<_>>(),
            vec![6]
        );
        assert!(genome.validate().is_ok());
    }

    #[test]
    fn delete_node_splices_connections() {
        // 0 -> 2 -> {3, 4}
        let mut genome = build(
            0,
            &[
                (0, NeuronType::Input, 0.5, 0.0),
                (2, NeuronType::Hidden, 0.5, 0.5),
                (3, NeuronType::Output, 0.0, 1.0),
                (4, NeuronType::Output, 1.0, 1.0),
            ],
            &[(5, 0, 2, 1.0), (6, 2, 3, 0.5), (7, 2, 4, -0.5)],
        );
        assert!(pruning().delete_node(&mut genome).unwrap());
        assert!(!genome.contains_node(2));
        assert_eq!(genome.connections().len(), 3);
        assert_eq!(genome.connection(6).unwrap().endpoints(), (0, 3));
        assert_eq!(genome.connection(7).unwrap().endpoints(), (0, 4));
        assert_eq!(genome.connection(5).unwrap().source(), 0);
        assert!(genome.validate().is_ok());
    }

    #[test]
    fn delete_node_skips_fan_in_fan_out() {
        let mut genome = build(
            0,
            &[
                (0, NeuronType::Input, 0.0, 0.0),
                (1, NeuronType::Input, 1.0, 0.0),
                (2, NeuronType::Hidden, 0.5, 0.5),
                (3, NeuronType::Output, 0.0, 1.0),
                (4, NeuronType::Output, 1.0, 1.0),
            ],
            &[(5, 0, 2, 1.0), (6, 1, 2, 1.0), (7, 2, 3, 1.0), (8, 2, 4, 1.0)],
        );
        assert!(!pruning().delete_node(&mut genome).unwrap());
        assert!(genome.contains_node(2));
    }

    #[test]
    fn delete_connection_removes_orphans() {
        let mut genome = build(
            0,
            &[
                (0, NeuronType::Input, 0.5, 0.0),
                (2, NeuronType::Hidden, 0.5, 0.5),
                (3, NeuronType::Output, 0.5, 1.0),
            ],
            &[(5, 0, 2, 1.0)],
        );
        assert!(pruning().delete_connection(&mut genome).unwrap());
        assert!(genome.connections().is_empty());
        assert!(!genome.contains_node(2));
        // Input and output nodes are never removed.
        assert!(genome.contains_node(0));
        assert!(genome.contains_node(3));
    }

    #[test]
    fn delete_connection_empty_genome() {
        let mut genome = Genome::new(0);
        assert!(!pruning().delete_connection(&mut genome).unwrap());
    }
}

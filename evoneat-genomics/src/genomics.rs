//! Genomes are the focus of evolution in NEAT.
//! They are a collection of node and connection genes, plus a vector
//! of trait values, that can be decoded into a phenome (a neural network).
//! Genomes are progressively mutated, thus adding complexity and functionality.

mod connections;
mod errors;
mod history;
mod nodes;
mod traits;

pub use connections::Connection;
pub use errors::GenomicsError;
pub use history::{History, IdSequence};
pub use nodes::{ActivationType, NeuronType, Node, Position};
pub use traits::{Trait, TraitSchema};

use crate::{GenomeId, Innovation};

use serde::{Deserialize, Serialize};

use std::cmp::Ordering;
use std::fmt;

/// A candidate network encoded as node and connection genes.
///
/// Genes are stored in insertion order in dense vectors; views ordered
/// by innovation number or by position are built on demand. Cloning a
/// genome produces a deep copy sharing no state with the original,
/// which is how parents are preserved while offspring are mutated.
///
/// Supports Serde for convenient genome saving and loading.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Genome {
    id: GenomeId,
    species_idx: usize,
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    traits: Vec<f64>,
    fitness: f64,
    improvement: f64,
    birth: usize,
}

impl Genome {
    /// Creates an empty genome with the given id.
    ///
    /// # Examples
    /// ```
    /// use evoneat_genomics::genomics::Genome;
    ///
    /// let genome = Genome::new(7);
    /// assert_eq!(genome.id(), 7);
    /// assert_eq!(genome.complexity(), 0);
    /// ```
    pub fn new(id: GenomeId) -> Genome {
        Genome {
            id,
            species_idx: 0,
            nodes: vec![],
            connections: vec![],
            traits: vec![],
            fitness: 0.0,
            improvement: 0.0,
            birth: 0,
        }
    }

    /// Returns the genome's id.
    pub fn id(&self) -> GenomeId {
        self.id
    }

    /// Sets the genome's id.
    pub fn set_id(&mut self, id: GenomeId) {
        self.id = id;
    }

    /// Returns the index of the genome's species within its population.
    pub fn species_idx(&self) -> usize {
        self.species_idx
    }

    /// Sets the index of the genome's species.
    pub fn set_species_idx(&mut self, idx: usize) {
        self.species_idx = idx;
    }

    /// Returns the genome's raw fitness.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Sets the genome's raw fitness.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Returns the genome's improvement, the score used for
    /// fitness sharing. Under plain fitness-driven search it
    /// equals the fitness; novelty search replaces it with a
    /// behavioral novelty score.
    pub fn improvement(&self) -> f64 {
        self.improvement
    }

    /// Sets the genome's improvement.
    pub fn set_improvement(&mut self, improvement: f64) {
        self.improvement = improvement;
    }

    /// Returns the generation in which the genome was created.
    pub fn birth(&self) -> usize {
        self.birth
    }

    /// Sets the genome's birth generation.
    pub fn set_birth(&mut self, birth: usize) {
        self.birth = birth;
    }

    /// Returns the genome's trait values, parallel to the trait schema.
    pub fn traits(&self) -> &[f64] {
        &self.traits
    }

    /// Returns the genome's trait values mutably.
    pub fn traits_mut(&mut self) -> &mut [f64] {
        &mut self.traits
    }

    /// Replaces the genome's trait values.
    pub fn set_traits(&mut self, traits: Vec<f64>) {
        self.traits = traits;
    }

    /// Returns the genome's nodes, in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the genome's connections, in insertion order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Returns the genome's connections mutably. Endpoints cannot
    /// be changed through this view, only weights and enabled flags.
    pub fn connections_mut(&mut self) -> &mut [Connection] {
        &mut self.connections
    }

    /// Returns an iterator over the expressed connections.
    pub fn enabled_connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(|c| c.enabled())
    }

    /// Returns the node with innovation number `id`, if present.
    pub fn node(&self, id: Innovation) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    /// Returns whether a node with innovation number `id` is present.
    pub fn contains_node(&self, id: Innovation) -> bool {
        self.node(id).is_some()
    }

    /// Returns the connection with innovation number `id`, if present.
    pub fn connection(&self, id: Innovation) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id() == id)
    }

    /// Returns the connection from `source` to `target`, if present.
    pub fn connection_between(&self, source: Innovation, target: Innovation) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|c| c.source() == source && c.target() == target)
    }

    /// Returns an iterator over the connections leaving node `id`.
    pub fn outgoing(&self, id: Innovation) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.source() == id)
    }

    /// Returns an iterator over the connections entering node `id`.
    pub fn incoming(&self, id: Innovation) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.target() == id)
    }

    /// Adds a node to the genome.
    ///
    /// # Errors
    /// Returns an error if a node with the same innovation
    /// number is already present.
    ///
    /// # Examples
    /// ```
    /// use evoneat_genomics::genomics::{ActivationType, Genome, Node, NeuronType, Position};
    ///
    /// let mut genome = Genome::new(0);
    /// let node = Node::new(3, NeuronType::Input, ActivationType::Direct, Position::new(0.5, 0.0));
    ///
    /// assert!(genome.add_node(node.clone()).is_ok());
    /// assert!(genome.add_node(node).is_err());
    /// ```
    pub fn add_node(&mut self, node: Node) -> Result<(), GenomicsError> {
        if self.contains_node(node.id()) {
            return Err(GenomicsError::DuplicateNode(node.id()));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Adds a connection to the genome.
    ///
    /// # Errors
    /// Returns an error if a connection with the same innovation
    /// number is already present, or if either endpoint is not a
    /// node of the genome.
    ///
    /// # Examples
    /// ```
    /// use evoneat_genomics::genomics::{ActivationType, Connection, Genome, Node, NeuronType, Position};
    ///
    /// let mut genome = Genome::new(0);
    /// genome.add_node(Node::new(0, NeuronType::Input, ActivationType::Direct, Position::new(0.5, 0.0))).unwrap();
    /// genome.add_node(Node::new(1, NeuronType::Output, ActivationType::Sigmoid, Position::new(0.5, 1.0))).unwrap();
    ///
    /// assert!(genome.add_connection(Connection::new(2, 0, 1, 1.0)).is_ok());
    /// assert!(genome.add_connection(Connection::new(2, 1, 0, 1.0)).is_err());
    /// assert!(genome.add_connection(Connection::new(3, 0, 9, 1.0)).is_err());
    /// ```
    pub fn add_connection(&mut self, conn: Connection) -> Result<(), GenomicsError> {
        if self.connection(conn.id()).is_some() {
            return Err(GenomicsError::DuplicateConnection(conn.id()));
        }
        if !self.contains_node(conn.source()) || !self.contains_node(conn.target()) {
            return Err(GenomicsError::NonexistentEndpoints {
                id: conn.id(),
                input: conn.source(),
                output: conn.target(),
            });
        }
        self.connections.push(conn);
        Ok(())
    }

    /// Appends a connection without validating its endpoints.
    /// Used by crossover, which reconciles nodes afterwards.
    pub(crate) fn push_connection(&mut self, conn: Connection) {
        self.connections.push(conn);
    }

    /// Removes and returns the node with innovation number `id`.
    /// Connections attached to it are left untouched.
    pub(crate) fn remove_node(&mut self, id: Innovation) -> Option<Node> {
        let idx = self.nodes.iter().position(|n| n.id() == id)?;
        Some(self.nodes.remove(idx))
    }

    /// Removes and returns the connection with innovation number `id`.
    pub(crate) fn remove_connection(&mut self, id: Innovation) -> Option<Connection> {
        let idx = self.connections.iter().position(|c| c.id() == id)?;
        Some(self.connections.remove(idx))
    }

    pub(crate) fn connection_mut(&mut self, id: Innovation) -> Option<&mut Connection> {
        self.connections.iter_mut().find(|c| c.id() == id)
    }

    /// Returns nodes and connections, each sorted ascending
    /// by innovation number. This is the order used for
    /// gene alignment during comparison and crossover.
    ///
    /// # Examples
    /// ```
    /// use evoneat_genomics::genomics::{ActivationType, Connection, Genome, Node, NeuronType, Position};
    ///
    /// let mut genome = Genome::new(0);
    /// genome.add_node(Node::new(5, NeuronType::Output, ActivationType::Sigmoid, Position::new(0.5, 1.0))).unwrap();
    /// genome.add_node(Node::new(1, NeuronType::Input, ActivationType::Direct, Position::new(0.5, 0.0))).unwrap();
    /// genome.add_connection(Connection::new(9, 5, 1, 1.0)).unwrap();
    /// genome.add_connection(Connection::new(6, 1, 5, 1.0)).unwrap();
    ///
    /// let (nodes, conns) = genome.genes_by_innovation();
    /// assert_eq!(nodes.iter().map(|n| n.id()).collect::<Vec<_>>(), vec![1, 5]);
    /// assert_eq!(conns.iter().map(|c| c.id()).collect::<Vec<_>>(), vec![6, 9]);
    /// ```
    pub fn genes_by_innovation(&self) -> (Vec<&Node>, Vec<&Connection>) {
        let mut nodes: Vec<&Node> = self.nodes.iter().collect();
        let mut conns: Vec<&Connection> = self.connections.iter().collect();
        nodes.sort_unstable_by_key(|n| n.id());
        conns.sort_unstable_by_key(|c| c.id());
        (nodes, conns)
    }

    /// Returns the connections sorted ascending by innovation number.
    pub fn connections_by_innovation(&self) -> Vec<&Connection> {
        let mut conns: Vec<&Connection> = self.connections.iter().collect();
        conns.sort_unstable_by_key(|c| c.id());
        conns
    }

    /// Returns nodes sorted by position (`y`, then `x`) and connections
    /// sorted by their target's position, then their source's position.
    /// Decoders use this order to lay out feed-forward networks.
    pub fn genes_by_position(&self) -> (Vec<&Node>, Vec<&Connection>) {
        let mut nodes: Vec<&Node> = self.nodes.iter().collect();
        nodes.sort_by(|a, b| compare_positions(&a.position(), &b.position()));

        let position_of = |id: Innovation| self.node(id).map(Node::position);
        let mut conns: Vec<&Connection> = self.connections.iter().collect();
        conns.sort_by(|a, b| {
            compare_optional_positions(position_of(a.target()), position_of(b.target()))
                .then_with(|| {
                    compare_optional_positions(position_of(a.source()), position_of(b.source()))
                })
                .then_with(|| a.id().cmp(&b.id()))
        });
        (nodes, conns)
    }

    /// Returns the number of nodes plus the number of connections.
    pub fn complexity(&self) -> usize {
        self.nodes.len() + self.connections.len()
    }

    /// Checks that every connection references nodes of the genome.
    ///
    /// # Errors
    /// Returns the first dangling connection found.
    pub fn validate(&self) -> Result<(), GenomicsError> {
        match self
            .connections
            .iter()
            .find(|c| !self.contains_node(c.source()) || !self.contains_node(c.target()))
        {
            Some(c) => Err(GenomicsError::NonexistentEndpoints {
                id: c.id(),
                input: c.source(),
                output: c.target(),
            }),
            None => Ok(()),
        }
    }

    /// Checks that the genome carries one trait value per schema entry.
    pub fn validate_traits(&self, schema: &TraitSchema) -> Result<(), GenomicsError> {
        if self.traits.len() != schema.len() {
            return Err(GenomicsError::TraitCountMismatch {
                expected: schema.len(),
                found: self.traits.len(),
            });
        }
        Ok(())
    }
}

fn compare_positions(a: &Position, b: &Position) -> Ordering {
    a.y.total_cmp(&b.y).then_with(|| a.x.total_cmp(&b.x))
}

fn compare_optional_positions(a: Option<Position>, b: Option<Position>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => compare_positions(&a, &b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (nodes, conns) = self.genes_by_innovation();
        f.debug_struct("Genome")
            .field("ID", &self.id)
            .field("Species", &self.species_idx)
            .field("Nodes", &nodes)
            .field("Connections", &conns)
            .field("Traits", &self.traits)
            .field("Fitness", &self.fitness)
            .field("Improvement", &self.improvement)
            .field("Birth", &self.birth)
            .finish()
    }
}

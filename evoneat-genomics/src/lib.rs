//! # EvoNEAT genomics
//! Genome representation, historical marking and genetic operators
//! for the [`evoneat`](https://crates.io/crates/evoneat) engine.
//!
//! A [`Genome`] holds [`Node`] and [`Connection`] genes, each identified by
//! an innovation number handed out by a shared [`History`]. Identical
//! structural mutations arising independently in different genomes are
//! given the same innovation number, which is what lets the [`Comparer`]
//! and the [`Crosser`] align genes meaningfully.
//!
//! [`Genome`]: crate::genomics::Genome
//! [`Node`]: crate::genomics::Node
//! [`Connection`]: crate::genomics::Connection
//! [`History`]: crate::genomics::History
//! [`Comparer`]: crate::operators::Comparer
//! [`Crosser`]: crate::operators::Crosser
//!
//! # Example usage: splitting a connection
//! ```
//! use evoneat_genomics::genomics::{
//!     ActivationType, Connection, Genome, History, IdSequence, Node, NeuronType, Position,
//! };
//! use evoneat_genomics::operators::{Complexify, ComplexifyConfig, Mutator};
//! use std::sync::Arc;
//!
//! let history = Arc::new(History::new(Arc::new(IdSequence::new())));
//!
//! let input = Position::new(0.5, 0.0);
//! let output = Position::new(0.5, 1.0);
//! let mut genome = Genome::new(history.next_id());
//! let i = history.mark_node(input);
//! let o = history.mark_node(output);
//! genome.add_node(Node::new(i, NeuronType::Input, ActivationType::Direct, input)).unwrap();
//! genome.add_node(Node::new(o, NeuronType::Output, ActivationType::Sigmoid, output)).unwrap();
//! genome
//!     .add_connection(Connection::new(history.mark_connection(i, o), i, o, 0.5))
//!     .unwrap();
//!
//! let complexify = Complexify::new(
//!     ComplexifyConfig {
//!         add_node_probability: 1.0,
//!         ..ComplexifyConfig::zero()
//!     },
//!     history.clone(),
//! );
//! complexify.mutate(&mut genome).unwrap();
//!
//! assert_eq!(genome.nodes().len(), 3);
//! assert_eq!(genome.connections().len(), 3);
//! assert_eq!(genome.enabled_connections().count(), 2);
//! ```

pub mod genomics;
pub mod operators;

/// Historical marker of a structural feature.
pub type Innovation = usize;

/// Identifier of a genome within a run.
pub type GenomeId = usize;

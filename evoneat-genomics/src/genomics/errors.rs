use crate::Innovation;

use thiserror::Error;

/// Structural errors raised while building or recombining genomes.
///
/// Outside of explicit genome construction these indicate a
/// bug in a genetic operator rather than a recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenomicsError {
    /// A node with the same innovation number is already present.
    #[error("duplicate node insertion with id {0}")]
    DuplicateNode(Innovation),
    /// A connection with the same innovation number is already present.
    #[error("duplicate connection insertion with id {0}")]
    DuplicateConnection(Innovation),
    /// A connection references nodes absent from the genome.
    #[error("connection {id} between nonexistent endpoint(s) {input} -> {output}")]
    NonexistentEndpoints {
        id: Innovation,
        input: Innovation,
        output: Innovation,
    },
    /// A crossover child references a node found in neither parent.
    #[error("node {0} referenced by offspring is missing from both parents")]
    MissingNode(Innovation),
    /// The genome's trait vector does not match the trait schema.
    #[error("genome carries {found} trait values but the schema defines {expected}")]
    TraitCountMismatch { expected: usize, found: usize },
}

use crate::genomics::GenomicsError;
use crate::GenomeId;

use thiserror::Error;

/// Errors that abort a generational step. Population
/// integrity can no longer be guaranteed after one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvolutionError {
    /// A genetic operator broke a structural invariant.
    #[error("genetic operator failed: {0}")]
    Genomics(#[from] GenomicsError),
    /// A genome refers to a species the population does not have.
    #[error("genome {0} refers to nonexistent species {1}")]
    UnknownSpecies(GenomeId, usize),
    /// No species survived to produce offspring.
    #[error("no species left to reproduce")]
    NoSpecies,
}

use crate::operators::ConfigError;
use crate::populations::EvolutionError;
use crate::GenomeId;

use thiserror::Error;

/// The error type returned by collaborators of an experiment.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failure confined to a single genome. It does not stop the rest
/// of the generation from being decoded and evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenomeError {
    /// The genome could not be turned into a phenome.
    #[error("unable to decode genome {id}: {reason}")]
    Decode { id: GenomeId, reason: String },
    /// The evaluator reported an error for the genome's phenome.
    #[error("error evaluating genome {id}: {reason}")]
    Evaluate { id: GenomeId, reason: String },
}

impl GenomeError {
    /// Returns the id of the genome that failed.
    pub fn id(&self) -> GenomeId {
        match self {
            GenomeError::Decode { id, .. } | GenomeError::Evaluate { id, .. } => *id,
        }
    }
}

/// Errors ending an experiment run.
#[derive(Debug, Error)]
pub enum ExperimentError {
    /// The configuration was rejected before the first generation.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The generator or one of its operators failed.
    #[error("could not advance the population: {0}")]
    Evolution(#[from] EvolutionError),
    /// The searcher failed as a whole.
    #[error("error searching the population: {0}")]
    Search(BoxError),
    /// The archiver failed.
    #[error("could not archive the experiment: {0}")]
    Archive(BoxError),
    /// The restorer failed, or returned state that could not be used.
    #[error("could not restore the experiment: {0}")]
    Restore(BoxError),
    /// The visualizer failed.
    #[error("could not visualize the population: {0}")]
    Visualize(BoxError),
    /// Some genomes of the generation failed. The generation was
    /// otherwise completed.
    #[error("{} genome(s) failed: {}", .0.len(), join(.0))]
    Genomes(Vec<GenomeError>),
}

fn join(errors: &[GenomeError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

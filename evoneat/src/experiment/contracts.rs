use super::{BoxError, ExperimentState};
use crate::genomics::Genome;
use crate::operators::ConfigError;
use crate::populations::Population;
use crate::GenomeId;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// The decoded, runnable form of a genome.
pub trait Phenome: Send + Sync {
    /// Returns the id of the genome this phenome was decoded from.
    fn id(&self) -> GenomeId;

    /// Returns the genome's trait values.
    fn traits(&self) -> &[f64];

    /// Feeds `inputs` through the network and returns its outputs.
    fn activate(&self, inputs: &[f64]) -> Result<Vec<f64>, BoxError>;
}

/// Turns genomes into phenomes.
pub trait Decoder: Send + Sync {
    /// Decodes `genome`.
    fn decode(&self, genome: &Genome) -> Result<Arc<dyn Phenome>, BoxError>;
}

/// The outcome of evaluating one phenome.
///
/// # Examples
/// ```
/// use evoneat::experiment::Evaluation;
///
/// let evaluation = Evaluation::new(4, 0.75);
/// assert_eq!(evaluation.improvement(), 0.75);
///
/// let evaluation = Evaluation::new(4, 0.75).with_improvement(3.0).stopping();
/// assert_eq!(evaluation.improvement(), 3.0);
/// assert!(evaluation.stop);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Id of the evaluated genome.
    pub id: GenomeId,
    /// Raw fitness.
    pub fitness: f64,
    /// Error met while evaluating, if any.
    pub error: Option<String>,
    /// Whether the experiment's goal has been reached.
    pub stop: bool,
    /// Behaviour characterization, for novelty search.
    pub behavior: Option<Vec<f64>>,
    /// Reproductive value, if distinct from fitness.
    pub improvement: Option<f64>,
}

impl Evaluation {
    /// Creates a successful evaluation.
    pub fn new(id: GenomeId, fitness: f64) -> Evaluation {
        Evaluation {
            id,
            fitness,
            error: None,
            stop: false,
            behavior: None,
            improvement: None,
        }
    }

    /// Creates an evaluation that failed with `error`.
    pub fn failed(id: GenomeId, error: impl fmt::Display) -> Evaluation {
        Evaluation {
            error: Some(error.to_string()),
            ..Evaluation::new(id, 0.0)
        }
    }

    /// Sets the behaviour characterization.
    pub fn with_behavior(mut self, behavior: Vec<f64>) -> Evaluation {
        self.behavior = Some(behavior);
        self
    }

    /// Sets an improvement distinct from fitness.
    pub fn with_improvement(mut self, improvement: f64) -> Evaluation {
        self.improvement = Some(improvement);
        self
    }

    /// Flags the experiment's goal as reached.
    pub fn stopping(mut self) -> Evaluation {
        self.stop = true;
        self
    }

    /// Returns the improvement, falling back to fitness.
    pub fn improvement(&self) -> f64 {
        self.improvement.unwrap_or(self.fitness)
    }
}

/// The problem-specific fitness function.
///
/// [`evaluate`] may be called concurrently. The hooks are called
/// sequentially, once per generation, around the search.
///
/// [`evaluate`]: Evaluator::evaluate
pub trait Evaluator: Send + Sync {
    /// Evaluates one phenome.
    fn evaluate(&self, phenome: &dyn Phenome) -> Evaluation;

    /// Called before the search of each generation.
    fn setup(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called after the search of each generation.
    fn takedown(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Receives every phenome of the generation before setup.
    fn set_phenomes(&mut self, _phenomes: &[Arc<dyn Phenome>]) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Strategy for evaluating a whole generation.
///
/// Searchers usually wrap an [`Evaluator`], and forward the hooks
/// to it.
pub trait Searcher: Send {
    /// Evaluates `phenomes`, returning one evaluation per phenome.
    fn search(&mut self, phenomes: &[Arc<dyn Phenome>]) -> Result<Vec<Evaluation>, BoxError>;

    /// Called before the search of each generation.
    fn setup(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called after the search of each generation.
    fn takedown(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Receives every phenome of the generation before setup.
    fn set_phenomes(&mut self, _phenomes: &[Arc<dyn Phenome>]) -> Result<(), BoxError> {
        Ok(())
    }

    /// Checks the searcher's configuration, reporting
    /// every problem found.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Stores any state that must survive a restore.
    fn save_state(&self, _components: &mut BTreeMap<String, Value>) {}

    /// Loads state saved by [`save_state`].
    ///
    /// [`save_state`]: Searcher::save_state
    fn load_state(&mut self, _components: &BTreeMap<String, Value>) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Persists experiment state.
pub trait Archiver: Send + Sync {
    fn archive(&self, state: &ExperimentState) -> Result<(), BoxError>;
}

/// Loads experiment state persisted by an [`Archiver`].
pub trait Restorer {
    fn restore(&self, state: &mut ExperimentState) -> Result<(), BoxError>;
}

/// Reports on a population, once per generation and
/// once at the end of a run.
pub trait Visualizer: Send + Sync {
    fn visualize(&self, population: &Population) -> Result<(), BoxError>;
}

/// An archiver that keeps nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullArchiver;

impl Archiver for NullArchiver {
    fn archive(&self, _state: &ExperimentState) -> Result<(), BoxError> {
        Ok(())
    }
}

/// A visualizer that shows nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullVisualizer;

impl Visualizer for NullVisualizer {
    fn visualize(&self, _population: &Population) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<A: Archiver + ?Sized> Archiver for Arc<A> {
    fn archive(&self, state: &ExperimentState) -> Result<(), BoxError> {
        (**self).archive(state)
    }
}

impl<V: Visualizer + ?Sized> Visualizer for Arc<V> {
    fn visualize(&self, population: &Population) -> Result<(), BoxError> {
        (**self).visualize(population)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(&self, phenome: &dyn Phenome) -> Evaluation {
        (**self).evaluate(phenome)
    }

    fn setup(&mut self) -> Result<(), BoxError> {
        (**self).setup()
    }

    fn takedown(&mut self) -> Result<(), BoxError> {
        (**self).takedown()
    }

    fn set_phenomes(&mut self, phenomes: &[Arc<dyn Phenome>]) -> Result<(), BoxError> {
        (**self).set_phenomes(phenomes)
    }
}

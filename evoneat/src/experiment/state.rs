use crate::genomics::Genome;
use crate::populations::Population;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::collections::BTreeMap;

/// Everything needed to resume an experiment.
///
/// This is what archivers persist and restorers load. Component
/// state, such as a novelty archive, is kept as JSON values keyed
/// by component name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentState {
    /// Number of completed iterations.
    pub iteration: usize,
    /// The current population.
    pub population: Population,
    /// Best genome according to the experiment's fitness type.
    pub best: Option<Genome>,
    /// Values of the best genome's setting traits, by trait name.
    pub settings: BTreeMap<String, f64>,
    /// Whether an evaluation reached the experiment's goal.
    pub stopped: bool,
    /// Component-local state.
    pub components: BTreeMap<String, Value>,
}

use super::{Complexify, Pruning, TraitMutator, WeightMutator};
use crate::genomics::{Genome, GenomicsError};
use crate::operators::{ConfigError, ConfigIssues, FitnessType, Mutator, PhasedConfig};

use log::debug;
use serde::{Deserialize, Serialize};

/// The structural regime a [`Phased`] mutator is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Nodes and connections may be added.
    Complexifying,
    /// Nodes and connections may be deleted, and crossover is disabled.
    Pruning,
}

/// Phased search: alternates between a complexifying phase and a
/// pruning phase based on the mean population complexity (MPC).
///
/// The search starts complexifying, with a pruning threshold set at
/// the first observed MPC plus [`pruning_phase_threshold`]. Pruning
/// begins once the MPC reaches the threshold and improvement has
/// stalled for more than [`max_improvement_age`] generations. Pruning
/// ends once the MPC has not dropped for more than [`max_mpc_age`]
/// generations, and the threshold is reset relative to the new MPC.
///
/// Whenever a structural mutation leaves the topology unchanged,
/// weights and traits are mutated instead.
///
/// [`pruning_phase_threshold`]: PhasedConfig::pruning_phase_threshold
/// [`max_improvement_age`]: PhasedConfig::max_improvement_age
/// [`max_mpc_age`]: PhasedConfig::max_mpc_age
#[derive(Clone, Debug)]
pub struct Phased {
    config: PhasedConfig,
    complexify: Complexify,
    pruning: Pruning,
    weight: WeightMutator,
    traits: TraitMutator,
    phase: Phase,
    target_mpc: Option<f64>,
    min_mpc: f64,
    mpc_age: usize,
    last_improvement: f64,
    improvement_age: usize,
}

impl Phased {
    /// Composes a phased mutator.
    pub fn new(
        config: PhasedConfig,
        complexify: Complexify,
        pruning: Pruning,
        weight: WeightMutator,
        traits: TraitMutator,
    ) -> Phased {
        Phased {
            config,
            complexify,
            pruning,
            weight,
            traits,
            phase: Phase::Complexifying,
            target_mpc: None,
            min_mpc: 0.0,
            mpc_age: 0,
            last_improvement: 0.0,
            improvement_age: 0,
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the MPC at which pruning may begin, once known.
    pub fn target_mpc(&self) -> Option<f64> {
        self.target_mpc
    }

    fn improvement_signal(&self, genomes: &[Genome]) -> f64 {
        let improvements = genomes.iter().map(Genome::improvement);
        match self.config.improvement_type {
            FitnessType::Absolute => improvements.fold(f64::MIN, f64::max),
            FitnessType::Relative => {
                let n = genomes.len() as f64;
                let mean = improvements.clone().sum::<f64>() / n;
                improvements.map(|i| (i - mean).powi(2)).sum::<f64>() / n
            }
        }
    }
}

impl Mutator for Phased {
    fn mutate(&self, genome: &mut Genome) -> Result<(), GenomicsError> {
        let complexity = genome.complexity();
        match self.phase {
            Phase::Complexifying => self.complexify.mutate(genome)?,
            Phase::Pruning => self.pruning.mutate(genome)?,
        }
        if genome.complexity() == complexity {
            self.weight.mutate(genome)?;
            self.traits.mutate(genome)?;
        }
        Ok(())
    }

    fn set_population(&mut self, genomes: &[Genome]) {
        if genomes.is_empty() {
            return;
        }
        let mpc =
            genomes.iter().map(|g| g.complexity() as f64).sum::<f64>() / genomes.len() as f64;
        if mpc < self.min_mpc {
            self.mpc_age = 0;
            self.min_mpc = mpc;
        } else {
            self.mpc_age += 1;
        }

        let improvement = self.improvement_signal(genomes);
        if improvement > self.last_improvement {
            self.improvement_age = 0;
            self.last_improvement = improvement;
        } else {
            self.improvement_age += 1;
        }

        let target = match self.target_mpc {
            Some(target) => target,
            None => {
                self.phase = Phase::Complexifying;
                self.target_mpc = Some(mpc + self.config.pruning_phase_threshold);
                return;
            }
        };
        match self.phase {
            Phase::Pruning if self.mpc_age > self.config.max_mpc_age => {
                self.phase = Phase::Complexifying;
                self.target_mpc = Some(mpc + self.config.pruning_phase_threshold);
                self.improvement_age = 0;
                self.last_improvement = 0.0;
                debug!("phased search: complexifying, mpc {:.2}", mpc);
            }
            Phase::Complexifying
                if mpc >= target && self.improvement_age > self.config.max_improvement_age =>
            {
                self.phase = Phase::Pruning;
                self.mpc_age = 0;
                self.min_mpc = mpc;
                debug!("phased search: pruning, mpc {:.2}", mpc);
            }
            _ => {}
        }
    }

    fn allows_crossover(&self) -> bool {
        self.phase == Phase::Complexifying
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        issues.merge(self.config.validate());
        issues.merge(self.complexify.validate());
        issues.merge(self.pruning.validate());
        issues.merge(self.weight.validate());
        issues.merge(self.traits.validate());
        issues.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::tests::seed;
    use crate::genomics::{
        ActivationType, History, IdSequence, NeuronType, Node, Position, TraitSchema,
    };
    use crate::operators::{ComplexifyConfig, PruningConfig, TraitConfig, WeightConfig};

    use std::sync::Arc;

    fn phased() -> Phased {
        let history = Arc::new(History::new(Arc::new(IdSequence::starting_at(100))));
        Phased::new(
            PhasedConfig {
                pruning_phase_threshold: 2.0,
                max_mpc_age: 2,
                max_improvement_age: 1,
                improvement_type: FitnessType::Absolute,
            },
            Complexify::new(
                ComplexifyConfig {
                    add_node_probability: 1.0,
                    ..ComplexifyConfig::zero()
                },
                history,
            ),
            Pruning::new(PruningConfig {
                del_conn_probability: 1.0,
                ..PruningConfig::zero()
            }),
            WeightMutator::new(WeightConfig::zero()),
            TraitMutator::new(TraitConfig::zero(), TraitSchema::default()),
        )
    }

    /// Two genomes with `extra` hidden nodes over the
    /// seed's 7 genes, and the given improvement.
    fn population(extra: usize, improvement: f64) -> Vec<Genome> {
        (0..2)
            .map(|id| {
                let mut genome = seed(id);
                for i in 0..extra {
                    genome
                        .add_node(Node::new(
                            50 + i,
                            NeuronType::Hidden,
                            ActivationType::Sigmoid,
                            Position::new(i as f64, 0.5),
                        ))
                        .unwrap();
                }
                genome.set_improvement(improvement);
                genome
            })
            .collect()
    }

    #[test]
    fn phase_cycle() {
        let mut m = phased();
        assert!(m.allows_crossover());

        // First observation sets the target at 7 + 2.
        m.set_population(&population(0, 1.0));
        assert_eq!(m.target_mpc(), Some(9.0));
        assert_eq!(m.phase(), Phase::Complexifying);

        // Complexity over target, but fitness still improving.
        m.set_population(&population(3, 2.0));
        assert_eq!(m.phase(), Phase::Complexifying);

        // Improvement stalls for two generations.
        m.set_population(&population(3, 2.0));
        assert_eq!(m.phase(), Phase::Complexifying);
        m.set_population(&population(3, 2.0));
        assert_eq!(m.phase(), Phase::Pruning);
        assert!(!m.allows_crossover());

        // MPC keeps dropping, pruning continues.
        m.set_population(&population(2, 2.0));
        m.set_population(&population(1, 2.0));
        assert_eq!(m.phase(), Phase::Pruning);

        // MPC floors out for more than two generations.
        m.set_population(&population(1, 2.0));
        m.set_population(&population(1, 2.0));
        assert_eq!(m.phase(), Phase::Pruning);
        m.set_population(&population(1, 2.0));
        assert_eq!(m.phase(), Phase::Complexifying);
        assert_eq!(m.target_mpc(), Some(10.0));
        assert!(m.allows_crossover());
    }

    #[test]
    fn mutation_follows_phase() {
        let mut m = phased();
        let mut genome = seed(0);
        m.mutate(&mut genome).unwrap();
        assert_eq!(genome.complexity(), 10);

        m.phase = Phase::Pruning;
        let mut genome = seed(0);
        m.mutate(&mut genome).unwrap();
        assert_eq!(genome.complexity(), 6);
    }

    #[test]
    fn relative_signal_is_variance() {
        let mut m = phased();
        m.config.improvement_type = FitnessType::Relative;
        let mut genomes = population(0, 0.0);
        genomes[0].set_improvement(1.0);
        genomes[1].set_improvement(3.0);
        assert_eq!(m.improvement_signal(&genomes), 1.0);
    }
}

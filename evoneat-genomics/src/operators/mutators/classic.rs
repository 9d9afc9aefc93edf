use super::{Complexify, TraitMutator, WeightMutator};
use crate::genomics::{Genome, GenomicsError};
use crate::operators::{ConfigError, ConfigIssues, Mutator};

/// The usual NEAT mutation policy: try to grow the topology first,
/// and only if it is left unchanged mutate weights and traits.
#[derive(Clone, Debug)]
pub struct ClassicMutator {
    complexify: Complexify,
    weight: WeightMutator,
    traits: TraitMutator,
}

impl ClassicMutator {
    /// Composes a classic mutator from its three policies.
    ///
    /// # Examples
    /// ```
    /// use evoneat_genomics::genomics::{History, IdSequence, TraitSchema};
    /// use evoneat_genomics::operators::{
    ///     ClassicMutator, Complexify, ComplexifyConfig, TraitConfig, TraitMutator, WeightConfig,
    ///     WeightMutator,
    /// };
    /// use std::sync::Arc;
    ///
    /// let history = Arc::new(History::new(Arc::new(IdSequence::new())));
    /// let mutator = ClassicMutator::new(
    ///     Complexify::new(ComplexifyConfig::zero(), history),
    ///     WeightMutator::new(WeightConfig::zero()),
    ///     TraitMutator::new(TraitConfig::zero(), TraitSchema::default()),
    /// );
    /// ```
    pub fn new(complexify: Complexify, weight: WeightMutator, traits: TraitMutator) -> ClassicMutator {
        ClassicMutator {
            complexify,
            weight,
            traits,
        }
    }
}

impl Mutator for ClassicMutator {
    fn mutate(&self, genome: &mut Genome) -> Result<(), GenomicsError> {
        let complexity = genome.complexity();
        self.complexify.mutate(genome)?;
        if genome.complexity() == complexity {
            self.weight.mutate(genome)?;
            self.traits.mutate(genome)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = ConfigIssues::new();
        issues.merge(self.complexify.validate());
        issues.merge(self.weight.validate());
        issues.merge(self.traits.validate());
        issues.finish()
    }
}

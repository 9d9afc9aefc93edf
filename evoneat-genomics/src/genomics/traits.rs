use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

/// An evolvable scalar parameter carried by every genome.
///
/// Plain traits are only exposed to the evaluator through
/// the phenome. Traits flagged as settings additionally feed
/// back into the experiment's own configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trait {
    /// Name of the trait, unique within a schema.
    pub name: String,
    /// Lowest allowed value.
    pub min: f64,
    /// Highest allowed value.
    pub max: f64,
    /// Whether the trait is an experiment setting.
    pub is_setting: bool,
}

impl Trait {
    /// Returns a uniformly random value in `[min, max]`.
    pub fn random_value(&self) -> f64 {
        if self.max > self.min {
            thread_rng().gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    /// Clamps `value` into `[min, max]`.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

/// The ordered list of traits shared by all genomes of an experiment.
/// A genome's trait vector is parallel to the schema.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitSchema(pub Vec<Trait>);

impl TraitSchema {
    /// Returns the position of the trait named `name`, if any.
    ///
    /// # Examples
    /// ```
    /// use evoneat_genomics::genomics::{Trait, TraitSchema};
    ///
    /// let schema = TraitSchema(vec![
    ///     Trait { name: "rate".into(), min: 0.0, max: 1.0, is_setting: false },
    ///     Trait { name: "threshold".into(), min: 1.0, max: 3.0, is_setting: true },
    /// ]);
    /// assert_eq!(schema.index_of("threshold"), Some(1));
    /// assert_eq!(schema.index_of("missing"), None);
    /// ```
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|t| t.name == name)
    }

    /// Returns a fresh trait vector with every value drawn
    /// uniformly from its trait's range.
    pub fn random_values(&self) -> Vec<f64> {
        self.0.iter().map(Trait::random_value).collect()
    }

    /// Returns an iterator over the traits.
    pub fn iter(&self) -> impl Iterator<Item = &Trait> {
        self.0.iter()
    }

    /// Returns the number of traits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the schema holds no traits.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_values_within_range() {
        let schema = TraitSchema(vec![
            Trait {
                name: "a".into(),
                min: -1.0,
                max: 1.0,
                is_setting: false,
            },
            Trait {
                name: "b".into(),
                min: 2.0,
                max: 2.0,
                is_setting: true,
            },
        ]);
        for _ in 0..100 {
            let values = schema.random_values();
            assert_eq!(values.len(), 2);
            assert!((-1.0..=1.0).contains(&values[0]));
            assert_eq!(values[1], 2.0);
        }
    }

    #[test]
    fn clamp_into_range() {
        let t = Trait {
            name: "a".into(),
            min: 0.0,
            max: 1.0,
            is_setting: false,
        };
        assert_eq!(t.clamp(-3.0), 0.0);
        assert_eq!(t.clamp(3.0), 1.0);
        assert_eq!(t.clamp(0.25), 0.25);
    }
}

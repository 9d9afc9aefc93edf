use super::{Comparer, ComparerConfig, ConfigError};
use crate::genomics::Genome;

/// Compatibility distance as a linear combination of excess genes,
/// disjoint genes and the mean weight difference of matching genes.
///
/// Unlike the formula in the original NEAT paper, the excess and
/// disjoint terms are not normalized by genome size.
#[derive(Clone, Debug)]
pub struct ClassicComparer {
    config: ComparerConfig,
}

impl ClassicComparer {
    /// Creates a comparer with the given coefficients.
    pub fn new(config: ComparerConfig) -> ClassicComparer {
        ClassicComparer { config }
    }

    /// Returns the comparer's configuration.
    pub fn config(&self) -> &ComparerConfig {
        &self.config
    }
}

impl Comparer for ClassicComparer {
    /// # Examples
    /// ```
    /// use evoneat_genomics::genomics::Genome;
    /// use evoneat_genomics::operators::{ClassicComparer, Comparer, ComparerConfig};
    ///
    /// let comparer = ClassicComparer::new(ComparerConfig {
    ///     excess_coefficient: 1.0,
    ///     disjoint_coefficient: 1.0,
    ///     weight_coefficient: 0.4,
    /// });
    /// let genome = Genome::new(0);
    /// assert_eq!(comparer.compare(&genome, &genome), 0.0);
    /// ```
    fn compare(&self, a: &Genome, b: &Genome) -> f64 {
        let conns_a = a.connections_by_innovation();
        let conns_b = b.connections_by_innovation();

        let (mut excess, mut disjoint, mut matched) = (0usize, 0usize, 0usize);
        let mut weight_difference = 0.0;
        let (mut i, mut j) = (0, 0);
        while i < conns_a.len() || j < conns_b.len() {
            match (conns_a.get(i), conns_b.get(j)) {
                (None, Some(_)) => {
                    excess += 1;
                    j += 1;
                }
                (Some(_), None) => {
                    excess += 1;
                    i += 1;
                }
                (Some(ca), Some(cb)) if ca.id() < cb.id() => {
                    disjoint += 1;
                    i += 1;
                }
                (Some(ca), Some(cb)) if ca.id() > cb.id() => {
                    disjoint += 1;
                    j += 1;
                }
                (Some(ca), Some(cb)) => {
                    weight_difference += (ca.weight() - cb.weight()).abs();
                    matched += 1;
                    i += 1;
                    j += 1;
                }
                (None, None) => break,
            }
        }

        let mut distance = self.config.excess_coefficient * excess as f64
            + self.config.disjoint_coefficient * disjoint as f64;
        if matched > 0 {
            distance += self.config.weight_coefficient * weight_difference / matched as f64;
        }
        distance
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::tests::{build, seed};
    use crate::genomics::NeuronType;

    fn comparer() -> ClassicComparer {
        ClassicComparer::new(ComparerConfig {
            excess_coefficient: 1.0,
            disjoint_coefficient: 2.0,
            weight_coefficient: 0.5,
        })
    }

    fn nodes() -> Vec<(usize, NeuronType, f64, f64)> {
        vec![
            (0, NeuronType::Input, 0.0, 0.0),
            (1, NeuronType::Input, 1.0, 0.0),
            (2, NeuronType::Output, 0.5, 1.0),
        ]
    }

    #[test]
    fn genetic_distance_to_self() {
        let genome = seed(0);
        assert_eq!(comparer().compare(&genome, &genome), 0.0);
    }

    #[test]
    fn genetic_distance_counts_each_kind() {
        // a: 10 11 13 15 16
        // b: 10 12 13 14
        // matching 10, 13; disjoint 11, 12, 14; excess 15, 16.
        let a = build(
            0,
            &nodes(),
            &[
                (10, 0, 2, 1.0),
                (11, 1, 2, 1.0),
                (13, 0, 1, 1.0),
                (15, 1, 0, 1.0),
                (16, 2, 0, 1.0),
            ],
        );
        let b = build(
            1,
            &nodes(),
            &[
                (10, 0, 2, 0.0),
                (12, 1, 2, 1.0),
                (13, 0, 1, 2.0),
                (14, 2, 1, 1.0),
            ],
        );
        let expected = 1.0 * 2.0 + 2.0 * 3.0 + 0.5 * (1.0 + 1.0) / 2.0;
        assert_eq!(comparer().compare(&a, &b), expected);
    }

    #[test]
    fn genetic_distance_symmetric() {
        let a = build(
            0,
            &nodes(),
            &[(3, 0, 2, 0.25), (4, 1, 2, -1.0), (7, 0, 1, 3.0)],
        );
        let b = build(
            1,
            &nodes(),
            &[(3, 0, 2, 1.0), (5, 1, 2, 1.0), (6, 2, 0, 1.0), (8, 2, 1, 1.0)],
        );
        let comparer = comparer();
        assert_eq!(comparer.compare(&a, &b), comparer.compare(&b, &a));
        assert!(comparer.compare(&a, &b) > 0.0);
    }

    #[test]
    fn genetic_distance_no_shared_genes() {
        let a = build(0, &nodes(), &[(3, 0, 2, 1.0)]);
        let b = build(1, &nodes(), &[]);
        // Only an excess gene, and no weight term without matches.
        assert_eq!(comparer().compare(&a, &b), 1.0);
    }
}

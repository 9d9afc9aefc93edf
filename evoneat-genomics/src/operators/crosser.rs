use super::{ConfigError, Crosser, CrosserConfig};
use crate::genomics::{Connection, Genome, GenomicsError};

use rand::{thread_rng, Rng};

/// NEAT crossover.
///
/// Matching genes are lined up by innovation number and either
/// averaged or picked from a random parent. Disjoint and excess
/// genes come from the fitter parent, or from both parents if
/// they are equally fit.
#[derive(Clone, Debug)]
pub struct ClassicCrosser {
    config: CrosserConfig,
}

impl ClassicCrosser {
    /// Creates a crosser with the given configuration.
    pub fn new(config: CrosserConfig) -> ClassicCrosser {
        ClassicCrosser { config }
    }

    fn inherit_connections<R: Rng>(
        &self,
        rng: &mut R,
        same: bool,
        fitter: &Genome,
        other: &Genome,
        child: &mut Genome,
    ) {
        let conns1 = fitter.connections_by_innovation();
        let conns2 = other.connections_by_innovation();
        let (mut i, mut j) = (0, 0);
        while i < conns1.len() && j < conns2.len() {
            let (c1, c2) = (conns1[i], conns2[j]);
            if c1.id() < c2.id() {
                child.push_connection(c1.clone());
                i += 1;
            } else if c1.id() > c2.id() {
                if same {
                    child.push_connection(c2.clone());
                }
                j += 1;
            } else {
                let mut conn = if rng.gen::<f64>() < self.config.mate_by_averaging_probability {
                    let mut conn = c1.clone();
                    conn.set_weight((c1.weight() + c2.weight()) / 2.0);
                    conn
                } else if rng.gen::<bool>() {
                    c1.clone()
                } else {
                    c2.clone()
                };
                // Expression follows the fitter parent even when the
                // weaker parent's copy supplied the weight.
                conn.set_enabled(c1.enabled());
                child.push_connection(conn);
                i += 1;
                j += 1;
            }
        }
        for c1 in &conns1[i..] {
            child.push_connection((*c1).clone());
        }
        if same {
            for c2 in &conns2[j..] {
                child.push_connection((*c2).clone());
            }
        }
    }

    fn enable_connections<R: Rng>(&self, rng: &mut R, child: &mut Genome) {
        for conn in child.connections_mut() {
            if !conn.enabled() && rng.gen::<f64>() < self.config.enable_probability {
                conn.set_enabled(true);
            }
        }
    }

    fn ensure_nodes(
        &self,
        fitter: &Genome,
        other: &Genome,
        child: &mut Genome,
    ) -> Result<(), GenomicsError> {
        for node in fitter.nodes() {
            child.add_node(node.clone())?;
        }
        let endpoints: Vec<_> = child
            .connections()
            .iter()
            .flat_map(|c: &Connection| [c.source(), c.target()])
            .collect();
        for id in endpoints {
            if child.contains_node(id) {
                continue;
            }
            let node = other.node(id).ok_or(GenomicsError::MissingNode(id))?;
            child.add_node(node.clone())?;
        }
        Ok(())
    }

    fn blend_traits<R: Rng>(
        &self,
        rng: &mut R,
        same: bool,
        fitter: &Genome,
        other: &Genome,
        child: &mut Genome,
    ) {
        let traits = fitter
            .traits()
            .iter()
            .enumerate()
            .map(|(i, &t1)| match other.traits().get(i) {
                Some(&t2) if same => {
                    if rng.gen::<f64>() < self.config.mate_by_averaging_probability {
                        (t1 + t2) / 2.0
                    } else if rng.gen::<bool>() {
                        t1
                    } else {
                        t2
                    }
                }
                _ => t1,
            })
            .collect();
        child.set_traits(traits);
    }
}

impl Crosser for ClassicCrosser {
    fn cross(&self, a: &Genome, b: &Genome) -> Result<Genome, GenomicsError> {
        let mut rng = thread_rng();
        let same = a.fitness() == b.fitness();
        let (fitter, other) = if a.fitness() < b.fitness() {
            (b, a)
        } else {
            (a, b)
        };

        let mut child = Genome::new(0);
        self.inherit_connections(&mut rng, same, fitter, other, &mut child);
        self.enable_connections(&mut rng, &mut child);
        self.ensure_nodes(fitter, other, &mut child)?;
        self.blend_traits(&mut rng, same, fitter, other, &mut child);
        Ok(child)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::tests::build;
    use crate::genomics::NeuronType;

    fn nodes() -> Vec<(usize, NeuronType, f64, f64)> {
        vec![
            (0, NeuronType::Input, 0.0, 0.0),
            (1, NeuronType::Input, 1.0, 0.0),
            (2, NeuronType::Output, 0.5, 1.0),
        ]
    }

    fn ids(genome: &Genome) -> Vec<usize> {
        genome
            .connections_by_innovation()
            .iter()
            .map(|c| c.id())
            .collect()
    }

    #[test]
    fn fitter_parent_genes_only() {
        let mut fitter = build(0, &nodes(), &[(3, 0, 2, 1.0), (5, 1, 2, 1.0)]);
        let mut weaker = build(
            1,
            &[
                (0, NeuronType::Input, 0.0, 0.0),
                (1, NeuronType::Input, 1.0, 0.0),
                (2, NeuronType::Output, 0.5, 1.0),
                (9, NeuronType::Hidden, 0.75, 0.5),
            ],
            &[(4, 1, 9, 1.0), (6, 9, 2, 1.0), (8, 0, 1, 1.0)],
        );
        fitter.set_fitness(2.0);
        weaker.set_fitness(1.0);

        let crosser = ClassicCrosser::new(CrosserConfig::zero());
        for _ in 0..20 {
            for child in [
                crosser.cross(&fitter, &weaker).unwrap(),
                crosser.cross(&weaker, &fitter).unwrap(),
            ] {
                assert_eq!(ids(&child), vec![3, 5]);
                assert!(child.connections().iter().all(|c| fitter.connection(c.id()).is_some()));
                assert!(child.node(9).is_none());
                assert!(child.validate().is_ok());
            }
        }
    }

    #[test]
    fn equal_fitness_keeps_both_sides() {
        let a = build(0, &nodes(), &[(3, 0, 2, 1.0), (5, 1, 2, 1.0)]);
        let b = build(
            1,
            &[
                (0, NeuronType::Input, 0.0, 0.0),
                (1, NeuronType::Input, 1.0, 0.0),
                (2, NeuronType::Output, 0.5, 1.0),
                (9, NeuronType::Hidden, 0.75, 0.5),
            ],
            &[(3, 0, 2, 3.0), (4, 1, 9, 1.0), (6, 9, 2, 1.0)],
        );
        let child = ClassicCrosser::new(CrosserConfig::zero())
            .cross(&a, &b)
            .unwrap();
        assert_eq!(ids(&child), vec![3, 4, 5, 6]);
        // The hidden node is backfilled from the second parent.
        assert!(child.node(9).is_some());
        assert!(child.validate().is_ok());
    }

    #[test]
    fn combines_genes_average() {
        let mut a = build(0, &nodes(), &[(3, 0, 2, 1.0)]);
        let b = build(1, &nodes(), &[(3, 0, 2, 3.0)]);
        a.set_fitness(1.0);
        let crosser = ClassicCrosser::new(CrosserConfig {
            mate_by_averaging_probability: 1.0,
            ..CrosserConfig::zero()
        });
        let child = crosser.cross(&a, &b).unwrap();
        assert_eq!(child.connections()[0].weight(), 2.0);
    }

    #[test]
    fn fitter_enabled_flag_preserved() {
        let mut a = build(0, &nodes(), &[(3, 0, 2, 1.0)]);
        let b = build(1, &nodes(), &[(3, 0, 2, 3.0)]);
        a.connections_mut()[0].set_enabled(false);
        a.set_fitness(1.0);
        let crosser = ClassicCrosser::new(CrosserConfig::zero());
        for _ in 0..20 {
            assert!(!crosser.cross(&a, &b).unwrap().connections()[0].enabled());
        }
    }

    #[test]
    fn reenables_disabled_connections() {
        let mut a = build(0, &nodes(), &[(3, 0, 2, 1.0), (4, 1, 2, 1.0)]);
        a.connections_mut()[0].set_enabled(false);
        let crosser = ClassicCrosser::new(CrosserConfig {
            enable_probability: 1.0,
            ..CrosserConfig::zero()
        });
        let child = crosser.cross(&a, &a.clone()).unwrap();
        assert!(child.connections().iter().all(|c| c.enabled()));
    }

    #[test]
    fn traits_from_fitter_parent() {
        let mut a = build(0, &nodes(), &[]);
        let mut b = build(1, &nodes(), &[]);
        a.set_traits(vec![1.0, 2.0]);
        b.set_traits(vec![5.0, 6.0]);
        b.set_fitness(3.0);
        let crosser = ClassicCrosser::new(CrosserConfig {
            mate_by_averaging_probability: 1.0,
            ..CrosserConfig::zero()
        });
        assert_eq!(crosser.cross(&a, &b).unwrap().traits(), &[5.0, 6.0]);

        b.set_fitness(0.0);
        assert_eq!(crosser.cross(&a, &b).unwrap().traits(), &[3.0, 4.0]);
    }

    #[test]
    fn parents_unmodified() {
        let a = build(0, &nodes(), &[(3, 0, 2, 1.0)]);
        let b = build(1, &nodes(), &[(4, 1, 2, 1.0)]);
        let (a0, b0) = (a.clone(), b.clone());
        let _ = ClassicCrosser::new(CrosserConfig::zero()).cross(&a, &b).unwrap();
        assert_eq!(a, a0);
        assert_eq!(b, b0);
    }

    #[test]
    fn validation_checks_probabilities() {
        assert!(ClassicCrosser::new(CrosserConfig::zero()).validate().is_ok());
        let crosser = ClassicCrosser::new(CrosserConfig {
            enable_probability: 1.5,
            ..CrosserConfig::zero()
        });
        assert_eq!(crosser.validate().unwrap_err().issues.len(), 1);
    }
}

use crate::genomics::Genome;

use serde::{Deserialize, Serialize};

/// Species are collections of reproductively
/// compatible (within a certain compatibility
/// distance) genomes. Membership is determined by
/// comparing against an _example_ genome, which is
/// the genome that founded the species.
///
/// Species identity persists across generations: the
/// struct is carried forward into each new population,
/// growing older by one generation each time. A species
/// whose fitness-sharing score has not improved for too
/// long is considered stagnant and may be purged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    age: usize,
    stagnation: usize,
    improvement: f64,
    example: Genome,
}

impl Species {
    /// Creates a new species founded by `example`.
    ///
    /// # Examples
    /// ```
    /// use evoneat::genomics::Genome;
    /// use evoneat::populations::Species;
    ///
    /// let species = Species::new(Genome::new(3));
    /// assert_eq!(species.age(), 0);
    /// assert_eq!(species.example().id(), 3);
    /// ```
    pub fn new(example: Genome) -> Species {
        Species {
            age: 0,
            stagnation: 0,
            improvement: 0.0,
            example,
        }
    }

    /// Returns the number of generations the species has survived.
    pub fn age(&self) -> usize {
        self.age
    }

    /// Returns the number of generations since
    /// the species' score last improved.
    pub fn stagnation(&self) -> usize {
        self.stagnation
    }

    /// Returns the species' best recorded fitness-sharing score.
    pub fn improvement(&self) -> f64 {
        self.improvement
    }

    /// Returns the genome new genomes are compared against.
    pub fn example(&self) -> &Genome {
        &self.example
    }

    /// Ages the species by one generation.
    pub fn grow_older(&mut self) {
        self.age += 1;
    }

    /// Records the species' latest score. Returns `true` and resets
    /// stagnation if the score beats the best recorded one, otherwise
    /// increases stagnation and returns `false`.
    ///
    /// # Examples
    /// ```
    /// use evoneat::genomics::Genome;
    /// use evoneat::populations::Species;
    ///
    /// let mut species = Species::new(Genome::new(0));
    ///
    /// assert!(species.record_score(1.5));
    /// assert!(!species.record_score(1.5));
    /// assert_eq!(species.stagnation(), 1);
    /// assert!(species.record_score(2.0));
    /// assert_eq!(species.stagnation(), 0);
    /// assert_eq!(species.improvement(), 2.0);
    /// ```
    pub fn record_score(&mut self, score: f64) -> bool {
        if score > self.improvement {
            self.improvement = score;
            self.stagnation = 0;
            true
        } else {
            self.stagnation += 1;
            false
        }
    }

    /// Returns the offspring multiplier for the species' age:
    /// young species are boosted and old species penalized.
    pub(crate) fn age_multiplier(&self, young_age: usize, old_age: usize) -> f64 {
        if self.age < young_age {
            1.2
        } else if self.age > old_age {
            0.2
        } else {
            1.0
        }
    }
}

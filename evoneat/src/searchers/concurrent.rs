use crate::experiment::{BoxError, Evaluation, Evaluator, Phenome, Searcher};

use rayon::prelude::*;

use std::sync::Arc;

/// Evaluates phenomes in parallel on the rayon thread pool, one
/// task per phenome. Evaluations are returned in phenome order.
pub struct ConcurrentSearcher<E> {
    evaluator: E,
}

impl<E: Evaluator> ConcurrentSearcher<E> {
    /// Creates a searcher driving `evaluator`.
    pub fn new(evaluator: E) -> ConcurrentSearcher<E> {
        ConcurrentSearcher { evaluator }
    }

    /// Returns the wrapped evaluator.
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }
}

impl<E: Evaluator> Searcher for ConcurrentSearcher<E> {
    fn search(&mut self, phenomes: &[Arc<dyn Phenome>]) -> Result<Vec<Evaluation>, BoxError> {
        let evaluator = &self.evaluator;
        Ok(phenomes
            .par_iter()
            .map(|p| evaluator.evaluate(p.as_ref()))
            .collect())
    }

    fn setup(&mut self) -> Result<(), BoxError> {
        self.evaluator.setup()
    }

    fn takedown(&mut self) -> Result<(), BoxError> {
        self.evaluator.takedown()
    }

    fn set_phenomes(&mut self, phenomes: &[Arc<dyn Phenome>]) -> Result<(), BoxError> {
        self.evaluator.set_phenomes(phenomes)
    }
}

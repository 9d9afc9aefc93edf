use crate::experiment::{BoxError, Evaluation, Evaluator, Phenome, Searcher};

use std::sync::Arc;

/// Evaluates phenomes one at a time, in order.
pub struct SerialSearcher<E> {
    evaluator: E,
}

impl<E: Evaluator> SerialSearcher<E> {
    /// Creates a searcher driving `evaluator`.
    pub fn new(evaluator: E) -> SerialSearcher<E> {
        SerialSearcher { evaluator }
    }

    /// Returns the wrapped evaluator.
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }
}

impl<E: Evaluator> Searcher for SerialSearcher<E> {
    fn search(&mut self, phenomes: &[Arc<dyn Phenome>]) -> Result<Vec<Evaluation>, BoxError> {
        Ok(phenomes
            .iter()
            .map(|p| self.evaluator.evaluate(p.as_ref()))
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

//! The mutator family. Each policy is usable on its own, and
//! [`ClassicMutator`] and [`Phased`] compose them.

mod classic;
mod complexify;
mod phased;
mod pruning;
mod traits;
mod weight;

pub use classic::ClassicMutator;
pub use complexify::Complexify;
pub use phased::{Phase, Phased};
pub use pruning::Pruning;
pub use traits::TraitMutator;
pub use weight::WeightMutator;

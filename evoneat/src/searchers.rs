//! Strategies for evaluating a generation's phenomes.

mod concurrent;
mod novelty;
mod serial;

pub use concurrent::ConcurrentSearcher;
pub use novelty::{BehaviorRecord, NoveltyConfig, NoveltySearcher};
pub use serial::SerialSearcher;

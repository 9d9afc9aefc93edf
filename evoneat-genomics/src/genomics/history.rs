use crate::genomics::{Genome, Position};
use crate::Innovation;

use ahash::RandomState;
use log::debug;
use parking_lot::Mutex;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A monotonic source of identifiers, shared by genome
/// ids and innovation numbers within a run.
#[derive(Debug, Default)]
pub struct IdSequence {
    next: AtomicUsize,
}

impl IdSequence {
    /// Creates a sequence starting at 0.
    pub fn new() -> IdSequence {
        IdSequence::starting_at(0)
    }

    /// Creates a sequence whose first issued value is `first`.
    pub fn starting_at(first: usize) -> IdSequence {
        IdSequence {
            next: AtomicUsize::new(first),
        }
    }

    /// Issues the next identifier.
    ///
    /// # Examples
    /// ```
    /// use evoneat_genomics::genomics::IdSequence;
    ///
    /// let ids = IdSequence::new();
    /// assert_eq!(ids.next(), 0);
    /// assert_eq!(ids.next(), 1);
    /// ```
    pub fn next(&self) -> usize {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the value the next call to [`next`] will issue.
    ///
    /// [`next`]: IdSequence::next
    pub fn peek(&self) -> usize {
        self.next.load(Ordering::Relaxed)
    }

    /// Makes sure no identifier below `first_unused` is issued
    /// from now on. The sequence is never moved backwards.
    ///
    /// # Examples
    /// ```
    /// use evoneat_genomics::genomics::IdSequence;
    ///
    /// let ids = IdSequence::starting_at(10);
    /// ids.prime(4);
    /// assert_eq!(ids.peek(), 10);
    /// ids.prime(25);
    /// assert_eq!(ids.next(), 25);
    /// ```
    pub fn prime(&self, first_unused: usize) {
        self.next.fetch_max(first_unused, Ordering::Relaxed);
    }
}

#[derive(Debug, Default)]
struct Markers {
    nodes: HashMap<(u64, u64), Innovation, RandomState>,
    connections: HashMap<(Innovation, Innovation), Innovation, RandomState>,
}

/// A `History` keeps track of node and connection innovations
/// in a run, in order to make sure identical mutations arising
/// independently are assigned the same innovation numbers.
///
/// Nodes are identified by their [`Position`], and connections
/// by their `(source, target)` endpoints. The first request for
/// a given key draws a fresh number from the shared [`IdSequence`];
/// later requests for the same key return the recorded number.
///
/// A `History` is meant to be shared through an [`Arc`] by every
/// operator and generator of a run. All methods take `&self` and
/// are safe to call from concurrent offspring production.
#[derive(Debug)]
pub struct History {
    ids: Arc<IdSequence>,
    markers: Mutex<Markers>,
}

impl History {
    /// Creates an empty history drawing numbers from `ids`.
    ///
    /// # Examples
    /// ```
    /// use evoneat_genomics::genomics::{History, IdSequence};
    /// use std::sync::Arc;
    ///
    /// let history = History::new(Arc::new(IdSequence::new()));
    /// ```
    pub fn new(ids: Arc<IdSequence>) -> History {
        History {
            ids,
            markers: Mutex::new(Markers::default()),
        }
    }

    /// Returns the shared identifier sequence.
    pub fn ids(&self) -> &Arc<IdSequence> {
        &self.ids
    }

    /// Issues a fresh identifier, used for new genomes.
    pub fn next_id(&self) -> usize {
        self.ids.next()
    }

    /// Returns the innovation number for a node at `position`,
    /// recording a new one if the position was never seen.
    ///
    /// # Examples
    /// ```
    /// use evoneat_genomics::genomics::{History, IdSequence, Position};
    /// use std::sync::Arc;
    ///
    /// let history = History::new(Arc::new(IdSequence::new()));
    ///
    /// let a = history.mark_node(Position::new(0.5, 0.5));
    /// let b = history.mark_node(Position::new(0.25, 0.5));
    /// assert_ne!(a, b);
    /// assert_eq!(history.mark_node(Position::new(0.5, 0.5)), a);
    /// ```
    pub fn mark_node(&self, position: Position) -> Innovation {
        let mut markers = self.markers.lock();
        *markers
            .nodes
            .entry(position.key())
            .or_insert_with(|| self.ids.next())
    }

    /// Returns the innovation number for a connection from
    /// `source` to `target`, recording a new one if the pair
    /// was never seen.
    ///
    /// # Examples
    /// ```
    /// use evoneat_genomics::genomics::{History, IdSequence};
    /// use std::sync::Arc;
    ///
    /// let history = History::new(Arc::new(IdSequence::new()));
    ///
    /// let forward = history.mark_connection(0, 1);
    /// let backward = history.mark_connection(1, 0);
    /// assert_ne!(forward, backward);
    /// assert_eq!(history.mark_connection(0, 1), forward);
    /// ```
    pub fn mark_connection(&self, source: Innovation, target: Innovation) -> Innovation {
        let mut markers = self.markers.lock();
        *markers
            .connections
            .entry((source, target))
            .or_insert_with(|| self.ids.next())
    }

    /// Forgets all recorded structural keys. The identifier
    /// sequence keeps its position, so no number is reissued.
    pub fn reset(&self) {
        let mut markers = self.markers.lock();
        markers.nodes.clear();
        markers.connections.clear();
    }

    /// Rebuilds the history from a restored set of genomes.
    ///
    /// The identifier sequence is primed above every genome id
    /// and innovation number found, then every node position and
    /// connection endpoint pair is re-registered under the number
    /// the genomes already carry.
    pub fn load<'a>(&self, genomes: impl IntoIterator<Item = &'a Genome>) {
        let mut markers = self.markers.lock();
        markers.nodes.clear();
        markers.connections.clear();

        let mut first_unused = 0;
        for genome in genomes {
            first_unused = first_unused.max(genome.id() + 1);
            for node in genome.nodes() {
                first_unused = first_unused.max(node.id() + 1);
                markers.nodes.insert(node.position().key(), node.id());
            }
            for conn in genome.connections() {
                first_unused = first_unused.max(conn.id() + 1);
                markers.connections.insert(conn.endpoints(), conn.id());
            }
        }
        self.ids.prime(first_unused);
        debug!(
            "innovation history loaded: {} nodes, {} connections, next id {}",
            markers.nodes.len(),
            markers.connections.len(),
            self.ids.peek()
        );
    }

    /// Returns the complete record of connection innovations, in the
    /// format `((source, target), innovation)`, sorted by innovation.
    pub fn connection_history(&self) -> Vec<((Innovation, Innovation), Innovation)> {
        let markers = self.markers.lock();
        let mut record: Vec<_> = markers.connections.iter().map(|(k, v)| (*k, *v)).collect();
        record.sort_unstable_by_key(|(_, id)| *id);
        record
    }

    /// Returns the number of node positions recorded.
    pub fn node_count(&self) -> usize {
        self.markers.lock().nodes.len()
    }
}

use crate::Innovation;

use serde::{Deserialize, Serialize};

use std::fmt;

/// Connection genes link two nodes of a genome,
/// and become weighted edges in the decoded network.
///
/// Disabled connections stay in the genome so they
/// can be re-enabled through crossover, but decoders
/// should skip them.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Connection {
    id: Innovation,
    source: Innovation,
    target: Innovation,
    weight: f64,
    enabled: bool,
}

impl Connection {
    /// Returns a new _enabled_ connection with the specified parameters.
    ///
    /// # Examples
    /// ```
    /// use evoneat_genomics::genomics::Connection;
    ///
    /// let conn = Connection::new(42, 3, 9, 2.0);
    /// assert!(conn.enabled());
    /// ```
    pub fn new(id: Innovation, source: Innovation, target: Innovation, weight: f64) -> Connection {
        Connection {
            id,
            source,
            target,
            weight,
            enabled: true,
        }
    }

    /// Returns the connection's innovation number.
    pub fn id(&self) -> Innovation {
        self.id
    }

    /// Returns the innovation number of the source node.
    pub fn source(&self) -> Innovation {
        self.source
    }

    /// Returns the innovation number of the target node.
    pub fn target(&self) -> Innovation {
        self.target
    }

    /// Returns the `(source, target)` pair identifying
    /// the connection structurally.
    ///
    /// # Examples
    /// ```
    /// use evoneat_genomics::genomics::Connection;
    ///
    /// assert_eq!(Connection::new(42, 3, 9, 2.0).endpoints(), (3, 9));
    /// ```
    pub fn endpoints(&self) -> (Innovation, Innovation) {
        (self.source, self.target)
    }

    /// Returns the connection's weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Sets the connection's weight.
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// Returns whether the connection is expressed.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Sets the connection's enabled status.
    ///
    /// # Examples
    /// ```
    /// use evoneat_genomics::genomics::Connection;
    ///
    /// let mut conn = Connection::new(42, 3, 9, 2.0);
    /// conn.set_enabled(false);
    /// assert!(!conn.enabled());
    /// ```
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn set_source(&mut self, source: Innovation) {
        self.source = source;
    }

    pub(crate) fn set_target(&mut self, target: Innovation) {
        self.target = target;
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Connection {} [{} -> {}] w={:.4}{}",
            self.id,
            self.source,
            self.target,
            self.weight,
            if self.enabled { "" } else { " (disabled)" }
        )
    }
}

use crate::Innovation;

use serde::{Deserialize, Serialize};

use std::fmt;

/// An ActivationType represents the type
/// of activation function the node's network
/// equivalent will use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ActivationType {
    // x
    Direct,
    // 1 / (1 + exp(-4.9x))
    SteepenedSigmoid,
    // 1 / (1 + exp(-x))
    Sigmoid,
    // tanh(0.9x)
    Tanh,
    // x / (1 + |x|)
    InverseAbs,
}

impl ActivationType {
    /// Applies the activation function to `x`.
    ///
    /// # Examples
    /// ```
    /// use evoneat_genomics::genomics::ActivationType;
    ///
    /// assert_eq!(ActivationType::Direct.activate(2.5), 2.5);
    /// assert_eq!(ActivationType::Sigmoid.activate(0.0), 0.5);
    /// assert_eq!(ActivationType::InverseAbs.activate(1.0), 0.5);
    /// ```
    pub fn activate(&self, x: f64) -> f64 {
        match self {
            Self::Direct => x,
            Self::SteepenedSigmoid => 1.0 / (1.0 + (-4.9 * x).exp()),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Tanh => (0.9 * x).tanh(),
            Self::InverseAbs => x / (1.0 + x.abs()),
        }
    }

    /// Returns the `(minimum, maximum)` output values of the
    /// activation function.
    pub fn range(&self) -> (f64, f64) {
        match self {
            Self::Direct => (f64::NEG_INFINITY, f64::INFINITY),
            Self::SteepenedSigmoid | Self::Sigmoid => (0.0, 1.0),
            Self::Tanh | Self::InverseAbs => (-1.0, 1.0),
        }
    }
}

/// A NeuronType indicates the function of
/// the node's network equivalent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeuronType {
    /// Constant-output nodes.
    Bias,
    /// Sensor nodes.
    Input,
    /// Nodes created by splitting connections.
    Hidden,
    /// Actuator nodes.
    Output,
}

impl fmt::Display for NeuronType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bias => "Bias",
            Self::Input => "Input",
            Self::Hidden => "Hidden",
            Self::Output => "Output",
        };
        write!(f, "{}", name)
    }
}

/// Location of a node in the genome's 2D layout.
///
/// `y` increases from the input layer (0.0) towards the
/// output layer (1.0), and is used as the layering hint
/// for feed-forward ordering. The position of a node is
/// also its structural key during historical marking.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Creates a new position.
    pub const fn new(x: f64, y: f64) -> Position {
        Position { x, y }
    }

    /// Returns the point halfway between `self` and `other`.
    ///
    /// # Examples
    /// ```
    /// use evoneat_genomics::genomics::Position;
    ///
    /// let mid = Position::new(0.0, 0.0).midpoint(&Position::new(1.0, 1.0));
    /// assert_eq!(mid, Position::new(0.5, 0.5));
    /// ```
    pub fn midpoint(&self, other: &Position) -> Position {
        Position {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Returns a hashable key with bitwise equality semantics.
    /// Negative zero is folded into positive zero so that
    /// both compare equal, as they do numerically.
    pub fn key(&self) -> (u64, u64) {
        fn bits(v: f64) -> u64 {
            if v == 0.0 {
                0.0f64.to_bits()
            } else {
                v.to_bits()
            }
        }
        (bits(self.x), bits(self.y))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Nodes are the structural elements of genomes
/// between which connections are created.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Node {
    id: Innovation,
    neuron_type: NeuronType,
    activation: ActivationType,
    position: Position,
}

impl Node {
    /// Generate a new node with the passed parameters.
    ///
    /// # Examples
    /// ```
    /// use evoneat_genomics::genomics::{ActivationType, Node, NeuronType, Position};
    ///
    /// let node = Node::new(5, NeuronType::Hidden, ActivationType::Sigmoid, Position::new(0.5, 0.5));
    /// assert_eq!(node.id(), 5);
    /// ```
    pub fn new(
        id: Innovation,
        neuron_type: NeuronType,
        activation: ActivationType,
        position: Position,
    ) -> Node {
        Node {
            id,
            neuron_type,
            activation,
            position,
        }
    }

    /// Returns the node's innovation number.
    pub fn id(&self) -> Innovation {
        self.id
    }

    /// Returns the node's type.
    pub fn neuron_type(&self) -> NeuronType {
        self.neuron_type
    }

    /// Returns the node's activation function.
    pub fn activation(&self) -> ActivationType {
        self.activation
    }

    /// Returns the node's position.
    pub fn position(&self) -> Position {
        self.position
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Node {} [{}, {:?}] at {}",
            self.id, self.neuron_type, self.activation, self.position
        )
    }
}

//! Domain entities: geometry, records and render-time points

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;

use crate::domain::arena::NodeId;

/// A point in the 2D layout plane (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Shift by the given deltas.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Linear interpolation towards `target`; `t` is clamped to `[0, 1]`.
    pub fn lerp(&self, target: Position, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::new(
            self.x + (target.x - self.x) * t,
            self.y + (target.y - self.y) * t,
        )
    }

    pub fn distance(&self, other: Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Angle of the segment `self -> other` in degrees, measured from the x axis.
    pub fn angle_to(&self, other: Position) -> f64 {
        (other.y - self.y).atan2(other.x - self.x).to_degrees()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Straight segment connecting a parent node to one of its children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub parent: NodeId,
    pub child: NodeId,
    pub from: Position,
    pub to: Position,
    /// Segment length in layout units
    pub length: f64,
    /// Rotation of the segment in degrees
    pub angle_degrees: f64,
}

impl Edge {
    pub fn new(parent: NodeId, child: NodeId, from: Position, to: Position) -> Self {
        Self {
            parent,
            child,
            from,
            to,
            length: from.distance(to),
            angle_degrees: from.angle_to(to),
        }
    }
}

/// One evaluation input.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Display name
    pub identity: String,
    /// Feature values by name
    pub features: BTreeMap<String, f64>,
    /// Class the record actually belongs to
    pub ground_truth: String,
}

impl Record {
    pub fn new(
        identity: impl Into<String>,
        features: BTreeMap<String, f64>,
        ground_truth: impl Into<String>,
    ) -> Self {
        Self {
            identity: identity.into(),
            features,
            ground_truth: ground_truth.into(),
        }
    }

    pub fn feature(&self, name: &str) -> Option<f64> {
        self.features.get(name).copied()
    }
}

/// Lifecycle of a point moving through the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointState {
    AtRoot,
    /// Moving towards the path element at `path_index`
    Traveling { path_index: usize },
    Settled,
}

/// Render-time entity derived from a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Index of the originating record (0-based)
    pub record_index: usize,
    pub position: Position,
    pub state: PointState,
    /// Leaf the point was routed to
    pub leaf: NodeId,
    /// Nodes visited from root to leaf, both inclusive
    pub path: Vec<NodeId>,
    pub predicted: String,
    /// Final packed position inside the leaf
    pub target: Position,
}

impl Point {
    pub fn is_settled(&self) -> bool {
        self.state == PointState::Settled
    }

    /// Hover card text for the point.
    pub fn tooltip(&self, record: &Record) -> String {
        let features = record
            .features
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .join("\n");
        format!(
            "Name: {}\nPredicted: {}\nActual: {}\n{}",
            record.identity,
            self.predicted.to_uppercase(),
            record.ground_truth,
            features
        )
    }
}

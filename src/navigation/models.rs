use glam::Vec2;
use std::cmp::Ordering;

use super::graph::Graph;

/// Level of the plain grid cells.
pub const BASE_LEVEL: u8 = 0;
/// Level of gates and query nodes.
pub const GATE_LEVEL: u8 = 1;

/// Dense index into the navigator's node arena.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ClusterId(pub usize);

/// Integer grid coordinate. `y` grows downward (row-major).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn to_world(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    pub fn chebyshev(self, other: Cell) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// A location at one abstraction level.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Node {
    pub level: u8,
    /// 0 is passable; anything else is blocked. Only meaningful at level 0.
    pub height: i32,
    pub cell: Cell,
}

impl Node {
    pub fn new(level: u8, height: i32, cell: Cell) -> Self {
        Self { level, height, cell }
    }

    pub fn position(&self) -> Vec2 {
        self.cell.to_world()
    }

    pub fn is_blocked(&self) -> bool {
        self.height != 0
    }
}

// Level, then row, then column, then height.
impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level
            .cmp(&other.level)
            .then(self.cell.y.cmp(&other.cell.y))
            .then(self.cell.x.cmp(&other.cell.x))
            .then(self.height.cmp(&other.height))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// How `first` sits relative to `second`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Adjacency {
    Above,
    Below,
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub struct Cluster {
    pub id: ClusterId,
    pub level: u8,
    /// Extent along x, in cells.
    pub length: usize,
    /// Extent along y, in cells.
    pub width: usize,
    /// Level-0 nodes covered by the cluster, row-major.
    pub base_nodes: Vec<NodeId>,
    /// Gates and query nodes that belong to the cluster.
    pub level_nodes: Vec<NodeId>,
    pub local_graph: Graph,
    pub min_pos: Cell,
    pub max_pos: Cell,
}

impl Cluster {
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.min_pos.x
            && cell.x <= self.max_pos.x
            && cell.y >= self.min_pos.y
            && cell.y <= self.max_pos.y
    }

    /// Base node at a cell inside the cluster.
    pub fn base_node_at(&self, cell: Cell) -> Option<NodeId> {
        if !self.contains(cell) {
            return None;
        }
        let col = (cell.x - self.min_pos.x) as usize;
        let row = (cell.y - self.min_pos.y) as usize;
        self.base_nodes.get(row * self.length + col).copied()
    }
}

/// Crossable border between two adjacent clusters.
#[derive(Clone, Debug)]
pub struct Entrance {
    pub clusters: (ClusterId, ClusterId),
    /// (node in first cluster, node in second cluster)
    pub gates: Vec<(NodeId, NodeId)>,
}

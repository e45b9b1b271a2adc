use anyhow::{bail, Result};
use std::str::FromStr;

use super::models::Node;

/// Cost estimate between two nodes, plugged into `astar`.
pub trait Heuristic: Send + Sync {
    fn estimate(&self, from: &Node, to: &Node) -> f64;
}

/// Uniform-cost search (Dijkstra).
#[derive(Copy, Clone, Debug, Default)]
pub struct ZeroHeuristic;

#[derive(Copy, Clone, Debug, Default)]
pub struct EuclideanDistance;

#[derive(Copy, Clone, Debug, Default)]
pub struct ManhattanDistance;

impl Heuristic for ZeroHeuristic {
    fn estimate(&self, _from: &Node, _to: &Node) -> f64 {
        0.0
    }
}

impl Heuristic for EuclideanDistance {
    fn estimate(&self, from: &Node, to: &Node) -> f64 {
        from.position().distance(to.position()) as f64
    }
}

impl Heuristic for ManhattanDistance {
    fn estimate(&self, from: &Node, to: &Node) -> f64 {
        let d = (from.position() - to.position()).abs();
        (d.x + d.y) as f64
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HeuristicKind {
    Zero,
    Euclidean,
    Manhattan,
}

impl HeuristicKind {
    pub fn heuristic(self) -> &'static dyn Heuristic {
        match self {
            HeuristicKind::Zero => &ZeroHeuristic,
            HeuristicKind::Euclidean => &EuclideanDistance,
            HeuristicKind::Manhattan => &ManhattanDistance,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HeuristicKind::Zero => "zero",
            HeuristicKind::Euclidean => "euclidean",
            HeuristicKind::Manhattan => "manhattan",
        }
    }
}

impl FromStr for HeuristicKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" | "dijkstra" | "none" => Ok(HeuristicKind::Zero),
            "euclidean" => Ok(HeuristicKind::Euclidean),
            "manhattan" => Ok(HeuristicKind::Manhattan),
            other => bail!("unknown heuristic: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::models::{Cell, GATE_LEVEL};

    #[test]
    fn distances_between_cells() {
        let a = Node::new(GATE_LEVEL, 0, Cell::new(0, 0));
        let b = Node::new(GATE_LEVEL, 0, Cell::new(3, 4));
        assert_eq!(ZeroHeuristic.estimate(&a, &b), 0.0);
        assert!((EuclideanDistance.estimate(&a, &b) - 5.0).abs() < 1e-6);
        assert_eq!(ManhattanDistance.estimate(&a, &b), 7.0);
        assert_eq!(ManhattanDistance.estimate(&b, &a), 7.0);
    }

    #[test]
    fn parse_kind() {
        assert_eq!("Manhattan".parse::<HeuristicKind>().unwrap(), HeuristicKind::Manhattan);
        assert_eq!("dijkstra".parse::<HeuristicKind>().unwrap(), HeuristicKind::Zero);
        assert!("octile".parse::<HeuristicKind>().is_err());
        let h = HeuristicKind::Euclidean.heuristic();
        let a = Node::new(GATE_LEVEL, 0, Cell::new(1, 1));
        assert_eq!(h.estimate(&a, &a), 0.0);
    }
}

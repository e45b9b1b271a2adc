use std::collections::BTreeMap;

use super::models::{Node, NodeId};

pub const ORTHOGONAL_COST: f64 = 1.0;
pub const DIAGONAL_COST: f64 = 1.42;

/// Weighted adjacency map. Edges are inserted in both directions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
    adjacency: BTreeMap<NodeId, BTreeMap<NodeId, f64>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: NodeId) {
        self.adjacency.entry(id).or_default();
    }

    /// Inserts `a <-> b`; an existing edge keeps the cheaper weight.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, weight: f64) {
        if a == b {
            return;
        }
        Self::insert_min(self.adjacency.entry(a).or_default(), b, weight);
        Self::insert_min(self.adjacency.entry(b).or_default(), a, weight);
    }

    fn insert_min(row: &mut BTreeMap<NodeId, f64>, to: NodeId, weight: f64) {
        row.entry(to)
            .and_modify(|w| {
                if weight < *w {
                    *w = weight;
                }
            })
            .or_insert(weight);
    }

    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.adjacency
            .get(&id)
            .into_iter()
            .flat_map(|row| row.iter().map(|(&n, &w)| (n, w)))
    }

    pub fn weight(&self, a: NodeId, b: NodeId) -> Option<f64> {
        self.adjacency.get(&a).and_then(|row| row.get(&b)).copied()
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.weight(a, b).is_some()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.adjacency.contains_key(&id)
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|row| row.len()).sum::<usize>() / 2
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Every edge once, as `(low, high, weight)`.
    pub fn edges(&self) -> Vec<(NodeId, NodeId, f64)> {
        self.adjacency
            .iter()
            .flat_map(|(&a, row)| {
                row.iter()
                    .filter(move |(&b, _)| a < b)
                    .map(move |(&b, &w)| (a, b, w))
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.adjacency.clear();
    }
}

/// Connects a row-major `length x width` block of nodes into an 8-connected grid.
///
/// Each passable cell only looks forward (right, down, down-right, down-left);
/// the bidirectional insert fills in the other four directions. Blocked cells
/// get no edges and are not added to `out`.
pub fn build_local_graph(length: usize, width: usize, nodes: &[NodeId], arena: &[Node], out: &mut Graph) {
    let passable = |col: usize, row: usize| -> Option<NodeId> {
        let id = *nodes.get(row * length + col)?;
        let node = arena.get(id.index())?;
        (!node.is_blocked()).then_some(id)
    };

    for row in 0..width {
        for col in 0..length {
            let Some(here) = passable(col, row) else { continue };
            out.add_node(here);

            if col + 1 < length {
                if let Some(right) = passable(col + 1, row) {
                    out.add_edge(here, right, ORTHOGONAL_COST);
                }
            }
            if row + 1 < width {
                if let Some(down) = passable(col, row + 1) {
                    out.add_edge(here, down, ORTHOGONAL_COST);
                }
                if col + 1 < length {
                    if let Some(down_right) = passable(col + 1, row + 1) {
                        out.add_edge(here, down_right, DIAGONAL_COST);
                    }
                }
                if col > 0 {
                    if let Some(down_left) = passable(col - 1, row + 1) {
                        out.add_edge(here, down_left, DIAGONAL_COST);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::models::{Cell, BASE_LEVEL};

    fn block(length: usize, width: usize, blocked: &[(i32, i32)]) -> (Vec<Node>, Vec<NodeId>) {
        let mut arena = Vec::new();
        let mut ids = Vec::new();
        for y in 0..width as i32 {
            for x in 0..length as i32 {
                let h = if blocked.contains(&(x, y)) { 1 } else { 0 };
                ids.push(NodeId(arena.len() as u32));
                arena.push(Node::new(BASE_LEVEL, h, Cell::new(x, y)));
            }
        }
        (arena, ids)
    }

    #[test]
    fn open_block_is_eight_connected() {
        let (arena, ids) = block(3, 3, &[]);
        let mut g = Graph::new();
        build_local_graph(3, 3, &ids, &arena, &mut g);
        // centre touches all eight neighbours
        assert_eq!(g.neighbors(ids[4]).count(), 8);
        // corner touches three
        assert_eq!(g.neighbors(ids[0]).count(), 3);
        assert_eq!(g.weight(ids[0], ids[1]), Some(ORTHOGONAL_COST));
        assert_eq!(g.weight(ids[0], ids[4]), Some(DIAGONAL_COST));
        assert_eq!(g.weight(ids[2], ids[4]), Some(DIAGONAL_COST));
        // 12 orthogonal + 8 diagonal
        assert_eq!(g.edge_count(), 20);
    }

    #[test]
    fn blocked_cells_have_no_edges() {
        let (arena, ids) = block(3, 3, &[(1, 1)]);
        let mut g = Graph::new();
        build_local_graph(3, 3, &ids, &arena, &mut g);
        assert!(!g.contains(ids[4]));
        for id in &ids {
            assert!(!g.has_edge(*id, ids[4]));
        }
        // diagonals around the blocked centre are still allowed (no corner check)
        assert!(g.has_edge(ids[1], ids[3]));
    }

    #[test]
    fn edges_are_symmetric_and_keep_cheapest() {
        let mut g = Graph::new();
        g.add_edge(NodeId(1), NodeId(2), 5.0);
        g.add_edge(NodeId(2), NodeId(1), 3.0);
        g.add_edge(NodeId(1), NodeId(2), 4.0);
        assert_eq!(g.weight(NodeId(1), NodeId(2)), Some(3.0));
        assert_eq!(g.weight(NodeId(2), NodeId(1)), Some(3.0));
        assert_eq!(g.edges(), vec![(NodeId(1), NodeId(2), 3.0)]);
        g.add_edge(NodeId(7), NodeId(7), 1.0);
        assert!(!g.contains(NodeId(7)));
    }
}

use std::collections::HashMap;

use super::graph::{Graph, ORTHOGONAL_COST};
use super::models::{Adjacency, Cell, Cluster, Entrance, Node, NodeId};

#[derive(Clone, Debug, Default)]
pub struct EntrancesStats {
    pub cluster_pairs_adjacent: usize,
    pub entrances_created: usize,
    pub gates_created: usize,
}

/// Gate nodes shared by every entrance, interned by cell.
pub struct GateRegistry<'a> {
    pub arena: &'a mut Vec<Node>,
    pub by_cell: &'a mut HashMap<Cell, NodeId>,
    pub level: u8,
}

impl GateRegistry<'_> {
    pub fn intern(&mut self, cell: Cell, height: i32) -> NodeId {
        if let Some(&id) = self.by_cell.get(&cell) {
            return id;
        }
        let id = NodeId(self.arena.len() as u32);
        self.arena.push(Node::new(self.level, height, cell));
        self.by_cell.insert(cell, id);
        id
    }
}

/// How `first` sits relative to `second`, if their boxes share a full border.
pub fn adjacency(first: &Cluster, second: &Cluster) -> Option<Adjacency> {
    if first.min_pos.x == second.max_pos.x + 1 && first.min_pos.y == second.min_pos.y {
        Some(Adjacency::Right)
    } else if first.min_pos.y == second.max_pos.y + 1 && first.min_pos.x == second.min_pos.x {
        Some(Adjacency::Below)
    } else if first.max_pos.x + 1 == second.min_pos.x && first.min_pos.y == second.min_pos.y {
        Some(Adjacency::Left)
    } else if first.max_pos.y + 1 == second.min_pos.y && first.min_pos.x == second.min_pos.x {
        Some(Adjacency::Above)
    } else {
        None
    }
}

/// Discovers entrances between every adjacent cluster pair, registers the gates
/// in both clusters and links each gate pair with a unit edge in `abstract_graph`.
pub fn build_entrances(
    clusters: &mut [Cluster],
    gates: &mut GateRegistry<'_>,
    abstract_graph: &mut Graph,
    max_entrance_width: usize,
) -> (Vec<Entrance>, EntrancesStats) {
    let mut stats = EntrancesStats::default();
    let mut entrances = Vec::new();

    for i in 0..clusters.len() {
        for j in (i + 1)..clusters.len() {
            let Some(adj) = adjacency(&clusters[i], &clusters[j]) else { continue };
            stats.cluster_pairs_adjacent += 1;

            let cell_pairs = {
                let (first, second) = (&clusters[i], &clusters[j]);
                let arena: &[Node] = &*gates.arena;
                let blocked = |cell: Cell| is_blocked(first, cell, arena) || is_blocked(second, cell, arena);
                match adj {
                    Adjacency::Left => build_side_entrances(first, second, blocked, max_entrance_width),
                    Adjacency::Right => swap(build_side_entrances(second, first, blocked, max_entrance_width)),
                    Adjacency::Above => build_top_entrances(first, second, blocked, max_entrance_width),
                    Adjacency::Below => swap(build_top_entrances(second, first, blocked, max_entrance_width)),
                }
            };

            let mut gate_pairs = Vec::with_capacity(cell_pairs.len());
            for (c1, c2) in cell_pairs {
                let g1 = gates.intern(c1, 0);
                let g2 = gates.intern(c2, 0);
                abstract_graph.add_edge(g1, g2, ORTHOGONAL_COST);
                clusters[i].level_nodes.push(g1);
                clusters[j].level_nodes.push(g2);
                gate_pairs.push((g1, g2));
            }
            stats.gates_created += gate_pairs.len();

            dedup_level_nodes(&mut clusters[i], gates.arena);
            dedup_level_nodes(&mut clusters[j], gates.arena);

            entrances.push(Entrance {
                clusters: (clusters[i].id, clusters[j].id),
                gates: gate_pairs,
            });
            stats.entrances_created += 1;
        }
    }
    (entrances, stats)
}

fn is_blocked(cluster: &Cluster, cell: Cell, arena: &[Node]) -> bool {
    if !cluster.contains(cell) {
        return false;
    }
    cluster
        .base_node_at(cell)
        .and_then(|id| arena.get(id.index()))
        .map(|n| n.is_blocked())
        .unwrap_or(true)
}

fn swap(pairs: Vec<(Cell, Cell)>) -> Vec<(Cell, Cell)> {
    pairs.into_iter().map(|(a, b)| (b, a)).collect()
}

/// Border between `left` and the cluster on its right; returns (left cell, right cell) gates.
pub fn build_side_entrances(
    left: &Cluster,
    right: &Cluster,
    blocked: impl Fn(Cell) -> bool,
    max_entrance_width: usize,
) -> Vec<(Cell, Cell)> {
    let border = (0..left.width as i32).map(|r| {
        (
            Cell::new(left.max_pos.x, left.min_pos.y + r),
            Cell::new(right.min_pos.x, right.min_pos.y + r),
        )
    });
    emit_gates(collect_runs(border, blocked), max_entrance_width)
}

/// Border between `top` and the cluster below it; returns (top cell, bottom cell) gates.
pub fn build_top_entrances(
    top: &Cluster,
    bottom: &Cluster,
    blocked: impl Fn(Cell) -> bool,
    max_entrance_width: usize,
) -> Vec<(Cell, Cell)> {
    let border = (0..top.length as i32).map(|c| {
        (
            Cell::new(top.min_pos.x + c, top.max_pos.y),
            Cell::new(bottom.min_pos.x + c, bottom.min_pos.y),
        )
    });
    emit_gates(collect_runs(border, blocked), max_entrance_width)
}

/// Maximal runs of border pairs where both cells are open.
fn collect_runs(
    border: impl Iterator<Item = (Cell, Cell)>,
    blocked: impl Fn(Cell) -> bool,
) -> Vec<Vec<(Cell, Cell)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (a, b) in border {
        if blocked(a) || blocked(b) {
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        } else {
            current.push((a, b));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn emit_gates(runs: Vec<Vec<(Cell, Cell)>>, max_entrance_width: usize) -> Vec<(Cell, Cell)> {
    let mut out = Vec::new();
    for run in runs {
        let n = run.len();
        if n == max_entrance_width {
            out.push(run[n / 2]);
        } else if n < max_entrance_width {
            out.push(run[n - 1]);
        } else {
            out.push(run[0]);
            if n > 1 {
                out.push(run[n - 1]);
            }
        }
    }
    out
}

fn dedup_level_nodes(cluster: &mut Cluster, arena: &[Node]) {
    cluster.level_nodes.sort_by(|a, b| arena[a.index()].cmp(&arena[b.index()]).then(a.cmp(b)));
    cluster.level_nodes.dedup();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::cluster_builder::build_clusters;
    use crate::navigation::models::{BASE_LEVEL, GATE_LEVEL};

    fn setup(width: usize, height: usize, blocked: &[(i32, i32)]) -> (Vec<Node>, Vec<Cluster>) {
        let mut arena = Vec::new();
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let h = if blocked.contains(&(x, y)) { 1 } else { 0 };
                arena.push(Node::new(BASE_LEVEL, h, Cell::new(x, y)));
            }
        }
        let ids: Vec<NodeId> = (0..arena.len() as u32).map(NodeId).collect();
        let (clusters, _) = build_clusters(width, height, &ids, 20, GATE_LEVEL).unwrap();
        (arena, clusters)
    }

    fn gate_cells(arena: &[Node], entrance: &Entrance) -> Vec<(Cell, Cell)> {
        entrance
            .gates
            .iter()
            .map(|(a, b)| (arena[a.index()].cell, arena[b.index()].cell))
            .collect()
    }

    #[test]
    fn detects_adjacency_from_bounds() {
        let (_arena, clusters) = setup(8, 8, &[]);
        assert_eq!(adjacency(&clusters[0], &clusters[1]), Some(Adjacency::Left));
        assert_eq!(adjacency(&clusters[1], &clusters[0]), Some(Adjacency::Right));
        assert_eq!(adjacency(&clusters[0], &clusters[2]), Some(Adjacency::Above));
        assert_eq!(adjacency(&clusters[2], &clusters[0]), Some(Adjacency::Below));
        assert_eq!(adjacency(&clusters[0], &clusters[3]), None);
    }

    #[test]
    fn emits_gates_by_run_length() {
        let c = |i: i32| (Cell::new(i, 0), Cell::new(i, 1));
        let run = |n: i32| (0..n).map(c).collect::<Vec<_>>();
        // equal to width -> midpoint
        assert_eq!(emit_gates(vec![run(4)], 4), vec![c(2)]);
        // shorter -> last cell
        assert_eq!(emit_gates(vec![run(3)], 4), vec![c(2)]);
        // longer -> both ends
        assert_eq!(emit_gates(vec![run(6)], 4), vec![c(0), c(5)]);
        assert!(emit_gates(Vec::new(), 4).is_empty());
    }

    #[test]
    fn open_grid_gets_one_gate_per_border() {
        let (mut arena, mut clusters) = setup(8, 8, &[]);
        let mut by_cell = HashMap::new();
        let mut graph = Graph::new();
        let mut reg = GateRegistry { arena: &mut arena, by_cell: &mut by_cell, level: GATE_LEVEL };
        let (entrances, stats) = build_entrances(&mut clusters, &mut reg, &mut graph, 4);

        assert_eq!(stats.entrances_created, 4);
        assert_eq!(stats.gates_created, 4);
        assert_eq!(gate_cells(&arena, &entrances[0]), vec![(Cell::new(3, 2), Cell::new(4, 2))]);
        assert_eq!(gate_cells(&arena, &entrances[1]), vec![(Cell::new(2, 3), Cell::new(2, 4))]);
        assert_eq!(gate_cells(&arena, &entrances[2]), vec![(Cell::new(6, 3), Cell::new(6, 4))]);
        assert_eq!(gate_cells(&arena, &entrances[3]), vec![(Cell::new(3, 6), Cell::new(4, 6))]);
        assert_eq!(graph.edge_count(), 4);
        for cluster in &clusters {
            assert_eq!(cluster.level_nodes.len(), 2);
        }
    }

    #[test]
    fn wall_splits_border_into_runs() {
        // block the left cluster's border cell at y=1
        let (mut arena, mut clusters) = setup(8, 8, &[(3, 1)]);
        let mut by_cell = HashMap::new();
        let mut graph = Graph::new();
        let mut reg = GateRegistry { arena: &mut arena, by_cell: &mut by_cell, level: GATE_LEVEL };
        let (entrances, _) = build_entrances(&mut clusters, &mut reg, &mut graph, 3);
        assert_eq!(
            gate_cells(&arena, &entrances[0]),
            vec![(Cell::new(3, 0), Cell::new(4, 0)), (Cell::new(3, 3), Cell::new(4, 3))]
        );
        assert!(graph.has_edge(entrances[0].gates[1].0, entrances[0].gates[1].1));
    }

    #[test]
    fn fully_blocked_border_has_no_gates() {
        let wall: Vec<(i32, i32)> = (0..4).map(|y| (4, y)).collect();
        let (mut arena, mut clusters) = setup(8, 8, &wall);
        let mut by_cell = HashMap::new();
        let mut graph = Graph::new();
        let mut reg = GateRegistry { arena: &mut arena, by_cell: &mut by_cell, level: GATE_LEVEL };
        let (entrances, stats) = build_entrances(&mut clusters, &mut reg, &mut graph, 3);
        assert_eq!(entrances.len(), 4);
        assert!(entrances[0].gates.is_empty());
        // the other three borders are 4 wide (two gates) except the one clipped by the wall
        assert_eq!(stats.gates_created, 5);
        assert_eq!(clusters[0].level_nodes.len(), 2);
    }
}

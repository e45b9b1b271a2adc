use anyhow::Result;
use glam::Vec2;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

use super::astar::astar;
use super::cluster_builder::build_clusters;
use super::config::{IntraEdgeMode, NavConfig};
use super::entrance_discovery::{build_entrances, GateRegistry};
use super::graph::{build_local_graph, Graph};
use super::grid::GridModel;
use super::heuristics::{EuclideanDistance, ZeroHeuristic};
use super::intra_connector::{build_intra_edges, connect_pair, connect_to_border, IntraStats};
use super::models::{Cell, Cluster, Entrance, Node, NodeId, BASE_LEVEL, GATE_LEVEL};
use super::path_cache::PathCache;
use super::resumable::{Budget, IntraEdgeCursor, ProcessReport, ProcessingState, Progress};

#[derive(Clone, Debug, Default, Serialize)]
pub struct InitStats {
    pub clusters: usize,
    pub cluster_length: usize,
    pub cluster_width: usize,
    pub entrances: usize,
    pub gates: usize,
    pub intra_pairs: usize,
    pub intra_edges: usize,
    pub elapsed_ms: f64,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct NavStats {
    pub width: usize,
    pub height: usize,
    pub clusters: usize,
    pub entrances: usize,
    pub level_nodes: usize,
    pub abstract_edges: usize,
    pub base_edges: usize,
    pub cached_paths: usize,
    pub cached_base_paths: usize,
}

/// Two-level path planner over one grid.
///
/// The node arena holds the `width * height` base nodes first (row-major),
/// followed by gates and query nodes in creation order.
#[derive(Debug, Default)]
pub struct Navigator {
    config: NavConfig,
    width: usize,
    height: usize,
    nodes: Vec<Node>,
    base_graph: Graph,
    abstract_graph: Graph,
    clusters: Vec<Cluster>,
    entrances: Vec<Entrance>,
    level_nodes_by_cell: HashMap<Cell, NodeId>,
    paths: PathCache,
    base_paths: PathCache,
    cursor: IntraEdgeCursor,
    initialized: bool,
}

impl Navigator {
    pub fn new(config: NavConfig) -> Self {
        Self { config, ..Default::default() }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Builds the whole abstraction for `grid`, discarding any previous one.
    pub fn init(&mut self, grid: &GridModel) -> Result<InitStats> {
        let started = Instant::now();
        self.reset();
        self.width = grid.width;
        self.height = grid.height;

        self.nodes.reserve(grid.width * grid.height);
        for y in 0..grid.height as i32 {
            for x in 0..grid.width as i32 {
                let cell = Cell::new(x, y);
                self.nodes.push(Node::new(BASE_LEVEL, grid.height_at(cell), cell));
            }
        }
        let base_ids: Vec<NodeId> = (0..self.nodes.len() as u32).map(NodeId).collect();
        build_local_graph(grid.width, grid.height, &base_ids, &self.nodes, &mut self.base_graph);

        let (mut clusters, built) =
            build_clusters(grid.width, grid.height, &base_ids, self.config.max_cluster_size, GATE_LEVEL)?;
        for cluster in clusters.iter_mut() {
            build_local_graph(cluster.length, cluster.width, &cluster.base_nodes, &self.nodes, &mut cluster.local_graph);
        }
        info!(
            "navigator: {} clusters of {}x{} over a {}x{} grid",
            built.clusters_created, built.cluster_length, built.cluster_width, grid.width, grid.height
        );

        let (entrances, found) = {
            let mut gates = GateRegistry {
                arena: &mut self.nodes,
                by_cell: &mut self.level_nodes_by_cell,
                level: GATE_LEVEL,
            };
            build_entrances(&mut clusters, &mut gates, &mut self.abstract_graph, self.config.max_entrance_width)
        };
        self.clusters = clusters;
        self.entrances = entrances;
        info!(
            "navigator: {} entrances, {} gates (max entrance width {})",
            found.entrances_created, found.gates_created, self.config.max_entrance_width
        );

        let intra = match self.config.intra_edges {
            IntraEdgeMode::Eager => {
                let stats = build_intra_edges(
                    &self.clusters,
                    &self.nodes,
                    &mut self.abstract_graph,
                    &mut self.paths,
                    self.config.threads,
                )?;
                self.cursor = IntraEdgeCursor::finished(&self.clusters);
                stats
            }
            IntraEdgeMode::Deferred => {
                self.cursor = IntraEdgeCursor::start(&self.clusters);
                IntraStats::default()
            }
        };
        self.initialized = true;

        let stats = InitStats {
            clusters: self.clusters.len(),
            cluster_length: built.cluster_length,
            cluster_width: built.cluster_width,
            entrances: self.entrances.len(),
            gates: found.gates_created,
            intra_pairs: intra.pairs_examined,
            intra_edges: intra.edges_created,
            elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
        };
        info!(
            "navigator: init done in {:.1} ms ({} abstract edges, intra edges {:?}, {} heuristic)",
            stats.elapsed_ms,
            self.abstract_graph.edge_count(),
            self.config.intra_edges,
            self.config.abstract_heuristic.as_str()
        );
        Ok(stats)
    }

    /// Drops every derived structure; `init` must run again before queries.
    pub fn reset(&mut self) {
        self.width = 0;
        self.height = 0;
        self.nodes.clear();
        self.base_graph.clear();
        self.abstract_graph.clear();
        self.clusters.clear();
        self.entrances.clear();
        self.level_nodes_by_cell.clear();
        self.paths.clear();
        self.base_paths.clear();
        self.cursor = IntraEdgeCursor::default();
        self.initialized = false;
    }

    /// Grid cell for a world position: rounded, then clamped to the grid.
    /// Positions that round to a negative cell or past the far edge resolve
    /// to nothing; the edge itself (`width`, `height`) clamps to the last cell.
    pub fn query_cell(&self, position: Vec2) -> Option<Cell> {
        if !self.initialized {
            warn!("navigator: query before init");
            return None;
        }
        let rounded = position.round();
        if !rounded.is_finite()
            || rounded.x < 0.0
            || rounded.y < 0.0
            || rounded.x > self.width as f32
            || rounded.y > self.height as f32
        {
            debug!("navigator: position {:?} outside the grid", position);
            return None;
        }
        let x = (rounded.x as i32).clamp(0, self.width as i32 - 1);
        let y = (rounded.y as i32).clamp(0, self.height as i32 - 1);
        Some(Cell::new(x, y))
    }

    fn base_id(&self, cell: Cell) -> NodeId {
        NodeId((cell.y as usize * self.width + cell.x as usize) as u32)
    }

    /// Level node at `cell`, created and wired into its cluster if missing.
    fn level_node_for(&mut self, cell: Cell) -> Option<NodeId> {
        let owner = self.clusters.iter().position(|c| c.contains(cell))?;
        if let Some(&id) = self.level_nodes_by_cell.get(&cell) {
            return Some(id);
        }
        let height = self.nodes.get(self.base_id(cell).index())?.height;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(GATE_LEVEL, height, cell));
        self.level_nodes_by_cell.insert(cell, id);
        debug!("navigator: query node {:?} at ({}, {}) in cluster {}", id, cell.x, cell.y, owner);
        connect_to_border(
            &mut self.clusters[owner],
            &self.nodes,
            &mut self.abstract_graph,
            &mut self.paths,
            id,
        );
        Some(id)
    }

    /// Abstract route (level nodes) between two world positions; empty when
    /// there is none or both positions fall on the same cell.
    pub fn compute_abstract_path(&mut self, start: Vec2, goal: Vec2) -> Vec<NodeId> {
        let (Some(start_cell), Some(goal_cell)) = (self.query_cell(start), self.query_cell(goal)) else {
            return Vec::new();
        };
        if start_cell == goal_cell {
            return Vec::new();
        }
        let (Some(s), Some(g)) = (self.level_node_for(start_cell), self.level_node_for(goal_cell)) else {
            return Vec::new();
        };
        if let Some(cached) = self.paths.get(s, g) {
            debug!("navigator: abstract cache hit {:?} -> {:?}", s, g);
            return cached.to_vec();
        }
        match astar(&self.abstract_graph, &self.nodes, s, g, self.config.abstract_heuristic.heuristic()) {
            Some(found) => {
                self.paths.insert_both_directions(&found.path);
                found.path
            }
            None => Vec::new(),
        }
    }

    /// Cell-by-cell route between two nodes that share a cluster, both ends included.
    pub fn compute_concrete_path(&mut self, start: NodeId, goal: NodeId) -> Vec<Vec2> {
        let (Some(a), Some(b)) = (self.nodes.get(start.index()), self.nodes.get(goal.index())) else {
            return Vec::new();
        };
        let (ca, cb) = (a.cell, b.cell);
        let Some(cluster) = self.clusters.iter().find(|c| c.contains(ca) && c.contains(cb)) else {
            return Vec::new();
        };
        let (Some(from), Some(to)) = (cluster.base_node_at(ca), cluster.base_node_at(cb)) else {
            return Vec::new();
        };

        let path = match self.paths.get(from, to) {
            Some(cached) => cached.to_vec(),
            None => match astar(&cluster.local_graph, &self.nodes, from, to, &ZeroHeuristic) {
                Some(found) => {
                    self.paths.insert_both_directions(&found.path);
                    found.path
                }
                None => return Vec::new(),
            },
        };
        self.positions(&path)
    }

    /// Abstract search followed by refinement of every hop, stitched into one
    /// waypoint list without repeated joints.
    pub fn compute_path(&mut self, start: Vec2, goal: Vec2) -> Vec<Vec2> {
        let hops = self.compute_abstract_path(start, goal);
        let Some(&first) = hops.first() else { return Vec::new() };
        let mut out = self.positions(&[first]);
        for pair in hops.windows(2) {
            let segment = self.compute_concrete_path(pair[0], pair[1]);
            if segment.is_empty() {
                // gate crossings join cells of two different clusters
                let (a, b) = (self.nodes[pair[0].index()].cell, self.nodes[pair[1].index()].cell);
                if a.chebyshev(b) == 1 {
                    out.push(b.to_world());
                    continue;
                }
                return Vec::new();
            }
            out.extend(segment.into_iter().skip(1));
        }
        out
    }

    /// Direct level-0 search over the full grid graph.
    pub fn compute_base_path(&mut self, start: Vec2, goal: Vec2) -> Vec<Vec2> {
        let (Some(sc), Some(gc)) = (self.query_cell(start), self.query_cell(goal)) else {
            return Vec::new();
        };
        let (s, g) = (self.base_id(sc), self.base_id(gc));
        if let Some(cached) = self.base_paths.get(s, g) {
            let cached = cached.to_vec();
            return self.positions(&cached);
        }
        match astar(&self.base_graph, &self.nodes, s, g, &EuclideanDistance) {
            Some(found) => {
                self.base_paths.insert_both_directions(&found.path);
                self.positions(&found.path)
            }
            None => Vec::new(),
        }
    }

    /// Fills in missing intra-cluster edges until done or `budget_ms` runs out.
    ///
    /// A zero budget does nothing. A positive one always completes at least one
    /// pair; an in-flight search is never interrupted.
    pub fn process_clusters(&mut self, budget_ms: f64) -> ProcessReport {
        let budget = Budget::from_millis(budget_ms);
        let mut report = ProcessReport {
            pairs_examined: 0,
            edges_inserted: 0,
            elapsed_ms: 0.0,
            state: self.processing_state(),
        };
        if !self.initialized {
            warn!("navigator: process_clusters before init");
            return report;
        }

        let mut keep_going = budget.gate();
        while self.cursor.has_more(&self.clusters) && keep_going() {
            let Some((ci, a, b)) = self.cursor.current(&self.clusters) else { break };
            report.pairs_examined += 1;
            if !self.abstract_graph.has_edge(a, b)
                && connect_pair(&self.clusters[ci], &self.nodes, &mut self.abstract_graph, &mut self.paths, a, b)
            {
                report.edges_inserted += 1;
            }
            self.cursor.advance(&self.clusters);
        }

        report.elapsed_ms = budget.elapsed_ms();
        report.state = self.processing_state();
        if report.pairs_examined > 0 {
            debug!(
                "navigator: processed {} pairs (+{} edges) in {:.2} ms, now {:?}",
                report.pairs_examined, report.edges_inserted, report.elapsed_ms, report.state
            );
        }
        report
    }

    pub fn processing_state(&self) -> ProcessingState {
        self.cursor.state(&self.clusters)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            clusters_done: self.cursor.cluster_index().min(self.clusters.len()),
            clusters_total: self.clusters.len(),
        }
    }

    fn positions(&self, path: &[NodeId]) -> Vec<Vec2> {
        path.iter()
            .filter_map(|id| self.nodes.get(id.index()))
            .map(Node::position)
            .collect()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn entrances(&self) -> &[Entrance] {
        &self.entrances
    }

    pub fn abstract_graph(&self) -> &Graph {
        &self.abstract_graph
    }

    pub fn base_graph(&self) -> &Graph {
        &self.base_graph
    }

    pub fn path_cache(&self) -> &PathCache {
        &self.paths
    }

    pub fn base_path_cache(&self) -> &PathCache {
        &self.base_paths
    }

    pub fn stats(&self) -> NavStats {
        NavStats {
            width: self.width,
            height: self.height,
            clusters: self.clusters.len(),
            entrances: self.entrances.len(),
            level_nodes: self.clusters.iter().map(|c| c.level_nodes.len()).sum(),
            abstract_edges: self.abstract_graph.edge_count(),
            base_edges: self.base_graph.edge_count(),
            cached_paths: self.paths.len(),
            cached_base_paths: self.base_paths.len(),
        }
    }
}

use anyhow::{Context, Result};
use log::{debug, trace};
use rayon::prelude::*;

use super::astar::{astar, SearchResult};
use super::graph::Graph;
use super::heuristics::ZeroHeuristic;
use super::models::{Cluster, Node, NodeId};
use super::path_cache::PathCache;

#[derive(Clone, Debug, Default)]
pub struct IntraStats {
    pub clusters_processed: usize,
    pub pairs_examined: usize,
    pub edges_created: usize,
}

/// Distance between two level nodes of the same cluster, searched over the
/// cluster's local graph. The returned path holds base node ids.
pub fn search_in_cluster(cluster: &Cluster, arena: &[Node], a: NodeId, b: NodeId) -> Option<SearchResult> {
    let from = cluster.base_node_at(arena.get(a.index())?.cell)?;
    let to = cluster.base_node_at(arena.get(b.index())?.cell)?;
    astar(&cluster.local_graph, arena, from, to, &ZeroHeuristic)
}

/// Links `a` and `b` in the abstract graph when a local route exists.
/// Returns true if an edge was inserted.
pub fn connect_pair(
    cluster: &Cluster,
    arena: &[Node],
    abstract_graph: &mut Graph,
    cache: &mut PathCache,
    a: NodeId,
    b: NodeId,
) -> bool {
    match search_in_cluster(cluster, arena, a, b) {
        Some(found) => {
            trace!("intra: cluster {} {:?} <-> {:?} = {:.2}", cluster.id.0, a, b, found.cost);
            abstract_graph.add_edge(a, b, found.cost);
            cache.insert_both_directions(&found.path);
            true
        }
        None => {
            trace!("intra: cluster {} {:?} <-> {:?} unreachable", cluster.id.0, a, b);
            false
        }
    }
}

/// Joins a freshly created query node to every level node already in the
/// cluster, then registers it as one of them.
pub fn connect_to_border(
    cluster: &mut Cluster,
    arena: &[Node],
    abstract_graph: &mut Graph,
    cache: &mut PathCache,
    node: NodeId,
) -> usize {
    abstract_graph.add_node(node);
    let mut linked = 0;
    for other in cluster.level_nodes.clone() {
        if other == node {
            continue;
        }
        if connect_pair(cluster, arena, abstract_graph, cache, node, other) {
            linked += 1;
        }
    }
    cluster.level_nodes.push(node);
    debug!("intra: query node {:?} linked to {} border nodes in cluster {}", node, linked, cluster.id.0);
    linked
}

struct ClusterDistances {
    pairs: Vec<(NodeId, NodeId, Option<SearchResult>)>,
}

fn cluster_distances(cluster: &Cluster, arena: &[Node]) -> ClusterDistances {
    let nodes = &cluster.level_nodes;
    let mut pairs = Vec::new();
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            pairs.push((nodes[i], nodes[j], search_in_cluster(cluster, arena, nodes[i], nodes[j])));
        }
    }
    ClusterDistances { pairs }
}

/// Computes every gate pair distance of every cluster at once.
///
/// Clusters are searched in parallel (on a dedicated pool of `threads` workers
/// when given) and merged in cluster order, so the resulting graph matches the
/// one built slice by slice through `process_clusters`.
pub fn build_intra_edges(
    clusters: &[Cluster],
    arena: &[Node],
    abstract_graph: &mut Graph,
    cache: &mut PathCache,
    threads: Option<usize>,
) -> Result<IntraStats> {
    let compute = || -> Vec<ClusterDistances> {
        clusters
            .par_iter()
            .map(|c| cluster_distances(c, arena))
            .collect()
    };
    let per_cluster = match threads {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .with_context(|| format!("build rayon pool with {} threads", n))?
            .install(compute),
        None => compute(),
    };

    let mut stats = IntraStats::default();
    for (cluster, distances) in clusters.iter().zip(per_cluster) {
        if distances.pairs.is_empty() {
            continue;
        }
        stats.clusters_processed += 1;
        for (a, b, found) in distances.pairs {
            stats.pairs_examined += 1;
            if abstract_graph.has_edge(a, b) {
                continue;
            }
            if let Some(found) = found {
                abstract_graph.add_edge(a, b, found.cost);
                cache.insert_both_directions(&found.path);
                stats.edges_created += 1;
            }
        }
        trace!("intra: cluster {} merged", cluster.id.0);
    }
    debug!(
        "intra: {} clusters, {} pairs, {} edges",
        stats.clusters_processed, stats.pairs_examined, stats.edges_created
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::cluster_builder::build_clusters;
    use crate::navigation::graph::build_local_graph;
    use crate::navigation::models::{Cell, BASE_LEVEL, GATE_LEVEL};

    /// One 4x4 cluster (inside an 8x8 grid) with two gate nodes on its border.
    fn fixture(blocked: &[(i32, i32)]) -> (Vec<Node>, Cluster, NodeId, NodeId) {
        let mut arena = Vec::new();
        for y in 0..8 {
            for x in 0..8 {
                let h = if blocked.contains(&(x, y)) { 1 } else { 0 };
                arena.push(Node::new(BASE_LEVEL, h, Cell::new(x, y)));
            }
        }
        let ids: Vec<NodeId> = (0..arena.len() as u32).map(NodeId).collect();
        let (mut clusters, _) = build_clusters(8, 8, &ids, 20, GATE_LEVEL).unwrap();
        let mut cluster = clusters.remove(0);
        let mut local = Graph::new();
        build_local_graph(cluster.length, cluster.width, &cluster.base_nodes, &arena, &mut local);
        cluster.local_graph = local;

        let a = NodeId(arena.len() as u32);
        arena.push(Node::new(GATE_LEVEL, 0, Cell::new(3, 0)));
        let b = NodeId(arena.len() as u32);
        arena.push(Node::new(GATE_LEVEL, 0, Cell::new(0, 3)));
        cluster.level_nodes = vec![a, b];
        (arena, cluster, a, b)
    }

    #[test]
    fn connects_gates_with_local_distance() {
        let (arena, cluster, a, b) = fixture(&[]);
        let mut graph = Graph::new();
        let mut cache = PathCache::default();
        assert!(connect_pair(&cluster, &arena, &mut graph, &mut cache, a, b));
        // three diagonal steps from (3,0) to (0,3)
        let w = graph.weight(a, b).unwrap();
        assert!((w - 3.0 * 1.42).abs() < 1e-9);
        let from = cluster.base_node_at(Cell::new(3, 0)).unwrap();
        let to = cluster.base_node_at(Cell::new(0, 3)).unwrap();
        assert_eq!(cache.get(from, to).map(|p| p.len()), Some(4));
        assert!(cache.contains(to, from));
    }

    #[test]
    fn sealed_gate_gets_no_edge() {
        let (arena, cluster, a, b) = fixture(&[(2, 0), (2, 1), (3, 1)]);
        let mut graph = Graph::new();
        let mut cache = PathCache::default();
        assert!(!connect_pair(&cluster, &arena, &mut graph, &mut cache, a, b));
        assert!(graph.is_empty());
        assert!(cache.is_empty());
    }

    #[test]
    fn connect_to_border_registers_query_node() {
        let (mut arena, mut cluster, a, b) = fixture(&[]);
        let q = NodeId(arena.len() as u32);
        arena.push(Node::new(GATE_LEVEL, 0, Cell::new(1, 1)));
        let mut graph = Graph::new();
        let mut cache = PathCache::default();
        let linked = connect_to_border(&mut cluster, &arena, &mut graph, &mut cache, q);
        assert_eq!(linked, 2);
        assert!(graph.has_edge(q, a) && graph.has_edge(q, b));
        assert_eq!(cluster.level_nodes.last(), Some(&q));
    }

    #[test]
    fn parallel_build_matches_pairwise_connect() -> Result<()> {
        let (arena, cluster, a, b) = fixture(&[(1, 2)]);
        let clusters = vec![cluster];

        let mut parallel = Graph::new();
        let mut cache = PathCache::default();
        let stats = build_intra_edges(&clusters, &arena, &mut parallel, &mut cache, Some(2))?;
        assert_eq!(stats.edges_created, 1);

        let mut serial = Graph::new();
        let mut cache2 = PathCache::default();
        connect_pair(&clusters[0], &arena, &mut serial, &mut cache2, a, b);
        assert_eq!(parallel, serial);
        Ok(())
    }
}

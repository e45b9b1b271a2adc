use ordered_float::OrderedFloat;
use std::collections::{BTreeSet, HashMap};

use super::graph::Graph;
use super::heuristics::Heuristic;
use super::models::{Node, NodeId};

#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub cost: f64,
    /// `start ..= goal`
    pub path: Vec<NodeId>,
}

/// Shortest path from `start` to `goal` over `graph`.
///
/// Returns `None` (no path, infinite distance) without searching when either
/// endpoint is blocked or both are the same node. Closed nodes are reopened
/// when a strictly cheaper route to them turns up, so an inconsistent
/// heuristic still yields the optimal cost.
pub fn astar(
    graph: &Graph,
    arena: &[Node],
    start: NodeId,
    goal: NodeId,
    heuristic: &dyn Heuristic,
) -> Option<SearchResult> {
    if start == goal {
        return None;
    }
    let start_node = arena.get(start.index())?;
    let goal_node = arena.get(goal.index())?;
    if start_node.is_blocked() || goal_node.is_blocked() {
        return None;
    }

    // (f, insertion order, node): ties pop first-in first-out
    let mut open: BTreeSet<(OrderedFloat<f64>, u64, NodeId)> = BTreeSet::new();
    let mut open_keys: HashMap<NodeId, (OrderedFloat<f64>, u64)> = HashMap::new();
    let mut closed: HashMap<NodeId, f64> = HashMap::new();
    let mut g_score: HashMap<NodeId, f64> = HashMap::new();
    let mut parent: HashMap<NodeId, NodeId> = HashMap::new();
    let mut seq = 0u64;

    let f0 = OrderedFloat(heuristic.estimate(start_node, goal_node));
    open.insert((f0, seq, start));
    open_keys.insert(start, (f0, seq));
    g_score.insert(start, 0.0);

    while let Some((_, _, current)) = open.pop_first() {
        open_keys.remove(&current);
        let g = g_score.get(&current).copied().unwrap_or(f64::INFINITY);

        if current == goal {
            return Some(SearchResult { cost: g, path: reconstruct(&parent, start, goal) });
        }
        closed.insert(current, g);

        for (next, weight) in graph.neighbors(current) {
            let Some(next_node) = arena.get(next.index()) else { continue };
            if next_node.is_blocked() {
                continue;
            }
            let tentative = g + weight;

            if let Some(&recorded) = closed.get(&next) {
                if tentative >= recorded {
                    continue;
                }
                closed.remove(&next);
            }
            if let Some(&(f, s)) = open_keys.get(&next) {
                if tentative >= g_score.get(&next).copied().unwrap_or(f64::INFINITY) {
                    continue;
                }
                open.remove(&(f, s, next));
            }

            g_score.insert(next, tentative);
            parent.insert(next, current);
            seq += 1;
            let f = OrderedFloat(tentative + heuristic.estimate(next_node, goal_node));
            open.insert((f, seq, next));
            open_keys.insert(next, (f, seq));
        }
    }
    None
}

fn reconstruct(parent: &HashMap<NodeId, NodeId>, start: NodeId, goal: NodeId) -> Vec<NodeId> {
    let mut path = vec![goal];
    let mut at = goal;
    while at != start {
        match parent.get(&at) {
            Some(&p) => {
                path.push(p);
                at = p;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

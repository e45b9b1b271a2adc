use std::collections::HashMap;

use super::models::NodeId;

/// Last known shortest path per (start, goal). Only ever cleared as a whole.
#[derive(Clone, Debug, Default)]
pub struct PathCache {
    paths: HashMap<NodeId, HashMap<NodeId, Vec<NodeId>>>,
}

impl PathCache {
    pub fn get(&self, start: NodeId, goal: NodeId) -> Option<&[NodeId]> {
        self.paths.get(&start)?.get(&goal).map(Vec::as_slice)
    }

    pub fn contains(&self, start: NodeId, goal: NodeId) -> bool {
        self.get(start, goal).is_some()
    }

    /// Stores `path` under its own endpoints and its reverse under the swapped pair.
    pub fn insert_both_directions(&mut self, path: &[NodeId]) {
        let (Some(&first), Some(&last)) = (path.first(), path.last()) else { return };
        if first == last {
            return;
        }
        let mut reversed = path.to_vec();
        reversed.reverse();
        self.paths.entry(first).or_default().insert(last, path.to_vec());
        self.paths.entry(last).or_default().insert(first, reversed);
    }

    /// Number of cached (start, goal) entries.
    pub fn len(&self) -> usize {
        self.paths.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caches_both_directions() {
        let mut cache = PathCache::default();
        cache.insert_both_directions(&[NodeId(1), NodeId(5), NodeId(9)]);
        assert_eq!(cache.get(NodeId(1), NodeId(9)), Some(&[NodeId(1), NodeId(5), NodeId(9)][..]));
        assert_eq!(cache.get(NodeId(9), NodeId(1)), Some(&[NodeId(9), NodeId(5), NodeId(1)][..]));
        assert_eq!(cache.len(), 2);
        assert!(cache.get(NodeId(1), NodeId(5)).is_none());
    }

    #[test]
    fn newer_path_replaces_older_and_clear_empties() {
        let mut cache = PathCache::default();
        cache.insert_both_directions(&[NodeId(1), NodeId(2), NodeId(3)]);
        cache.insert_both_directions(&[NodeId(3), NodeId(1)]);
        assert_eq!(cache.get(NodeId(1), NodeId(3)), Some(&[NodeId(1), NodeId(3)][..]));
        cache.insert_both_directions(&[NodeId(4)]);
        cache.insert_both_directions(&[]);
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}

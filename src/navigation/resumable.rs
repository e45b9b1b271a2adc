use std::time::{Duration, Instant};

use super::models::{Cluster, NodeId};

/// Wall-clock allowance for one slice of background work.
#[derive(Clone, Debug)]
pub struct Budget {
    started: Instant,
    /// `None` is unbounded.
    allowance: Option<Duration>,
}

impl Budget {
    /// Zero, negative or NaN means no work at all; infinity, or anything too
    /// large for a `Duration`, means no limit.
    pub fn from_millis(ms: f64) -> Self {
        let allowance = if !(ms > 0.0) {
            Some(Duration::ZERO)
        } else {
            Duration::try_from_secs_f64(ms / 1000.0)
                .ok()
                .map(|d| d.max(Duration::from_nanos(1)))
        };
        Self { started: Instant::now(), allowance }
    }

    pub fn allows_work(&self) -> bool {
        self.allowance != Some(Duration::ZERO)
    }

    pub fn expired(&self) -> bool {
        match self.allowance {
            None => false,
            Some(limit) => self.started.elapsed() >= limit,
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    /// Loop condition: refuses everything on a zero budget, otherwise lets the
    /// first unit through and then runs until the deadline.
    pub fn gate(&self) -> impl FnMut() -> bool + '_ {
        let mut first = true;
        move || {
            if !self.allows_work() {
                return false;
            }
            if std::mem::take(&mut first) {
                return true;
            }
            !self.expired()
        }
    }
}

/// Visits `items[*cursor..]` while `keep_going` holds, leaving `cursor` on the
/// first unvisited item. Returns how many items were visited this call.
pub fn resumable_for_each<T>(
    items: &[T],
    cursor: &mut usize,
    mut keep_going: impl FnMut() -> bool,
    mut visit: impl FnMut(&T),
) -> usize {
    let mut visited = 0;
    while *cursor < items.len() && keep_going() {
        visit(&items[*cursor]);
        *cursor += 1;
        visited += 1;
    }
    visited
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ProcessingState {
    /// Every cluster has been swept.
    Idle,
    /// Positioned on the first pair of a cluster.
    Resuming,
    /// Part way through a cluster's pairs.
    Advancing,
}

/// Position in the sweep over every cluster's unordered level-node pairs.
///
/// The cursor always rests on a valid pair or past the last cluster. Level
/// nodes are only ever appended after the offline phase, so indices stay valid
/// between calls.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct IntraEdgeCursor {
    cluster: usize,
    first: usize,
    second: usize,
}

impl IntraEdgeCursor {
    pub fn start(clusters: &[Cluster]) -> Self {
        let mut cursor = Self { cluster: 0, first: 0, second: 1 };
        cursor.settle(clusters);
        cursor
    }

    pub fn finished(clusters: &[Cluster]) -> Self {
        Self { cluster: clusters.len(), first: 0, second: 1 }
    }

    fn settle(&mut self, clusters: &[Cluster]) {
        while let Some(cluster) = clusters.get(self.cluster) {
            let n = cluster.level_nodes.len();
            if self.second < n {
                return;
            }
            self.first += 1;
            self.second = self.first + 1;
            if self.second >= n {
                self.cluster += 1;
                self.first = 0;
                self.second = 1;
            }
        }
    }

    pub fn has_more(&self, clusters: &[Cluster]) -> bool {
        self.cluster < clusters.len()
    }

    /// `(cluster index, first node, second node)` under the cursor.
    pub fn current(&self, clusters: &[Cluster]) -> Option<(usize, NodeId, NodeId)> {
        let nodes = &clusters.get(self.cluster)?.level_nodes;
        Some((self.cluster, *nodes.get(self.first)?, *nodes.get(self.second)?))
    }

    pub fn advance(&mut self, clusters: &[Cluster]) {
        if !self.has_more(clusters) {
            return;
        }
        self.second += 1;
        self.settle(clusters);
    }

    pub fn cluster_index(&self) -> usize {
        self.cluster
    }

    pub fn state(&self, clusters: &[Cluster]) -> ProcessingState {
        if !self.has_more(clusters) {
            ProcessingState::Idle
        } else if self.first == 0 && self.second == 1 {
            ProcessingState::Resuming
        } else {
            ProcessingState::Advancing
        }
    }
}

/// Outcome of one `process_clusters` slice.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessReport {
    pub pairs_examined: usize,
    pub edges_inserted: usize,
    pub elapsed_ms: f64,
    pub state: ProcessingState,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Progress {
    pub clusters_done: usize,
    pub clusters_total: usize,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.clusters_done >= self.clusters_total
    }
}

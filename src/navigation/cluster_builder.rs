use anyhow::{bail, Result};

use super::graph::Graph;
use super::models::{Cell, Cluster, ClusterId, NodeId};

#[derive(Clone, Debug, Default)]
pub struct BuildStats {
    pub cluster_length: usize,
    pub cluster_width: usize,
    pub clusters_created: usize,
}

/// Largest divisor of `size` that is at most `max` and smaller than `size` itself.
/// Falls back to 1 when no such divisor exists.
pub fn cluster_size(size: usize, max: usize) -> usize {
    let mut candidate = max.min(size);
    while candidate > 1 {
        if size % candidate == 0 && candidate != size {
            break;
        }
        candidate -= 1;
    }
    candidate.max(1)
}

/// Tiles a `grid_width x grid_height` grid with equal clusters.
///
/// `base_ids` is the row-major list of level-0 nodes for the whole grid.
/// Clusters are emitted row-major over the cluster grid.
pub fn build_clusters(
    grid_width: usize,
    grid_height: usize,
    base_ids: &[NodeId],
    max_cluster_size: usize,
    level: u8,
) -> Result<(Vec<Cluster>, BuildStats)> {
    if base_ids.len() != grid_width * grid_height {
        bail!(
            "expected {} base nodes for a {}x{} grid, got {}",
            grid_width * grid_height,
            grid_width,
            grid_height,
            base_ids.len()
        );
    }

    let length = cluster_size(grid_width, max_cluster_size);
    let width = cluster_size(grid_height, max_cluster_size);
    let per_row = grid_width / length;
    let per_col = grid_height / width;

    let mut clusters = Vec::with_capacity(per_row * per_col);
    for cy in 0..per_col {
        for cx in 0..per_row {
            let x0 = cx * length;
            let y0 = cy * width;
            let mut base_nodes = Vec::with_capacity(length * width);
            for y in y0..y0 + width {
                for x in x0..x0 + length {
                    base_nodes.push(base_ids[y * grid_width + x]);
                }
            }
            clusters.push(Cluster {
                id: ClusterId(clusters.len()),
                level,
                length,
                width,
                base_nodes,
                level_nodes: Vec::new(),
                local_graph: Graph::default(),
                min_pos: Cell::new(x0 as i32, y0 as i32),
                max_pos: Cell::new((x0 + length - 1) as i32, (y0 + width - 1) as i32),
            });
        }
    }

    let stats = BuildStats {
        cluster_length: length,
        cluster_width: width,
        clusters_created: clusters.len(),
    };
    Ok((clusters, stats))
}

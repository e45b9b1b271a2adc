use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use crate::navigation::{GridModel, InitStats, NavConfig, NavStats, Navigator};

#[derive(Debug, Serialize)]
pub struct ClusterSummary {
    pub id: usize,
    pub min: [i32; 2],
    pub max: [i32; 2],
    pub level_nodes: usize,
    pub local_edges: usize,
}

#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub init: InitStats,
    pub totals: NavStats,
    pub clusters: Vec<ClusterSummary>,
}

pub fn inspect(nav: &Navigator, init: InitStats) -> InspectOutput {
    let clusters = nav
        .clusters()
        .iter()
        .map(|c| ClusterSummary {
            id: c.id.0,
            min: [c.min_pos.x, c.min_pos.y],
            max: [c.max_pos.x, c.max_pos.y],
            level_nodes: c.level_nodes.len(),
            local_edges: c.local_graph.edge_count(),
        })
        .collect();
    InspectOutput { init, totals: nav.stats(), clusters }
}

pub fn cmd_inspect(cfg: NavConfig, grid_path: &Path, json: bool) -> Result<()> {
    let grid = GridModel::load(grid_path)?;
    let mut nav = Navigator::new(cfg);
    let init = nav.init(&grid)?;
    let out = inspect(&nav, init);

    if json {
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    println!(
        "inspect: grid {}x{}, {} clusters of {}x{}, {} entrances, {} gates",
        out.totals.width,
        out.totals.height,
        out.totals.clusters,
        out.init.cluster_length,
        out.init.cluster_width,
        out.totals.entrances,
        out.init.gates
    );
    println!(
        "inspect: abstract edges {}, base edges {}, init {:.1} ms",
        out.totals.abstract_edges, out.totals.base_edges, out.init.elapsed_ms
    );
    for c in &out.clusters {
        println!(
            "inspect: cluster {} ({},{})..({},{}) level nodes {} local edges {}",
            c.id, c.min[0], c.min[1], c.max[0], c.max[1], c.level_nodes, c.local_edges
        );
    }
    Ok(())
}

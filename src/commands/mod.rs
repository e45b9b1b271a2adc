use anyhow::{bail, Result};
use clap::Args;

use crate::navigation::{logging, HeuristicKind, IntraEdgeMode, NavConfig};

pub mod inspect;
pub mod plan;
pub mod simulate;

#[derive(Args, Debug, Clone, Default)]
pub struct CommonOpts {
    /// Upper bound for a cluster side, in cells (default 20 or NAV_MAX_CLUSTER_SIZE)
    #[arg(long = "max-cluster-size", global = true)]
    pub max_cluster_size: Option<usize>,
    /// Border runs of exactly this width get a single midpoint gate (default 3)
    #[arg(long = "max-entrance-width", global = true)]
    pub max_entrance_width: Option<usize>,
    /// Heuristic for the abstract search (zero|euclidean|manhattan)
    #[arg(long = "heuristic", global = true)]
    pub heuristic: Option<HeuristicKind>,
    /// Number of worker threads for eager intra-cluster assembly (rayon)
    #[arg(long = "threads", global = true)]
    pub threads: Option<usize>,
    /// Log level (trace|debug|info|warn|error)
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,
}

fn cli_config(common: &CommonOpts, intra_edges: IntraEdgeMode) -> NavConfig {
    let mut cfg = NavConfig::default().with_intra_edges(intra_edges);
    if let Some(v) = common.max_cluster_size { cfg.max_cluster_size = v; }
    if let Some(v) = common.max_entrance_width { cfg.max_entrance_width = v; }
    if let Some(v) = common.heuristic { cfg.abstract_heuristic = v; }
    cfg.threads = common.threads;
    cfg.log_level = common.log_level.clone();
    cfg
}

/// CLI flags first, then environment on top (env > CLI precedence).
pub fn build_config(common: &CommonOpts, intra_edges: IntraEdgeMode) -> NavConfig {
    let mut cfg = cli_config(common, intra_edges);
    cfg.overlay(NavConfig::from_env_defaults());
    cfg
}

fn validate(cfg: &NavConfig) -> Result<()> {
    if cfg.max_cluster_size == 0 {
        bail!("max cluster size must be at least 1");
    }
    if cfg.threads == Some(0) {
        bail!("thread count must be at least 1");
    }
    Ok(())
}

/// Resolves the config and installs logging; shared by every subcommand.
pub fn prepare(common: &CommonOpts, intra_edges: IntraEdgeMode) -> Result<NavConfig> {
    let cfg = build_config(common, intra_edges);
    logging::init(cfg.log_level.as_deref());
    validate(&cfg)?;
    Ok(cfg)
}

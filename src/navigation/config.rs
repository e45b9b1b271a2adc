use anyhow::{bail, Result};
use std::env;
use std::str::FromStr;

use super::heuristics::HeuristicKind;

pub const DEFAULT_MAX_CLUSTER_SIZE: usize = 20;
pub const DEFAULT_MAX_ENTRANCE_WIDTH: usize = 3;

/// How the intra-cluster gate distances are produced after `init`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum IntraEdgeMode {
    /// Computed synchronously during `init` (level load).
    #[default]
    Eager,
    /// Left to `process_clusters`, one time slice per tick.
    Deferred,
}

impl FromStr for IntraEdgeMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eager" => Ok(IntraEdgeMode::Eager),
            "deferred" | "lazy" => Ok(IntraEdgeMode::Deferred),
            other => bail!("unknown intra edge mode: {}", other),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NavConfig {
    pub max_cluster_size: usize,
    pub max_entrance_width: usize,
    pub abstract_heuristic: HeuristicKind,
    pub intra_edges: IntraEdgeMode,
    pub threads: Option<usize>,
    pub log_level: Option<String>,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            max_cluster_size: DEFAULT_MAX_CLUSTER_SIZE,
            max_entrance_width: DEFAULT_MAX_ENTRANCE_WIDTH,
            abstract_heuristic: HeuristicKind::Manhattan,
            intra_edges: IntraEdgeMode::Eager,
            threads: None,
            log_level: None,
        }
    }
}

impl NavConfig {
    pub fn with_max_entrance_width(mut self, width: usize) -> Self {
        self.max_entrance_width = width;
        self
    }

    pub fn with_intra_edges(mut self, mode: IntraEdgeMode) -> Self {
        self.intra_edges = mode;
        self
    }

    /// Values found in the environment; unset or unparsable variables stay `None`/default.
    pub fn from_env_defaults() -> EnvOverrides {
        EnvOverrides {
            max_cluster_size: parse_env("NAV_MAX_CLUSTER_SIZE"),
            max_entrance_width: parse_env("NAV_MAX_ENTRANCE_WIDTH"),
            abstract_heuristic: parse_env("NAV_HEURISTIC"),
            intra_edges: parse_env("NAV_INTRA_EDGES"),
            threads: parse_env("NAV_THREADS"),
            log_level: env::var("NAV_LOG_LEVEL").ok(),
        }
    }

    /// Env overrides CLI when set.
    pub fn overlay(&mut self, env_cfg: EnvOverrides) {
        if let Some(v) = env_cfg.max_cluster_size { self.max_cluster_size = v; }
        if let Some(v) = env_cfg.max_entrance_width { self.max_entrance_width = v; }
        if let Some(v) = env_cfg.abstract_heuristic { self.abstract_heuristic = v; }
        if let Some(v) = env_cfg.intra_edges { self.intra_edges = v; }
        if env_cfg.threads.is_some() { self.threads = env_cfg.threads; }
        if env_cfg.log_level.is_some() { self.log_level = env_cfg.log_level; }
    }
}

#[derive(Clone, Debug, Default)]
pub struct EnvOverrides {
    pub max_cluster_size: Option<usize>,
    pub max_entrance_width: Option<usize>,
    pub abstract_heuristic: Option<HeuristicKind>,
    pub intra_edges: Option<IntraEdgeMode>,
    pub threads: Option<usize>,
    pub log_level: Option<String>,
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
}

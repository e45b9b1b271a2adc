pub mod config;
pub mod logging;
pub mod models;
pub mod grid;
pub mod graph;
pub mod cluster_builder;
pub mod entrance_discovery;
pub mod heuristics;
pub mod astar;
pub mod path_cache;
pub mod intra_connector;
pub mod resumable;
pub mod navigator;

pub use config::{IntraEdgeMode, NavConfig};
pub use grid::GridModel;
pub use heuristics::{Heuristic, HeuristicKind};
pub use models::{Cell, Cluster, ClusterId, Entrance, Node, NodeId};
pub use navigator::{InitStats, NavStats, Navigator};
pub use resumable::{Budget, ProcessReport, ProcessingState, Progress};

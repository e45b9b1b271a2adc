use anyhow::Result;
use glam::Vec2;
use log::{debug, info};
use serde::Serialize;
use std::path::Path;

use crate::navigation::resumable::resumable_for_each;
use crate::navigation::{Budget, GridModel, NavConfig, Navigator, ProcessingState};

#[derive(Clone, Debug, Default, Serialize)]
pub struct SimSummary {
    pub ticks: usize,
    pub queries: usize,
    pub paths_found: usize,
    pub pairs_examined: usize,
    pub edges_inserted: usize,
    pub idle: bool,
}

/// Game-loop stand-in: every tick serves agent queries first, then hands the
/// leftover time to intra-cluster processing. Queries that did not fit are
/// picked up on the next tick.
pub fn simulate(nav: &mut Navigator, routes: &[(Vec2, Vec2)], ticks: usize, tick_budget_ms: f64) -> SimSummary {
    let mut summary = SimSummary::default();
    let mut next_route = 0usize;
    let mut served_once = routes.is_empty();

    for tick in 0..ticks {
        let budget = Budget::from_millis(tick_budget_ms);
        if next_route >= routes.len() {
            next_route = 0;
        }
        let served = resumable_for_each(routes, &mut next_route, budget.gate(), |(start, goal)| {
            summary.queries += 1;
            if !nav.compute_path(*start, *goal).is_empty() {
                summary.paths_found += 1;
            }
        });
        if next_route >= routes.len() {
            served_once = true;
        }

        let leftover = tick_budget_ms - budget.elapsed_ms();
        let report = nav.process_clusters(leftover);
        summary.pairs_examined += report.pairs_examined;
        summary.edges_inserted += report.edges_inserted;
        summary.ticks = tick + 1;
        debug!(
            "simulate: tick {} served {} queries, {} pairs (+{} edges), {:?}",
            tick, served, report.pairs_examined, report.edges_inserted, report.state
        );

        if report.state == ProcessingState::Idle && served_once {
            break;
        }
    }
    summary.idle = nav.processing_state() == ProcessingState::Idle;
    summary
}

pub fn cmd_simulate(
    cfg: NavConfig,
    grid_path: &Path,
    routes: &[(Vec2, Vec2)],
    ticks: usize,
    tick_budget_ms: f64,
    json: bool,
) -> Result<()> {
    let grid = GridModel::load(grid_path)?;
    let mut nav = Navigator::new(cfg);
    nav.init(&grid)?;

    let summary = simulate(&mut nav, routes, ticks, tick_budget_ms);
    let progress = nav.progress();
    info!(
        "simulate: {} ticks, clusters {}/{} swept",
        summary.ticks, progress.clusters_done, progress.clusters_total
    );
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "simulate: {} ticks, {} queries ({} with a path), {} pairs examined, {} edges inserted, idle={}",
            summary.ticks, summary.queries, summary.paths_found, summary.pairs_examined, summary.edges_inserted, summary.idle
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::IntraEdgeMode;

    #[test]
    fn unlimited_tick_finishes_in_one_go() -> Result<()> {
        let grid = GridModel::open(8, 8)?;
        let mut nav = Navigator::new(NavConfig::default().with_intra_edges(IntraEdgeMode::Deferred));
        nav.init(&grid)?;
        let routes = [(Vec2::new(0.0, 0.0), Vec2::new(7.0, 7.0))];
        let summary = simulate(&mut nav, &routes, 10, f64::INFINITY);
        assert_eq!(summary.ticks, 1);
        assert!(summary.idle);
        assert_eq!(summary.queries, 1);
        Ok(())
    }

    #[test]
    fn zero_budget_ticks_do_nothing() -> Result<()> {
        let grid = GridModel::open(8, 8)?;
        let mut nav = Navigator::new(NavConfig::default().with_intra_edges(IntraEdgeMode::Deferred));
        nav.init(&grid)?;
        let routes = [(Vec2::new(0.0, 0.0), Vec2::new(7.0, 7.0))];
        let summary = simulate(&mut nav, &routes, 3, 0.0);
        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.queries, 0);
        assert_eq!(summary.pairs_examined, 0);
        assert!(!summary.idle);
        Ok(())
    }
}

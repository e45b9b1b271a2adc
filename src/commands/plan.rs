use anyhow::Result;
use glam::Vec2;
use serde::Serialize;
use std::path::Path;

use crate::navigation::{GridModel, NavConfig, Navigator};
use crate::util::format_path;

#[derive(Debug, Serialize)]
pub struct PlanOutput {
    pub abstract_path: Vec<[i32; 2]>,
    pub path: Vec<[f32; 2]>,
    pub base_path: Option<Vec<[f32; 2]>>,
}

pub fn plan(nav: &mut Navigator, start: Vec2, goal: Vec2, with_base: bool) -> PlanOutput {
    let hops = nav.compute_abstract_path(start, goal);
    let abstract_path = hops
        .iter()
        .filter_map(|id| nav.node(*id))
        .map(|n| [n.cell.x, n.cell.y])
        .collect();
    let path = nav.compute_path(start, goal).iter().map(|p| p.to_array()).collect();
    let base_path = with_base.then(|| nav.compute_base_path(start, goal).iter().map(|p| p.to_array()).collect());
    PlanOutput { abstract_path, path, base_path }
}

pub fn cmd_plan(cfg: NavConfig, grid_path: &Path, start: Vec2, goal: Vec2, with_base: bool, json: bool) -> Result<()> {
    let grid = GridModel::load(grid_path)?;
    let mut nav = Navigator::new(cfg);
    nav.init(&grid)?;

    let out = plan(&mut nav, start, goal, with_base);
    if json {
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let cells: Vec<String> = out.abstract_path.iter().map(|c| format!("({},{})", c[0], c[1])).collect();
    println!("plan: abstract path ({} nodes): {}", cells.len(), cells.join(" -> "));
    let waypoints: Vec<Vec2> = out.path.iter().map(|p| Vec2::from_array(*p)).collect();
    if waypoints.is_empty() {
        println!("plan: no path from {} to {}", start, goal);
    } else {
        println!("plan: concrete path ({} steps): {}", waypoints.len() - 1, format_path(&waypoints));
    }
    if let Some(base) = &out.base_path {
        let base: Vec<Vec2> = base.iter().map(|p| Vec2::from_array(*p)).collect();
        println!("plan: base path ({} steps): {}", base.len().saturating_sub(1), format_path(&base));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_reports_both_levels() -> Result<()> {
        let grid = GridModel::open(8, 8)?;
        let mut nav = Navigator::new(NavConfig::default().with_max_entrance_width(4));
        nav.init(&grid)?;
        let out = plan(&mut nav, Vec2::new(0.0, 6.0), Vec2::new(1.0, 1.0), true);
        assert_eq!(out.abstract_path.first(), Some(&[0, 6]));
        assert_eq!(out.abstract_path.last(), Some(&[1, 1]));
        assert_eq!(out.path.len(), 6);
        assert_eq!(out.base_path.as_ref().map(Vec::len), Some(6));
        Ok(())
    }
}

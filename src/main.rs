use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use hpa_navigator::commands::{self, CommonOpts};
use hpa_navigator::navigation::IntraEdgeMode;
use hpa_navigator::util;

#[derive(Parser, Debug)]
#[command(name = "hpa_navigator", version, about = "Hierarchical (HPA*) path planning over grid maps")]
struct Cli {
    #[command(flatten)]
    common: CommonOpts,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the abstraction and plan one route
    Plan {
        /// Grid file (.json with width/height/heights, or an ASCII map)
        #[arg(long)]
        grid: PathBuf,
        /// Start position as x,y
        #[arg(long)]
        start: String,
        /// Goal position as x,y
        #[arg(long)]
        goal: String,
        /// Also run a flat search over the full grid for comparison
        #[arg(long)]
        base: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print cluster geometry, gate and edge counts
    Inspect {
        #[arg(long)]
        grid: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Run a tick loop with deferred intra-cluster processing
    Simulate {
        #[arg(long)]
        grid: PathBuf,
        /// Maximum number of ticks
        #[arg(long, default_value_t = 100)]
        ticks: usize,
        /// Wall-clock budget per tick in milliseconds
        #[arg(long = "tick-budget-ms", default_value_t = 16.0)]
        tick_budget_ms: f64,
        /// Agent route as x,y:x,y (repeatable)
        #[arg(long = "route")]
        routes: Vec<String>,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Plan { grid, start, goal, base, json } => {
            let cfg = commands::prepare(&cli.common, IntraEdgeMode::Eager)?;
            let start = util::parse_point(&start)?;
            let goal = util::parse_point(&goal)?;
            commands::plan::cmd_plan(cfg, &grid, start, goal, base, json)
        }
        Commands::Inspect { grid, json } => {
            let cfg = commands::prepare(&cli.common, IntraEdgeMode::Eager)?;
            commands::inspect::cmd_inspect(cfg, &grid, json)
        }
        Commands::Simulate { grid, ticks, tick_budget_ms, routes, json } => {
            let cfg = commands::prepare(&cli.common, IntraEdgeMode::Deferred)?;
            let routes = routes
                .iter()
                .map(|r| util::parse_route(r))
                .collect::<Result<Vec<_>>>()?;
            commands::simulate::cmd_simulate(cfg, &grid, &routes, ticks, tick_budget_ms, json)
        }
    }
}

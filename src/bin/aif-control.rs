//! aif-control CLI - Expected-free-energy planning from the command line
//!
//! This CLI provides a unified interface for:
//! - Enumerating candidate policies
//! - Scoring policies and selecting an action for a JSON planning problem
//! - Inspecting inductive goal-reachability tables

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "aif-control")]
#[command(version, about = "Policy evaluation for discrete active inference", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate every policy over a horizon
    Policies(aif_control::cli::commands::policies::PoliciesArgs),

    /// Compute the policy posterior and select an action
    Plan(aif_control::cli::commands::plan::PlanArgs),

    /// Build the goal-reachability table of a problem
    Reachability(aif_control::cli::commands::reachability::ReachabilityArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    aif_control::cli::logging::init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Policies(args) => aif_control::cli::commands::policies::execute(args),
        Commands::Plan(args) => aif_control::cli::commands::plan::execute(args),
        Commands::Reachability(args) => aif_control::cli::commands::reachability::execute(args),
    }
}

//! Reachability command - Inspect the inductive planning table

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;

use crate::{
    cli::{
        output::{format_vector, print_kv, print_section, print_subsection},
        problem::{PlanningProblem, load_config},
    },
    control::generate_i_matrix,
};

#[derive(Parser, Debug)]
#[command(about = "Build the goal-reachability table of a problem")]
pub struct ReachabilityArgs {
    /// Path to a JSON planning problem with goals
    pub problem: PathBuf,

    /// Path to a JSON planner configuration
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Transition probability threshold (overrides the config)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Number of backward steps (overrides the config)
    #[arg(long)]
    pub depth: Option<usize>,

    /// Print the table as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: ReachabilityArgs) -> Result<()> {
    let problem = PlanningProblem::load(&args.problem)?;
    let Some(goals) = &problem.goals else {
        bail!("problem {} has no goals", args.problem.display());
    };
    let mut config = load_config(args.config.as_deref())?;
    if let Some(threshold) = args.threshold {
        config.inductive.threshold = threshold;
    }
    if let Some(depth) = args.depth {
        config.inductive.depth = depth;
    }
    config.validate()?;

    let model = problem.model();
    model.validate()?;
    let table = generate_i_matrix(
        goals,
        model.b(),
        config.inductive.threshold,
        config.inductive.depth,
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    print_section("Inductive reachability");
    print_kv("Threshold", &config.inductive.threshold.to_string());
    print_kv("Depth", &table.depth().to_string());
    for (f, rows) in table.tables().iter().enumerate() {
        print_subsection(&format!("Factor {f}"));
        for (step, row) in rows.outer_iter().enumerate() {
            print_kv(&format!("{step} steps"), &format_vector(row));
        }
        let unreachable: Vec<usize> = (0..rows.ncols())
            .filter(|&s| table.steps_to_goal(f, s).is_none())
            .collect();
        if !unreachable.is_empty() {
            print_kv("Out of reach", &format!("{unreachable:?}"));
        }
    }
    Ok(())
}

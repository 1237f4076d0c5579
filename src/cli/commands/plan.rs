//! Plan command - Score policies and select an action

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::{
    Planner,
    cli::{
        output::{create_spinner, format_number, format_vector, print_kv, print_section, print_subsection},
        problem::{PlanningProblem, load_config},
    },
    control::ActionSelection,
    export::ScoresCsvExporter,
};

#[derive(Parser, Debug)]
#[command(about = "Compute the policy posterior and select an action")]
pub struct PlanArgs {
    /// Path to a JSON planning problem
    pub problem: PathBuf,

    /// Path to a JSON planner configuration
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Policy precision (overrides the config)
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Action precision for stochastic selection (overrides the config)
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Action selection mode: deterministic or stochastic
    #[arg(long)]
    pub action_selection: Option<ActionSelection>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Add the inductive goal-reachability term (needs goals in the problem)
    #[arg(long)]
    pub inductive: bool,

    /// Number of top policies to list
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,

    /// Export per-policy scores to a CSV file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

pub fn execute(args: PlanArgs) -> Result<()> {
    let problem = PlanningProblem::load(&args.problem)?;
    let mut config = load_config(args.config.as_deref())?;
    if let Some(gamma) = args.gamma {
        config = config.with_gamma(gamma);
    }
    if let Some(alpha) = args.alpha {
        config = config.with_alpha(alpha);
    }
    if let Some(mode) = args.action_selection {
        config = config.with_action_selection(mode);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if args.inductive {
        config.terms.use_inductive = true;
    }
    let config = config.with_resolved_seed();

    let model = problem.model();
    let mut planner = Planner::new(model, config).context("invalid model or configuration")?;
    // goals only matter to the inductive term; B may not fit the table otherwise
    if planner.config().terms.use_inductive
        && let Some(goals) = &problem.goals
    {
        planner = planner.with_goals(goals)?;
    }
    let policies = problem.policies(planner.model())?;
    info!(policies = policies.len(), horizon = policies.horizon(), "planning");

    let spinner = if args.json {
        None
    } else {
        let pb = create_spinner(&format!("Scoring {} policies", format_number(policies.len())))?;
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    };
    let mut rng = planner.config().rng();
    let outcome = planner.plan(&problem.qs, &policies, &mut rng);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let outcome = outcome?;

    if let Some(path) = &args.export {
        let count = ScoresCsvExporter::export(
            path,
            &policies,
            outcome.q_pi.view(),
            outcome.neg_efe.view(),
            &outcome.breakdowns,
        )?;
        info!(count, path = %path.display(), "exported policy scores");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let config = planner.config();
    print_section("Policy evaluation");
    print_kv("Policies", &format_number(policies.len()));
    print_kv("Horizon", &policies.horizon().to_string());
    print_kv("Gamma", &config.gamma.to_string());
    print_kv("Selection", &config.action_selection.to_string());
    if let Some(seed) = config.seed {
        print_kv("Seed", &seed.to_string());
    }

    print_subsection("Top policies");
    let mut order: Vec<usize> = (0..policies.len()).collect();
    order.sort_by(|&i, &j| outcome.q_pi[j].total_cmp(&outcome.q_pi[i]));
    for &idx in order.iter().take(args.top) {
        let b = &outcome.breakdowns[idx];
        println!(
            "  #{idx:<5} q={:.4}  G={:+.4}  (utility {:+.4}, info {:+.4}, param {:+.4}, inductive {:+.4})",
            outcome.q_pi[idx],
            outcome.neg_efe[idx],
            b.utility,
            b.states_info_gain,
            b.param_info_gain,
            b.inductive_value
        );
    }

    print_subsection("Action marginals");
    for (f, marginal) in outcome.marginals.iter().enumerate() {
        print_kv(&format!("Factor {f}"), &format_vector(marginal.view()));
    }
    print_kv("Selected action", &format!("{:?}", outcome.action));
    if let Some(path) = &args.export {
        print_kv("Exported", &path.display().to_string());
    }
    Ok(())
}

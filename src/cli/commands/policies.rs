//! Policies command - Enumerate candidate policies

use anyhow::Result;
use clap::Parser;

use crate::{
    cli::output::{format_number, print_kv, print_section},
    policies::construct_policies,
};

#[derive(Parser, Debug)]
#[command(about = "Enumerate every policy over a horizon")]
pub struct PoliciesArgs {
    /// Number of states of each hidden-state factor (comma separated)
    #[arg(long, value_delimiter = ',', required = true)]
    pub num_states: Vec<usize>,

    /// Number of actions of each factor (defaults to the state counts)
    #[arg(long, value_delimiter = ',')]
    pub num_controls: Option<Vec<usize>>,

    /// Indices of controllable factors (defaults to all with more than one action)
    #[arg(long, value_delimiter = ',')]
    pub control_factors: Option<Vec<usize>>,

    /// Planning horizon
    #[arg(long, default_value_t = 1)]
    pub horizon: usize,

    /// Print the batch as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: PoliciesArgs) -> Result<()> {
    let batch = construct_policies(
        &args.num_states,
        args.num_controls.as_deref(),
        args.horizon,
        args.control_factors.as_deref(),
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
        return Ok(());
    }

    print_section("Policy enumeration");
    print_kv("Factors", &batch.num_factors().to_string());
    print_kv("Horizon", &batch.horizon().to_string());
    print_kv("Policies", &format_number(batch.len()));
    for (idx, policy) in batch.iter().enumerate().take(10) {
        let steps: Vec<String> = policy
            .outer_iter()
            .map(|row| format!("{:?}", row.to_vec()))
            .collect();
        println!("  {idx:>4}: {}", steps.join(" -> "));
    }
    if batch.len() > 10 {
        println!("  ... ({} more)", format_number(batch.len() - 10));
    }
    Ok(())
}

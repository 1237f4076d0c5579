//! Expected-free-energy policy evaluation for discrete active inference
//!
//! This crate provides:
//! - Policy enumeration over a planning horizon
//! - Sparse tensor contraction over ragged per-factor beliefs
//! - State and observation rollout under a generative model
//! - Utility, state information gain and parameter information gain terms
//! - Inductive planning toward goal states
//! - Parallel policy scoring, the policy posterior and action selection
//! - A command-line front end and CSV export of scores

pub mod cli;
pub mod config;
pub mod control;
pub mod efe;
pub mod error;
pub mod export;
pub mod model;
pub mod planner;
pub mod policies;
pub mod tensor;
pub mod utils;

pub use config::{InductiveConfig, PlannerConfig};
pub use control::{
    ActionSelection, EfeBreakdown, EfeTerms, PolicyPosterior, ReachabilityTable, get_marginals,
    sample_action, sample_policy, update_posterior_policies,
};
pub use error::{Error, Result};
pub use model::GenerativeModel;
pub use planner::{PlanOutcome, Planner};
pub use policies::{PolicyBatch, construct_policies};
pub use tensor::factor_dot;

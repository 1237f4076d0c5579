//! Policy evaluation and action selection
//!
//! An agent holding a belief over hidden states scores every candidate policy
//! by its negative expected free energy (EFE), forms a posterior over
//! policies and picks an action from it.
//!
//! ## Pipeline
//!
//! 1. [`rollout`]: predict hidden states and observations one step ahead
//! 2. [`scoring`]: fold a policy over its horizon, summing EFE terms
//! 3. [`posterior`]: score a batch in parallel, `softmax(gamma * G + ln E)`
//! 4. [`selection`]: marginalise first actions and choose one
//!
//! [`inductive`] builds the goal-reachability table used by the optional
//! inductive term.
//!
//! ## Module Structure
//!
//! - [`types`]: selection mode and term switches
//! - [`rollout`]: state and observation prediction
//! - [`inductive`]: backward-induction reachability
//! - [`scoring`]: per-policy scoring with diagnostics
//! - [`posterior`]: batch posterior over policies
//! - [`selection`]: marginals, action and policy sampling

pub mod inductive;
pub mod posterior;
pub mod rollout;
pub mod scoring;
pub mod selection;
pub mod types;

// Public re-exports
pub use inductive::{ReachabilityTable, calc_inductive_value_t, generate_i_matrix};
pub use posterior::{PolicyPosterior, update_posterior_policies};
pub use rollout::{compute_expected_obs, compute_expected_state, compute_expected_state_and_bs};
pub use scoring::{EfeBreakdown, InductiveContext, compute_efe_breakdown, compute_neg_efe_policy};
pub use selection::{get_marginals, sample_action, sample_policy, select_policy_index};
pub use types::{ActionSelection, EfeTerms};

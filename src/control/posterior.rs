//! Posterior over policies from a batch of expected-free-energy scores.

use ndarray::Array1;
use rayon::prelude::*;
use tracing::debug;

use super::{
    scoring::{EfeBreakdown, InductiveContext, check_term_inputs, compute_efe_breakdown},
    types::EfeTerms,
};
use crate::{
    Error, Result,
    model::GenerativeModel,
    policies::PolicyBatch,
    utils::{log_stable, softmax},
};

/// Result of scoring a policy batch.
#[derive(Debug, Clone)]
pub struct PolicyPosterior {
    /// Categorical posterior over policies, `softmax(gamma * neg_efe + ln E)`
    pub q_pi: Array1<f64>,
    /// Raw negative expected free energy per policy
    pub neg_efe: Array1<f64>,
    /// Per-term decomposition of each score
    pub breakdowns: Vec<EfeBreakdown>,
}

impl PolicyPosterior {
    /// Index of the most probable policy (first on ties).
    pub fn best_policy(&self) -> usize {
        crate::utils::argmax(self.q_pi.view())
    }
}

/// Score every policy and form the posterior over policies.
///
/// Inputs are validated up front; any invalid input aborts the whole call.
/// Policies are scored independently and in parallel. The habit prior comes
/// from the model (`E`), defaulting to uniform.
///
/// # Arguments
///
/// * `policies` - Candidate action sequences, all of the same horizon
/// * `qs_init` - Current belief over each hidden-state factor
/// * `model` - Generative model supplying `A`, `B`, `C` and optionally `E`, `pA`
/// * `gamma` - Policy precision; zero returns the habit prior unchanged
/// * `terms` - Which expected-free-energy terms to include
/// * `inductive` - Reachability table and epsilon, required when `terms` enables
///   the inductive term
///
/// # Returns
///
/// `softmax(gamma * neg_efe + ln E)` together with the raw scores and their
/// per-term breakdown, or the first validation error found.
///
/// # Examples
///
/// ```
/// use ndarray::{Array3, array};
/// use aif_control::{EfeTerms, GenerativeModel, construct_policies, update_posterior_policies};
///
/// // action 1 flips a binary state; the agent prefers observing state 1
/// let b = Array3::from_shape_fn((2, 2, 2), |(s, v, u)| {
///     let target = if u == 0 { v } else { 1 - v };
///     if s == target { 1.0 } else { 0.0 }
/// });
/// let model = GenerativeModel::new(
///     vec![array![[1.0, 0.0], [0.0, 1.0]].into_dyn()],
///     vec![b.into_dyn()],
///     vec![array![0.0, 2.0]],
/// );
/// let policies = construct_policies(&[2], None, 1, None)?;
/// let posterior = update_posterior_policies(
///     &policies,
///     &[array![1.0, 0.0]],
///     &model,
///     16.0,
///     &EfeTerms::default(),
///     None,
/// )?;
/// assert_eq!(posterior.best_policy(), 1);
/// assert!((posterior.q_pi.sum() - 1.0).abs() < 1e-12);
/// # Ok::<(), aif_control::Error>(())
/// ```
pub fn update_posterior_policies(
    policies: &PolicyBatch,
    qs_init: &[Array1<f64>],
    model: &GenerativeModel,
    gamma: f64,
    terms: &EfeTerms,
    inductive: Option<InductiveContext<'_>>,
) -> Result<PolicyPosterior> {
    model.validate()?;
    model.validate_beliefs(qs_init)?;
    policies.validate_against(&model.num_controls())?;
    check_term_inputs(model, terms, inductive)?;
    if !gamma.is_finite() || gamma < 0.0 {
        return Err(Error::InvalidConfiguration {
            message: format!("policy precision gamma must be finite and non-negative, got {gamma}"),
        });
    }
    if let Some(ctx) = inductive {
        if ctx.table.num_factors() != model.num_factors() {
            return Err(Error::shape(
                "reachability table factor count",
                model.num_factors(),
                ctx.table.num_factors(),
            ));
        }
        ctx.table.validate()?;
    }

    let num_policies = policies.len();
    let log_habits = match model.habits() {
        Some(e) if e.len() != num_policies => {
            return Err(Error::HabitLengthMismatch {
                expected: num_policies,
                got: e.len(),
            });
        }
        Some(e) => e.mapv(log_stable),
        None => Array1::from_elem(num_policies, log_stable(1.0 / num_policies as f64)),
    };

    debug!(
        num_policies,
        horizon = policies.horizon(),
        gamma,
        ?terms,
        "scoring policy batch"
    );
    let breakdowns = (0..num_policies)
        .into_par_iter()
        .map(|idx| compute_efe_breakdown(qs_init, model, policies.policy(idx), terms, inductive))
        .collect::<Result<Vec<_>>>()?;

    let neg_efe: Array1<f64> = breakdowns.iter().map(EfeBreakdown::neg_efe).collect();
    let logits = &neg_efe * gamma + &log_habits;
    let q_pi = softmax(logits.view());
    Ok(PolicyPosterior {
        q_pi,
        neg_efe,
        breakdowns,
    })
}

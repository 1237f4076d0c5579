//! Turning a policy posterior into something the agent can do.

use ndarray::{Array1, ArrayView1};
use rand::Rng;
use tracing::debug;

use super::types::ActionSelection;
use crate::{
    Error, Result,
    policies::PolicyBatch,
    utils::{argmax, log_stable, sample_categorical, softmax},
};

fn check_posterior(q_pi: ArrayView1<'_, f64>, policies: &PolicyBatch) -> Result<()> {
    if q_pi.len() != policies.len() {
        return Err(Error::shape("policy posterior", policies.len(), q_pi.len()));
    }
    if q_pi.is_empty() {
        return Err(Error::Empty {
            what: "policy posterior".to_string(),
        });
    }
    Ok(())
}

fn check_alpha(alpha: f64) -> Result<()> {
    if !alpha.is_finite() || alpha < 0.0 {
        return Err(Error::InvalidConfiguration {
            message: format!("action precision alpha must be finite and non-negative, got {alpha}"),
        });
    }
    Ok(())
}

/// Posterior mass of each first-step action, per control factor.
///
/// Later timesteps and the other factors are marginalised out.
pub fn get_marginals(
    q_pi: ArrayView1<'_, f64>,
    policies: &PolicyBatch,
    num_controls: &[usize],
) -> Result<Vec<Array1<f64>>> {
    check_posterior(q_pi, policies)?;
    policies.validate_against(num_controls)?;

    let mut marginals: Vec<Array1<f64>> =
        num_controls.iter().map(|&n| Array1::zeros(n)).collect();
    for (policy, &p) in policies.iter().zip(q_pi) {
        for (marginal, &action) in marginals.iter_mut().zip(policy.row(0)) {
            marginal[action] += p;
        }
    }
    Ok(marginals)
}

/// Pick one action per control factor from the policy posterior.
///
/// Deterministic mode returns the arg-max of each marginal. Stochastic mode
/// draws from `softmax(alpha * ln marginal)` using `rng`.
pub fn sample_action<R: Rng>(
    q_pi: ArrayView1<'_, f64>,
    policies: &PolicyBatch,
    num_controls: &[usize],
    mode: ActionSelection,
    alpha: f64,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let marginals = get_marginals(q_pi, policies, num_controls)?;
    let action: Vec<usize> = match mode {
        ActionSelection::Deterministic => marginals.iter().map(|m| argmax(m.view())).collect(),
        ActionSelection::Stochastic => {
            check_alpha(alpha)?;
            marginals
                .iter()
                .map(|m| {
                    let sharpened = softmax((m.mapv(log_stable) * alpha).view());
                    sample_categorical(sharpened.view(), rng)
                })
                .collect()
        }
    };
    debug!(%mode, ?action, "selected action");
    Ok(action)
}

/// Index of one whole policy drawn from the posterior.
///
/// Stochastic mode sharpens the posterior with `alpha` before sampling.
pub fn select_policy_index<R: Rng>(
    q_pi: ArrayView1<'_, f64>,
    policies: &PolicyBatch,
    mode: ActionSelection,
    alpha: f64,
    rng: &mut R,
) -> Result<usize> {
    check_posterior(q_pi, policies)?;
    match mode {
        ActionSelection::Deterministic => Ok(argmax(q_pi)),
        ActionSelection::Stochastic => {
            check_alpha(alpha)?;
            let sharpened = softmax((q_pi.mapv(log_stable) * alpha).view());
            Ok(sample_categorical(sharpened.view(), rng))
        }
    }
}

/// First-step action vector of a policy drawn from the posterior.
pub fn sample_policy<R: Rng>(
    q_pi: ArrayView1<'_, f64>,
    policies: &PolicyBatch,
    mode: ActionSelection,
    alpha: f64,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let idx = select_policy_index(q_pi, policies, mode, alpha, rng)?;
    debug!(%mode, policy = idx, "selected policy");
    Ok(policies.first_action(idx))
}

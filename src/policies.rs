//! Candidate policies: fixed action sequences over the planning horizon.
//!
//! A policy is a `(horizon, num_factors)` matrix of action indices. A batch
//! stacks identically shaped policies along a leading axis.

use ndarray::{Array2, Array3, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Ordered, identically shaped collection of policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyBatch {
    actions: Array3<usize>,
}

impl PolicyBatch {
    /// Wrap a `(num_policies, horizon, num_factors)` action array.
    pub fn new(actions: Array3<usize>) -> Self {
        Self { actions }
    }

    /// Stack individual policy matrices, which must all share one shape.
    pub fn from_policies(policies: &[Array2<usize>]) -> Result<Self> {
        let Some(first) = policies.first() else {
            return Err(Error::Empty {
                what: "policy list".to_string(),
            });
        };
        let shape = first.dim();
        let mut actions = Array3::zeros((policies.len(), shape.0, shape.1));
        for (idx, (mut slot, policy)) in actions.outer_iter_mut().zip(policies).enumerate() {
            if policy.dim() != shape {
                return Err(Error::shape(format!("policy {idx}"), shape, policy.dim()));
            }
            slot.assign(policy);
        }
        Ok(Self { actions })
    }

    pub fn len(&self) -> usize {
        self.actions.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn horizon(&self) -> usize {
        self.actions.len_of(Axis(1))
    }

    pub fn num_factors(&self) -> usize {
        self.actions.len_of(Axis(2))
    }

    /// The `(horizon, num_factors)` matrix of policy `idx`.
    pub fn policy(&self, idx: usize) -> ArrayView2<'_, usize> {
        self.actions.index_axis(Axis(0), idx)
    }

    /// Action vector the policy takes at its first timestep.
    pub fn first_action(&self, idx: usize) -> Vec<usize> {
        self.actions.index_axis(Axis(0), idx).row(0).to_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = ArrayView2<'_, usize>> {
        self.actions.outer_iter()
    }

    pub fn as_array(&self) -> &Array3<usize> {
        &self.actions
    }

    /// Check the batch against per-factor control cardinalities.
    pub fn validate_against(&self, num_controls: &[usize]) -> Result<()> {
        if self.is_empty() {
            return Err(Error::Empty {
                what: "policy batch".to_string(),
            });
        }
        if self.horizon() == 0 {
            return Err(Error::Empty {
                what: "policy horizon".to_string(),
            });
        }
        if self.num_factors() != num_controls.len() {
            return Err(Error::FactorCountMismatch {
                policy_factors: self.num_factors(),
                model_factors: num_controls.len(),
            });
        }
        for ((policy, timestep, factor), &action) in self.actions.indexed_iter() {
            if action >= num_controls[factor] {
                return Err(Error::ActionOutOfRange {
                    policy,
                    timestep,
                    factor,
                    action,
                    num_controls: num_controls[factor],
                });
            }
        }
        Ok(())
    }
}

/// Enumerate every policy of length `policy_len`.
///
/// When `num_controls` is omitted a factor gets as many actions as it has
/// states if it is controllable, and a single no-op action otherwise. When
/// `control_fac_idx` is omitted it defaults to the factors with more than one
/// action (or to every factor, when `num_controls` is omitted too).
///
/// The result is the Cartesian product of per-timestep, per-factor actions
/// with the last factor of the last timestep varying fastest.
///
/// # Examples
///
/// ```
/// use aif_control::policies::construct_policies;
///
/// let policies = construct_policies(&[2, 2], None, 2, None).unwrap();
/// assert_eq!(policies.len(), 16);
/// assert_eq!(policies.first_action(0), vec![0, 0]);
/// ```
pub fn construct_policies(
    num_states: &[usize],
    num_controls: Option<&[usize]>,
    policy_len: usize,
    control_fac_idx: Option<&[usize]>,
) -> Result<PolicyBatch> {
    let num_factors = num_states.len();
    if num_factors == 0 {
        return Err(Error::Empty {
            what: "state factor list".to_string(),
        });
    }
    if policy_len == 0 {
        return Err(Error::InvalidConfiguration {
            message: "policy length must be at least 1".to_string(),
        });
    }
    if let Some(indices) = control_fac_idx
        && let Some(&bad) = indices.iter().find(|&&f| f >= num_factors)
    {
        return Err(Error::DependencyOutOfRange {
            kind: "controllable factor list".to_string(),
            owner: 0,
            index: bad,
            num_factors,
        });
    }

    let controls: Vec<usize> = match num_controls {
        Some(given) => {
            if given.len() != num_factors {
                return Err(Error::shape("num_controls", num_factors, given.len()));
            }
            given.to_vec()
        }
        None => {
            let controllable: Vec<usize> = match control_fac_idx {
                Some(indices) => indices.to_vec(),
                None => (0..num_factors).collect(),
            };
            (0..num_factors)
                .map(|f| if controllable.contains(&f) { num_states[f] } else { 1 })
                .collect()
        }
    };
    if let Some(f) = controls.iter().position(|&n| n == 0) {
        return Err(Error::Empty {
            what: format!("control set of factor {f}"),
        });
    }

    let too_large = || Error::InvalidConfiguration {
        message: format!(
            "policy space for controls {controls:?} over {policy_len} steps is too large"
        ),
    };
    // the action array holds total * policy_len * num_factors entries and
    // ndarray caps any array at isize::MAX elements
    let slots = num_factors.checked_mul(policy_len).ok_or_else(too_large)?;
    let total = controls
        .iter()
        .cycle()
        .take(slots)
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .ok_or_else(too_large)?;
    total
        .checked_mul(slots)
        .filter(|&n| n <= isize::MAX as usize)
        .ok_or_else(too_large)?;
    let radices: Vec<usize> = controls.iter().copied().cycle().take(slots).collect();
    debug!(
        num_policies = total,
        policy_len,
        ?controls,
        "enumerating policies"
    );

    let mut actions = Array3::zeros((total, policy_len, num_factors));
    for (n, mut policy) in actions.outer_iter_mut().enumerate() {
        let mut rem = n;
        for (pos, &radix) in radices.iter().enumerate().rev() {
            policy[[pos / num_factors, pos % num_factors]] = rem % radix;
            rem /= radix;
        }
    }
    Ok(PolicyBatch { actions })
}

//! Scoring one policy by rolling it forward through the horizon.

use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{
    inductive::{ReachabilityTable, calc_inductive_value_t},
    rollout::{compute_expected_obs, compute_expected_state},
    types::EfeTerms,
};
use crate::{
    Error, Result,
    efe::{calc_pa_info_gain, calc_pb_info_gain, compute_expected_utility, compute_info_gain},
    model::GenerativeModel,
};

/// Per-term contributions to a policy's negative expected free energy,
/// summed over the horizon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EfeBreakdown {
    pub utility: f64,
    pub states_info_gain: f64,
    pub param_info_gain: f64,
    pub inductive_value: f64,
}

impl EfeBreakdown {
    /// Total score: the negative expected free energy.
    pub fn neg_efe(&self) -> f64 {
        self.utility + self.states_info_gain + self.param_info_gain + self.inductive_value
    }
}

/// Reachability table and strength used by the inductive term.
#[derive(Debug, Clone, Copy)]
pub struct InductiveContext<'a> {
    pub table: &'a ReachabilityTable,
    pub epsilon: f64,
}

impl<'a> InductiveContext<'a> {
    pub fn new(table: &'a ReachabilityTable, epsilon: f64) -> Self {
        Self { table, epsilon }
    }
}

/// Fail when an enabled term lacks the input it needs.
pub(crate) fn check_term_inputs(
    model: &GenerativeModel,
    terms: &EfeTerms,
    inductive: Option<InductiveContext<'_>>,
) -> Result<()> {
    if terms.use_param_info_gain && model.pa().is_none() {
        return Err(Error::MissingInput {
            input: "observation pseudo-counts (pA)".to_string(),
            feature: "parameter information gain".to_string(),
        });
    }
    if terms.use_inductive && inductive.is_none() {
        return Err(Error::MissingInput {
            input: "reachability table".to_string(),
            feature: "inductive planning".to_string(),
        });
    }
    Ok(())
}

/// Roll `policy` forward from `qs_init`, accumulating every enabled term.
///
/// The rollout is a strict fold over timesteps: each step's predicted belief
/// is the next step's prior. Intermediate beliefs are dropped.
pub fn compute_efe_breakdown(
    qs_init: &[Array1<f64>],
    model: &GenerativeModel,
    policy: ArrayView2<'_, usize>,
    terms: &EfeTerms,
    inductive: Option<InductiveContext<'_>>,
) -> Result<EfeBreakdown> {
    check_term_inputs(model, terms, inductive)?;

    let (_, breakdown) = policy.outer_iter().try_fold(
        (qs_init.to_vec(), EfeBreakdown::default()),
        |(qs, mut acc), action| -> Result<_> {
            let qs_next = compute_expected_state(&qs, model.b(), action, model.b_dependencies())?;
            let qo = compute_expected_obs(&qs_next, model.a(), model.a_dependencies())?;

            if terms.use_utility {
                acc.utility += compute_expected_utility(&qo, model.c())?;
            }
            if terms.use_states_info_gain {
                acc.states_info_gain +=
                    compute_info_gain(&qs_next, &qo, model.a(), model.a_dependencies())?;
            }
            if terms.use_param_info_gain {
                if let Some(pa) = model.pa() {
                    acc.param_info_gain +=
                        calc_pa_info_gain(pa, &qo, &qs_next, model.a_dependencies())?;
                }
                if let Some(pb) = model.pb() {
                    acc.param_info_gain +=
                        calc_pb_info_gain(pb, &qs_next, &qs, model.b_dependencies())?;
                }
            }
            if terms.use_inductive
                && let Some(ctx) = inductive
            {
                acc.inductive_value +=
                    calc_inductive_value_t(qs_init, &qs_next, ctx.table, ctx.epsilon)?;
            }
            trace!(neg_efe = acc.neg_efe(), "rolled policy one step");
            Ok((qs_next, acc))
        },
    )?;
    Ok(breakdown)
}

/// Negative expected free energy of one policy.
pub fn compute_neg_efe_policy(
    qs_init: &[Array1<f64>],
    model: &GenerativeModel,
    policy: ArrayView2<'_, usize>,
    terms: &EfeTerms,
    inductive: Option<InductiveContext<'_>>,
) -> Result<f64> {
    compute_efe_breakdown(qs_init, model, policy, terms, inductive).map(|b| b.neg_efe())
}

#[cfg(test)]
mod tests {
    use ndarray::{Array3, ArrayD, array};

    use super::*;
    use crate::control::inductive::generate_i_matrix;

    fn identity_b(n: usize, controls: usize) -> ArrayD<f64> {
        Array3::from_shape_fn((n, n, controls), |(s, v, _)| if s == v { 1.0 } else { 0.0 }).into_dyn()
    }

    fn model() -> GenerativeModel {
        GenerativeModel::new(
            vec![array![[0.8, 0.2], [0.2, 0.8]].into_dyn()],
            vec![identity_b(2, 2)],
            vec![array![0.0, -1.0]],
        )
    }

    #[test]
    fn all_terms_off_scores_zero() {
        let qs = vec![array![0.3, 0.7]];
        let score = compute_neg_efe_policy(
            &qs,
            &model(),
            array![[0], [1], [0]].view(),
            &EfeTerms::none(),
            None,
        )
        .unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn terms_accumulate_over_horizon() {
        let qs = vec![array![0.5, 0.5]];
        let terms = EfeTerms::none().with_utility(true);
        let one = compute_neg_efe_policy(&qs, &model(), array![[0]].view(), &terms, None).unwrap();
        let three =
            compute_neg_efe_policy(&qs, &model(), array![[0], [0], [0]].view(), &terms, None).unwrap();
        assert!((three - 3.0 * one).abs() < 1e-12);
    }

    #[test]
    fn breakdown_sums_to_score() {
        let qs = vec![array![0.9, 0.1]];
        let terms = EfeTerms::default();
        let breakdown =
            compute_efe_breakdown(&qs, &model(), array![[1], [0]].view(), &terms, None).unwrap();
        let score = compute_neg_efe_policy(&qs, &model(), array![[1], [0]].view(), &terms, None).unwrap();
        assert_eq!(breakdown.neg_efe(), score);
        assert_eq!(breakdown.param_info_gain, 0.0);
        assert_eq!(breakdown.inductive_value, 0.0);
    }

    #[test]
    fn param_info_gain_requires_pseudo_counts() {
        let qs = vec![array![0.5, 0.5]];
        let terms = EfeTerms::none().with_param_info_gain(true);
        let err = compute_neg_efe_policy(&qs, &model(), array![[0]].view(), &terms, None).unwrap_err();
        assert!(matches!(err, Error::MissingInput { .. }));
    }

    #[test]
    fn transition_pseudo_counts_surface_as_unsupported() {
        let qs = vec![array![0.5, 0.5]];
        let m = model()
            .with_pa(vec![array![[1.0, 1.0], [1.0, 1.0]].into_dyn()])
            .with_pb(vec![identity_b(2, 2)]);
        let terms = EfeTerms::none().with_param_info_gain(true);
        let err = compute_neg_efe_policy(&qs, &m, array![[0]].view(), &terms, None).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFeature { .. }));
    }

    #[test]
    fn inductive_term_requires_table() {
        let qs = vec![array![0.5, 0.5]];
        let terms = EfeTerms::none().with_inductive(true);
        let err = compute_neg_efe_policy(&qs, &model(), array![[0]].view(), &terms, None).unwrap_err();
        assert!(matches!(err, Error::MissingInput { .. }));
    }

    #[test]
    fn inductive_term_uses_initial_belief() {
        // two states, action 1 swaps them; goal is state 1
        let swap = Array3::from_shape_fn((2, 2, 2), |(s, v, u)| {
            let target = if u == 0 { v } else { 1 - v };
            if s == target { 1.0 } else { 0.0 }
        })
        .into_dyn();
        let m = GenerativeModel::new(
            vec![array![[0.5, 0.5], [0.5, 0.5]].into_dyn()],
            vec![swap.clone()],
            vec![array![0.0, 0.0]],
        );
        let table = generate_i_matrix(&[array![0.0, 1.0]], &[swap], 0.5, 2).unwrap();
        let ctx = InductiveContext::new(&table, 1e-3);
        let terms = EfeTerms::none().with_inductive(true);
        let qs = vec![array![1.0, 0.0]];
        let stay = compute_neg_efe_policy(&qs, &m, array![[0]].view(), &terms, Some(ctx)).unwrap();
        let go = compute_neg_efe_policy(&qs, &m, array![[1]].view(), &terms, Some(ctx)).unwrap();
        assert!(go > stay);
        assert_eq!(go, 0.0);
    }
}

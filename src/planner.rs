//! One-call planning over a fixed model and configuration.

use ndarray::Array1;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::{
    Result,
    config::PlannerConfig,
    control::{
        EfeBreakdown, InductiveContext, PolicyPosterior, ReachabilityTable, generate_i_matrix,
        get_marginals, sample_action, update_posterior_policies,
    },
    model::GenerativeModel,
    policies::PolicyBatch,
};

/// Everything produced by one planning step.
#[derive(Debug, Clone, Serialize)]
pub struct PlanOutcome {
    pub q_pi: Array1<f64>,
    pub neg_efe: Array1<f64>,
    pub breakdowns: Vec<EfeBreakdown>,
    /// Per control factor, posterior mass of each first-step action
    pub marginals: Vec<Array1<f64>>,
    /// Selected action, one index per factor
    pub action: Vec<usize>,
}

/// A validated model paired with planner settings.
///
/// # Examples
///
/// ```
/// use ndarray::{array, Array3};
/// use aif_control::{GenerativeModel, Planner, PlannerConfig};
/// use aif_control::policies::construct_policies;
///
/// let b = Array3::from_shape_fn((2, 2, 2), |(s, v, u)| {
///     let target = if u == 0 { v } else { 1 - v };
///     if s == target { 1.0 } else { 0.0 }
/// });
/// let model = GenerativeModel::new(
///     vec![array![[1.0, 0.0], [0.0, 1.0]].into_dyn()],
///     vec![b.into_dyn()],
///     vec![array![0.0, 3.0]],
/// );
/// let planner = Planner::new(model, PlannerConfig::default().with_seed(1))?;
/// let policies = construct_policies(&[2], None, 1, None)?;
/// let outcome = planner.plan(&[array![1.0, 0.0]], &policies, &mut planner.config().rng())?;
/// assert_eq!(outcome.action, vec![1]);
/// # Ok::<(), aif_control::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Planner {
    model: GenerativeModel,
    config: PlannerConfig,
    reachability: Option<ReachabilityTable>,
}

impl Planner {
    /// Validate `model` and `config` and build a planner without goals.
    pub fn new(model: GenerativeModel, config: PlannerConfig) -> Result<Self> {
        model.validate()?;
        config.validate()?;
        Ok(Self {
            model,
            config,
            reachability: None,
        })
    }

    /// Attach goal indicators, building the reachability table for the inductive term.
    pub fn with_goals(mut self, goals: &[Array1<f64>]) -> Result<Self> {
        let table = generate_i_matrix(
            goals,
            self.model.b(),
            self.config.inductive.threshold,
            self.config.inductive.depth,
        )?;
        self.reachability = Some(table);
        Ok(self)
    }

    pub fn model(&self) -> &GenerativeModel {
        &self.model
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn reachability(&self) -> Option<&ReachabilityTable> {
        self.reachability.as_ref()
    }

    fn inductive_context(&self) -> Option<InductiveContext<'_>> {
        self.reachability
            .as_ref()
            .map(|table| InductiveContext::new(table, self.config.inductive.epsilon))
    }

    /// Posterior over `policies` from the current belief `qs`.
    pub fn infer_policies(
        &self,
        qs: &[Array1<f64>],
        policies: &PolicyBatch,
    ) -> Result<PolicyPosterior> {
        update_posterior_policies(
            policies,
            qs,
            &self.model,
            self.config.gamma,
            &self.config.terms,
            self.inductive_context(),
        )
    }

    /// Score `policies`, marginalise their first actions and select one action.
    pub fn plan<R: Rng>(
        &self,
        qs: &[Array1<f64>],
        policies: &PolicyBatch,
        rng: &mut R,
    ) -> Result<PlanOutcome> {
        let posterior = self.infer_policies(qs, policies)?;
        let num_controls = self.model.num_controls();
        let marginals = get_marginals(posterior.q_pi.view(), policies, &num_controls)?;
        let action = sample_action(
            posterior.q_pi.view(),
            policies,
            &num_controls,
            self.config.action_selection,
            self.config.alpha,
            rng,
        )?;
        debug!(?action, best_policy = posterior.best_policy(), "planning step done");
        Ok(PlanOutcome {
            q_pi: posterior.q_pi,
            neg_efe: posterior.neg_efe,
            breakdowns: posterior.breakdowns,
            marginals,
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array3, ArrayD, array};

    use super::*;
    use crate::{control::EfeTerms, policies::construct_policies};

    fn line_b(n: usize) -> ArrayD<f64> {
        Array3::from_shape_fn((n, n, 3), |(s, v, u)| {
            let target = match u {
                0 => v,
                1 => v.saturating_sub(1),
                _ => (v + 1).min(n - 1),
            };
            if s == target { 1.0 } else { 0.0 }
        })
        .into_dyn()
    }

    fn flat_model(n: usize) -> GenerativeModel {
        GenerativeModel::new(
            vec![ArrayD::from_elem(vec![2, n], 0.5)],
            vec![line_b(n)],
            vec![array![0.0, 0.0]],
        )
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = PlannerConfig::default().with_gamma(f64::INFINITY);
        assert!(Planner::new(flat_model(3), config).is_err());
    }

    #[test]
    fn inductive_term_steers_toward_goal_without_preferences() {
        let mut config = PlannerConfig::default()
            .with_terms(EfeTerms::none().with_inductive(true))
            .with_seed(0);
        config.inductive.depth = 4;
        config.inductive.threshold = 0.5;
        let planner = Planner::new(flat_model(4), config)
            .unwrap()
            .with_goals(&[array![0.0, 0.0, 0.0, 1.0]])
            .unwrap();
        let policies = construct_policies(&[4], Some(&[3]), 1, None).unwrap();
        let qs = vec![array![0.0, 1.0, 0.0, 0.0]];
        let outcome = planner
            .plan(&qs, &policies, &mut planner.config().rng())
            .unwrap();
        assert_eq!(outcome.action, vec![2]);
        assert!((outcome.marginals[0].sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn inductive_flag_without_goals_is_missing_input() {
        let config = PlannerConfig::default().with_terms(EfeTerms::none().with_inductive(true));
        let planner = Planner::new(flat_model(3), config).unwrap();
        let policies = construct_policies(&[3], Some(&[3]), 1, None).unwrap();
        let err = planner
            .infer_policies(&[array![1.0, 0.0, 0.0]], &policies)
            .unwrap_err();
        assert!(matches!(err, crate::Error::MissingInput { .. }));
    }
}

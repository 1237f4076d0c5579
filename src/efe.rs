//! Expected-free-energy terms for a single forecast step.
//!
//! Every function here scores one predicted state/observation pair and
//! returns a contribution to the *negative* expected free energy, so larger
//! is better:
//! - expected utility: `Σ_m qo_m · C_m`
//! - state information gain: `H[qo_m] - E_qs[H[A_m]]`, summed over modalities
//! - parameter information gain about `pA`, from [`masked_wnorm`]
//!
//! The transition-side parameter term is not implemented and says so.

use ndarray::{Array1, ArrayD, Axis};

use crate::{
    Error, Result,
    control::rollout::gather,
    tensor::{factor_dot_keep_first, factor_dot_scalar},
    utils::{entropy, log_stable_array, masked_wnorm},
};

/// Expected log-preference of the predicted observations.
pub fn compute_expected_utility(qo: &[Array1<f64>], c: &[Array1<f64>]) -> Result<f64> {
    if qo.len() != c.len() {
        return Err(Error::shape("preference count", qo.len(), c.len()));
    }
    let mut utility = 0.0;
    for (m, (o_m, c_m)) in qo.iter().zip(c).enumerate() {
        if o_m.len() != c_m.len() {
            return Err(Error::shape(format!("C[{m}]"), o_m.len(), c_m.len()));
        }
        utility += o_m.dot(c_m);
    }
    Ok(utility)
}

/// Expected reduction in observation entropy from resolving hidden states.
///
/// For each modality this is the entropy of the predictive observation
/// distribution minus the expected entropy of the likelihood columns under
/// the predicted state belief (a mutual information between states and
/// observations). Logarithms are floored, so zero entries contribute zero.
///
/// # Arguments
///
/// * `qs` - Predicted belief over each hidden-state factor
/// * `qo` - Predicted observation distribution per modality, `A[m]` applied to `qs`
/// * `a` - Likelihood tensors, observation axis first
/// * `a_dependencies` - Factors each modality depends on, in `A[m]` axis order
///
/// # Returns
///
/// The summed gain over modalities in nats (never negative up to rounding),
/// or a shape error when the counts or axes disagree.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use aif_control::efe::compute_info_gain;
///
/// // A noiseless sensor resolves a coin flip completely
/// let a = vec![array![[1.0, 0.0], [0.0, 1.0]].into_dyn()];
/// let qs = vec![array![0.5, 0.5]];
/// let qo = vec![array![0.5, 0.5]];
/// let gain = compute_info_gain(&qs, &qo, &a, &[vec![0]])?;
/// assert!((gain - std::f64::consts::LN_2).abs() < 1e-9);
///
/// // A certain belief has nothing left to learn
/// let certain = vec![array![1.0, 0.0]];
/// let gain = compute_info_gain(&certain, &[array![1.0, 0.0]], &a, &[vec![0]])?;
/// assert!(gain.abs() < 1e-9);
/// # Ok::<(), aif_control::Error>(())
/// ```
pub fn compute_info_gain(
    qs: &[Array1<f64>],
    qo: &[Array1<f64>],
    a: &[ArrayD<f64>],
    a_dependencies: &[Vec<usize>],
) -> Result<f64> {
    if qo.len() != a.len() || a_dependencies.len() != a.len() {
        return Err(Error::shape("modality count", a.len(), qo.len()));
    }
    let mut info_gain = 0.0;
    for ((qo_m, a_m), deps) in qo.iter().zip(a).zip(a_dependencies) {
        let h_qo = entropy(qo_m.view());
        let h_a = -(a_m * &log_stable_array(a_m)).sum_axis(Axis(0));
        let relevant = gather(qs, deps)?;
        let expected_h_a = factor_dot_scalar(h_a.view(), &relevant)?;
        info_gain += h_qo - expected_h_a;
    }
    Ok(info_gain)
}

/// Expected information gain about the Dirichlet parameters of `A`.
///
/// Uses the weighted-normalised counts (zeroed where a count is zero),
/// contracted with the dependent state beliefs and the predicted
/// observations. The sign is chosen so the gain is non-negative.
pub fn calc_pa_info_gain(
    pa: &[ArrayD<f64>],
    qo: &[Array1<f64>],
    qs: &[Array1<f64>],
    a_dependencies: &[Vec<usize>],
) -> Result<f64> {
    if pa.len() != qo.len() || a_dependencies.len() != qo.len() {
        return Err(Error::shape("pA modality count", qo.len(), pa.len()));
    }
    let mut info_gain = 0.0;
    for (m, ((pa_m, qo_m), deps)) in pa.iter().zip(qo).zip(a_dependencies).enumerate() {
        let wa = masked_wnorm(pa_m);
        let relevant = gather(qs, deps)?;
        let expected_w = factor_dot_keep_first(wa.view(), &relevant)?;
        if expected_w.len() != qo_m.len() {
            return Err(Error::shape(format!("pA[{m}]"), qo_m.len(), expected_w.len()));
        }
        info_gain -= qo_m.dot(&expected_w);
    }
    Ok(info_gain)
}

/// Expected information gain about the Dirichlet parameters of `B`.
///
/// Not implemented: always returns [`Error::UnsupportedFeature`] rather than a
/// zero that would read as "no parameter uncertainty".
pub fn calc_pb_info_gain(
    _pb: &[ArrayD<f64>],
    _qs_next: &[Array1<f64>],
    _qs_prev: &[Array1<f64>],
    _b_dependencies: &[Vec<usize>],
) -> Result<f64> {
    Err(Error::UnsupportedFeature {
        feature: "transition-model (pB) parameter information gain".to_string(),
    })
}

//! One-step forecasts of hidden states and observations.

use ndarray::{Array1, Array2, ArrayD, ArrayView1, Axis, Ix2};

use crate::{Error, Result, tensor::factor_dot_keep_first};

/// Predict the next belief over every factor after taking `action`.
///
/// Each factor's action-conditioned transition slice is contracted against
/// the beliefs of its declared dependencies only. Couplings between factors
/// beyond those dependencies are not represented, so the forecast is exact
/// only when the declared dependencies capture them.
pub fn compute_expected_state(
    qs_prior: &[Array1<f64>],
    b: &[ArrayD<f64>],
    action: ArrayView1<'_, usize>,
    b_dependencies: &[Vec<usize>],
) -> Result<Vec<Array1<f64>>> {
    if action.len() != b.len() {
        return Err(Error::FactorCountMismatch {
            policy_factors: action.len(),
            model_factors: b.len(),
        });
    }
    if b_dependencies.len() != b.len() {
        return Err(Error::shape("B dependency list count", b.len(), b_dependencies.len()));
    }

    b.iter()
        .zip(action.iter())
        .zip(b_dependencies)
        .enumerate()
        .map(|(f, ((b_f, &u), deps))| {
            let b_u = action_slice(b_f, f, u)?;
            let relevant = gather(qs_prior, deps)?;
            factor_dot_keep_first(b_u, &relevant)
        })
        .collect()
}

/// Self-only rollout that also returns the action-conditioned transition matrices.
///
/// Every `B[f]` must be `(num_states, num_states, num_controls)`.
pub fn compute_expected_state_and_bs(
    qs_prior: &[Array1<f64>],
    b: &[ArrayD<f64>],
    action: ArrayView1<'_, usize>,
) -> Result<(Vec<Array1<f64>>, Vec<Array2<f64>>)> {
    if action.len() != b.len() || qs_prior.len() != b.len() {
        return Err(Error::FactorCountMismatch {
            policy_factors: action.len(),
            model_factors: b.len(),
        });
    }

    let mut qs_next = Vec::with_capacity(b.len());
    let mut slices = Vec::with_capacity(b.len());
    for (f, ((b_f, &u), qs_f)) in b.iter().zip(action.iter()).zip(qs_prior).enumerate() {
        let b_u = action_slice(b_f, f, u)?.to_owned().into_dimensionality::<Ix2>()?;
        if b_u.ncols() != qs_f.len() {
            return Err(Error::shape(format!("B[{f}] columns"), qs_f.len(), b_u.ncols()));
        }
        qs_next.push(b_u.dot(qs_f));
        slices.push(b_u);
    }
    Ok((qs_next, slices))
}

/// Predict the observation distribution of every modality under `qs`.
pub fn compute_expected_obs(
    qs: &[Array1<f64>],
    a: &[ArrayD<f64>],
    a_dependencies: &[Vec<usize>],
) -> Result<Vec<Array1<f64>>> {
    if a_dependencies.len() != a.len() {
        return Err(Error::shape("A dependency list count", a.len(), a_dependencies.len()));
    }
    a.iter()
        .zip(a_dependencies)
        .map(|(a_m, deps)| {
            let relevant = gather(qs, deps)?;
            factor_dot_keep_first(a_m.view(), &relevant)
        })
        .collect()
}

/// Views of the beliefs named by `deps`, in dependency order.
pub(crate) fn gather<'a>(qs: &'a [Array1<f64>], deps: &[usize]) -> Result<Vec<ArrayView1<'a, f64>>> {
    deps.iter()
        .map(|&idx| {
            qs.get(idx).map(|q| q.view()).ok_or_else(|| Error::DependencyOutOfRange {
                kind: "belief lookup".to_string(),
                owner: idx,
                index: idx,
                num_factors: qs.len(),
            })
        })
        .collect()
}

fn action_slice(b_f: &ArrayD<f64>, factor: usize, action: usize) -> Result<ndarray::ArrayViewD<'_, f64>> {
    let Some(control_axis) = b_f.ndim().checked_sub(1) else {
        return Err(Error::Empty {
            what: format!("B[{factor}]"),
        });
    };
    let num_controls = b_f.len_of(Axis(control_axis));
    if action >= num_controls {
        return Err(Error::shape(
            format!("action for factor {factor}"),
            format!("index below {num_controls}"),
            action,
        ));
    }
    Ok(b_f.index_axis(Axis(control_axis), action))
}

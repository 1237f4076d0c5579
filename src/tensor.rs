//! Sparse tensor contraction against factorised beliefs.
//!
//! Likelihood tensors only carry axes for the factors they depend on, so
//! every contraction in the planner is "multiply this tensor by a handful of
//! belief vectors and sum those axes out". [`factor_dot`] is that primitive.
//! Axes listed in `keep_dims` survive; every other axis is paired, in order,
//! with one of the supplied factor vectors.

use ndarray::{Array1, ArrayD, ArrayView1, ArrayViewD, Axis, Ix1, IxDyn};

use crate::{Error, Result};

/// Contract `tensor` against `factors` on every axis not listed in `keep_dims`.
///
/// The i-th factor is paired with the i-th non-kept axis (in ascending axis
/// order). The result has one axis per entry of `keep_dims`; with no kept
/// axes it is zero-dimensional.
///
/// # Examples
///
/// ```
/// use aif_control::tensor::factor_dot;
/// use ndarray::{array, ArrayD, IxDyn};
///
/// // 2x2 matrix times a vector on its second axis
/// let m = ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
/// let x = array![1.0, 0.5];
/// let y = factor_dot(m.view(), &[x.view()], &[0]).unwrap();
/// assert_eq!(y.iter().copied().collect::<Vec<_>>(), vec![2.0, 5.0]);
/// ```
pub fn factor_dot(
    tensor: ArrayViewD<'_, f64>,
    factors: &[ArrayView1<'_, f64>],
    keep_dims: &[usize],
) -> Result<ArrayD<f64>> {
    let ndim = tensor.ndim();
    if ndim != factors.len() + keep_dims.len() {
        return Err(Error::shape(
            "factor_dot rank",
            factors.len() + keep_dims.len(),
            ndim,
        ));
    }
    for (pos, &axis) in keep_dims.iter().enumerate() {
        if axis >= ndim || keep_dims[..pos].contains(&axis) {
            return Err(Error::shape(
                "factor_dot kept axes",
                format!("distinct axes below {ndim}"),
                keep_dims,
            ));
        }
    }

    let contracted: Vec<usize> = (0..ndim).filter(|axis| !keep_dims.contains(axis)).collect();
    for (&axis, factor) in contracted.iter().zip(factors) {
        let len = tensor.len_of(Axis(axis));
        if len != factor.len() {
            return Err(Error::shape(
                format!("factor_dot axis {axis}"),
                len,
                factor.len(),
            ));
        }
    }

    // Highest axis first so the remaining axis indices stay valid.
    let mut result = tensor.to_owned();
    for (&axis, factor) in contracted.iter().zip(factors).rev() {
        result = contract_axis(result.view(), axis, *factor);
    }
    Ok(result)
}

/// [`factor_dot`] keeping only axis 0, returned as a vector.
pub fn factor_dot_keep_first(
    tensor: ArrayViewD<'_, f64>,
    factors: &[ArrayView1<'_, f64>],
) -> Result<Array1<f64>> {
    Ok(factor_dot(tensor, factors, &[0])?.into_dimensionality::<Ix1>()?)
}

/// [`factor_dot`] over every axis, returned as a scalar.
pub fn factor_dot_scalar(tensor: ArrayViewD<'_, f64>, factors: &[ArrayView1<'_, f64>]) -> Result<f64> {
    Ok(factor_dot(tensor, factors, &[])?.sum())
}

fn contract_axis(tensor: ArrayViewD<'_, f64>, axis: usize, weights: ArrayView1<'_, f64>) -> ArrayD<f64> {
    let mut shape = tensor.shape().to_vec();
    shape.remove(axis);
    let mut out = ArrayD::zeros(IxDyn(&shape));
    for (slice, &weight) in tensor.axis_iter(Axis(axis)).zip(weights.iter()) {
        out.scaled_add(weight, &slice);
    }
    out
}

//! Numerical helpers shared by the planner

use ndarray::{Array, Array1, ArrayBase, ArrayD, ArrayView1, Axis, Data, Dimension, Zip};
use rand::{Rng, distr::StandardUniform};

/// Floor applied to probabilities before taking logarithms.
pub const MINVAL: f64 = f64::EPSILON;

/// Tolerance used when checking that a vector is a probability distribution.
pub const NORM_TOLERANCE: f64 = 1e-6;

/// Logarithm with its argument floored at [`MINVAL`], so `log_stable(0.0)` is finite.
///
/// # Examples
///
/// ```
/// use aif_control::utils::{log_stable, MINVAL};
///
/// assert_eq!(log_stable(1.0), 0.0);
/// assert_eq!(log_stable(0.0), MINVAL.ln());
/// ```
pub fn log_stable(x: f64) -> f64 {
    x.max(MINVAL).ln()
}

/// Elementwise [`log_stable`] over an array of any dimension.
pub fn log_stable_array<S, D>(x: &ArrayBase<S, D>) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    x.mapv(log_stable)
}

/// Numerically stable log-sum-exp.
fn logsumexp(values: ArrayView1<'_, f64>) -> f64 {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let sum = values.iter().map(|v| (v - max).exp()).sum::<f64>();
    max + sum.ln()
}

/// Softmax of a vector of logits. The result sums to one.
///
/// # Examples
///
/// ```
/// use aif_control::utils::softmax;
/// use ndarray::array;
///
/// let p = softmax(array![0.0, 0.0].view());
/// assert!((p[0] - 0.5).abs() < 1e-12);
/// ```
pub fn softmax(logits: ArrayView1<'_, f64>) -> Array1<f64> {
    let normaliser = logsumexp(logits);
    logits.mapv(|l| (l - normaliser).exp())
}

/// Shannon entropy `-Σ p ln p`, with the logarithm stabilised.
pub fn entropy(p: ArrayView1<'_, f64>) -> f64 {
    -p.iter().map(|&pi| pi * log_stable(pi)).sum::<f64>()
}

/// Index of the first maximal entry (matches numpy/jax `argmax` tie-breaking).
///
/// Returns 0 for an empty vector.
pub fn argmax(values: ArrayView1<'_, f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (idx, &value) in values.iter().enumerate() {
        if value > best_value {
            best = idx;
            best_value = value;
        }
    }
    best
}

/// Draw one index from a categorical distribution.
///
/// Weights need not be normalised. The last index is returned if rounding
/// keeps the running total below the ticket.
pub fn sample_categorical<R: Rng>(weights: ArrayView1<'_, f64>, rng: &mut R) -> usize {
    debug_assert!(!weights.is_empty());
    let total: f64 = weights.sum();
    let ticket = rng.sample::<f64, _>(StandardUniform) * total;
    let mut cumulative = 0.0;
    for (idx, &weight) in weights.iter().enumerate() {
        cumulative += weight;
        if ticket < cumulative {
            return idx;
        }
    }
    weights.len().saturating_sub(1)
}

/// True when every entry is non-negative and the entries sum to one.
pub fn is_distribution(p: ArrayView1<'_, f64>) -> bool {
    !p.is_empty()
        && p.iter().all(|&v| v.is_finite() && v >= 0.0)
        && (p.sum() - 1.0).abs() <= NORM_TOLERANCE
}

/// Weighted-normalised Dirichlet statistic used for parameter information gain.
///
/// For pseudo-counts `a` whose columns (axis 0) are Dirichlet parameters this
/// returns `1 / Σ_col a - 1 / a`, elementwise. Entries are non-positive (up to
/// the [`MINVAL`] offset) and shrink toward zero as counts grow.
pub fn spm_wnorm(a: &ArrayD<f64>) -> ArrayD<f64> {
    let norm = a.sum_axis(Axis(0)).mapv(|s| 1.0 / s);
    let mut w = a.mapv(|v| -1.0 / (v + MINVAL));
    for mut slice in w.axis_iter_mut(Axis(0)) {
        slice += &norm;
    }
    w
}

/// [`spm_wnorm`] with entries zeroed wherever the pseudo-count is not positive.
pub fn masked_wnorm(a: &ArrayD<f64>) -> ArrayD<f64> {
    let mut w = spm_wnorm(a);
    Zip::from(&mut w).and(a).for_each(|w, &count| {
        if count <= 0.0 {
            *w = 0.0;
        }
    });
    w
}

#[cfg(test)]
mod tests {
    use ndarray::{IxDyn, array};
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn log_stable_is_finite_at_zero() {
        assert!(log_stable(0.0).is_finite());
        assert!(log_stable(-1.0).is_finite());
        assert!((log_stable(std::f64::consts::E) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn softmax_normalises_and_preserves_order() {
        let p = softmax(array![1.0, 3.0, 2.0].view());
        assert!((p.sum() - 1.0).abs() < 1e-12);
        assert!(p[1] > p[2] && p[2] > p[0]);
    }

    #[test]
    fn softmax_survives_large_logits() {
        let p = softmax(array![1000.0, 1000.0].view());
        assert!((p[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn entropy_of_point_mass_is_zero() {
        assert_eq!(entropy(array![1.0, 0.0, 0.0].view()), 0.0);
        let uniform = entropy(array![0.25, 0.25, 0.25, 0.25].view());
        assert!((uniform - 4.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn argmax_prefers_first_of_ties() {
        assert_eq!(argmax(array![0.2, 0.4, 0.4].view()), 1);
        assert_eq!(argmax(array![0.5].view()), 0);
    }

    #[test]
    fn sample_categorical_never_picks_zero_weight() {
        let mut rng = StdRng::seed_from_u64(7);
        let weights = array![0.0, 1.0, 0.0];
        for _ in 0..200 {
            assert_eq!(sample_categorical(weights.view(), &mut rng), 1);
        }
    }

    #[test]
    fn sample_categorical_is_reproducible() {
        let weights = array![0.2, 0.5, 0.3];
        let mut first = StdRng::seed_from_u64(12345);
        let mut second = StdRng::seed_from_u64(12345);
        let a: Vec<usize> = (0..20)
            .map(|_| sample_categorical(weights.view(), &mut first))
            .collect();
        let b: Vec<usize> = (0..20)
            .map(|_| sample_categorical(weights.view(), &mut second))
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn wnorm_matches_closed_form() {
        let counts = ArrayD::from_shape_vec(IxDyn(&[2, 1]), vec![1.0, 3.0]).unwrap();
        let w = spm_wnorm(&counts);
        assert!((w[[0, 0]] - (0.25 - 1.0)).abs() < 1e-12);
        assert!((w[[1, 0]] - (0.25 - 1.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn masked_wnorm_zeroes_empty_counts() {
        let counts = ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![0.0, 2.0, 4.0, 2.0]).unwrap();
        let w = masked_wnorm(&counts);
        assert_eq!(w[[0, 0]], 0.0);
        assert!(w.iter().all(|v| v.is_finite() && *v <= 1e-12));
    }

    #[test]
    fn is_distribution_rejects_unnormalised() {
        assert!(is_distribution(array![0.3, 0.7].view()));
        assert!(!is_distribution(array![0.3, 0.3].view()));
        assert!(!is_distribution(array![1.5, -0.5].view()));
    }
}

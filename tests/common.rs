//! Common fixtures for the aif-control test suite.
//!
//! Random models are drawn column by column from Dirichlet distributions via
//! the Gamma-Dirichlet relationship, so every likelihood is normalised.

#![allow(dead_code)]

use aif_control::GenerativeModel;
use ndarray::{Array1, Array3, ArrayD, Axis, IxDyn};
use rand::{Rng, rngs::StdRng};
use rand_distr::Gamma;

/// Sample from a Dirichlet distribution with concentration `alpha`.
pub fn sample_dirichlet(alpha: &[f64], rng: &mut StdRng) -> Vec<f64> {
    let mut draws: Vec<f64> = alpha
        .iter()
        .map(|&a| {
            let gamma = Gamma::new(a, 1.0).unwrap();
            rng.sample(gamma).max(1e-300)
        })
        .collect();
    let total: f64 = draws.iter().sum();
    draws.iter_mut().for_each(|value| *value /= total);
    draws
}

/// Random normalised belief over `n` states.
pub fn random_belief(n: usize, rng: &mut StdRng) -> Array1<f64> {
    Array1::from(sample_dirichlet(&vec![1.0; n], rng))
}

/// Random tensor of shape `shape` whose axis-0 fibres are distributions.
pub fn random_conditional(shape: &[usize], rng: &mut StdRng) -> ArrayD<f64> {
    let mut tensor = ArrayD::zeros(IxDyn(shape));
    let alpha = vec![1.0; shape[0]];
    for mut lane in tensor.lanes_mut(Axis(0)) {
        lane.assign(&Array1::from(sample_dirichlet(&alpha, rng)));
    }
    tensor
}

/// Random model with dense observation dependencies and self-only transitions.
pub fn random_model(
    num_states: &[usize],
    num_controls: &[usize],
    num_obs: &[usize],
    rng: &mut StdRng,
) -> GenerativeModel {
    let a = num_obs
        .iter()
        .map(|&no| {
            let mut shape = vec![no];
            shape.extend_from_slice(num_states);
            random_conditional(&shape, rng)
        })
        .collect();
    let b = num_states
        .iter()
        .zip(num_controls)
        .map(|(&ns, &nu)| random_conditional(&[ns, ns, nu], rng))
        .collect();
    let c = num_obs
        .iter()
        .map(|&no| Array1::from_shape_fn(no, |_| rng.random_range(-2.0..2.0)))
        .collect();
    GenerativeModel::new(a, b, c)
}

/// Line of `n` states with stay / left / right actions.
pub fn line_transitions(n: usize) -> ArrayD<f64> {
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

/// Identity transitions with `nu` actions that all do nothing.
pub fn identity_transitions(n: usize, nu: usize) -> ArrayD<f64> {
    Array3::from_shape_fn((n, n, nu), |(s, v, _)| if s == v { 1.0 } else { 0.0 }).into_dyn()
}

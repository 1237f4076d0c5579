//! Generative model consumed by the planner.
//!
//! The model is a ragged collection of tensors: one observation likelihood
//! per modality and one transition likelihood per hidden-state factor, each
//! carrying axes only for the factors it declares as dependencies.
//!
//! Shapes:
//! - `A[m]`: `(num_obs[m], num_states[d] for d in a_dependencies[m])`
//! - `B[f]`: `(num_states[f], num_states[d] for d in b_dependencies[f], num_controls[f])`
//! - `C[m]`: `(num_obs[m],)`, log-preferences
//! - `pA`, `pB`: same shapes as `A`, `B`
//!
//! By default every modality depends on every factor and every factor's
//! transitions depend only on that factor.

use ndarray::{Array1, ArrayD, ArrayView1};

use crate::{Error, Result, utils::is_distribution};

/// Observation/transition likelihoods, preferences and optional priors.
#[derive(Debug, Clone)]
pub struct GenerativeModel {
    a: Vec<ArrayD<f64>>,
    b: Vec<ArrayD<f64>>,
    c: Vec<Array1<f64>>,
    e: Option<Array1<f64>>,
    pa: Option<Vec<ArrayD<f64>>>,
    pb: Option<Vec<ArrayD<f64>>>,
    a_dependencies: Vec<Vec<usize>>,
    b_dependencies: Vec<Vec<usize>>,
}

impl GenerativeModel {
    /// Creates a model with dense observation dependencies and self-only transitions.
    ///
    /// Nothing is checked here; call [`GenerativeModel::validate`] once the
    /// builder methods have been applied.
    pub fn new(a: Vec<ArrayD<f64>>, b: Vec<ArrayD<f64>>, c: Vec<Array1<f64>>) -> Self {
        let num_factors = b.len();
        let a_dependencies = vec![(0..num_factors).collect(); a.len()];
        let b_dependencies = (0..num_factors).map(|f| vec![f]).collect();
        Self {
            a,
            b,
            c,
            e: None,
            pa: None,
            pb: None,
            a_dependencies,
            b_dependencies,
        }
    }

    /// Set the habit prior over policies.
    pub fn with_habits(mut self, e: Array1<f64>) -> Self {
        self.e = Some(e);
        self
    }

    /// Set the factor dependencies of each observation modality.
    pub fn with_a_dependencies(mut self, deps: Vec<Vec<usize>>) -> Self {
        self.a_dependencies = deps;
        self
    }

    /// Set the factor dependencies of each transition tensor, normally including the factor itself.
    pub fn with_b_dependencies(mut self, deps: Vec<Vec<usize>>) -> Self {
        self.b_dependencies = deps;
        self
    }

    /// Set Dirichlet pseudo-counts over the observation likelihoods.
    pub fn with_pa(mut self, pa: Vec<ArrayD<f64>>) -> Self {
        self.pa = Some(pa);
        self
    }

    /// Set Dirichlet pseudo-counts over the transition likelihoods.
    pub fn with_pb(mut self, pb: Vec<ArrayD<f64>>) -> Self {
        self.pb = Some(pb);
        self
    }

    pub fn a(&self) -> &[ArrayD<f64>] {
        &self.a
    }

    pub fn b(&self) -> &[ArrayD<f64>] {
        &self.b
    }

    pub fn c(&self) -> &[Array1<f64>] {
        &self.c
    }

    pub fn habits(&self) -> Option<&Array1<f64>> {
        self.e.as_ref()
    }

    pub fn pa(&self) -> Option<&[ArrayD<f64>]> {
        self.pa.as_deref()
    }

    pub fn pb(&self) -> Option<&[ArrayD<f64>]> {
        self.pb.as_deref()
    }

    pub fn a_dependencies(&self) -> &[Vec<usize>] {
        &self.a_dependencies
    }

    pub fn b_dependencies(&self) -> &[Vec<usize>] {
        &self.b_dependencies
    }

    pub fn num_factors(&self) -> usize {
        self.b.len()
    }

    pub fn num_modalities(&self) -> usize {
        self.a.len()
    }

    /// Hidden-state cardinality per factor (axis 0 of each `B[f]`).
    pub fn num_states(&self) -> Vec<usize> {
        self.b.iter().map(|b| b.shape().first().copied().unwrap_or(0)).collect()
    }

    /// Control cardinality per factor (last axis of each `B[f]`).
    pub fn num_controls(&self) -> Vec<usize> {
        self.b.iter().map(|b| b.shape().last().copied().unwrap_or(0)).collect()
    }

    /// Observation cardinality per modality (axis 0 of each `A[m]`).
    pub fn num_obs(&self) -> Vec<usize> {
        self.a.iter().map(|a| a.shape().first().copied().unwrap_or(0)).collect()
    }

    /// Check every shape and dependency invariant.
    pub fn validate(&self) -> Result<()> {
        if self.b.is_empty() {
            return Err(Error::Empty {
                what: "transition model B".to_string(),
            });
        }
        if self.a.is_empty() {
            return Err(Error::Empty {
                what: "observation model A".to_string(),
            });
        }
        let num_factors = self.num_factors();
        let num_states = self.num_states();

        if self.b_dependencies.len() != num_factors {
            return Err(Error::shape(
                "B dependency list count",
                num_factors,
                self.b_dependencies.len(),
            ));
        }
        for (f, (b, deps)) in self.b.iter().zip(&self.b_dependencies).enumerate() {
            check_dependencies("transition factor", f, deps, num_factors)?;
            let mut expected = vec![num_states[f]];
            expected.extend(deps.iter().map(|&d| num_states[d]));
            let shape = b.shape();
            if shape.len() != expected.len() + 1 || shape[..expected.len()] != expected[..] {
                return Err(Error::shape(
                    format!("B[{f}]"),
                    format!("{expected:?} + [num_controls]"),
                    shape,
                ));
            }
            if shape.iter().any(|&n| n == 0) {
                return Err(Error::Empty {
                    what: format!("axis of B[{f}]"),
                });
            }
        }

        if self.a_dependencies.len() != self.a.len() {
            return Err(Error::shape(
                "A dependency list count",
                self.a.len(),
                self.a_dependencies.len(),
            ));
        }
        if self.c.len() != self.a.len() {
            return Err(Error::shape("preference count", self.a.len(), self.c.len()));
        }
        for (m, (a, deps)) in self.a.iter().zip(&self.a_dependencies).enumerate() {
            check_dependencies("modality", m, deps, num_factors)?;
            let shape = a.shape();
            let expected_states: Vec<usize> = deps.iter().map(|&d| num_states[d]).collect();
            if shape.len() != deps.len() + 1 || shape[1..] != expected_states[..] {
                return Err(Error::shape(
                    format!("A[{m}]"),
                    format!("[num_obs] + {expected_states:?}"),
                    shape,
                ));
            }
            if shape[0] == 0 {
                return Err(Error::Empty {
                    what: format!("observation axis of A[{m}]"),
                });
            }
            if self.c[m].len() != shape[0] {
                return Err(Error::shape(format!("C[{m}]"), shape[0], self.c[m].len()));
            }
        }

        if let Some(pa) = &self.pa {
            check_same_shapes("pA", pa, &self.a)?;
        }
        if let Some(pb) = &self.pb {
            check_same_shapes("pB", pb, &self.b)?;
        }
        if let Some(e) = &self.e
            && e.iter().any(|&v| !v.is_finite() || v < 0.0)
        {
            return Err(Error::InvalidConfiguration {
                message: "habit prior entries must be finite and non-negative".to_string(),
            });
        }
        Ok(())
    }

    /// Check that `qs` holds one normalised belief per factor of matching size.
    pub fn validate_beliefs(&self, qs: &[Array1<f64>]) -> Result<()> {
        let num_states = self.num_states();
        if qs.len() != num_states.len() {
            return Err(Error::shape("belief factor count", num_states.len(), qs.len()));
        }
        for (f, (q, &ns)) in qs.iter().zip(&num_states).enumerate() {
            if q.len() != ns {
                return Err(Error::shape(format!("belief over factor {f}"), ns, q.len()));
            }
            check_belief(f, q.view())?;
        }
        Ok(())
    }
}

pub(crate) fn check_belief(factor: usize, q: ArrayView1<'_, f64>) -> Result<()> {
    if is_distribution(q) {
        Ok(())
    } else {
        Err(Error::InvalidBelief {
            factor,
            sum: q.sum(),
        })
    }
}

fn check_dependencies(kind: &str, owner: usize, deps: &[usize], num_factors: usize) -> Result<()> {
    for (pos, &index) in deps.iter().enumerate() {
        if index >= num_factors {
            return Err(Error::DependencyOutOfRange {
                kind: kind.to_string(),
                owner,
                index,
                num_factors,
            });
        }
        if deps[..pos].contains(&index) {
            return Err(Error::DuplicateDependency {
                kind: kind.to_string(),
                owner,
                index,
            });
        }
    }
    Ok(())
}

fn check_same_shapes(name: &str, counts: &[ArrayD<f64>], reference: &[ArrayD<f64>]) -> Result<()> {
    if counts.len() != reference.len() {
        return Err(Error::shape(format!("{name} count"), reference.len(), counts.len()));
    }
    for (i, (p, r)) in counts.iter().zip(reference).enumerate() {
        if p.shape() != r.shape() {
            return Err(Error::shape(format!("{name}[{i}]"), r.shape(), p.shape()));
        }
    }
    Ok(())
}

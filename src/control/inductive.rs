//! Inductive planning: goal reachability by backward induction.
//!
//! For each factor a [`ReachabilityTable`] row `k` marks the states from
//! which a goal state can be reached within `k` steps, using only
//! transitions whose probability exceeds a threshold under some action.
//! The scorer then rewards predicted beliefs that sit strictly closer to the
//! goal than the current (assumed near-deterministic) state.

use ndarray::{Array1, Array2, ArrayD, Axis, Ix2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Error, Result,
    utils::{argmax, log_stable},
};

/// Values above this count as reachable after each propagation step.
const CLAMP_THRESHOLD: f64 = 0.1;

/// Per-factor `(depth, num_states)` tables of {0, 1} reachability flags.
///
/// Every factor carries at least one row (the goal indicator itself);
/// construction and deserialisation both reject tables without one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawReachabilityTable")]
pub struct ReachabilityTable {
    tables: Vec<Array2<f64>>,
}

#[derive(Deserialize)]
struct RawReachabilityTable {
    tables: Vec<Array2<f64>>,
}

impl TryFrom<RawReachabilityTable> for ReachabilityTable {
    type Error = Error;

    fn try_from(raw: RawReachabilityTable) -> Result<Self> {
        Self::new(raw.tables)
    }
}

impl ReachabilityTable {
    /// Wrap precomputed tables, rejecting any factor without rows.
    pub fn new(tables: Vec<Array2<f64>>) -> Result<Self> {
        let table = Self { tables };
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<()> {
        for (f, t) in self.tables.iter().enumerate() {
            if t.nrows() == 0 {
                return Err(Error::Empty {
                    what: format!("reachability table for factor {f}"),
                });
            }
        }
        Ok(())
    }

    pub fn num_factors(&self) -> usize {
        self.tables.len()
    }

    pub fn factor(&self, f: usize) -> Option<&Array2<f64>> {
        self.tables.get(f)
    }

    pub fn tables(&self) -> &[Array2<f64>] {
        &self.tables
    }

    /// Number of backward steps represented (rows per factor).
    pub fn depth(&self) -> usize {
        self.tables.first().map_or(0, |t| t.nrows())
    }

    /// Fewest steps from which `state` of factor `f` reaches the goal, if within depth.
    pub fn steps_to_goal(&self, f: usize, state: usize) -> Option<usize> {
        let table = self.tables.get(f)?;
        if state >= table.ncols() {
            return None;
        }
        table.column(state).iter().position(|&v| v > 0.0)
    }
}

/// Build the reachability table for goal indicators `h` under transitions `b`.
///
/// `b[f]` must be `(num_states, num_states, num_controls)` with
/// `b[f][s, v, u]` the probability of moving from `v` to `s` under `u`. Row 0
/// of each table is `h[f]`; each further row multiplies the thresholded
/// transition relation into the previous row and clamps the result to {0, 1}.
/// With `depth` too small the table stops short of the full transitive closure.
///
/// # Arguments
///
/// * `h` - Goal indicator per factor (1.0 on goal states)
/// * `b` - Transition tensors without cross-factor dependencies
/// * `threshold` - Transitions at or below this probability are ignored
/// * `depth` - Rows per table, at least 1
///
/// # Returns
///
/// A [`ReachabilityTable`] with one `(depth, num_states)` table per factor.
///
/// # Examples
///
/// ```
/// use ndarray::{Array3, array};
/// use aif_control::control::generate_i_matrix;
///
/// // three states on a line, actions stay / left / right
/// let b = Array3::from_shape_fn((3, 3, 3), |(s, v, u)| {
///     let target = match u {
///         0 => v,
///         1 => v.saturating_sub(1),
///         _ => (v + 1).min(2),
///     };
///     if s == target { 1.0 } else { 0.0 }
/// });
/// let table = generate_i_matrix(&[array![0.0, 0.0, 1.0]], &[b.into_dyn()], 0.5, 3)?;
/// assert_eq!(table.factor(0).unwrap().row(1), array![0.0, 1.0, 1.0]);
/// assert_eq!(table.steps_to_goal(0, 0), Some(2));
/// # Ok::<(), aif_control::Error>(())
/// ```
pub fn generate_i_matrix(
    h: &[Array1<f64>],
    b: &[ArrayD<f64>],
    threshold: f64,
    depth: usize,
) -> Result<ReachabilityTable> {
    if h.len() != b.len() {
        return Err(Error::shape("goal indicator count", b.len(), h.len()));
    }
    if depth == 0 {
        return Err(Error::InvalidConfiguration {
            message: "inductive depth must be at least 1".to_string(),
        });
    }

    let mut tables = Vec::with_capacity(h.len());
    for (f, (h_f, b_f)) in h.iter().zip(b).enumerate() {
        let shape = b_f.shape();
        if shape.len() != 3 || shape[0] != shape[1] {
            return Err(Error::shape(
                format!("B[{f}] for inductive planning"),
                "(num_states, num_states, num_controls)",
                shape,
            ));
        }
        let num_states = shape[0];
        if h_f.len() != num_states {
            return Err(Error::shape(format!("goal indicator H[{f}]"), num_states, h_f.len()));
        }

        let reachable = b_f
            .map_axis(Axis(2), |lane| {
                if lane.iter().any(|&p| p > threshold) {
                    1.0
                } else {
                    0.0
                }
            })
            .into_dimensionality::<Ix2>()?;

        let mut table = Array2::zeros((depth, num_states));
        table.row_mut(0).assign(h_f);
        for i in 1..depth {
            let next = reachable
                .dot(&table.row(i - 1))
                .mapv(|v| if v > CLAMP_THRESHOLD { 1.0 } else { 0.0 });
            table.row_mut(i).assign(&next);
        }
        debug!(
            factor = f,
            depth,
            reachable_states = table.row(depth - 1).sum(),
            "built reachability table"
        );
        tables.push(table);
    }
    Ok(ReachabilityTable { tables })
}

/// Inductive value of the predicted beliefs `qs_next` given the current beliefs `qs`.
///
/// Only the most probable current state of each factor is used. If that
/// state first reaches the goal after `n` steps, predicted mass on states
/// that cannot reach the goal within `n - 1` steps costs `ln(epsilon)`.
/// Factors whose current state never reaches a goal contribute nothing.
pub fn calc_inductive_value_t(
    qs: &[Array1<f64>],
    qs_next: &[Array1<f64>],
    table: &ReachabilityTable,
    epsilon: f64,
) -> Result<f64> {
    if qs.len() != table.num_factors() || qs_next.len() != table.num_factors() {
        return Err(Error::shape(
            "inductive factor count",
            table.num_factors(),
            (qs.len(), qs_next.len()),
        ));
    }
    let log_eps = log_stable(epsilon);

    let mut value = 0.0;
    for (f, ((q, q_next), i_f)) in qs.iter().zip(qs_next).zip(table.tables()).enumerate() {
        if q.len() != i_f.ncols() || q_next.len() != i_f.ncols() {
            return Err(Error::shape(
                format!("belief for inductive factor {f}"),
                i_f.ncols(),
                (q.len(), q_next.len()),
            ));
        }
        if i_f.nrows() == 0 {
            return Err(Error::Empty {
                what: format!("reachability table for factor {f}"),
            });
        }
        let idx = argmax(q.view());
        let column = i_f.column(idx);
        let m = argmax(column).saturating_sub(1);
        let path_available = column.sum().clamp(0.0, 1.0);
        let cost = i_f.row(m).mapv(|reach| (1.0 - reach) * log_eps);
        value += path_available * cost.dot(q_next);
    }
    Ok(value)
}

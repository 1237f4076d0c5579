//! JSON planning problems consumed by the CLI
//!
//! Tensors use ndarray's serde encoding:
//! `{"v": 1, "dim": [2, 2], "data": [0.9, 0.1, 0.1, 0.9]}` (row-major).

use std::{fs, path::Path};

use anyhow::{Context, Result};
use ndarray::{Array1, ArrayD};
use serde::{Deserialize, Serialize};

use crate::{
    GenerativeModel, PlannerConfig,
    policies::{PolicyBatch, construct_policies},
};

fn default_horizon() -> usize {
    1
}

/// A generative model, the current belief and what to plan over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningProblem {
    pub a: Vec<ArrayD<f64>>,
    pub b: Vec<ArrayD<f64>>,
    pub c: Vec<Array1<f64>>,
    /// Habit prior over the enumerated policies
    pub e: Option<Array1<f64>>,
    pub pa: Option<Vec<ArrayD<f64>>>,
    pub pb: Option<Vec<ArrayD<f64>>>,
    pub a_dependencies: Option<Vec<Vec<usize>>>,
    pub b_dependencies: Option<Vec<Vec<usize>>>,
    /// Current belief, one distribution per hidden-state factor
    pub qs: Vec<Array1<f64>>,
    #[serde(default = "default_horizon")]
    pub horizon: usize,
    /// Factors whose actions are enumerated; others stay at action 0
    pub control_factors: Option<Vec<usize>>,
    /// Goal indicator per factor for inductive planning
    pub goals: Option<Vec<Array1<f64>>>,
}

impl PlanningProblem {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read problem file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse problem file {}", path.display()))
    }

    /// Assemble the generative model; validation happens in the planner.
    pub fn model(&self) -> GenerativeModel {
        let mut model = GenerativeModel::new(self.a.clone(), self.b.clone(), self.c.clone());
        if let Some(e) = &self.e {
            model = model.with_habits(e.clone());
        }
        if let Some(pa) = &self.pa {
            model = model.with_pa(pa.clone());
        }
        if let Some(pb) = &self.pb {
            model = model.with_pb(pb.clone());
        }
        if let Some(deps) = &self.a_dependencies {
            model = model.with_a_dependencies(deps.clone());
        }
        if let Some(deps) = &self.b_dependencies {
            model = model.with_b_dependencies(deps.clone());
        }
        model
    }

    /// Enumerate every policy over the problem's horizon.
    ///
    /// Factors left out of `control_factors` are pinned to action 0.
    pub fn policies(&self, model: &GenerativeModel) -> crate::Result<PolicyBatch> {
        let mut controls = model.num_controls();
        if let Some(factors) = &self.control_factors {
            for (f, n) in controls.iter_mut().enumerate() {
                if !factors.contains(&f) {
                    *n = 1;
                }
            }
        }
        construct_policies(
            &model.num_states(),
            Some(&controls),
            self.horizon,
            self.control_factors.as_deref(),
        )
    }
}

/// Read a planner configuration from JSON, or use the defaults.
pub fn load_config(path: Option<&Path>) -> Result<PlannerConfig> {
    let Some(path) = path else {
        return Ok(PlannerConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

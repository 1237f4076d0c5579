//! Planner configuration.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    Error, Result,
    control::{ActionSelection, EfeTerms},
};

/// Settings for the inductive reachability table and its cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InductiveConfig {
    /// Transitions at or below this probability are treated as impossible
    pub threshold: f64,
    /// Number of rows (backward steps) in the reachability table
    pub depth: usize,
    /// Predicted mass off the goal path costs `ln(epsilon)`
    pub epsilon: f64,
}

impl Default for InductiveConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            depth: 1,
            epsilon: 1e-3,
        }
    }
}

/// Knobs recognised by policy evaluation and action selection.
///
/// # Examples
///
/// ```
/// use aif_control::PlannerConfig;
/// use aif_control::control::ActionSelection;
///
/// let config = PlannerConfig::default()
///     .with_gamma(8.0)
///     .with_action_selection(ActionSelection::Stochastic)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Precision over policies
    pub gamma: f64,
    /// Precision over actions in stochastic selection
    pub alpha: f64,
    pub action_selection: ActionSelection,
    pub terms: EfeTerms,
    pub inductive: InductiveConfig,
    /// Random seed for reproducible stochastic selection
    pub seed: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            gamma: 16.0,
            alpha: 16.0,
            action_selection: ActionSelection::default(),
            terms: EfeTerms::default(),
            inductive: InductiveConfig::default(),
            seed: None,
        }
    }
}

impl PlannerConfig {
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_action_selection(mut self, mode: ActionSelection) -> Self {
        self.action_selection = mode;
        self
    }

    pub fn with_terms(mut self, terms: EfeTerms) -> Self {
        self.terms = terms;
        self
    }

    pub fn with_inductive(mut self, inductive: InductiveConfig) -> Self {
        self.inductive = inductive;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject values that would make scoring or selection meaningless.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("gamma", self.gamma), ("alpha", self.alpha)] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfiguration {
                    message: format!("{name} must be finite and non-negative, got {value}"),
                });
            }
        }
        if self.inductive.depth == 0 {
            return Err(Error::InvalidConfiguration {
                message: "inductive depth must be at least 1".to_string(),
            });
        }
        let epsilon = self.inductive.epsilon;
        if !(epsilon > 0.0 && epsilon < 1.0) {
            return Err(Error::InvalidConfiguration {
                message: format!("inductive epsilon must lie in (0, 1), got {epsilon}"),
            });
        }
        if !self.inductive.threshold.is_finite() {
            return Err(Error::InvalidConfiguration {
                message: "inductive threshold must be finite".to_string(),
            });
        }
        Ok(())
    }

    /// Pin `seed` for this run, drawing one from the OS if none is configured.
    ///
    /// The drawn seed is logged at `info` so the run can be replayed.
    pub fn with_resolved_seed(mut self) -> Self {
        if self.seed.is_none() {
            self.seed = Some(draw_seed());
        }
        self
    }

    /// Random number generator seeded from `seed`.
    ///
    /// Without a configured seed a fresh one is drawn and logged.
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed.unwrap_or_else(draw_seed))
    }
}

fn draw_seed() -> u64 {
    let seed: u64 = StdRng::from_os_rng().random();
    info!(seed, "no seed configured, drew one from the OS");
    seed
}

//! Core enums and switches for policy evaluation

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// How a concrete action (or policy) is chosen from a posterior.
///
/// **Deterministic** picks the arg-max. **Stochastic** sharpens the
/// distribution with an inverse temperature `alpha` and draws one sample from
/// a caller-supplied random number generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSelection {
    #[default]
    Deterministic,
    Stochastic,
}

impl fmt::Display for ActionSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionSelection::Deterministic => "deterministic",
            ActionSelection::Stochastic => "stochastic",
        };
        f.write_str(label)
    }
}

impl FromStr for ActionSelection {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deterministic" => Ok(ActionSelection::Deterministic),
            "stochastic" => Ok(ActionSelection::Stochastic),
            _ => Err(crate::Error::UnsupportedActionSelection {
                input: s.to_string(),
                expected: "deterministic, stochastic".to_string(),
            }),
        }
    }
}

/// Which terms enter the negative expected free energy.
///
/// Each flag switches one term independently; with every flag off each
/// policy scores exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EfeTerms {
    /// Expected log-preference of predicted observations
    pub use_utility: bool,
    /// Expected information gain about hidden states
    pub use_states_info_gain: bool,
    /// Expected information gain about Dirichlet model parameters
    pub use_param_info_gain: bool,
    /// Goal-reachability bonus from inductive planning
    pub use_inductive: bool,
}

impl Default for EfeTerms {
    fn default() -> Self {
        Self {
            use_utility: true,
            use_states_info_gain: true,
            use_param_info_gain: false,
            use_inductive: false,
        }
    }
}

impl EfeTerms {
    /// Every term switched off.
    pub fn none() -> Self {
        Self {
            use_utility: false,
            use_states_info_gain: false,
            use_param_info_gain: false,
            use_inductive: false,
        }
    }

    pub fn with_utility(mut self, on: bool) -> Self {
        self.use_utility = on;
        self
    }

    pub fn with_states_info_gain(mut self, on: bool) -> Self {
        self.use_states_info_gain = on;
        self
    }

    pub fn with_param_info_gain(mut self, on: bool) -> Self {
        self.use_param_info_gain = on;
        self
    }

    pub fn with_inductive(mut self, on: bool) -> Self {
        self.use_inductive = on;
        self
    }
}

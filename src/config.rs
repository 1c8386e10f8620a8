//! Environment and experiment configuration.
//!
//! `EnvConfig` carries the knobs of the environment core. `ExperimentConfig`
//! names a model and a cost function by registry id, with their parameter
//! maps, and builds a ready environment from them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::env::Environment;
use crate::error::{EnvError, Result};
use crate::registry;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvConfig {
    /// Episode length in time units, warm-up included.
    pub simulation_horizon: usize,
    /// Time units advanced with neutral actions inside `reset`.
    pub time_action_start: usize,
    /// Fraction of a control's current value moved by one nudge.
    pub percentage_shift: f64,
    /// Time units per step.
    pub time_resolution: usize,
    /// `None` draws a fresh seed when the environment is built.
    pub seed: Option<u64>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            simulation_horizon: 200,
            time_action_start: 70,
            percentage_shift: 0.05,
            time_resolution: 1,
            seed: None,
        }
    }
}

impl EnvConfig {
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| Err(EnvError::InvalidConfig { reason });
        if self.simulation_horizon == 0 {
            return fail("simulation_horizon must be positive".into());
        }
        if self.time_resolution == 0 {
            return fail("time_resolution must be positive".into());
        }
        if self.time_action_start > self.simulation_horizon {
            return fail(format!(
                "time_action_start ({}) exceeds simulation_horizon ({})",
                self.time_action_start, self.simulation_horizon
            ));
        }
        if !(0.0..1.0).contains(&self.percentage_shift) {
            return fail(format!(
                "percentage_shift must lie in [0, 1), got {}",
                self.percentage_shift
            ));
        }
        Ok(())
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| EnvError::InvalidConfig {
            reason: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Time units left for the caller once warm-up is done.
    pub fn control_length(&self) -> usize {
        self.simulation_horizon.saturating_sub(self.time_action_start)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperimentConfig {
    pub model_id: String,
    #[serde(default)]
    pub model_params: Value,
    pub cost_id: String,
    #[serde(default)]
    pub cost_params: Value,
    #[serde(default)]
    pub env: EnvConfig,
}

impl ExperimentConfig {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| EnvError::InvalidConfig {
            reason: e.to_string(),
        })
    }

    pub fn build(&self) -> Result<Environment> {
        let model = registry::get_model(&self.model_id, &self.model_params)?;
        let cost_function = registry::get_cost_function(&self.cost_id, &self.cost_params)?;
        Environment::new(cost_function, model, self.env.clone())
    }
}

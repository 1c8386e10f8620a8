//! Per-episode record, allocated on reset and appended on every step.

use serde::Serialize;

use crate::costs::CostEvaluation;

/// State-like series hold one entry per elapsed time unit (plus the initial
/// state); `model_states` holds one entry per step; cost series hold one
/// entry per elapsed time unit, spread evenly over a multi-unit step.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct History {
    pub env_states: Vec<Vec<f64>>,
    pub model_states: Vec<Vec<f64>>,
    pub env_timesteps: Vec<usize>,
    pub actions: Vec<Vec<i8>>,
    pub aggregated_costs: Vec<f64>,
    pub costs: Vec<Vec<f64>>,
}

impl History {
    /// Initial entry at t = 0. The action slot holds the neutral action so
    /// actions stay aligned with states.
    pub(crate) fn start(env_state: Vec<f64>, model_state: Vec<f64>, neutral: Vec<i8>) -> Self {
        Self {
            env_states: vec![env_state],
            model_states: vec![model_state],
            env_timesteps: vec![0],
            actions: vec![neutral],
            aggregated_costs: Vec::new(),
            costs: Vec::new(),
        }
    }

    /// A step ending at `t` that covered `jump_of` units.
    pub(crate) fn record_step(
        &mut self,
        t: usize,
        jump_of: usize,
        action: &[i8],
        env_state: &[f64],
        model_state: &[f64],
    ) {
        for unit in (t + 1 - jump_of)..=t {
            self.actions.push(action.to_vec());
            self.env_states.push(env_state.to_vec());
            self.env_timesteps.push(unit);
        }
        self.model_states.push(model_state.to_vec());
    }

    pub(crate) fn record_costs(&mut self, jump_of: usize, eval: &CostEvaluation) {
        let units = jump_of as f64;
        let per_unit: Vec<f64> = eval.costs.iter().map(|c| c / units).collect();
        for _ in 0..jump_of {
            self.aggregated_costs.push(eval.aggregated / units);
            self.costs.push(per_unit.clone());
        }
    }

    /// Number of recorded states.
    pub fn len(&self) -> usize {
        self.env_states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.env_states.is_empty()
    }
}

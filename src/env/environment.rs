//! The environment core: a dynamical model and a multi-cost function wrapped
//! into a reset/step decision process.
//!
//! Step order matters. Costs are computed from the transition whose current
//! state still carries the cumulative costs of the *previous* step; the state
//! is then rebuilt so the exposed vector includes this step's costs.

use std::cell::RefCell;

use bevy_prng::WyRand;
use tracing::{debug, trace, warn};

use crate::config::EnvConfig;
use crate::costs::{CostContext, CostEvaluation, CostFunction};
use crate::env::history::History;
use crate::env::labels::{LabelSchema, LabelledState};
use crate::error::{EnvError, Result};
use crate::mechanics::{control, control::Nudge, stoch};
use crate::models::Model;

/// Label of the running total of cost component `id_cost`.
pub fn cumulative_cost_label(id_cost: usize) -> String {
    format!("cumulative_cost_{id_cost}")
}

/// A labelled state together with its schema-ordered vector.
#[derive(Clone, Debug, PartialEq)]
pub struct EnvState {
    pub labelled: LabelledState,
    pub vector: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StepInfo {
    pub costs: Vec<f64>,
    pub constraints: Vec<bool>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub observation: Vec<f64>,
    pub aggregated_cost: f64,
    pub done: bool,
    pub info: StepInfo,
}

pub struct Environment {
    model: Box<dyn Model>,
    cost_function: Box<dyn CostFunction>,
    cfg: EnvConfig,
    seed: u64,
    rng: RefCell<WyRand>,
    dim_action: usize,
    schema: LabelSchema,
    /// Position of each agent label in the raw model state.
    agent_index: Vec<usize>,
    normalization_factors: Vec<f64>,
    reset_same: bool,

    t: usize,
    jump_of: usize,
    cumulative_costs: Vec<f64>,
    model_state: Vec<f64>,
    previous: Option<EnvState>,
    current: Option<EnvState>,
    costs: Vec<f64>,
    history: Option<History>,
}

impl Environment {
    pub fn new(
        cost_function: Box<dyn CostFunction>,
        model: Box<dyn Model>,
        cfg: EnvConfig,
    ) -> Result<Self> {
        cfg.validate()?;

        let internal = LabelSchema::new(model.internal_states_labels().to_vec())?;
        let agent_index = model
            .state_labels_for_agent()
            .iter()
            .map(|l| internal.id(l))
            .collect::<Result<Vec<usize>>>()?;

        let controls = model.control_variables().len();
        let ranges = model.control_variables_ranges().len();
        if controls != ranges {
            return Err(EnvError::InvalidConfig {
                reason: format!("{controls} control variables but {ranges} ranges"),
            });
        }

        let nb_costs = cost_function.nb_costs();
        let mut labels = model.state_labels_for_agent().to_vec();
        labels.extend((0..nb_costs).map(cumulative_cost_label));
        let schema = LabelSchema::new(labels)?;

        // Seed is consumed once, here.
        let seed = match cfg.seed {
            Some(s) => s,
            None => stoch::fresh_seed()?,
        };

        Ok(Self {
            normalization_factors: vec![1.0; schema.len()],
            dim_action: controls,
            rng: RefCell::new(stoch::seeded(seed)),
            seed,
            schema,
            agent_index,
            reset_same: false,
            t: 0,
            jump_of: 0,
            cumulative_costs: vec![0.0; nb_costs],
            model_state: Vec::new(),
            previous: None,
            current: None,
            costs: vec![0.0; nb_costs],
            history: None,
            model,
            cost_function,
            cfg,
        })
    }

    /// Replace the identity normalization.
    pub fn with_normalization(mut self, factors: Vec<f64>) -> Result<Self> {
        if factors.len() != self.schema.len() {
            return Err(EnvError::StateLength {
                expected: self.schema.len(),
                actual: factors.len(),
            });
        }
        if let Some(i) = factors.iter().position(|f| *f == 0.0 || !f.is_finite()) {
            return Err(EnvError::InvalidConfig {
                reason: format!(
                    "normalization factor for '{}' must be finite and non-zero",
                    self.schema.labels()[i]
                ),
            });
        }
        self.normalization_factors = factors;
        Ok(self)
    }

    /// Next `reset` restores the previous episode's model configuration.
    /// One-shot: cleared by that reset.
    pub fn reset_same_model(&mut self) {
        self.reset_same = true;
    }

    pub fn reset(&mut self) -> Result<Vec<f64>> {
        self.history = None;
        self.t = 0;
        self.jump_of = 0;
        self.cumulative_costs = vec![0.0; self.cost_function.nb_costs()];
        self.costs = vec![0.0; self.cost_function.nb_costs()];
        self.previous = None;
        self.current = None;

        let same = self.reset_same;
        if same {
            self.model.reset_same_model();
            self.reset_same = false;
        } else {
            self.model.reset(&self.rng);
        }
        self.set_model_state(self.model.current_state())?;

        self.update_previous_env_state();
        self.update_env_state()?;
        let env_state = self.state_vector()?.to_vec();
        self.history = Some(History::start(
            env_state,
            self.model_state.clone(),
            self.neutral_action(),
        ));

        debug!(
            seed = self.seed,
            same_model = same,
            warm_up = self.cfg.time_action_start,
            "environment reset"
        );

        let neutral = self.neutral_action();
        while self.t < self.cfg.time_action_start {
            self.advance(&neutral, self.cfg.time_action_start)?;
        }

        self.observation()
    }

    pub fn step(&mut self, action: &[i8]) -> Result<StepOutcome> {
        self.advance(action, self.cfg.simulation_horizon)
    }

    /// One transition covering `min(time_resolution, limit - t)` time units.
    fn advance(&mut self, action: &[i8], limit: usize) -> Result<StepOutcome> {
        if self.history.is_none() {
            return Err(EnvError::NotReset);
        }
        let nudges = self.validate_action(action)?;
        if self.is_done() {
            return Err(EnvError::EpisodeFinished {
                t: self.t,
                horizon: self.cfg.simulation_horizon,
            });
        }

        let jump_of = self.cfg.time_resolution.min(limit.saturating_sub(self.t)).max(1);
        let next = self.integrate(&nudges, jump_of)?;
        self.jump_of = jump_of;
        self.model_state = next;
        self.t += jump_of;

        self.update_previous_env_state();
        self.update_env_state()?;

        let (previous, state) = self.transition()?;
        let ctx = CostContext {
            jump_of: self.cfg.time_resolution,
        };
        let step_costs = self
            .cost_function
            .costs()
            .iter()
            .map(|c| c.compute_cost(&previous.vector, &state.vector, &self.schema, action, &ctx))
            .collect::<Result<Vec<f64>>>()?;
        for (acc, c) in self.cumulative_costs.iter_mut().zip(&step_costs) {
            *acc += c;
        }

        self.update_env_state()?;

        let (previous, state) = self.transition()?;
        let eval: CostEvaluation = self.cost_function.compute_cost(
            &previous.vector,
            &state.vector,
            &self.schema,
            action,
            &CostContext {
                jump_of: self.jump_of,
            },
        )?;
        let env_state = state.vector.clone();

        let history = self.history.as_mut().ok_or(EnvError::NotReset)?;
        history.record_step(self.t, self.jump_of, action, &env_state, &self.model_state);
        history.record_costs(self.jump_of, &eval);
        self.costs = eval.costs.clone();

        if eval.constraints.iter().any(|c| *c) {
            warn!(t = self.t, constraints = ?eval.constraints, "cost constraint violated");
        }
        let done = self.is_done();
        trace!(t = self.t, jump_of = self.jump_of, cost = eval.aggregated, done, "step");

        Ok(StepOutcome {
            observation: self.normalize(&env_state),
            aggregated_cost: eval.aggregated,
            done,
            info: StepInfo {
                costs: eval.costs,
                constraints: eval.constraints,
            },
        })
    }

    /// Nudge each control by +/- `percentage_shift` of its value, clipped to
    /// its declared range.
    pub fn update_with_action(&mut self, action: &[i8]) -> Result<()> {
        let nudges = self.validate_action(action)?;
        self.apply_nudges(&nudges)
    }

    pub fn sample_action(&self) -> Vec<i8> {
        (0..self.dim_action)
            .map(|_| stoch::signed_unit(&self.rng))
            .collect()
    }

    /* --- accessors --- */

    pub fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    pub fn cost_function(&self) -> &dyn CostFunction {
        self.cost_function.as_ref()
    }

    pub fn config(&self) -> &EnvConfig {
        &self.cfg
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn dim_action(&self) -> usize {
        self.dim_action
    }

    pub fn state_labels(&self) -> &[String] {
        self.schema.labels()
    }

    pub fn label_to_id(&self) -> &LabelSchema {
        &self.schema
    }

    pub fn normalization_factors(&self) -> &[f64] {
        &self.normalization_factors
    }

    pub fn t(&self) -> usize {
        self.t
    }

    pub fn jump_of(&self) -> usize {
        self.jump_of
    }

    pub fn max_episode_steps(&self) -> usize {
        self.cfg.simulation_horizon / self.cfg.time_resolution
    }

    pub fn is_done(&self) -> bool {
        self.t >= self.cfg.simulation_horizon
    }

    pub fn cumulative_costs(&self) -> &[f64] {
        &self.cumulative_costs
    }

    /// Cost vector of the last step.
    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    pub fn model_state(&self) -> &[f64] {
        &self.model_state
    }

    pub fn env_state(&self) -> Option<&EnvState> {
        self.current.as_ref()
    }

    pub fn previous_env_state(&self) -> Option<&EnvState> {
        self.previous.as_ref()
    }

    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }

    /// Normalized current state.
    pub fn observation(&self) -> Result<Vec<f64>> {
        Ok(self.normalize(self.state_vector()?))
    }

    /* --- internals --- */

    fn neutral_action(&self) -> Vec<i8> {
        vec![0; self.dim_action]
    }

    fn validate_action(&self, action: &[i8]) -> Result<Vec<Nudge>> {
        if action.len() != self.dim_action {
            return Err(EnvError::ActionLength {
                expected: self.dim_action,
                actual: action.len(),
            });
        }
        action
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                Nudge::from_unit(value).ok_or(EnvError::InvalidAction { index, value })
            })
            .collect()
    }

    fn apply_nudges(&mut self, nudges: &[Nudge]) -> Result<()> {
        let pct = self.cfg.percentage_shift;
        let controls: Vec<(String, (f64, f64))> = self
            .model
            .control_variables()
            .iter()
            .cloned()
            .zip(self.model.control_variables_ranges().iter().copied())
            .collect();
        let params = self.model.current_internal_params_mut();
        for ((name, (lo, hi)), nudge) in controls.into_iter().zip(nudges) {
            let value = params
                .get_mut(&name)
                .ok_or(EnvError::UnknownLabel { label: name.clone() })?;
            *value = control::shift(*value, *nudge, pct, lo, hi);
        }
        Ok(())
    }

    /// Model hooks, nudges and one integration step. Nothing is committed
    /// here; on failure the model parameters are restored.
    fn integrate(&mut self, nudges: &[Nudge], jump_of: usize) -> Result<Vec<f64>> {
        let params = self.model.current_internal_params().clone();
        let next = self.try_integrate(nudges, jump_of);
        if next.is_err() {
            *self.model.current_internal_params_mut() = params;
        }
        next
    }

    fn try_integrate(&mut self, nudges: &[Nudge], jump_of: usize) -> Result<Vec<f64>> {
        for unit in self.t..self.t + jump_of {
            self.model.on_time_unit(unit);
        }
        self.apply_nudges(nudges)?;
        let last = self
            .model
            .run_n_steps(&self.model_state, 1)?
            .pop()
            .ok_or(EnvError::StateLength {
                expected: self.model.internal_states_labels().len(),
                actual: 0,
            })?;
        self.check_model_state(&last)?;
        Ok(last)
    }

    fn check_model_state(&self, state: &[f64]) -> Result<()> {
        let expected = self.model.internal_states_labels().len();
        if state.len() != expected {
            return Err(EnvError::StateLength {
                expected,
                actual: state.len(),
            });
        }
        Ok(())
    }

    fn set_model_state(&mut self, state: Vec<f64>) -> Result<()> {
        self.check_model_state(&state)?;
        self.model_state = state;
        Ok(())
    }

    fn update_previous_env_state(&mut self) {
        if let Some(current) = &self.current {
            self.previous = Some(current.clone());
        }
    }

    /// Rebuild the labelled state from the raw model state and the cumulative
    /// costs. The first update of an episode also seeds `previous`.
    fn update_env_state(&mut self) -> Result<()> {
        let mut labelled = LabelledState::new();
        for (label, &i) in self
            .model
            .state_labels_for_agent()
            .iter()
            .zip(&self.agent_index)
        {
            labelled.insert(label.clone(), self.model_state[i]);
        }
        for (id_cost, value) in self.cumulative_costs.iter().enumerate() {
            labelled.insert(cumulative_cost_label(id_cost), *value);
        }
        let vector = labelled.to_vector(&self.schema)?;
        let state = EnvState { labelled, vector };
        if self.previous.is_none() {
            self.previous = Some(state.clone());
        }
        self.current = Some(state);
        Ok(())
    }

    fn transition(&self) -> Result<(&EnvState, &EnvState)> {
        match (&self.previous, &self.current) {
            (Some(p), Some(c)) => Ok((p, c)),
            _ => Err(EnvError::NotReset),
        }
    }

    fn state_vector(&self) -> Result<&[f64]> {
        self.current
            .as_ref()
            .map(|s| s.vector.as_slice())
            .ok_or(EnvError::NotReset)
    }

    fn normalize(&self, state: &[f64]) -> Vec<f64> {
        state
            .iter()
            .zip(&self.normalization_factors)
            .map(|(v, f)| v / f)
            .collect()
    }
}

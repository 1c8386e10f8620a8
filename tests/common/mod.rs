// tests/common/mod.rs
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bevy_prng::WyRand;
use rand_core::RngCore;

use world_optim::env::LabelSchema;
use world_optim::{
    CostComponent, CostContext, CostFunction, EnvConfig, Environment, Model, ParamSet, Result,
};

/* ──────────────────────────────────────────────────────────────────────────
Tank: level' = level + inflow per step. One control (inflow).
────────────────────────────────────────────────────────────────────────── */

pub struct Tank {
    pub params: ParamSet,
    pub initial_level: f64,
    pub state: Vec<f64>,
    pub stochastic: bool,
    /// Every `t` passed to `on_time_unit`.
    pub hook_calls: Rc<RefCell<Vec<usize>>>,
    /// When set, integration returns a truncated state.
    pub broken: Rc<Cell<bool>>,
    internal: Vec<String>,
    agent: Vec<String>,
    controls: Vec<String>,
    ranges: Vec<(f64, f64)>,
    stocks: Vec<String>,
    rates: Vec<String>,
    summary: Vec<String>,
}

fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

impl Tank {
    pub fn new(stochastic: bool) -> Self {
        Self::with_agent_labels(stochastic, &["level", "inflow"])
    }

    pub fn with_agent_labels(stochastic: bool, agent: &[&str]) -> Self {
        let params: ParamSet = [("inflow".to_string(), 1.0)].into_iter().collect();
        Self {
            params,
            initial_level: 0.0,
            state: vec![0.0, 1.0, 0.0],
            stochastic,
            hook_calls: Rc::new(RefCell::new(Vec::new())),
            broken: Rc::new(Cell::new(false)),
            internal: strings(&["level", "inflow", "steps"]),
            agent: strings(agent),
            controls: strings(&["inflow"]),
            ranges: vec![(0.5, 2.0)],
            stocks: strings(&["level"]),
            rates: strings(&["inflow"]),
            summary: strings(&["level", "steps"]),
        }
    }

    fn restart(&mut self) {
        self.params.insert("inflow".to_string(), 1.0);
        self.state = vec![self.initial_level, 1.0, 0.0];
    }
}

impl Model for Tank {
    fn stochastic(&self) -> bool {
        self.stochastic
    }
    fn state_labels_for_agent(&self) -> &[String] {
        &self.agent
    }
    fn internal_states_labels(&self) -> &[String] {
        &self.internal
    }
    fn control_variables(&self) -> &[String] {
        &self.controls
    }
    fn control_variables_ranges(&self) -> &[(f64, f64)] {
        &self.ranges
    }
    fn current_internal_params(&self) -> &ParamSet {
        &self.params
    }
    fn current_internal_params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }
    fn reset(&mut self, rng: &RefCell<WyRand>) {
        self.initial_level = if self.stochastic {
            (rng.borrow_mut().next_u64() % 1_000) as f64
        } else {
            0.0
        };
        self.restart();
    }
    fn reset_same_model(&mut self) {
        self.restart();
    }
    fn current_state(&self) -> Vec<f64> {
        self.state.clone()
    }
    fn run_n_steps(&mut self, state: &[f64], n: usize) -> Result<Vec<Vec<f64>>> {
        if self.broken.get() {
            return Ok(vec![vec![state[0]]; n]);
        }
        let inflow = self.params["inflow"];
        let mut level = state[0];
        let mut steps = state[2];
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            level += inflow;
            steps += 1.0;
            out.push(vec![level, inflow, steps]);
        }
        if let Some(last) = out.last() {
            self.state = last.clone();
        }
        Ok(out)
    }
    fn stocks(&self) -> &[String] {
        &self.stocks
    }
    fn rates(&self) -> &[String] {
        &self.rates
    }
    fn summary_labels(&self) -> &[String] {
        &self.summary
    }
    fn year_min(&self) -> f64 {
        2000.0
    }
    fn on_time_unit(&mut self, t: usize) {
        self.hook_calls.borrow_mut().push(t);
    }
}

/* ──────────────────────────────────────────────────────────────────────────
Costs: level (scaled) and action effort (non-zero components).
────────────────────────────────────────────────────────────────────────── */

pub struct LevelCost {
    pub max_cost: Option<f64>,
}

impl CostComponent for LevelCost {
    fn name(&self) -> &str {
        "level"
    }
    fn compute_cost(
        &self,
        _previous_state: &[f64],
        state: &[f64],
        label_to_id: &LabelSchema,
        _action: &[i8],
        others: &CostContext,
    ) -> Result<f64> {
        Ok(0.01 * label_to_id.value(state, "level")? * others.jump_of as f64)
    }
    fn max_cost(&self) -> Option<f64> {
        self.max_cost
    }
}

pub struct EffortCost;

impl CostComponent for EffortCost {
    fn name(&self) -> &str {
        "effort"
    }
    fn compute_cost(
        &self,
        _previous_state: &[f64],
        _state: &[f64],
        _label_to_id: &LabelSchema,
        action: &[i8],
        _others: &CostContext,
    ) -> Result<f64> {
        Ok(action.iter().filter(|a| **a != 0).count() as f64)
    }
}

pub struct Blend {
    pub costs: Vec<Box<dyn CostComponent>>,
    pub beta: f64,
}

impl Blend {
    pub fn new(level_max: Option<f64>) -> Self {
        Self {
            costs: vec![
                Box::new(LevelCost { max_cost: level_max }),
                Box::new(EffortCost),
            ],
            beta: 0.5,
        }
    }
}

impl CostFunction for Blend {
    fn costs(&self) -> &[Box<dyn CostComponent>] {
        &self.costs
    }
    fn aggregate_with(&self, costs: &[f64], weight: f64) -> f64 {
        (1.0 - weight) * costs[0] + weight * costs[1]
    }
    fn aggregate(&self, costs: &[f64]) -> f64 {
        self.aggregate_with(costs, self.beta)
    }
}

pub fn config(horizon: usize, warm_up: usize, resolution: usize) -> EnvConfig {
    EnvConfig {
        simulation_horizon: horizon,
        time_action_start: warm_up,
        percentage_shift: 0.05,
        time_resolution: resolution,
        seed: Some(7),
    }
}

pub fn tank_env(horizon: usize, warm_up: usize, resolution: usize) -> Environment {
    Environment::new(
        Box::new(Blend::new(None)),
        Box::new(Tank::new(false)),
        config(horizon, warm_up, resolution),
    )
    .expect("tank environment")
}

pub fn inflow(env: &Environment) -> f64 {
    env.model().current_internal_params()["inflow"]
}

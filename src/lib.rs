/*!
`world_optim`: a discrete-time decision process around a continuous
System-Dynamics world model, for multi-objective policy search.

What it does
- Wraps a dynamical [`Model`] and a multi-objective [`CostFunction`] into an
  [`Environment`] with `reset() -> observation` and
  `step(action) -> (observation, aggregated_cost, done, info)`.
- Keeps a labelled agent-facing state (model labels ++ one cumulative cost
  per component), cumulative cost accounting, and a full episode history.
- Skips a fixed warm-up inside `reset` (neutral actions) before the caller's
  control begins, and ends the episode at the simulation horizon.

How to use (call surface only)
- Build collaborators directly or through [`registry::get_model`] /
  [`registry::get_cost_function`].
- `Environment::new(cost_function, model, EnvConfig { .. })`.
- Drive it yourself, or hand a policy to [`run_episode`] /
  [`evaluate_policy`].
- Actions are one of {-1, 0, 1} per control variable: each nudges that
  control by `percentage_shift` of its current value, clipped to its range.

What it does NOT do
- No optimiser, no plotting, no policy persistence. [`Environment::get_data`]
  returns plotting-ready series; drawing them is up to you.
*/

pub mod config;
pub mod costs;
pub mod env;
pub mod error;
pub mod mechanics;
pub mod models;
pub mod registry;

pub use config::{EnvConfig, ExperimentConfig};
pub use costs::{CostComponent, CostContext, CostEvaluation, CostFunction};
pub use env::{EpisodeData, Environment, StepInfo, StepOutcome};
pub use error::{EnvError, Result};
pub use models::{Model, ParamSet};

/// Totals over the controlled part of an episode (warm-up excluded).
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeSummary {
    pub steps: usize,
    pub aggregated_cost: f64,
    pub costs: Vec<f64>,
    pub constraint_violated: bool,
}

impl EpisodeSummary {
    fn empty(nb_costs: usize) -> Self {
        Self {
            steps: 0,
            aggregated_cost: 0.0,
            costs: vec![0.0; nb_costs],
            constraint_violated: false,
        }
    }
}

/// One episode: reset, then `step(policy(obs, t))` until done.
pub fn run_episode<P>(env: &mut Environment, mut policy: P) -> Result<EpisodeSummary>
where
    P: FnMut(&[f64], usize) -> Vec<i8>,
{
    let mut obs = env.reset()?;
    let mut summary = EpisodeSummary::empty(env.cost_function().nb_costs());
    while !env.is_done() {
        let action = policy(&obs, env.t());
        let out = env.step(&action)?;
        summary.steps += 1;
        summary.aggregated_cost += out.aggregated_cost;
        for (acc, c) in summary.costs.iter_mut().zip(&out.info.costs) {
            *acc += c;
        }
        summary.constraint_violated |= out.info.constraints.iter().any(|c| *c);
        obs = out.observation;
    }
    Ok(summary)
}

/// Mean summary over `n_evals` episodes for stochastic models; a single
/// episode for deterministic ones.
pub fn evaluate_policy<P>(env: &mut Environment, mut policy: P, n_evals: usize) -> Result<EpisodeSummary>
where
    P: FnMut(&[f64], usize) -> Vec<i8>,
{
    let n = if env.model().stochastic() { n_evals.max(1) } else { 1 };
    let mut mean = EpisodeSummary::empty(env.cost_function().nb_costs());
    for _ in 0..n {
        let s = run_episode(env, &mut policy)?;
        mean.steps = s.steps;
        mean.aggregated_cost += s.aggregated_cost / n as f64;
        for (acc, c) in mean.costs.iter_mut().zip(&s.costs) {
            *acc += c / n as f64;
        }
        mean.constraint_violated |= s.constraint_violated;
    }
    Ok(mean)
}

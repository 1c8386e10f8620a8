// src/models/sdk.rs

//! # Models SDK
//!
//! The protocol a dynamical model implements so the environment core can drive
//! it. A *model* owns its numerical state; the core only reads snapshots,
//! asks for integration, and nudges named control parameters.
//!
//! ## Your responsibilities (per model)
//! - Declare labels: `internal_states_labels` names every entry of the raw
//!   state vector, `state_labels_for_agent` is the ordered subset the agent
//!   sees. Every agent label must be an internal label.
//! - Declare controls: `control_variables` with inclusive
//!   `control_variables_ranges`, and keep their live values in
//!   `current_internal_params`.
//! - `run_n_steps(state, n)` integrates from `state` with the current
//!   parameters and returns the `n` states it passed through (last = newest).
//!   A parameter set it cannot integrate with is an error, never a default.
//! - `reset` draws a new configuration (use the RNG when `stochastic`),
//!   `reset_same_model` restores the configuration of the previous episode.
//!
//! ## Hooks
//! - `on_time_unit(t)` runs once for every time unit a step covers, in
//!   order, before that step integrates. `t` is the elapsed time since reset. Use it for scripted perturbations (a policy
//!   switch in a given year, a shock). Default: no-op.

use std::cell::RefCell;
use std::collections::BTreeMap;

use bevy_prng::WyRand;

use crate::error::Result;

/// Named parameter values (controls included).
pub type ParamSet = BTreeMap<String, f64>;

pub trait Model {
    fn stochastic(&self) -> bool;

    fn state_labels_for_agent(&self) -> &[String];

    fn internal_states_labels(&self) -> &[String];

    fn control_variables(&self) -> &[String];

    /// Inclusive (min, max), aligned with `control_variables`.
    fn control_variables_ranges(&self) -> &[(f64, f64)];

    fn current_internal_params(&self) -> &ParamSet;

    fn current_internal_params_mut(&mut self) -> &mut ParamSet;

    /// Fresh configuration for a new episode.
    fn reset(&mut self, rng: &RefCell<WyRand>);

    /// Same configuration as the previous episode.
    fn reset_same_model(&mut self);

    /// Raw state snapshot, aligned with `internal_states_labels`.
    fn current_state(&self) -> Vec<f64>;

    fn run_n_steps(&mut self, state: &[f64], n: usize) -> Result<Vec<Vec<f64>>>;

    /// Presentation subsets.
    fn stocks(&self) -> &[String];
    fn rates(&self) -> &[String];

    /// Internal labels shown in the overview panel of exported data.
    fn summary_labels(&self) -> &[String] {
        &[]
    }

    /// Calendar offset of t = 0.
    fn year_min(&self) -> f64;

    /// (Optional) side effect for time unit `t`, before integration.
    fn on_time_unit(&mut self, _t: usize) {}
}

// tests/world2.rs
#![cfg(feature = "model-world2")]

use serde_json::json;

use world_optim::costs::death_rate_qol::MultiCostDeathRateQol;
use world_optim::models::world2::{self, World2};
use world_optim::{EnvConfig, EnvError, Environment, Model, registry, run_episode};

fn world2_env(horizon: usize, warm_up: usize) -> Environment {
    Environment::new(
        Box::new(MultiCostDeathRateQol::default()),
        Box::new(World2::default()),
        EnvConfig {
            simulation_horizon: horizon,
            time_action_start: warm_up,
            seed: Some(11),
            ..EnvConfig::default()
        },
    )
    .expect("world2 environment")
}

#[test]
fn world2_declares_consistent_labels() {
    let m = World2::default();
    assert_eq!(m.control_variables(), ["BRN", "NRUN", "CIGN", "POLN", "FC"]);
    assert_eq!(m.control_variables_ranges().len(), 5);
    assert_eq!(m.current_state().len(), m.internal_states_labels().len());
    for l in m.state_labels_for_agent() {
        assert!(m.internal_states_labels().contains(l), "{l} is not internal");
    }
    for c in m.control_variables() {
        assert!(m.state_labels_for_agent().contains(c), "{c} hidden from agent");
        assert!(m.current_internal_params().contains_key(c));
    }
    assert_eq!(m.year_min(), 1900.0);
}

#[test]
fn initial_state_matches_1900_levels() {
    let m = World2::default();
    let labels = m.internal_states_labels();
    let s = m.current_state();
    let at = |l: &str| s[labels.iter().position(|x| x == l).expect("label")];
    assert_eq!(at("P"), 1.65e9);
    assert_eq!(at("NR"), 900e9);
    assert_eq!(at("BRN"), 0.04);
    assert!(at("BR") > 0.0 && at("DR") > 0.0);
    assert!(at("QL") > 0.0);
}

#[test]
fn two_hundred_neutral_years_stay_finite() {
    let mut env = world2_env(200, 71);
    env.reset().expect("reset");
    let neutral = vec![0i8; env.dim_action()];
    let mut steps = 0;
    loop {
        let out = env.step(&neutral).expect("step");
        steps += 1;
        assert!(out.observation.iter().all(|v| v.is_finite()));
        assert!(out.aggregated_cost.is_finite());
        if out.done {
            break;
        }
    }
    assert_eq!(steps, 129);

    let labels = env.label_to_id();
    let state = &env.env_state().expect("state").vector;
    assert!(labels.value(state, "P").expect("P") > 0.0);
    assert!(labels.value(state, "NR").expect("NR") >= 0.0);
}

#[test]
fn scripted_policy_year_switches_nrun() {
    let mut env = world2_env(100, 71);
    env.reset().expect("reset");
    assert_eq!(env.model().current_internal_params()["NRUN"], 0.25);

    let mut early = world2_env(100, 70);
    early.reset().expect("reset");
    assert_eq!(early.model().current_internal_params()["NRUN"], 1.0);
}

#[test]
fn policy_year_fires_inside_a_multi_year_step() {
    let mut env = Environment::new(
        Box::new(MultiCostDeathRateQol::default()),
        Box::new(World2::default()),
        EnvConfig {
            simulation_horizon: 100,
            time_action_start: 0,
            time_resolution: 3,
            seed: Some(11),
            ..EnvConfig::default()
        },
    )
    .expect("world2 environment");
    env.reset().expect("reset");
    let neutral = vec![0i8; env.dim_action()];
    while env.t() < 69 {
        env.step(&neutral).expect("step");
    }
    // steps start at 0, 3, ..., so year 70 is never a step boundary
    assert_eq!(env.t(), 69);
    assert_eq!(env.model().current_internal_params()["NRUN"], 1.0);

    env.step(&neutral).expect("step");
    assert_eq!(env.t(), 72);
    assert_eq!(env.model().current_internal_params()["NRUN"], 0.25);
    while !env.is_done() {
        env.step(&neutral).expect("step");
    }
    assert_eq!(env.t(), 100);
    assert_eq!(env.model().current_internal_params()["NRUN"], 0.25);
}

#[test]
fn missing_parameters_are_reported_not_defaulted() {
    let mut model = World2::default();
    let state = model.current_state();
    model.current_internal_params_mut().remove("LA");
    match model.run_n_steps(&state, 1) {
        Err(EnvError::InvalidParams { id, reason }) => {
            assert_eq!(id, "world2");
            assert!(reason.contains("LA"), "{reason}");
        }
        other => panic!("expected missing parameter error, got {other:?}"),
    }

    let mut env = world2_env(20, 2);
    env.reset().expect("reset");
    assert_eq!(env.model().current_internal_params().len(), 16);
    assert_eq!(env.step(&[0, 0, 0, 0, 0]).expect("step").observation.len(), env.state_labels().len());
}

#[test]
fn nudges_move_world2_controls() {
    let mut env = world2_env(100, 10);
    env.reset().expect("reset");
    env.step(&[1, 0, -1, 0, 1]).expect("step");
    let p = env.model().current_internal_params();
    assert!((p["BRN"] - 0.042).abs() < 1e-12);
    assert_eq!(p["NRUN"], 1.0);
    assert!((p["CIGN"] - 0.0475).abs() < 1e-12);
    assert!((p["FC"] - 1.05).abs() < 1e-12);

    // the agent sees the live control values
    let labels = env.label_to_id();
    let state = &env.env_state().expect("state").vector;
    assert!((labels.value(state, "BRN").expect("BRN") - 0.042).abs() < 1e-12);
}

#[test]
fn stochastic_resets_jitter_and_repeat_on_request() {
    let mut model = registry::get_model("world2", &json!({ "stochastic": true, "jitter": 0.1 }))
        .expect("model");
    assert!(model.stochastic());
    let mut env = Environment::new(
        Box::new(MultiCostDeathRateQol::default()),
        model,
        EnvConfig {
            simulation_horizon: 20,
            time_action_start: 0,
            seed: Some(3),
            ..EnvConfig::default()
        },
    )
    .expect("env");

    env.reset().expect("reset");
    let first = env.model_state().to_vec();
    env.reset_same_model();
    env.reset().expect("reset");
    assert_eq!(env.model_state(), first.as_slice());
    env.reset().expect("reset");
    assert_ne!(env.model_state(), first.as_slice());

    // deterministic configs ignore the RNG entirely
    model = Box::new(World2::new(world2::Config::default()));
    let before = model.current_state();
    let rng = std::cell::RefCell::new(world_optim::mechanics::seeded(5));
    model.reset(&rng);
    assert_eq!(model.current_state(), before);
}

#[test]
fn death_rate_and_qol_series_are_exported() {
    let mut env = world2_env(30, 5);
    let summary = run_episode(&mut env, |_obs, _t| vec![0, 0, 0, 0, 0]).expect("episode");
    assert_eq!(summary.steps, 25);

    let data = env.get_data().expect("data");
    let n = data.history.env_states.len();
    assert_eq!(n, 31);
    assert_eq!(data.time[0], 1900.0);
    assert_eq!(data.death_rate.as_ref().map(Vec::len), Some(n));
    assert_eq!(data.quality_of_life.as_ref().map(Vec::len), Some(n));
    assert_eq!(data.world_stats.labels, ["P", "POLR", "CI", "QL", "NR"]);
    assert_eq!(data.control_variables.series.len(), 5);
    assert_eq!(data.stocks.labels, ["P", "POL", "CI", "NR", "CIAF"]);
    // QoL is rewarded: its cost component is negative
    assert!(data.costs[1..].iter().all(|row| row[0] > 0.0 && row[1] < 0.0));
    assert!(serde_json::to_string(&data).is_ok());
}

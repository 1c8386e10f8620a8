// demos/world2.rs
// Run with:
//   cargo run --example world2
// Pass `--json` to dump the full episode data instead of the summary.

use tracing::info;
use world_optim::{ExperimentConfig, evaluate_policy, run_episode};

const EXPERIMENT: &str = r#"{
    "model_id": "world2",
    "model_params": { "stochastic": false, "policy_year": 70 },
    "cost_id": "multi_cost_deathrate_qol",
    "cost_params": { "beta": 0.5 },
    "env": {
        "simulation_horizon": 200,
        "time_action_start": 70,
        "percentage_shift": 0.05,
        "time_resolution": 5,
        "seed": 42
    }
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let exp = ExperimentConfig::from_json(EXPERIMENT)?;
    let mut env = exp.build()?;
    info!(model = %exp.model_id, cost = %exp.cost_id, seed = env.seed(), "environment built");
    println!("agent labels -> {:?}", env.state_labels());

    // Do-nothing baseline
    let neutral = run_episode(&mut env, |_obs, _t| vec![0; 5])?;
    println!("== Neutral policy ==");
    println!("steps      -> {}", neutral.steps);
    println!("aggregated -> {:.4}", neutral.aggregated_cost);
    println!("costs      -> {:?}", neutral.costs);

    // Cut pollution and resource usage every step
    let green = evaluate_policy(&mut env, |_obs, _t| vec![0, -1, 0, -1, 0], 1)?;
    println!("== Green policy ==");
    println!("aggregated -> {:.4}", green.aggregated_cost);
    println!("costs      -> {:?}", green.costs);

    // Random nudges, driven step by step
    env.reset()?;
    while !env.is_done() {
        let a = env.sample_action();
        env.step(&a)?;
    }
    let data = env.get_data()?;

    if std::env::args().any(|a| a == "--json") {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("== Random policy ({}) ==", data.title);
    let last = data.time.len() - 1;
    println!("year       -> {}", data.time[last]);
    for (label, series) in data.world_stats.labels.iter().zip(&data.world_stats.series) {
        println!("{label:<10} -> {:.4e}", series[last]);
    }
    for (w, agg) in data.aggregation_weights.iter().zip(&data.aggregated) {
        println!("beta {w:.2}  -> {:.4}", agg.iter().sum::<f64>());
    }
    Ok(())
}

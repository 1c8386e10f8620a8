//! Plotting-ready export of an episode. Read-only over the environment.

use serde::Serialize;

use crate::env::Environment;
use crate::env::history::History;
use crate::error::{EnvError, Result};

/// Weights at which the aggregated-cost curves are drawn.
pub const AGGREGATION_WEIGHTS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// One series per label, all sharing the panel's time axis.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Panel {
    pub labels: Vec<String>,
    pub series: Vec<Vec<f64>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EpisodeData {
    pub title: String,
    pub history: History,
    pub time_jump: usize,
    pub model_states_labels: Vec<String>,
    /// `env_timesteps` shifted by the model's start year.
    pub time: Vec<f64>,
    /// Per-unit cost vectors, with a zero row for the initial state.
    pub costs: Vec<Vec<f64>>,
    pub cost_labels: Vec<String>,
    pub aggregation_weights: Vec<f64>,
    /// One curve per entry of `aggregation_weights`.
    pub aggregated: Vec<Vec<f64>>,
    pub control_variables: Panel,
    pub stocks: Panel,
    pub rates: Panel,
    pub death_rate: Option<Vec<f64>>,
    pub quality_of_life: Option<Vec<f64>>,
    /// Overview drawn from raw model states (one entry per step).
    pub world_stats: Panel,
}

impl Environment {
    pub fn get_data(&self) -> Result<EpisodeData> {
        let history = self.history().ok_or(EnvError::NotReset)?;
        let model = self.model();
        let schema = self.label_to_id();

        let env_panel = |labels: &[String]| -> Result<Panel> {
            let series = labels
                .iter()
                .map(|l| -> Result<Vec<f64>> {
                    let i = schema.id(l)?;
                    Ok(history.env_states.iter().map(|s| s[i]).collect())
                })
                .collect::<Result<Vec<Vec<f64>>>>()?;
            Ok(Panel {
                labels: labels.to_vec(),
                series,
            })
        };
        let optional_series = |label: &str| {
            schema
                .get(label)
                .map(|i| history.env_states.iter().map(|s| s[i]).collect::<Vec<f64>>())
        };

        let nb_costs = self.cost_function().nb_costs();
        let mut costs = Vec::with_capacity(history.costs.len() + 1);
        costs.push(vec![0.0; nb_costs]);
        costs.extend(history.costs.iter().cloned());
        let aggregated = AGGREGATION_WEIGHTS
            .iter()
            .map(|w| self.cost_function().compute_aggregated_cost(&costs, *w))
            .collect();

        let internal = model.internal_states_labels();
        let summary = model.summary_labels();
        let world_series = summary
            .iter()
            .map(|l| -> Result<Vec<f64>> {
                let i = internal
                    .iter()
                    .position(|x| x == l)
                    .ok_or_else(|| EnvError::UnknownLabel { label: l.clone() })?;
                Ok(history.model_states.iter().map(|s| s[i]).collect())
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        Ok(EpisodeData {
            title: "Results".to_string(),
            history: history.clone(),
            time_jump: 1,
            model_states_labels: model.state_labels_for_agent().to_vec(),
            time: history
                .env_timesteps
                .iter()
                .map(|t| *t as f64 + model.year_min())
                .collect(),
            costs,
            cost_labels: self
                .cost_function()
                .costs()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            aggregation_weights: AGGREGATION_WEIGHTS.to_vec(),
            aggregated,
            control_variables: env_panel(model.control_variables())?,
            stocks: env_panel(model.stocks())?,
            rates: env_panel(model.rates())?,
            death_rate: optional_series("DR"),
            quality_of_life: optional_series("QL"),
            world_stats: Panel {
                labels: summary.to_vec(),
                series: world_series,
            },
        })
    }
}

// src/costs/sdk.rs

//! # Costs SDK
//!
//! A cost function is a list of elementary *components* plus an aggregation
//! rule. Components see a state transition `(previous_state, state)` laid out
//! by the environment's label schema and return one scalar each. The
//! aggregator folds the component vector into the single optimisation signal
//! and flags components that went over their ceiling.
//!
//! ## Your responsibilities
//! - Components: `compute_cost` should scale with `others.jump_of` (the number
//!   of time units the transition covers) so multi-unit steps stay comparable.
//! - Aggregators: `aggregate_with(costs, weight)` is the scalarisation for an
//!   arbitrary weight; `aggregate` is the configured default.

use serde::Serialize;

use crate::env::labels::LabelSchema;
use crate::error::Result;

/// Extra inputs to a cost evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CostContext {
    pub jump_of: usize,
}

pub trait CostComponent {
    fn name(&self) -> &str;

    fn compute_cost(
        &self,
        previous_state: &[f64],
        state: &[f64],
        label_to_id: &LabelSchema,
        action: &[i8],
        others: &CostContext,
    ) -> Result<f64>;

    /// (Optional) ceiling; a cost above it is a constraint violation.
    fn max_cost(&self) -> Option<f64> {
        None
    }
}

/// Aggregated scalar, per-component costs, per-component violation flags.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CostEvaluation {
    pub aggregated: f64,
    pub costs: Vec<f64>,
    pub constraints: Vec<bool>,
}

pub trait CostFunction {
    fn costs(&self) -> &[Box<dyn CostComponent>];

    fn nb_costs(&self) -> usize {
        self.costs().len()
    }

    /// Scalarisation with an explicit weight.
    fn aggregate_with(&self, costs: &[f64], weight: f64) -> f64;

    /// Scalarisation with the configured weight.
    fn aggregate(&self, costs: &[f64]) -> f64;

    fn compute_cost(
        &self,
        previous_state: &[f64],
        state: &[f64],
        label_to_id: &LabelSchema,
        action: &[i8],
        others: &CostContext,
    ) -> Result<CostEvaluation> {
        let costs = self
            .costs()
            .iter()
            .map(|c| c.compute_cost(previous_state, state, label_to_id, action, others))
            .collect::<Result<Vec<f64>>>()?;
        let constraints = self
            .costs()
            .iter()
            .zip(&costs)
            .map(|(c, v)| c.max_cost().is_some_and(|m| *v > m))
            .collect();
        Ok(CostEvaluation {
            aggregated: self.aggregate(&costs),
            costs,
            constraints,
        })
    }

    /// Row-wise scalarisation of a (steps x nb_costs) matrix.
    fn compute_aggregated_cost(&self, cost_matrix: &[Vec<f64>], weight: f64) -> Vec<f64> {
        cost_matrix
            .iter()
            .map(|row| self.aggregate_with(row, weight))
            .collect()
    }
}

//! Death rate vs. quality of life: the two-objective cost used with World2.
//!
//! c0 = (DR / P) / death_rate_ref * jump_of
//! c1 = -QL / qol_ref * jump_of
//! aggregated = (1 - beta) * c0 + beta * c1

use serde::Deserialize;

use crate::costs::sdk::{CostComponent, CostContext, CostFunction};
use crate::env::labels::LabelSchema;
use crate::error::Result;

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Params {
    /// Weight of the QoL objective, in [0, 1].
    pub beta: f64,
    /// Per-capita death rate that counts as one unit of cost.
    pub death_rate_ref: f64,
    pub qol_ref: f64,
    pub death_rate_max: Option<f64>,
    pub qol_max: Option<f64>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            beta: 0.5,
            death_rate_ref: 0.028,
            qol_ref: 1.0,
            death_rate_max: None,
            qol_max: None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct DeathRateCost {
    pub reference: f64,
    pub max_cost: Option<f64>,
}

impl CostComponent for DeathRateCost {
    fn name(&self) -> &str {
        "death_rate"
    }

    fn compute_cost(
        &self,
        _previous_state: &[f64],
        state: &[f64],
        label_to_id: &LabelSchema,
        _action: &[i8],
        others: &CostContext,
    ) -> Result<f64> {
        let dr = label_to_id.value(state, "DR")?;
        let p = label_to_id.value(state, "P")?.max(1.0);
        Ok((dr / p) / self.reference * others.jump_of as f64)
    }

    fn max_cost(&self) -> Option<f64> {
        self.max_cost
    }
}

#[derive(Clone, Copy, Debug)]
pub struct QualityOfLifeCost {
    pub reference: f64,
    pub max_cost: Option<f64>,
}

impl CostComponent for QualityOfLifeCost {
    fn name(&self) -> &str {
        "quality_of_life"
    }

    fn compute_cost(
        &self,
        _previous_state: &[f64],
        state: &[f64],
        label_to_id: &LabelSchema,
        _action: &[i8],
        others: &CostContext,
    ) -> Result<f64> {
        let ql = label_to_id.value(state, "QL")?;
        Ok(-ql / self.reference * others.jump_of as f64)
    }

    fn max_cost(&self) -> Option<f64> {
        self.max_cost
    }
}

pub struct MultiCostDeathRateQol {
    costs: Vec<Box<dyn CostComponent>>,
    pub beta: f64,
}

impl MultiCostDeathRateQol {
    pub fn new(params: Params) -> Self {
        Self {
            costs: vec![
                Box::new(DeathRateCost {
                    reference: params.death_rate_ref,
                    max_cost: params.death_rate_max,
                }),
                Box::new(QualityOfLifeCost {
                    reference: params.qol_ref,
                    max_cost: params.qol_max,
                }),
            ],
            beta: params.beta.clamp(0.0, 1.0),
        }
    }
}

impl Default for MultiCostDeathRateQol {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl CostFunction for MultiCostDeathRateQol {
    fn costs(&self) -> &[Box<dyn CostComponent>] {
        &self.costs
    }

    fn aggregate_with(&self, costs: &[f64], weight: f64) -> f64 {
        let c0 = costs.first().copied().unwrap_or(0.0);
        let c1 = costs.get(1).copied().unwrap_or(0.0);
        (1.0 - weight) * c0 + weight * c1
    }

    fn aggregate(&self, costs: &[f64]) -> f64 {
        self.aggregate_with(costs, self.beta)
    }
}

//! Factories: registry id + parameter map -> model / cost function.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::costs::CostFunction;
use crate::costs::death_rate_qol::{self, MultiCostDeathRateQol};
use crate::error::{EnvError, Result};
use crate::models::Model;
#[cfg(feature = "model-world2")]
use crate::models::world2::{self, World2};

#[cfg(feature = "model-world2")]
pub const MODEL_IDS: &[&str] = &["world2"];
#[cfg(not(feature = "model-world2"))]
pub const MODEL_IDS: &[&str] = &[];

pub const COST_FUNCTION_IDS: &[&str] = &["multi_cost_deathrate_qol"];

/// `null` means "all defaults"; anything else must match `T` exactly.
fn parse_params<T: DeserializeOwned + Default>(id: &str, params: &Value) -> Result<T> {
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params.clone()).map_err(|e| EnvError::InvalidParams {
        id: id.to_string(),
        reason: e.to_string(),
    })
}

fn invalid(id: &str, reason: impl Into<String>) -> EnvError {
    EnvError::InvalidParams {
        id: id.to_string(),
        reason: reason.into(),
    }
}

pub fn get_model(model_id: &str, params: &Value) -> Result<Box<dyn Model>> {
    match model_id {
        #[cfg(feature = "model-world2")]
        "world2" => {
            let cfg: world2::Config = parse_params(model_id, params)?;
            if cfg.substeps == 0 {
                return Err(invalid(model_id, "substeps must be positive"));
            }
            if !(cfg.jitter >= 0.0) {
                return Err(invalid(model_id, "jitter must be non-negative"));
            }
            Ok(Box::new(World2::new(cfg)))
        }
        _ => Err(EnvError::UnsupportedModel {
            id: model_id.to_string(),
            valid: MODEL_IDS.to_vec(),
        }),
    }
}

pub fn get_cost_function(cost_function_id: &str, params: &Value) -> Result<Box<dyn CostFunction>> {
    match cost_function_id {
        "multi_cost_deathrate_qol" => {
            let p: death_rate_qol::Params = parse_params(cost_function_id, params)?;
            if !(0.0..=1.0).contains(&p.beta) {
                return Err(invalid(cost_function_id, "beta must lie in [0, 1]"));
            }
            if !(p.death_rate_ref > 0.0 && p.qol_ref > 0.0) {
                return Err(invalid(cost_function_id, "reference values must be positive"));
            }
            Ok(Box::new(MultiCostDeathRateQol::new(p)))
        }
        _ => Err(EnvError::UnsupportedCostFunction {
            id: cost_function_id.to_string(),
            valid: COST_FUNCTION_IDS.to_vec(),
        }),
    }
}

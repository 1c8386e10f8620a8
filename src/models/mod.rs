// Dynamical models the environment core can drive.
// Concrete models are feature-gated so downstream users compile only what they run.

pub mod sdk;
pub use sdk::*;

#[cfg(feature = "model-world2")]
pub mod world2;

// Cost functions: the component/aggregator protocol plus concrete costs.

pub mod sdk;
pub use sdk::*;

pub mod death_rate_qol;

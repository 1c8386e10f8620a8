pub mod control;
pub mod stoch;
pub mod table;

pub use control::*;
pub use stoch::*;
pub use table::*;

// The environment core: labelled state, episode history, reset/step, export.

pub mod data;
pub mod environment;
pub mod history;
pub mod labels;

pub use data::*;
pub use environment::*;
pub use history::History;
pub use labels::{LabelSchema, LabelledState};

//! Error types for `world_optim`.
//!
//! Every failure is fatal: a malformed action, a label schema that does not
//! line up with what a model produces, or an unknown factory id all mean the
//! run is wired wrong. Nothing here is retried.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("action component {index} is {value}, expected one of -1, 0, 1")]
    InvalidAction { index: usize, value: i8 },

    #[error("action has {actual} components, expected {expected}")]
    ActionLength { expected: usize, actual: usize },

    #[error("labelled state does not match the declared labels (missing: {missing:?}, unexpected: {unexpected:?})")]
    LabelMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("label '{label}' is not part of the state schema")]
    UnknownLabel { label: String },

    #[error("label '{label}' is declared more than once")]
    DuplicateLabel { label: String },

    #[error("state vector has {actual} entries, expected {expected}")]
    StateLength { expected: usize, actual: usize },

    #[error("model id '{id}' is not supported; valid ids: {valid:?}")]
    UnsupportedModel { id: String, valid: Vec<&'static str> },

    #[error("cost function id '{id}' is not supported; valid ids: {valid:?}")]
    UnsupportedCostFunction { id: String, valid: Vec<&'static str> },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("invalid parameters for '{id}': {reason}")]
    InvalidParams { id: String, reason: String },

    #[error("environment has not been reset")]
    NotReset,

    #[error("episode already finished (t = {t}, horizon = {horizon})")]
    EpisodeFinished { t: usize, horizon: usize },

    #[error("could not draw a seed from the OS: {reason}")]
    Entropy { reason: String },
}

pub type Result<T> = std::result::Result<T, EnvError>;

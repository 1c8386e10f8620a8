//! Label schema and labelled states.
//!
//! The schema fixes the order of the agent-facing state vector. A labelled
//! state is only turned into a vector after its key set has been checked
//! against the schema; a missing or extra key is a wiring bug and never gets
//! a default value.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{EnvError, Result};

/// Ordered, duplicate-free labels with a name -> position index.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelSchema {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelSchema {
    pub fn new(labels: Vec<String>) -> Result<Self> {
        let mut index = HashMap::with_capacity(labels.len());
        for (i, l) in labels.iter().enumerate() {
            if index.insert(l.clone(), i).is_some() {
                return Err(EnvError::DuplicateLabel { label: l.clone() });
            }
        }
        Ok(Self { labels, index })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn id(&self, label: &str) -> Result<usize> {
        self.get(label).ok_or_else(|| EnvError::UnknownLabel {
            label: label.to_string(),
        })
    }

    /// Value of `label` in a vector laid out by this schema.
    pub fn value(&self, state: &[f64], label: &str) -> Result<f64> {
        let i = self.id(label)?;
        state.get(i).copied().ok_or(EnvError::StateLength {
            expected: self.len(),
            actual: state.len(),
        })
    }
}

/// Name -> value mapping for one point in time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelledState(BTreeMap<String, f64>);

impl LabelledState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, value: f64) {
        self.0.insert(label.into(), value);
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.get(label).copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Key set must equal the schema's label set.
    pub fn check(&self, schema: &LabelSchema) -> Result<()> {
        let declared: BTreeSet<&str> = schema.labels().iter().map(String::as_str).collect();
        let present: BTreeSet<&str> = self.labels().collect();
        if declared == present {
            return Ok(());
        }
        Err(EnvError::LabelMismatch {
            missing: declared.difference(&present).map(|s| s.to_string()).collect(),
            unexpected: present.difference(&declared).map(|s| s.to_string()).collect(),
        })
    }

    /// Ordered vector in schema order, after the key-set check.
    pub fn to_vector(&self, schema: &LabelSchema) -> Result<Vec<f64>> {
        self.check(schema)?;
        schema
            .labels()
            .iter()
            .map(|l| {
                self.get(l).ok_or_else(|| EnvError::UnknownLabel { label: l.clone() })
            })
            .collect()
    }
}

//! Immutable task outcome records.

use std::collections::BTreeMap;

/// A single value in the open key/value result bag.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ResultValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    Text(String),
}

impl From<bool> for ResultValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ResultValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ResultValue {
    fn from(value: u32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f32> for ResultValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ResultValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ResultValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Task-specific outputs keyed by name.
pub type ResultBag = BTreeMap<String, ResultValue>;

/// The outcome record produced exactly once per task at termination.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TaskResult {
    pub success: bool,
    pub message: String,
    /// Execution time accumulated while the task was Running.
    pub elapsed: f32,
    pub outputs: ResultBag,
}

impl TaskResult {
    pub fn output(&self, key: &str) -> Option<&ResultValue> {
        self.outputs.get(key)
    }

    pub fn output_float(&self, key: &str) -> Option<f32> {
        match self.outputs.get(key)? {
            ResultValue::Float(value) => Some(*value),
            ResultValue::Int(value) => Some(*value as f32),
            _ => None,
        }
    }

    pub fn output_int(&self, key: &str) -> Option<i64> {
        match self.outputs.get(key)? {
            ResultValue::Int(value) => Some(*value),
            _ => None,
        }
    }
}

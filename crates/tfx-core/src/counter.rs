//! Per-load counter state behind the `seq` template helper.
//!
//! A fresh [`Counters`] is created for every load call and shared (through an
//! `Arc`) with the helpers of that call's template registry only. Two load calls
//! never observe each other's counters.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// How long `seq` counters live within one load call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CounterScope {
    /// Counters keep counting from the first full render through every
    /// per-entry re-render.
    #[default]
    Load,
    /// Counters restart before the per-entry phase.
    Phase,
}

/// Monotonic counters keyed by an arbitrary string.
#[derive(Debug, Default)]
pub struct Counters {
    values: Mutex<HashMap<String, u64>>,
}

impl Counters {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Advance the counter for `key` and return its new value, starting at 1.
    pub fn next(&self, key: &str) -> u64 {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        let value = values.entry(key.to_string()).or_insert(0);
        *value += 1;
        *value
    }

    /// Forget every counter.
    pub fn reset(&self) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

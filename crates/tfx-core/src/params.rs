//! Parameter mapping and load options.
//!
//! A load call starts from an empty [`Params`] and applies its [`LoadOption`]s in
//! the order given. A later option overwrites an earlier one on the same key.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name → value mapping handed to the template engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, for writing parameters inline in tests.
    ///
    /// ```ignore
    /// let params = Params::new().with("registered", true).with("name", "alice");
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert a value, returning the previous one for that key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Copy every entry of `other` into `self`, overwriting on collision.
    pub fn merge(&mut self, other: &Params) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// A caller-supplied adjustment to the parameter mapping of one load call.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOption {
    /// Merge an explicit mapping.
    Params(Params),
    /// Bind `[1, 2, …, count]` under `name`.
    Loop { name: String, count: usize },
}

impl LoadOption {
    /// Apply this option on top of `params`.
    pub fn apply(&self, params: &mut Params) {
        match self {
            LoadOption::Params(extra) => params.merge(extra),
            LoadOption::Loop { name, count } => {
                params.insert(name.clone(), Value::Array(sequence(*count)));
            }
        }
    }
}

/// Merge an explicit name → value mapping into the parameters.
pub fn with_params(params: Params) -> LoadOption {
    LoadOption::Params(params)
}

/// Bind an integer sequence `[1..=count]` under `name`, for `{{#each name}}` loops.
pub fn with_loop(name: impl Into<String>, count: usize) -> LoadOption {
    LoadOption::Loop {
        name: name.into(),
        count,
    }
}

/// The consecutive integers `1..=count` as JSON numbers.
pub fn sequence(count: usize) -> Vec<Value> {
    (1..=count as u64).map(Value::from).collect()
}

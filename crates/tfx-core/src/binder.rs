//! Binding of caller options and deferred placeholders.
//!
//! After the caller's options are applied, every free variable still missing a
//! value is bound to the text `{{name}}`. Rendering that binding emits the same
//! expression again, so the reference survives the first pass and is resolved
//! against earlier document entries in the second.

use serde_json::Value;

use crate::params::{LoadOption, Params};

/// The deferred placeholder expression for `name`.
pub fn placeholder(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

/// Whether `value` is a deferred placeholder produced by [`placeholder`].
pub fn is_placeholder(value: &Value) -> bool {
    let Some(text) = value.as_str() else {
        return false;
    };
    text.strip_prefix("{{")
        .and_then(|rest| rest.strip_suffix("}}"))
        .is_some_and(|name| {
            !name.is_empty() && !name.contains(['{', '}']) && !name.contains(char::is_whitespace)
        })
}

/// Build the parameter mapping for one load call.
///
/// Options are applied in order. Free variables with no value afterwards get
/// their placeholder, so every free variable is bound before rendering.
pub fn bind<S: AsRef<str>>(options: &[LoadOption], free_names: &[S]) -> Params {
    let mut params = Params::new();
    for option in options {
        option.apply(&mut params);
    }

    for name in free_names {
        let name = name.as_ref();
        if !params.contains_key(name) {
            tracing::debug!("binding deferred placeholder for '{name}'");
            params.insert(name, Value::String(placeholder(name)));
        }
    }
    params
}

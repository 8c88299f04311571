//! Built-in helpers available inside fixture templates.
//!
//! | Helper | Example | Result |
//! |--------|---------|--------|
//! | `seq` | `{{seq "post"}}` | `1`, `2`, `3`, … per key, per load call |
//! | `now` | `{{now}}` / `{{now "%Y-%m-%d"}}` | evaluation-time UTC clock |
//! | `default` | `{{default registered false}}` | `false` while `registered` is unbound |

use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use chrono::{SecondsFormat, Utc};
use handlebars::{
    Context, Handlebars, Helper, HelperDef, RenderContext, RenderError, RenderErrorReason,
    ScopedJson,
};
use serde_json::Value;

use crate::binder;
use crate::counter::Counters;

pub const SEQ: &str = "seq";
pub const NOW: &str = "now";
pub const DEFAULT: &str = "default";

/// Names of every helper registered by [`crate::templates::renderer::TemplateRenderer`].
pub const BUILTIN_HELPERS: &[&str] = &[SEQ, NOW, DEFAULT];

/// `{{seq "key"}}`: the next value of the per-load counter for `key`.
pub struct SeqHelper {
    counters: Arc<Counters>,
}

impl SeqHelper {
    pub fn new(counters: Arc<Counters>) -> Self {
        Self { counters }
    }
}

impl HelperDef for SeqHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let key = h
            .param(0)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex(SEQ, 0))?;
        let key = match key.value() {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Ok(ScopedJson::Derived(Value::from(self.counters.next(&key))))
    }
}

/// `{{now}}` / `{{now "<strftime>"}}`: the current UTC time.
pub struct NowHelper;

impl HelperDef for NowHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let now = Utc::now();
        let rendered = match h.param(0).and_then(|p| p.value().as_str()) {
            None => now.to_rfc3339_opts(SecondsFormat::Secs, true),
            Some(pattern) => {
                let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
                if items.iter().any(|item| matches!(item, Item::Error)) {
                    return Err(RenderErrorReason::Other(format!(
                        "invalid time format for {NOW}: {pattern}"
                    ))
                    .into());
                }
                now.format_with_items(items.into_iter()).to_string()
            }
        };
        Ok(ScopedJson::Derived(Value::String(rendered)))
    }
}

/// `{{default value fallback}}`: `fallback` when `value` is null or still a
/// deferred placeholder.
pub struct DefaultHelper;

impl HelperDef for DefaultHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let value = h
            .param(0)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex(DEFAULT, 0))?
            .value();
        let fallback = h
            .param(1)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex(DEFAULT, 1))?
            .value();

        let chosen = if value.is_null() || binder::is_placeholder(value) {
            fallback
        } else {
            value
        };
        Ok(ScopedJson::Derived(chosen.clone()))
    }
}

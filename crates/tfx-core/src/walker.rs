//! Second-phase, declaration-order resolution of a rendered fixture.
//!
//! The first render leaves deferred placeholders such as `{{id}}` in the text.
//! The walker parses that text into an ordered mapping and re-renders each
//! string entry as its own template, then stores the entry's value in the
//! parameter mapping before moving to the next one. An entry therefore sees
//! every entry declared above it and none below: a forward reference renders
//! as the forward entry's placeholder. There is no second sweep.

use serde_yaml::{Mapping, Value as YamlValue};

use crate::error::{Result, TfxError};
use crate::params::Params;
use crate::templates::renderer::TemplateRenderer;

/// Registry name used for per-entry templates.
const ENTRY_TEMPLATE: &str = "__entry";

/// Which step of an entry's re-render failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Execute,
}

/// A per-entry failure that leaves the entry's original text in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftFailure {
    pub stage: Stage,
    pub message: String,
}

/// What happened to one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Not a string; copied through untouched.
    Passthrough,
    /// Re-rendered successfully.
    Rendered,
    /// Re-render failed; the original string was kept.
    Unresolved(SoftFailure),
}

/// Result of walking a document.
#[derive(Debug, Clone)]
pub struct Walk {
    pub document: Mapping,
    /// One outcome per entry, in declaration order.
    pub outcomes: Vec<(String, EntryOutcome)>,
}

impl Walk {
    /// Keys of entries left unresolved.
    pub fn unresolved(&self) -> impl Iterator<Item = (&str, &SoftFailure)> {
        self.outcomes.iter().filter_map(|(key, outcome)| match outcome {
            EntryOutcome::Unresolved(failure) => Some((key.as_str(), failure)),
            _ => None,
        })
    }
}

/// Parse first-pass output into an ordered mapping.
///
/// An empty document is an empty mapping; any other non-mapping top level is an
/// error.
pub fn parse_document(name: &str, text: &str) -> Result<Mapping> {
    if text.trim().is_empty() {
        return Ok(Mapping::new());
    }
    let value: YamlValue =
        serde_yaml::from_str(text).map_err(|e| TfxError::DocumentParse {
            name: name.to_string(),
            source: e,
        })?;
    match value {
        YamlValue::Mapping(mapping) => Ok(mapping),
        YamlValue::Null => Ok(Mapping::new()),
        _ => Err(TfxError::NotAMapping {
            name: name.to_string(),
        }),
    }
}

/// Resolve every entry of `document` in order, updating `params` as it goes.
pub fn walk(document: Mapping, params: &mut Params, renderer: &mut TemplateRenderer) -> Walk {
    let mut resolved = Mapping::with_capacity(document.len());
    let mut outcomes = Vec::with_capacity(document.len());

    for (key, value) in document {
        let label = key_name(&key);
        let entry_key = label.clone().unwrap_or_else(|| format!("{key:?}"));

        let (value, outcome) = resolve_entry(&entry_key, value, params, renderer);
        if let EntryOutcome::Unresolved(failure) = &outcome {
            tracing::warn!(
                "entry '{entry_key}' left unresolved ({:?} failed): {}",
                failure.stage,
                failure.message
            );
        }

        match label {
            Some(label) => store(params, label, &value),
            None => tracing::debug!("entry key {key:?} is not a scalar; not visible to later entries"),
        }
        resolved.insert(key, value);
        outcomes.push((entry_key, outcome));
    }

    Walk {
        document: resolved,
        outcomes,
    }
}

/// Re-render a single entry value against the current parameters.
pub fn resolve_entry(
    key: &str,
    value: YamlValue,
    params: &Params,
    renderer: &mut TemplateRenderer,
) -> (YamlValue, EntryOutcome) {
    let YamlValue::String(text) = value else {
        return (value, EntryOutcome::Passthrough);
    };

    let template = match TemplateRenderer::compile(&text) {
        Ok(template) => template,
        Err(e) => {
            let failure = SoftFailure {
                stage: Stage::Parse,
                message: e.to_string(),
            };
            return (YamlValue::String(text), EntryOutcome::Unresolved(failure));
        }
    };

    match renderer.render(ENTRY_TEMPLATE, template, params) {
        Ok(rendered) => {
            tracing::trace!("entry '{key}': {text:?} -> {rendered:?}");
            (YamlValue::String(rendered), EntryOutcome::Rendered)
        }
        Err(e) => {
            let message = match e {
                TfxError::TemplateRender { message, .. } => message,
                other => other.to_string(),
            };
            let failure = SoftFailure {
                stage: Stage::Execute,
                message,
            };
            (YamlValue::String(text), EntryOutcome::Unresolved(failure))
        }
    }
}

/// Parameter name for a document key. Only scalar keys can be referenced.
fn key_name(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn store(params: &mut Params, key: String, value: &YamlValue) {
    match serde_json::to_value(value) {
        Ok(json) => {
            params.insert(key, json);
        }
        Err(e) => tracing::debug!("entry '{key}' cannot be exposed to later entries: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder;
    use crate::counter::Counters;
    use serde_json::json;

    fn renderer() -> TemplateRenderer {
        TemplateRenderer::new(true, Counters::new())
    }

    fn string_at<'a>(doc: &'a Mapping, key: &str) -> &'a str {
        doc.get(key).and_then(YamlValue::as_str).unwrap()
    }

    #[test]
    fn test_parse_document_keeps_declaration_order() {
        let doc = parse_document("t", "b: 1\na: 2\nc: 3\n").unwrap();
        let keys: Vec<&str> = doc.keys().filter_map(YamlValue::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse_document("t", "").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_non_mapping() {
        let err = parse_document("t", "- a\n- b\n").unwrap_err();
        assert!(matches!(err, TfxError::NotAMapping { .. }));
    }

    #[test]
    fn test_parse_rejects_invalid_yaml() {
        let err = parse_document("t", "a: [unclosed\n").unwrap_err();
        assert!(matches!(err, TfxError::DocumentParse { .. }));
    }

    #[test]
    fn test_earlier_entries_are_visible() {
        let doc = parse_document("t", "id: 1\nname: \"user-{{id}}\"\n").unwrap();
        let mut params = binder::bind::<&str>(&[], &["id"]);
        let walk = walk(doc, &mut params, &mut renderer());
        assert_eq!(string_at(&walk.document, "name"), "user-1");
        assert_eq!(params.get("id"), Some(&json!(1)));
        assert_eq!(params.get("name"), Some(&json!("user-1")));
    }

    #[test]
    fn test_forward_reference_stays_unresolved() {
        let doc = parse_document("t", "a: \"see {{b}}\"\nb: bee\n").unwrap();
        let mut params = binder::bind::<&str>(&[], &["b"]);
        let walk = walk(doc, &mut params, &mut renderer());
        assert_eq!(string_at(&walk.document, "a"), "see {{b}}");
        assert_eq!(string_at(&walk.document, "b"), "bee");
    }

    #[test]
    fn test_reordering_resolves_the_reference() {
        let doc = parse_document("t", "b: bee\na: \"see {{b}}\"\n").unwrap();
        let mut params = binder::bind::<&str>(&[], &["b"]);
        let walk = walk(doc, &mut params, &mut renderer());
        assert_eq!(string_at(&walk.document, "a"), "see bee");
    }

    #[test]
    fn test_nested_values_pass_through_and_are_visible() {
        let text = "preference:\n  searchable: true\ntags: [foo, bar]\nsummary: \"searchable={{preference.searchable}}\"\n";
        let doc = parse_document("t", text).unwrap();
        let mut params = Params::new();
        let walk = walk(doc, &mut params, &mut renderer());

        assert_eq!(walk.outcomes[0].1, EntryOutcome::Passthrough);
        assert_eq!(walk.outcomes[1].1, EntryOutcome::Passthrough);
        assert_eq!(walk.outcomes[2].1, EntryOutcome::Rendered);
        assert_eq!(params.get("preference"), Some(&json!({ "searchable": true })));
        assert_eq!(params.get("tags"), Some(&json!(["foo", "bar"])));
        assert_eq!(string_at(&walk.document, "summary"), "searchable=true");
    }

    #[test]
    fn test_parse_failure_is_soft() {
        let doc = parse_document("t", "broken: \"{{#if}}\"\nafter: \"{{broken}}\"\n").unwrap();
        let mut params = Params::new();
        let walk = walk(doc, &mut params, &mut renderer());

        assert_eq!(string_at(&walk.document, "broken"), "{{#if}}");
        match &walk.outcomes[0].1 {
            EntryOutcome::Unresolved(failure) => assert_eq!(failure.stage, Stage::Parse),
            other => panic!("expected parse failure, got {other:?}"),
        }
        // later entries still run and see the unresolved text
        assert_eq!(string_at(&walk.document, "after"), "{{#if}}");
        assert_eq!(walk.unresolved().count(), 1);
    }

    #[test]
    fn test_execute_failure_is_soft() {
        let doc = parse_document("t", "a: \"{{missing.field}}\"\nb: ok\n").unwrap();
        let mut params = Params::new();
        let walk = walk(doc, &mut params, &mut renderer());

        assert_eq!(string_at(&walk.document, "a"), "{{missing.field}}");
        match &walk.outcomes[0].1 {
            EntryOutcome::Unresolved(failure) => assert_eq!(failure.stage, Stage::Execute),
            other => panic!("expected execute failure, got {other:?}"),
        }
        assert_eq!(walk.outcomes[1].1, EntryOutcome::Rendered);
        assert_eq!(params.get("a"), Some(&json!("{{missing.field}}")));
    }
}

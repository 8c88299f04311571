//! Free-variable discovery over a parsed Handlebars template.
//!
//! A *free variable* is a single-segment field reference such as `{{registered}}`
//! or the `registered` argument of `{{default registered false}}`. References with
//! more than one segment (`user.name`, `../owner`, `@root.id`) address structure
//! that is already bound, so they are noted as chained references but never
//! reported as free.
//!
//! Handlebars cannot tell a bare `{{now}}` helper call from a field lookup at
//! parse time, so the collector is given the names of the helpers that will be
//! registered at render time.

use std::collections::{HashMap, HashSet};

use handlebars::template::{
    BlockParam, DecoratorTemplate, HelperTemplate, Parameter, Subexpression, Template, TemplateElement,
};
use handlebars::Path;

/// A field reference found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    /// The reference as written, e.g. `user.name`.
    pub raw: String,
    /// Path segments, with a leading `this` removed.
    pub segments: Vec<String>,
}

impl FieldRef {
    /// Parse the raw text of a relative path. Returns `None` for references that
    /// do not name a field (`this`, `@index`).
    fn parse(raw: &str) -> Option<Self> {
        let mut segments = Vec::new();
        let mut rest = raw;
        while let Some(stripped) = rest.strip_prefix("../") {
            segments.push("..".to_string());
            rest = stripped;
        }
        for seg in rest.split(['.', '/']).filter(|s| !s.is_empty()) {
            let seg = seg.trim_start_matches('[').trim_end_matches(']');
            segments.push(seg.to_string());
        }

        if matches!(segments.first().map(String::as_str), Some("this")) {
            segments.remove(0);
        }
        match segments.first() {
            None => None,
            Some(first) if first.starts_with('@') && first != "@root" => None,
            Some(_) => Some(Self {
                raw: raw.to_string(),
                segments,
            }),
        }
    }

    /// Whether this reference is a free variable candidate.
    pub fn is_free(&self) -> bool {
        self.segments.len() == 1
    }

    /// The first segment: the top-level name this reference starts from.
    pub fn name(&self) -> &str {
        &self.segments[0]
    }
}

/// Recursive visitor collecting field references from a template tree.
pub struct FieldCollector<'a> {
    helpers: HashSet<&'a str>,
}

impl<'a> FieldCollector<'a> {
    /// Create a collector that treats `helpers` as function names, not fields.
    pub fn new(helpers: &[&'a str]) -> Self {
        Self {
            helpers: helpers.iter().copied().collect(),
        }
    }

    /// Every field reference in visit order, free or chained.
    pub fn references(&self, template: Option<&Template>) -> Vec<FieldRef> {
        let mut scope = Scope::default();
        self.visit_template(template, &mut scope);
        scope.found
    }

    /// Only the single-segment references, in visit order.
    pub fn free_fields(&self, template: Option<&Template>) -> Vec<FieldRef> {
        let mut refs = self.references(template);
        refs.retain(FieldRef::is_free);
        refs
    }

    /// Names of the free variables, de-duplicated, first occurrence first.
    pub fn free_names(&self, template: Option<&Template>) -> Vec<String> {
        let mut seen = HashSet::new();
        self.free_fields(template)
            .into_iter()
            .map(|field| field.name().to_string())
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }

    fn visit_template(&self, template: Option<&Template>, scope: &mut Scope) {
        let Some(template) = template else {
            return;
        };
        for element in &template.elements {
            self.visit_element(element, scope);
        }
    }

    fn visit_element(&self, element: &TemplateElement, scope: &mut Scope) {
        match element {
            TemplateElement::Expression(expr) | TemplateElement::HtmlExpression(expr) => {
                self.visit_expression(expr, scope)
            }
            TemplateElement::HelperBlock(block) => self.visit_block(block, scope),
            TemplateElement::DecoratorExpression(decorator)
            | TemplateElement::DecoratorBlock(decorator)
            | TemplateElement::PartialExpression(decorator)
            | TemplateElement::PartialBlock(decorator) => self.visit_decorator(decorator, scope),
            // raw text and comments
            _ => {}
        }
    }

    /// `{{name}}` is a lookup unless `name` is a helper; `{{name arg ...}}` is
    /// always a helper call, so only its arguments can hold fields.
    fn visit_expression(&self, expr: &HelperTemplate, scope: &mut Scope) {
        if expr.params.is_empty() && expr.hash.is_empty() {
            match &expr.name {
                Parameter::Path(path) if !self.is_helper(path) => self.visit_path(path, scope),
                Parameter::Subexpression(sub) => self.visit_subexpression(sub, scope),
                _ => {}
            }
        } else {
            if let Parameter::Subexpression(sub) = &expr.name {
                self.visit_subexpression(sub, scope);
            }
            self.visit_arguments(&expr.params, &expr.hash, scope);
        }
        self.visit_template(expr.template.as_ref(), scope);
        self.visit_template(expr.inverse.as_ref(), scope);
    }

    /// Block helpers: `if`/`unless` conditions, `each`/`with` sources, both bodies.
    fn visit_block(&self, block: &HelperTemplate, scope: &mut Scope) {
        if let Parameter::Subexpression(sub) = &block.name {
            self.visit_subexpression(sub, scope);
        }
        self.visit_arguments(&block.params, &block.hash, scope);

        // `as |item index|` names are bound in the main body only
        let declared = block_param_names(block.block_param.as_ref());
        let depth = scope.locals.len();
        scope.locals.extend(declared);
        self.visit_template(block.template.as_ref(), scope);
        scope.locals.truncate(depth);

        self.visit_template(block.inverse.as_ref(), scope);
    }

    /// Partials and decorators, including `{{#*inline}}` sub-template bodies.
    fn visit_decorator(&self, decorator: &DecoratorTemplate, scope: &mut Scope) {
        if let Parameter::Subexpression(sub) = &decorator.name {
            self.visit_subexpression(sub, scope);
        }
        self.visit_arguments(&decorator.params, &decorator.hash, scope);
        self.visit_template(decorator.template.as_ref(), scope);
    }

    fn visit_subexpression(&self, sub: &Subexpression, scope: &mut Scope) {
        match sub.element.as_ref() {
            // `(name args...)` always calls a helper
            TemplateElement::Expression(expr) | TemplateElement::HtmlExpression(expr) => {
                if let Parameter::Subexpression(inner) = &expr.name {
                    self.visit_subexpression(inner, scope);
                }
                self.visit_arguments(&expr.params, &expr.hash, scope);
            }
            other => self.visit_element(other, scope),
        }
    }

    fn visit_arguments(
        &self,
        params: &[Parameter],
        hash: &HashMap<String, Parameter>,
        scope: &mut Scope,
    ) {
        for param in params {
            self.visit_parameter(param, scope);
        }
        let mut keys: Vec<&String> = hash.keys().collect();
        keys.sort();
        for key in keys {
            self.visit_parameter(&hash[key], scope);
        }
    }

    fn visit_parameter(&self, param: &Parameter, scope: &mut Scope) {
        match param {
            Parameter::Path(path) => self.visit_path(path, scope),
            Parameter::Subexpression(sub) => self.visit_subexpression(sub, scope),
            // literals and bare names
            _ => {}
        }
    }

    fn visit_path(&self, path: &Path, scope: &mut Scope) {
        let Some(field) = relative_raw(path).and_then(FieldRef::parse) else {
            return;
        };
        if scope.locals.iter().any(|local| local == field.name()) {
            tracing::trace!("'{}' is a block param, not a field", field.raw);
            return;
        }
        scope.found.push(field);
    }

    fn is_helper(&self, path: &Path) -> bool {
        relative_raw(path).is_some_and(|raw| self.helpers.contains(raw))
    }
}

/// Traversal state: references found so far and the block params in scope.
#[derive(Default)]
struct Scope {
    found: Vec<FieldRef>,
    locals: Vec<String>,
}

fn block_param_names(param: Option<&BlockParam>) -> Vec<String> {
    let declared: Vec<&Parameter> = match param {
        None => Vec::new(),
        Some(BlockParam::Single(name)) => vec![name],
        Some(BlockParam::Pair((first, second))) => vec![first, second],
        Some(_) => Vec::new(),
    };
    declared
        .into_iter()
        .filter_map(|param| match param {
            Parameter::Name(name) => Some(name.clone()),
            Parameter::Path(path) => relative_raw(path).map(str::to_string),
            _ => None,
        })
        .collect()
}

/// Raw text of a relative path; `None` for block-local data like `@index`.
fn relative_raw(path: &Path) -> Option<&str> {
    match path {
        Path::Relative((_, raw)) => Some(raw.as_str()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELPERS: &[&str] = &["seq", "now", "default"];

    fn compile(source: &str) -> Template {
        Template::compile(source).unwrap()
    }

    fn free(source: &str) -> Vec<String> {
        let template = compile(source);
        FieldCollector::new(HELPERS).free_names(Some(&template))
    }

    #[test]
    fn test_collects_simple_expression() {
        assert_eq!(free("Hello {{name}}!"), vec!["name"]);
    }

    #[test]
    fn test_triple_stash_is_an_expression_too() {
        assert_eq!(free("{{{body}}}"), vec!["body"]);
    }

    #[test]
    fn test_ignores_multi_segment_references() {
        assert!(free("{{user.name}} {{post.author.id}}").is_empty());

        let template = compile("{{user.name}}");
        let refs = FieldCollector::new(HELPERS).references(Some(&template));
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].segments, vec!["user", "name"]);
        assert!(!refs[0].is_free());
    }

    #[test]
    fn test_leading_this_is_not_a_segment() {
        assert_eq!(free("{{this.title}}"), vec!["title"]);
        assert!(free("{{this}}").is_empty());
    }

    #[test]
    fn test_conditional_visits_condition_and_both_branches() {
        assert_eq!(
            free("{{#if registered}}{{title}}{{else}}{{fallback}}{{/if}}"),
            vec!["registered", "title", "fallback"]
        );
    }

    #[test]
    fn test_loop_body_is_visited() {
        assert_eq!(
            free("{{#each postCount}}{{this}} {{@index}} {{../owner}} {{label}}{{/each}}"),
            vec!["postCount", "label"]
        );
    }

    #[test]
    fn test_block_params_are_not_fields() {
        assert_eq!(free("{{#each items as |item|}}{{item}}{{/each}}"), vec!["items"]);
        assert_eq!(
            free("{{#each items as |item idx|}}{{idx}}: {{item.name}} {{label}}{{/each}}"),
            vec!["items", "label"]
        );

        let template = compile("{{#each items as |item|}}{{item.name}}{{/each}}");
        let refs = FieldCollector::new(HELPERS).references(Some(&template));
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw, "items");
    }

    #[test]
    fn test_block_params_end_with_their_block() {
        assert_eq!(
            free("{{#each items as |item|}}{{item}}{{else}}{{item}}{{/each}} {{item}}"),
            vec!["items", "item"]
        );
    }

    #[test]
    fn test_helper_names_are_not_fields() {
        assert_eq!(
            free(r#"{{seq "post"}} {{now}} {{default registered false}}"#),
            vec!["registered"]
        );
    }

    #[test]
    fn test_unknown_bare_name_is_a_field() {
        let template = compile("{{now}}");
        let names = FieldCollector::new(&[]).free_names(Some(&template));
        assert_eq!(names, vec!["now"]);
    }

    #[test]
    fn test_helper_arguments_subexpressions_and_hash() {
        assert_eq!(
            free("{{join (lower first) last sep=separator}}"),
            vec!["first", "last", "separator"]
        );
    }

    #[test]
    fn test_partials_and_inline_bodies() {
        assert_eq!(
            free(r#"{{#*inline "row"}}{{label}}{{/inline}}{{> row item}}"#),
            vec!["label", "item"]
        );
    }

    #[test]
    fn test_text_and_comments_contribute_nothing() {
        assert!(free("plain text {{!-- {{hidden}} --}} more").is_empty());
        assert!(free(r#"{{seq "literal"}}"#).is_empty());
    }

    #[test]
    fn test_absent_template_is_empty() {
        let collector = FieldCollector::new(HELPERS);
        assert!(collector.references(None).is_empty());
    }

    #[test]
    fn test_free_names_are_deduplicated_in_order() {
        let template = compile("{{b}} {{a}} {{b}}");
        let collector = FieldCollector::new(HELPERS);
        assert_eq!(collector.free_fields(Some(&template)).len(), 3);
        assert_eq!(collector.free_names(Some(&template)), vec!["b", "a"]);
    }

    #[test]
    fn test_parse_reference_forms() {
        assert_eq!(
            FieldRef::parse("../owner").unwrap().segments,
            vec!["..", "owner"]
        );
        assert_eq!(
            FieldRef::parse("@root.id").unwrap().segments,
            vec!["@root", "id"]
        );
        assert!(FieldRef::parse("@index").is_none());
        assert!(FieldRef::parse("this").is_none());
        assert_eq!(FieldRef::parse("[odd key]").unwrap().name(), "odd key");
    }
}

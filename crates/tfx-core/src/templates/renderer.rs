//! Handlebars-based renderer for fixture templates.
//!
//! Wraps a [`handlebars::Handlebars`] registry built for a single load call:
//! - **strict mode** (on by default) turns any lookup of an unbound name into an
//!   error. The binder guarantees every free variable is bound, so a strict-mode
//!   failure points at a multi-segment reference that does not exist;
//! - **no escaping**: fixtures are YAML, not HTML, and deferred placeholders must
//!   come out byte-for-byte;
//! - the built-in helpers from [`super::helpers`], sharing the load call's
//!   [`Counters`].
//!
//! ## Usage
//!
//! ```ignore
//! let counters = Counters::new();
//! let mut renderer = TemplateRenderer::new(true, counters);
//! let template = TemplateRenderer::compile("name: user-{{id}}")?;
//! let text = renderer.render("object", template, &params)?;
//! ```

use std::sync::Arc;

use handlebars::template::Template;
use handlebars::{no_escape, Handlebars};

use super::helpers::{DefaultHelper, NowHelper, SeqHelper, DEFAULT, NOW, SEQ};
use crate::counter::Counters;
use crate::error::{Result, TfxError};
use crate::params::Params;

/// Template renderer for one load call.
pub struct TemplateRenderer {
    hbs: Handlebars<'static>,
    counters: Arc<Counters>,
}

impl TemplateRenderer {
    /// Create a renderer whose `seq` helper draws from `counters`.
    pub fn new(strict: bool, counters: Arc<Counters>) -> Self {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(strict);
        hbs.register_escape_fn(no_escape);
        hbs.register_helper(SEQ, Box::new(SeqHelper::new(Arc::clone(&counters))));
        hbs.register_helper(NOW, Box::new(NowHelper));
        hbs.register_helper(DEFAULT, Box::new(DefaultHelper));
        Self { hbs, counters }
    }

    /// Parse template source into its syntax tree.
    pub fn compile(source: &str) -> std::result::Result<Template, handlebars::TemplateError> {
        Template::compile(source)
    }

    /// Register `template` under `name` and render it against `params`.
    ///
    /// Re-using a name replaces the previously registered template.
    pub fn render(&mut self, name: &str, template: Template, params: &Params) -> Result<String> {
        self.hbs.register_template(name, template);
        self.hbs
            .render(name, params)
            .map_err(|e| TfxError::TemplateRender {
                name: name.to_string(),
                message: e.to_string(),
            })
    }

    /// The counter context shared with the `seq` helper.
    pub fn counters(&self) -> &Arc<Counters> {
        &self.counters
    }
}

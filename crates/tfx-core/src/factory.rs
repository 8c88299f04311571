//! The fixture factory: one load call from template source to typed value.
//!
//! ## Load pipeline
//!
//! 1. Read the template from the [`FixtureSource`]
//! 2. Parse it and collect its free variables ([`FieldCollector`])
//! 3. Apply the caller's options and bind deferred placeholders ([`binder::bind`])
//! 4. Render the whole template once
//! 5. Parse the output as YAML and re-render string entries in declaration order
//!    ([`walker::walk`])
//! 6. Decode the resolved document into the caller's type
//!
//! Steps 1–6 use fresh parameter, counter and registry state on every call; the
//! factory itself only holds configuration and its source.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_yaml::Value as YamlValue;

use crate::binder;
use crate::collector::{FieldCollector, FieldRef};
use crate::config::FixtureConfig;
use crate::counter::{CounterScope, Counters};
use crate::error::{Result, TfxError};
use crate::params::LoadOption;
use crate::source::{DirSource, FixtureSource};
use crate::templates::helpers::BUILTIN_HELPERS;
use crate::templates::renderer::TemplateRenderer;
use crate::walker::{self, Walk};

/// Loads named fixtures.
pub struct Factory {
    config: FixtureConfig,
    source: Box<dyn FixtureSource>,
}

impl Default for Factory {
    fn default() -> Self {
        Self::new()
    }
}

impl Factory {
    /// A factory reading `testdata/<name>.yaml` with default settings.
    pub fn new() -> Self {
        Self::from_config(FixtureConfig::default())
    }

    /// A factory reading from the directory named in `config`.
    pub fn from_config(config: FixtureConfig) -> Self {
        let source = DirSource::from_config(&config);
        Self {
            config,
            source: Box::new(source),
        }
    }

    /// Replace the fixture source.
    pub fn with_source(mut self, source: impl FixtureSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    pub fn source(&self) -> &dyn FixtureSource {
        self.source.as_ref()
    }

    /// Every field reference in the fixture, free and chained.
    pub fn references(&self, name: &str) -> Result<Vec<FieldRef>> {
        let template = self.compile(name)?;
        Ok(FieldCollector::new(BUILTIN_HELPERS).references(Some(&template)))
    }

    /// Names of the fixture's free variables, first occurrence first.
    pub fn free_variables(&self, name: &str) -> Result<Vec<String>> {
        let template = self.compile(name)?;
        Ok(FieldCollector::new(BUILTIN_HELPERS).free_names(Some(&template)))
    }

    /// Render the fixture once, without the per-entry phase.
    pub fn first_pass(&self, name: &str, options: &[LoadOption]) -> Result<String> {
        let template = self.compile(name)?;
        let free = FieldCollector::new(BUILTIN_HELPERS).free_names(Some(&template));
        let params = binder::bind(options, &free);
        let mut renderer = TemplateRenderer::new(self.config.strict, Counters::new());
        renderer.render(name, template, &params)
    }

    /// Run both rendering phases and return the resolved document.
    pub fn resolve(&self, name: &str, options: &[LoadOption]) -> Result<Walk> {
        let template = self.compile(name)?;
        let free = FieldCollector::new(BUILTIN_HELPERS).free_names(Some(&template));
        tracing::debug!("fixture '{name}' free variables: {free:?}");
        let mut params = binder::bind(options, &free);

        let counters = Counters::new();
        let mut renderer = TemplateRenderer::new(self.config.strict, Arc::clone(&counters));
        let text = renderer.render(name, template, &params)?;
        let document = walker::parse_document(name, &text)?;

        if self.config.counter_scope == CounterScope::Phase {
            counters.reset();
        }

        tracing::debug!("resolving {} entries of fixture '{name}'", document.len());
        Ok(walker::walk(document, &mut params, &mut renderer))
    }

    /// Load the fixture `name` into a new `T`.
    pub fn try_load<T: DeserializeOwned>(&self, name: &str, options: &[LoadOption]) -> Result<T> {
        let walk = self.resolve(name, options)?;
        serde_yaml::from_value(YamlValue::Mapping(walk.document)).map_err(|e| TfxError::Decode {
            name: name.to_string(),
            source: e,
        })
    }

    /// Load the fixture `name`, panicking with the full error chain on failure.
    ///
    /// Meant for test bodies, where a panic is the test failure.
    #[track_caller]
    pub fn load<T: DeserializeOwned>(&self, name: &str, options: &[LoadOption]) -> T {
        match self.try_load(name, options) {
            Ok(value) => value,
            Err(err) => fail(name, err),
        }
    }

    /// Load the fixture `name` into `dest`, panicking on failure.
    #[track_caller]
    pub fn load_into<T: DeserializeOwned>(&self, name: &str, dest: &mut T, options: &[LoadOption]) {
        *dest = self.load(name, options);
    }

    fn compile(&self, name: &str) -> Result<handlebars::template::Template> {
        let source = self.source.read(name)?;
        TemplateRenderer::compile(&source).map_err(|e| TfxError::TemplateParse {
            name: name.to_string(),
            message: e.to_string(),
        })
    }
}

#[track_caller]
fn fail(name: &str, err: TfxError) -> ! {
    panic!("failed to load fixture '{name}': {:#}", anyhow::Error::new(err))
}

//! Template rendering for fixtures.
//!
//! Fixture files are [Handlebars](https://handlebarsjs.com/) templates that render
//! to YAML. They are rendered by the [`renderer::TemplateRenderer`] with the helpers
//! defined in [`helpers`].
//!
//! ## Template variables
//!
//! - `{{name}}`: a free variable. If the caller does not supply `name`, it renders
//!   as the literal text `{{name}}` and is resolved in the second phase from an
//!   earlier document entry.
//! - `{{#each postCount}}...{{/each}}`: iterate a sequence bound by
//!   [`crate::params::with_loop`]. Give the block an `{{else}}` branch: an unsupplied
//!   loop source is a placeholder string, not a list.
//! - `{{seq "key"}}`, `{{now}}`, `{{default name fallback}}`: built-in helpers.
//!
//! **Warning**: values that start with `{{` must be quoted in YAML, otherwise the
//! rendered placeholder is read as a flow mapping.

pub mod helpers;
pub mod renderer;

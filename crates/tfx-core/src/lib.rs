//! Parameterized test fixtures.
//!
//! A fixture is a YAML document written as a Handlebars template. Loading it
//! renders the template twice: once with the caller's parameters, where every
//! unsupplied variable is left in place as `{{name}}`, then entry by entry in
//! declaration order so those placeholders can resolve to earlier entries of the
//! same document. The result is decoded into any `serde::Deserialize` type.
//!
//! ```no_run
//! use serde::Deserialize;
//! use tfx_core::{with_loop, with_params, Params};
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! let user: User = tfx_core::load(
//!     "object",
//!     &[with_params(Params::new().with("id", 5)), with_loop("postCount", 3)],
//! );
//! assert_eq!(user.name, "user-5");
//! ```

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;

pub mod binder;
pub mod collector;
pub mod config;
pub mod counter;
pub mod error;
pub mod factory;
pub mod params;
pub mod source;
pub mod templates;
pub mod walker;

pub use config::FixtureConfig;
pub use error::{Result, TfxError};
pub use factory::Factory;
pub use params::{with_loop, with_params, LoadOption, Params};

/// Factory behind the free functions below: `testdata/<name>.yaml`, strict mode.
pub static DEFAULT_FACTORY: Lazy<Factory> = Lazy::new(Factory::new);

/// Load `name` with the default factory, panicking on failure.
#[track_caller]
pub fn load<T: DeserializeOwned>(name: &str, options: &[LoadOption]) -> T {
    DEFAULT_FACTORY.load(name, options)
}

/// Load `name` with the default factory.
pub fn try_load<T: DeserializeOwned>(name: &str, options: &[LoadOption]) -> Result<T> {
    DEFAULT_FACTORY.try_load(name, options)
}

/// Load `name` into `dest` with the default factory, panicking on failure.
#[track_caller]
pub fn load_into<T: DeserializeOwned>(name: &str, dest: &mut T, options: &[LoadOption]) {
    DEFAULT_FACTORY.load_into(name, dest, options)
}

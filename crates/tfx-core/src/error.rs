//! Unified error types for fixture loading.
//!
//! Every variant here is fatal for the load call that produced it. Per-entry
//! template failures during the second phase are not errors; see
//! [`crate::walker::EntryOutcome`].

use std::path::PathBuf;
use thiserror::Error;

/// All errors that can abort a fixture load.
#[derive(Error, Debug)]
pub enum TfxError {
    // --- Configuration ---

    /// The configuration file was not found or could not be read.
    #[error("config file not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file exists but contains invalid JSON.
    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // --- Fixture source ---

    /// The fixture file could not be read.
    #[error("fixture not found at {path}")]
    FixtureNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An in-memory source has no fixture registered under this name.
    #[error("no fixture named '{0}'")]
    UnknownFixture(String),

    // --- Templates ---

    /// The fixture template is not valid Handlebars.
    #[error("failed to parse template '{name}': {message}")]
    TemplateParse { name: String, message: String },

    /// The first full render of the fixture template failed.
    #[error("failed to render template '{name}': {message}")]
    TemplateRender { name: String, message: String },

    // --- Document ---

    /// The rendered fixture is not valid YAML.
    #[error("rendered fixture '{name}' is not a valid document")]
    DocumentParse {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The rendered fixture parsed, but its top level is not a mapping.
    #[error("rendered fixture '{name}' must be a mapping at the top level")]
    NotAMapping { name: String },

    /// The resolved document does not fit the destination type.
    #[error("failed to decode fixture '{name}'")]
    Decode {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    // --- General ---

    /// A filesystem I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Alias for `Result<T, TfxError>`.
pub type Result<T> = std::result::Result<T, TfxError>;

//! Loader configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) is a
//! valid configuration:
//!
//! ```json
//! {
//!   "fixture_dir": "testdata",
//!   "extension": "yaml",
//!   "strict": true,
//!   "counter_scope": "load"
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::counter::CounterScope;
use crate::error::{Result, TfxError};

pub const DEFAULT_FIXTURE_DIR: &str = "testdata";
pub const DEFAULT_EXTENSION: &str = "yaml";

/// Settings shared by every load call of a [`crate::factory::Factory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Directory holding fixture files.
    pub fixture_dir: PathBuf,
    /// File extension of fixture files, without the dot.
    pub extension: String,
    /// Fail on lookups of unbound names instead of rendering them empty.
    pub strict: bool,
    /// Lifetime of `seq` counters within one load.
    pub counter_scope: CounterScope,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            fixture_dir: PathBuf::from(DEFAULT_FIXTURE_DIR),
            extension: DEFAULT_EXTENSION.into(),
            strict: true,
            counter_scope: CounterScope::default(),
        }
    }
}

impl FixtureConfig {
    /// Location of the fixture called `name`: `<fixture_dir>/<name>.<extension>`.
    pub fn fixture_path(&self, name: &str) -> PathBuf {
        self.fixture_dir.join(format!("{name}.{}", self.extension))
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| TfxError::ConfigNotFound {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| TfxError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| TfxError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

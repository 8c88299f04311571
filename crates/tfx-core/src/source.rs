//! Where fixture templates come from.
//!
//! [`DirSource`] reads `<fixture_dir>/<name>.<extension>` from disk, which is what
//! tests normally use. [`MemorySource`] serves templates registered in code.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::FixtureConfig;
use crate::error::{Result, TfxError};

/// Every fixture source must implement this trait.
pub trait FixtureSource: Send + Sync {
    /// Return the template text of the fixture called `name`.
    fn read(&self, name: &str) -> Result<String>;

    /// Human-readable location of `name`, for error messages and the CLI.
    fn describe(&self, name: &str) -> String {
        name.to_string()
    }
}

/// Reads fixtures from a directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
    extension: String,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &FixtureConfig) -> Self {
        Self::new(config.fixture_dir.clone(), config.extension.clone())
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{}", self.extension))
    }
}

impl FixtureSource for DirSource {
    fn read(&self, name: &str) -> Result<String> {
        let path = self.path(name);
        tracing::debug!("reading fixture: {}", path.display());
        std::fs::read_to_string(&path).map_err(|e| TfxError::FixtureNotFound { path, source: e })
    }

    fn describe(&self, name: &str) -> String {
        self.path(name).display().to_string()
    }
}

/// Serves fixtures registered in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    fixtures: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a fixture, builder style.
    pub fn with(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.fixtures.insert(name.into(), template.into());
        self
    }
}

impl FixtureSource for MemorySource {
    fn read(&self, name: &str) -> Result<String> {
        self.fixtures
            .get(name)
            .cloned()
            .ok_or_else(|| TfxError::UnknownFixture(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_source_reads_named_fixture() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("user.yaml"), "id: 1\n").unwrap();
        let source = DirSource::new(dir.path(), "yaml");
        assert_eq!(source.read("user").unwrap(), "id: 1\n");
        assert!(source.describe("user").ends_with("user.yaml"));
    }

    #[test]
    fn test_dir_source_missing_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirSource::new(dir.path(), "yaml");
        let err = source.read("nope").unwrap_err();
        assert!(matches!(err, TfxError::FixtureNotFound { .. }));
    }

    #[test]
    fn test_dir_source_from_config() {
        let config = FixtureConfig {
            fixture_dir: PathBuf::from("fixtures"),
            extension: "yml".into(),
            ..FixtureConfig::default()
        };
        let source = DirSource::from_config(&config);
        assert_eq!(source.path("user"), config.fixture_path("user"));
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new().with("user", "id: 1");
        assert_eq!(source.read("user").unwrap(), "id: 1");
        assert!(matches!(
            source.read("post").unwrap_err(),
            TfxError::UnknownFixture(name) if name == "post"
        ));
    }
}

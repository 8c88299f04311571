//! CLI command implementations for tfx.
//!
//! Each module corresponds to a subcommand (`tfx <command>`).

pub mod render;
pub mod vars;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::Value;

use tfx_core::counter::CounterScope;
use tfx_core::{Factory, FixtureConfig};

/// Settings given on the command line; they win over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub dir: Option<PathBuf>,
    pub extension: Option<String>,
    pub no_strict: bool,
    pub counter_scope: Option<CounterScope>,
}

/// Build a factory from `config_path` (when it exists) plus `overrides`.
pub fn factory(config_path: &Path, overrides: Overrides) -> Result<Factory> {
    let mut config = if config_path.exists() {
        FixtureConfig::load(config_path)?
    } else {
        tracing::debug!("{} not found, using defaults", config_path.display());
        FixtureConfig::default()
    };

    if let Some(dir) = overrides.dir {
        config.fixture_dir = dir;
    }
    if let Some(extension) = overrides.extension {
        config.extension = extension;
    }
    if overrides.no_strict {
        config.strict = false;
    }
    if let Some(scope) = overrides.counter_scope {
        config.counter_scope = scope;
    }

    tracing::debug!("fixture config: {config:?}");
    Ok(Factory::from_config(config))
}

/// Parse `KEY=VALUE`, reading the value as a YAML scalar (`5`, `true`, `foo`).
pub fn parse_param(arg: &str) -> Result<(String, Value)> {
    let (key, raw) = split_pair(arg)?;
    if raw.is_empty() {
        return Ok((key, Value::String(String::new())));
    }
    let value: Value = serde_yaml::from_str(raw)
        .with_context(|| format!("invalid value for parameter '{key}': {raw}"))?;
    Ok((key, value))
}

/// Parse `NAME=COUNT`.
pub fn parse_loop(arg: &str) -> Result<(String, usize)> {
    let (name, raw) = split_pair(arg)?;
    let count = raw
        .parse()
        .with_context(|| format!("loop count for '{name}' must be a non-negative integer, got '{raw}'"))?;
    Ok((name, count))
}

fn split_pair(arg: &str) -> Result<(String, &str)> {
    let Some((key, value)) = arg.split_once('=') else {
        bail!("expected KEY=VALUE, got '{arg}'");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("empty key in '{arg}'");
    }
    Ok((key.to_string(), value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_param_scalars() {
        assert_eq!(parse_param("id=5").unwrap(), ("id".into(), json!(5)));
        assert_eq!(parse_param("registered=true").unwrap(), ("registered".into(), json!(true)));
        assert_eq!(parse_param("name=alice").unwrap(), ("name".into(), json!("alice")));
        assert_eq!(parse_param("name=").unwrap(), ("name".into(), json!("")));
        assert_eq!(parse_param("url=a=b").unwrap(), ("url".into(), json!("a=b")));
    }

    #[test]
    fn test_parse_param_rejects_missing_separator() {
        assert!(parse_param("id").is_err());
        assert!(parse_param("=5").is_err());
    }

    #[test]
    fn test_parse_loop() {
        assert_eq!(parse_loop("postCount=3").unwrap(), ("postCount".into(), 3));
        assert!(parse_loop("postCount=-1").is_err());
        assert!(parse_loop("postCount=many").is_err());
    }

    #[test]
    fn test_overrides_win_over_defaults() {
        let overrides = Overrides {
            dir: Some(PathBuf::from("fixtures")),
            extension: Some("yml".into()),
            no_strict: true,
            counter_scope: Some(CounterScope::Phase),
        };
        let factory = factory(Path::new("/nonexistent/tfx.config.json"), overrides).unwrap();
        let config = factory.config();
        assert_eq!(config.fixture_dir, PathBuf::from("fixtures"));
        assert_eq!(config.extension, "yml");
        assert!(!config.strict);
        assert_eq!(config.counter_scope, CounterScope::Phase);
    }
}

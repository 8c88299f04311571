use anyhow::{Context, Result};
use serde_yaml::Value as YamlValue;

use tfx_core::{with_loop, with_params, Factory, LoadOption, Params};

use crate::output;
use crate::OutputFormat;

/// Load a fixture and print the result on stdout.
///
/// Parameters are applied before loops, in the order given. Entries the
/// per-entry phase could not resolve are reported as warnings; their text is
/// printed as it was after the first pass.
pub fn run(
    factory: &Factory,
    name: &str,
    params: &[String],
    loops: &[String],
    format: OutputFormat,
    first_pass: bool,
) -> Result<()> {
    let options = options(params, loops)?;
    tracing::info!("rendering {}", factory.source().describe(name));

    if first_pass {
        let text = factory.first_pass(name, &options)?;
        output::document(&text)?;
        return Ok(());
    }

    let walk = factory.resolve(name, &options)?;
    for (key, failure) in walk.unresolved() {
        output::unresolved(key, failure)?;
    }

    let document = YamlValue::Mapping(walk.document);
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(&document)?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&document)
                .context("document cannot be represented as JSON")?;
            json.push('\n');
            json
        }
    };
    output::document(&rendered)?;
    Ok(())
}

fn options(params: &[String], loops: &[String]) -> Result<Vec<LoadOption>> {
    let mut options = Vec::new();

    let mut bound = Params::new();
    for arg in params {
        let (key, value) = super::parse_param(arg)?;
        bound.insert(key, value);
    }
    if !bound.is_empty() {
        options.push(with_params(bound));
    }

    for arg in loops {
        let (name, count) = super::parse_loop(arg)?;
        options.push(with_loop(name, count));
    }
    Ok(options)
}

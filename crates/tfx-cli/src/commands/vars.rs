use anyhow::Result;

use tfx_core::Factory;

use crate::output;

/// List the variables a fixture can be parameterized with.
pub fn run(factory: &Factory, name: &str, all: bool) -> Result<()> {
    output::section(&format!("tfx vars: {name}"))?;
    output::source(&factory.source().describe(name))?;
    output::names(&factory.free_variables(name)?)?;

    if all {
        let chained: Vec<String> = factory
            .references(name)?
            .into_iter()
            .filter(|field| !field.is_free())
            .map(|field| field.raw)
            .collect();
        output::section("chained references")?;
        output::names(&chained)?;
    }
    Ok(())
}

//! Plugins command implementation.

use crate::error::Result;
use crate::output::Formatter;
use strata_parsers::PluginRegistry;

/// Execute the plugins command.
pub fn execute_plugins(formatter: &Formatter) -> Result<()> {
    let registry = PluginRegistry::with_default_plugins()?;
    let output = formatter.format_plugins(&registry.descriptors())?;
    println!("{}", output);
    Ok(())
}

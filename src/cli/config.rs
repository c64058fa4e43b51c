use std::path::Path;

use super::serve::load_config;
use crate::config::WorkbenchConfig;
use crate::error::Result;

/// Execute the `config` command: print the effective configuration.
pub fn execute(config_path: Option<&Path>, default: bool) -> Result<()> {
    let config = if default {
        WorkbenchConfig::default()
    } else {
        load_config(config_path)?
    };
    print!("{}", render(&config)?);
    Ok(())
}

fn render(config: &WorkbenchConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::StrataConfig;
use std::path::Path;

/// Loads and validates a `strata.toml` configuration from a directory.
///
/// Reads `<dir>/strata.toml`, parses it, and validates required fields.
pub fn load_config(dir: &Path) -> Result<StrataConfig, ConfigError> {
    let path = dir.join("strata.toml");
    let content =
        std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })?;
    load_config_from_str(&content)
}

/// Parses and validates a `strata.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<StrataConfig, ConfigError> {
    let config: StrataConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are consistent.
fn validate_config(config: &StrataConfig) -> Result<(), ConfigError> {
    if config.design.name.is_empty() {
        return Err(ConfigError::EmptyField {
            field: "design.name",
        });
    }
    if config.design.top_module.as_deref() == Some("") {
        return Err(ConfigError::EmptyField {
            field: "design.top_module",
        });
    }
    let netlist = &config.netlist;
    if netlist.anonymous_net_prefix.is_empty() {
        return Err(ConfigError::EmptyField {
            field: "netlist.anonymous_net_prefix",
        });
    }
    if netlist.anonymous_instance_prefix.is_empty() {
        return Err(ConfigError::EmptyField {
            field: "netlist.anonymous_instance_prefix",
        });
    }
    if netlist.anonymous_net_prefix == netlist.anonymous_instance_prefix {
        return Err(ConfigError::PrefixCollision {
            prefix: netlist.anonymous_net_prefix.clone(),
        });
    }
    Ok(())
}

//! Configuration types deserialized from `strata.toml`.

use serde::Deserialize;

/// The top-level configuration parsed from `strata.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct StrataConfig {
    /// Design identity.
    pub design: DesignSection,
    /// Library-related settings (boundary-synthesis default cells).
    #[serde(default)]
    pub library: LibrarySection,
    /// Netlist editing behavior.
    #[serde(default)]
    pub netlist: NetlistSection,
    /// Arena reservation hints.
    #[serde(default)]
    pub capacity: CapacitySection,
}

impl StrataConfig {
    /// Creates a configuration with the given design name and all defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            design: DesignSection {
                name: name.into(),
                top_module: None,
            },
            library: LibrarySection::default(),
            netlist: NetlistSection::default(),
            capacity: CapacitySection::default(),
        }
    }

    /// Returns the name of the top module, falling back to the design name.
    pub fn top_module_name(&self) -> &str {
        self.design.top_module.as_deref().unwrap_or(&self.design.name)
    }
}

/// The `[design]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DesignSection {
    /// The design name.
    pub name: String,
    /// The top module name; defaults to the design name.
    #[serde(default)]
    pub top_module: Option<String>,
}

/// The `[library]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibrarySection {
    /// Library cell assumed to drive each input port.
    #[serde(default)]
    pub default_input_cell: Option<String>,
    /// Library cell assumed to load each output port.
    #[serde(default)]
    pub default_output_cell: Option<String>,
}

/// The `[netlist]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct NetlistSection {
    /// Prefix for generated net names.
    #[serde(default = "default_net_prefix")]
    pub anonymous_net_prefix: String,
    /// Prefix for generated instance names.
    #[serde(default = "default_instance_prefix")]
    pub anonymous_instance_prefix: String,
    /// Whether reading a net tag that was never set is an error.
    #[serde(default = "default_strict_tags")]
    pub strict_tags: bool,
}

impl Default for NetlistSection {
    fn default() -> Self {
        Self {
            anonymous_net_prefix: default_net_prefix(),
            anonymous_instance_prefix: default_instance_prefix(),
            strict_tags: default_strict_tags(),
        }
    }
}

fn default_net_prefix() -> String {
    "__net".to_string()
}

fn default_instance_prefix() -> String {
    "__inst".to_string()
}

fn default_strict_tags() -> bool {
    true
}

/// The `[capacity]` section: how many records to reserve up front.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CapacitySection {
    /// Expected number of instances.
    #[serde(default)]
    pub instances: usize,
    /// Expected number of nets.
    #[serde(default)]
    pub nets: usize,
    /// Expected number of pins.
    #[serde(default)]
    pub pins: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_defaults() {
        let config = StrataConfig::new("chip");
        assert_eq!(config.design.name, "chip");
        assert_eq!(config.top_module_name(), "chip");
        assert_eq!(config.netlist.anonymous_net_prefix, "__net");
        assert_eq!(config.netlist.anonymous_instance_prefix, "__inst");
        assert!(config.netlist.strict_tags);
        assert_eq!(config.capacity.pins, 0);
    }

    #[test]
    fn explicit_top_module_wins() {
        let mut config = StrataConfig::new("chip");
        config.design.top_module = Some("core".to_string());
        assert_eq!(config.top_module_name(), "core");
    }
}

//! Hierarchy levels.

use crate::ids::{InstanceId, NetId, PortId};
use serde::{Deserialize, Serialize};
use strata_common::Ident;

/// A hierarchy level owning the instances, nets and ports declared directly in it.
///
/// Modules are uniquified: each one is instantiated at most once, so a module
/// has at most one parent instance. The top module has none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// The module's name.
    pub name: Ident,
    /// The hierarchical instance of this module, if it has been instantiated.
    pub parent_instance: Option<InstanceId>,
    /// Every direct child instance, ports and module instances included.
    pub instances: Vec<InstanceId>,
    /// Nets declared in this module.
    pub nets: Vec<NetId>,
    /// Ports of this module, in declaration order.
    pub ports: Vec<PortId>,
}

impl Module {
    pub(crate) fn new(name: Ident) -> Self {
        Self {
            name,
            parent_instance: None,
            instances: Vec::new(),
            nets: Vec::new(),
            ports: Vec::new(),
        }
    }
}

//! Instances: leaf cells, ports, and module instances.

use crate::ids::{ArcId, InstanceId, ModuleId, PinId};
use crate::types::{InstanceTags, InstanceType, Placement};
use serde::{Deserialize, Serialize};
use strata_common::Ident;
use strata_library::{LibraryCellId, PinDirection};

/// The kind-specific payload of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstanceKind {
    /// A leaf cell.
    Cell {
        /// The library cell this instance is an occurrence of.
        library_cell: LibraryCellId,
    },
    /// A module port. Its single pin has the inside-view direction.
    Port {
        /// The port direction as seen from outside the module.
        direction: PinDirection,
        /// The matching pin on the module's hierarchical instance.
        outer_pin: Option<PinId>,
    },
    /// A hierarchical instance of a module.
    Module {
        /// The instantiated module.
        module: ModuleId,
    },
}

impl InstanceKind {
    /// Returns the type tag of this payload.
    pub fn instance_type(&self) -> InstanceType {
        match self {
            InstanceKind::Cell { .. } => InstanceType::Cell,
            InstanceKind::Port { .. } => InstanceType::Port,
            InstanceKind::Module { .. } => InstanceType::Module,
        }
    }
}

/// An instance record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// Instance name, unique across the design.
    pub name: Ident,
    /// The module this instance is declared in.
    pub parent: ModuleId,
    /// Position in the parent module's instance list.
    pub index_in_parent: u32,
    /// Owned pins, ordered like the library cell's pins (or the module's ports).
    pub pins: Vec<PinId>,
    /// Internal timing arcs built from the library cell's arc template.
    pub arcs: Vec<ArcId>,
    /// Kind-specific payload.
    pub kind: InstanceKind,
    /// User tags.
    pub tags: InstanceTags,
    /// Physical attributes.
    pub placement: Placement,
    /// Design revision of the last change to this instance.
    pub stamp: u64,
}

impl Instance {
    /// Returns the type tag of this instance.
    pub fn instance_type(&self) -> InstanceType {
        self.kind.instance_type()
    }

    /// Returns the library cell for leaf cells.
    pub fn library_cell(&self) -> Option<LibraryCellId> {
        match self.kind {
            InstanceKind::Cell { library_cell } => Some(library_cell),
            _ => None,
        }
    }
}

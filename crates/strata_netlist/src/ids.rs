//! Opaque ID newtypes for all netlist entities.
//!
//! Each ID is a thin `u32` wrapper that is `Copy`, `Ord`, `Hash`, and
//! `Serialize`/`Deserialize`. IDs are handed out by the design's arenas in
//! insertion order and are never reused, so they are stable map keys.
//!
//! [`CellId`] and [`PortId`] are kind-specific views of an [`InstanceId`].
//! Only the design mints them; converting back to [`InstanceId`] is free.

use serde::{Deserialize, Serialize};
use strata_common::define_id;

define_id!(
    /// Opaque, copyable ID for a hierarchy level.
    ModuleId
);

define_id!(
    /// Opaque, copyable ID for any instance: leaf cell, port, or module instance.
    InstanceId
);

define_id!(
    /// Opaque, copyable ID for a pin owned by an instance.
    PinId
);

define_id!(
    /// Opaque, copyable ID for a net.
    NetId
);

define_id!(
    /// Opaque, copyable ID for an instance arc or a net arc.
    ArcId
);

/// An instance known to be a leaf cell bound to a library cell.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct CellId(InstanceId);

impl CellId {
    pub(crate) fn new(instance: InstanceId) -> Self {
        Self(instance)
    }

    /// Returns the underlying instance ID.
    pub fn instance(self) -> InstanceId {
        self.0
    }
}

impl From<CellId> for InstanceId {
    fn from(cell: CellId) -> Self {
        cell.0
    }
}

/// An instance known to be a module port.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct PortId(InstanceId);

impl PortId {
    pub(crate) fn new(instance: InstanceId) -> Self {
        Self(instance)
    }

    /// Returns the underlying instance ID.
    pub fn instance(self) -> InstanceId {
        self.0
    }
}

impl From<PortId> for InstanceId {
    fn from(port: PortId) -> Self {
        port.0
    }
}

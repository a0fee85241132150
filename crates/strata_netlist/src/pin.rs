//! Pins.

use crate::ids::{ArcId, InstanceId, NetId};
use crate::types::InstanceType;
use serde::{Deserialize, Serialize};
use strata_library::PinDirection;

/// A pin record.
///
/// A pin belongs to exactly one instance for its whole lifetime. Its `net`
/// link is kept symmetric with the net's pin list by the design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    /// Owning instance.
    pub instance: InstanceId,
    /// Position in the owning instance's pin list.
    pub index: u32,
    /// Signal direction as seen by the net.
    pub direction: PinDirection,
    /// Type of the owning instance.
    pub owner: InstanceType,
    /// Set for pins that sit on a hierarchy boundary (ports and module-instance pins).
    pub boundary: bool,
    /// Connected net.
    pub net: Option<NetId>,
    /// Position in the connected net's pin list.
    pub index_in_net: u32,
    /// Arcs ending at this pin.
    pub incoming: Vec<ArcId>,
    /// Arcs starting at this pin.
    pub outgoing: Vec<ArcId>,
    /// Topological order; valid only while the design is consistent.
    pub order: u32,
    /// Traversal mark compared against the design's sign counter.
    pub mark: u32,
    /// Design revision of the last change to this pin.
    pub stamp: u64,
}

impl Pin {
    pub(crate) fn new(
        instance: InstanceId,
        index: u32,
        direction: PinDirection,
        owner: InstanceType,
        stamp: u64,
    ) -> Self {
        Self {
            instance,
            index,
            direction,
            owner,
            boundary: owner != InstanceType::Cell,
            net: None,
            index_in_net: 0,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            order: 0,
            mark: 0,
            stamp,
        }
    }

    /// Returns `true` if the pin is an output.
    pub fn is_driver(&self) -> bool {
        self.direction == PinDirection::Output
    }

    /// Returns `true` if the pin is an input.
    pub fn is_sink(&self) -> bool {
        self.direction == PinDirection::Input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_follows_owner() {
        let inst = InstanceId::from_raw(0);
        assert!(!Pin::new(inst, 0, PinDirection::Input, InstanceType::Cell, 0).boundary);
        assert!(Pin::new(inst, 0, PinDirection::Output, InstanceType::Port, 0).boundary);
        assert!(Pin::new(inst, 0, PinDirection::Input, InstanceType::Module, 0).boundary);
    }

    #[test]
    fn driver_and_sink() {
        let inst = InstanceId::from_raw(0);
        let out = Pin::new(inst, 2, PinDirection::Output, InstanceType::Cell, 0);
        assert!(out.is_driver());
        assert!(!out.is_sink());
    }
}

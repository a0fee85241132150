//! Timing arcs.

use crate::ids::{NetId, PinId};
use serde::{Deserialize, Serialize};
use strata_library::LibraryArcId;

/// What an arc represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArcKind {
    /// An internal cell arc from an input pin to an output pin.
    Instance {
        /// The template arc in the library.
        library_arc: LibraryArcId,
    },
    /// A wire segment from a net's output pin to one of its input pins.
    Net {
        /// The net the arc belongs to.
        net: NetId,
    },
}

/// An arc record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc {
    /// Source pin.
    pub from: PinId,
    /// Destination pin.
    pub to: PinId,
    /// Arc kind and payload.
    pub kind: ArcKind,
}

impl Arc {
    /// Returns `true` for internal cell arcs.
    pub fn is_instance_arc(&self) -> bool {
        matches!(self.kind, ArcKind::Instance { .. })
    }

    /// Returns the net for net arcs.
    pub fn net(&self) -> Option<NetId> {
        match self.kind {
            ArcKind::Net { net } => Some(net),
            ArcKind::Instance { .. } => None,
        }
    }
}

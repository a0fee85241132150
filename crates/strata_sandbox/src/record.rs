//! Sandbox records.
//!
//! Each record mirrors the shape of its design counterpart and adds a
//! `related` link to it. `captured` is the design revision at which a
//! mirrored record was copied; local records carry `related: None` and
//! `captured: 0`.

use crate::ids::{SandboxArcId, SandboxInstanceId, SandboxNetId, SandboxPinId};
use serde::{Deserialize, Serialize};
use strata_common::Ident;
use strata_library::{DirectionCounts, LibraryArcId, LibraryCellId, PinDirection};
use strata_netlist::{ArcId, InstanceId, NetId, PinId};

/// What a sandbox instance is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SandboxInstanceKind {
    /// A leaf cell bound to a library cell.
    Cell {
        /// The bound library cell.
        library_cell: LibraryCellId,
    },
    /// A boundary port standing in for connectivity outside the sandbox.
    VirtualPort {
        /// Port direction; an input port drives its net.
        direction: PinDirection,
        /// The inside pin on the other side of the cut, if any.
        attached: Option<SandboxPinId>,
    },
}

/// A sandbox instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxInstance {
    /// Name, unique within the sandbox.
    pub name: Ident,
    /// Kind and payload.
    pub kind: SandboxInstanceKind,
    /// Pins in library order; a virtual port has exactly one.
    pub pins: Vec<SandboxPinId>,
    /// Internal arcs.
    pub arcs: Vec<SandboxArcId>,
    /// The design instance this mirrors.
    pub related: Option<InstanceId>,
    /// Design revision when mirrored.
    pub captured: u64,
}

impl SandboxInstance {
    /// Returns the library cell, or `None` for a virtual port.
    pub fn library_cell(&self) -> Option<LibraryCellId> {
        match self.kind {
            SandboxInstanceKind::Cell { library_cell } => Some(library_cell),
            SandboxInstanceKind::VirtualPort { .. } => None,
        }
    }

    /// Returns `true` for virtual ports.
    pub fn is_virtual(&self) -> bool {
        matches!(self.kind, SandboxInstanceKind::VirtualPort { .. })
    }
}

/// A sandbox pin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxPin {
    /// Pin name; a virtual port's pin shares the port's name.
    pub name: Ident,
    /// Owning instance.
    pub instance: SandboxInstanceId,
    /// Position in the owner's pin list.
    pub index: u32,
    /// Direction seen from the sandbox netlist.
    pub direction: PinDirection,
    /// Connected net.
    pub net: Option<SandboxNetId>,
    /// Position in the net's pin list while connected.
    pub index_in_net: u32,
    /// Arcs ending at this pin.
    pub incoming: Vec<SandboxArcId>,
    /// Arcs starting at this pin.
    pub outgoing: Vec<SandboxArcId>,
    /// `true` for the pin of a virtual port.
    pub is_virtual: bool,
    /// Traversal mark.
    pub mark: u32,
    /// The design pin this mirrors.
    pub related: Option<PinId>,
    /// Design revision when mirrored.
    pub captured: u64,
}

impl SandboxPin {
    pub(crate) fn new(
        name: Ident,
        instance: SandboxInstanceId,
        index: u32,
        direction: PinDirection,
        is_virtual: bool,
    ) -> Self {
        Self {
            name,
            instance,
            index,
            direction,
            net: None,
            index_in_net: 0,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            is_virtual,
            mark: 0,
            related: None,
            captured: 0,
        }
    }
}

/// A sandbox net.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxNet {
    /// Name, unique within the sandbox.
    pub name: Ident,
    /// Connected pins.
    pub pins: Vec<SandboxPinId>,
    /// Cached driver: any output pin currently in `pins`.
    pub driver: Option<SandboxPinId>,
    /// Connected pins per direction.
    pub counts: DirectionCounts,
    /// Driver-to-sink wire arcs.
    pub arcs: Vec<SandboxArcId>,
    /// `true` when the net exists only to represent a boundary.
    pub is_virtual: bool,
    /// The design net this mirrors.
    pub related: Option<NetId>,
    /// Design revision when mirrored.
    pub captured: u64,
}

impl SandboxNet {
    pub(crate) fn new(name: Ident, is_virtual: bool) -> Self {
        Self {
            name,
            pins: Vec::new(),
            driver: None,
            counts: DirectionCounts::default(),
            arcs: Vec::new(),
            is_virtual,
            related: None,
            captured: 0,
        }
    }
}

/// What a sandbox arc represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SandboxArcKind {
    /// Internal cell arc.
    Instance {
        /// Template arc in the library.
        library_arc: LibraryArcId,
    },
    /// Wire segment of a net.
    Net {
        /// Owning net.
        net: SandboxNetId,
    },
}

/// A sandbox arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxArc {
    /// Source pin.
    pub from: SandboxPinId,
    /// Destination pin.
    pub to: SandboxPinId,
    /// Kind and payload.
    pub kind: SandboxArcKind,
    /// The design arc this mirrors.
    pub related: Option<ArcId>,
}

impl SandboxArc {
    /// Returns the net for net arcs.
    pub fn net(&self) -> Option<SandboxNetId> {
        match self.kind {
            SandboxArcKind::Net { net } => Some(net),
            SandboxArcKind::Instance { .. } => None,
        }
    }
}

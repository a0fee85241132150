//! Nets.

use crate::ids::{ArcId, ModuleId, PinId};
use crate::types::NetTags;
use serde::{Deserialize, Serialize};
use strata_common::Ident;
use strata_library::DirectionCounts;

/// A net record.
///
/// `counts` always matches the directions of the pins in `pins`, and
/// `driver`, when set, is an output pin currently in `pins`. With several
/// output pins the cached driver is any one of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Net {
    /// Net name, unique across the design.
    pub name: Ident,
    /// The module this net is declared in.
    pub parent: ModuleId,
    /// Position in the parent module's net list.
    pub index_in_parent: u32,
    /// Connected pins.
    pub pins: Vec<PinId>,
    /// Cached driver.
    pub driver: Option<PinId>,
    /// Connected pins per direction.
    pub counts: DirectionCounts,
    /// Driver-to-sink wire arcs.
    pub arcs: Vec<ArcId>,
    /// User tags.
    pub tags: NetTags,
    /// Topological order; valid only while the design is consistent.
    pub order: u32,
    /// Design revision of the last change to this net.
    pub stamp: u64,
}

impl Net {
    pub(crate) fn new(name: Ident, parent: ModuleId, index_in_parent: u32, stamp: u64) -> Self {
        Self {
            name,
            parent,
            index_in_parent,
            pins: Vec::new(),
            driver: None,
            counts: DirectionCounts::default(),
            arcs: Vec::new(),
            tags: NetTags::default(),
            order: 0,
            stamp,
        }
    }
}

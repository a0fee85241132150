//! Sandbox connectivity edits.
//!
//! These follow the design's policies: connecting a pin to its current net
//! is a no-op, disconnecting a free pin is a no-op, and net arcs link every
//! output pin of a net to every input pin.

use crate::error::{SandboxError, SandboxResult};
use crate::ids::{SandboxArcId, SandboxInstanceId, SandboxNetId, SandboxPinId};
use crate::record::{SandboxArc, SandboxArcKind, SandboxInstanceKind};
use crate::sandbox::Sandbox;
use strata_library::{Library, LibraryCellId, LibraryError, PinDirection};

impl Sandbox {
    /// Connects `pin` to `net`.
    pub fn connect(&mut self, pin: SandboxPinId, net: SandboxNetId) -> SandboxResult<()> {
        let p = &self.pins[pin];
        let direction = p.direction;
        match p.net {
            Some(current) if current == net => return Ok(()),
            Some(current) => {
                return Err(SandboxError::PinAlreadyConnected {
                    pin: self.pin_path(pin),
                    net: self.net_name(current).to_string(),
                })
            }
            None => {}
        }

        let partner = match direction {
            PinDirection::Output => Some(PinDirection::Input),
            PinDirection::Input => Some(PinDirection::Output),
            _ => None,
        };
        if let Some(partner) = partner {
            let others: Vec<SandboxPinId> = self.pins_of_direction(net, partner).collect();
            for other in others {
                let (from, to) = match direction {
                    PinDirection::Output => (pin, other),
                    _ => (other, pin),
                };
                self.alloc_net_arc(net, from, to);
            }
        }

        let n = &mut self.nets[net];
        let index_in_net = n.pins.len() as u32;
        n.pins.push(pin);
        n.counts.increment(direction);
        if direction == PinDirection::Output && n.driver.is_none() {
            n.driver = Some(pin);
        }
        let p = &mut self.pins[pin];
        p.net = Some(net);
        p.index_in_net = index_in_net;
        tracing::trace!(pin = %self.pin_path(pin), net = self.net_name(net), "sandbox pin connected");
        Ok(())
    }

    /// Disconnects `pin`. Returns `false` if it was not connected.
    pub fn disconnect(&mut self, pin: SandboxPinId) -> bool {
        let Some(net) = self.pins[pin].net else {
            return false;
        };
        let p = &self.pins[pin];
        let touching: Vec<SandboxArcId> = p
            .incoming
            .iter()
            .chain(&p.outgoing)
            .copied()
            .filter(|&a| self.arcs[a].net() == Some(net))
            .collect();
        for arc in touching {
            self.release_arc(arc);
        }

        let direction = self.pins[pin].direction;
        let index = self.pins[pin].index_in_net as usize;
        let n = &mut self.nets[net];
        n.pins.swap_remove(index);
        let moved = n.pins.get(index).copied();
        n.counts.decrement(direction);
        if n.driver == Some(pin) {
            n.driver = n
                .pins
                .iter()
                .copied()
                .find(|&other| self.pins[other].direction == PinDirection::Output);
        }
        if let Some(moved) = moved {
            self.pins[moved].index_in_net = index as u32;
        }
        let p = &mut self.pins[pin];
        p.net = None;
        p.index_in_net = 0;
        tracing::trace!(pin = %self.pin_path(pin), net = self.net_name(net), "sandbox pin disconnected");
        true
    }

    /// Rebinds a sandbox cell to another library cell.
    ///
    /// Uses the same compatibility rule as the design. Only the sandbox copy
    /// changes; see [`pending_remaps`](Self::pending_remaps) for carrying the
    /// change over.
    pub fn remap(
        &mut self,
        library: &Library,
        instance: SandboxInstanceId,
        library_cell: LibraryCellId,
    ) -> SandboxResult<()> {
        let Some(previous) = self.instances[instance].library_cell() else {
            return Err(SandboxError::NotACell(
                self.instance_name(instance).to_string(),
            ));
        };
        if previous == library_cell {
            return Ok(());
        }
        library
            .check_remap_compatible(previous, library_cell)
            .map_err(|err| match err {
                LibraryError::IncompatibleInterface { from, to, reason } => {
                    SandboxError::IncompatibleLibraryCellForRemapping {
                        instance: self.instance_name(instance).to_string(),
                        from,
                        to,
                        reason,
                    }
                }
                other => other.into(),
            })?;

        for arc in self.instances[instance].arcs.clone() {
            self.release_arc(arc);
        }
        self.instances[instance].kind = SandboxInstanceKind::Cell { library_cell };
        self.build_instance_arcs(library, instance, library_cell);
        tracing::debug!(
            sandbox = %self.name,
            instance = self.instance_name(instance),
            from = library.cell_name(previous),
            to = library.cell_name(library_cell),
            "sandbox cell remapped"
        );
        Ok(())
    }

    /// Returns the internal arc of `instance` from `from` to `to`, if any.
    pub fn instance_arc(
        &self,
        instance: SandboxInstanceId,
        from: SandboxPinId,
        to: SandboxPinId,
    ) -> Option<SandboxArcId> {
        self.instances[instance]
            .arcs
            .iter()
            .copied()
            .find(|&a| self.arcs[a].from == from && self.arcs[a].to == to)
    }

    /// Returns the wire arc of `net` from `from` to `to`, if any.
    pub fn net_arc(
        &self,
        net: SandboxNetId,
        from: SandboxPinId,
        to: SandboxPinId,
    ) -> Option<SandboxArcId> {
        self.pins[from].outgoing.iter().copied().find(|&a| {
            let arc = &self.arcs[a];
            arc.to == to && arc.net() == Some(net)
        })
    }

    pub(crate) fn build_instance_arcs(
        &mut self,
        library: &Library,
        instance: SandboxInstanceId,
        library_cell: LibraryCellId,
    ) {
        for &library_arc in library.arcs(library_cell) {
            let template = library.arc(library_arc);
            let from = self.instances[instance].pins[library.pin(template.from).index as usize];
            let to = self.instances[instance].pins[library.pin(template.to).index as usize];
            let id = self.arcs.alloc(SandboxArc {
                from,
                to,
                kind: SandboxArcKind::Instance { library_arc },
                related: None,
            });
            self.pins[from].outgoing.push(id);
            self.pins[to].incoming.push(id);
            self.instances[instance].arcs.push(id);
        }
    }

    fn alloc_net_arc(&mut self, net: SandboxNetId, from: SandboxPinId, to: SandboxPinId) {
        let id = self.arcs.alloc(SandboxArc {
            from,
            to,
            kind: SandboxArcKind::Net { net },
            related: None,
        });
        self.pins[from].outgoing.push(id);
        self.pins[to].incoming.push(id);
        self.nets[net].arcs.push(id);
    }

    pub(crate) fn release_arc(&mut self, id: SandboxArcId) {
        let Some(arc) = self.arcs.remove(id) else {
            return;
        };
        self.pins[arc.from].outgoing.retain(|&a| a != id);
        self.pins[arc.to].incoming.retain(|&a| a != id);
        match arc.kind {
            SandboxArcKind::Net { net } => self.nets[net].arcs.retain(|&a| a != id),
            SandboxArcKind::Instance { .. } => {
                let owner = self.pins[arc.from].instance;
                self.instances[owner].arcs.retain(|&a| a != id);
            }
        }
    }
}

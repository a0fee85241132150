//! Connectivity edits: connect, disconnect, remap, and move.
//!
//! Net arcs are materialized here. Connecting an output pin adds an arc to
//! every input pin already on the net and vice versa, so
//! [`Design::net_arc`] is a lookup, never a search of the net.

use crate::arc::{Arc, ArcKind};
use crate::design::Design;
use crate::error::{NetlistError, NetlistResult};
use crate::ids::{ArcId, CellId, InstanceId, NetId, PinId};
use crate::instance::InstanceKind;
use crate::observer::Event;
use crate::types::{Orientation, Point, Rect};
use strata_library::{LibraryCellId, LibraryError, PinDirection};

impl Design {
    /// Connects `pin` to `net`.
    ///
    /// Connecting a pin to the net it is already on does nothing. A pin on a
    /// different net must be disconnected first.
    pub fn connect(&mut self, pin: PinId, net: NetId) -> NetlistResult<()> {
        let p = &self.pins[pin];
        let direction = p.direction;
        match p.net {
            Some(current) if current == net => return Ok(()),
            Some(current) => {
                return Err(NetlistError::PinAlreadyConnected {
                    pin: self.pin_path(pin),
                    net: self.net_name(current).to_string(),
                })
            }
            None => {}
        }
        if self.instances[p.instance].parent != self.nets[net].parent {
            return Err(NetlistError::CrossModuleConnection {
                pin: self.pin_path(pin),
                net: self.net_name(net).to_string(),
            });
        }

        let stamp = self.bump();
        let partner = match direction {
            PinDirection::Output => Some(PinDirection::Input),
            PinDirection::Input => Some(PinDirection::Output),
            _ => None,
        };
        if let Some(partner) = partner {
            let others: Vec<PinId> = self.pins_of_direction(net, partner).collect();
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
        n.stamp = stamp;
        let p = &mut self.pins[pin];
        p.net = Some(net);
        p.index_in_net = index_in_net;
        p.stamp = stamp;
        self.invalidate_topology();

        tracing::debug!(pin = %self.pin_path(pin), net = self.net_name(net), "pin connected");
        self.notify(Event::PostPinConnect { pin, net });
        Ok(())
    }

    /// Disconnects `pin` from its net.
    ///
    /// Returns `false` and changes nothing if the pin is not connected.
    pub fn disconnect(&mut self, pin: PinId) -> bool {
        let Some(net) = self.pins[pin].net else {
            return false;
        };
        self.notify(Event::PrePinDisconnect { pin, net });
        let stamp = self.bump();

        let p = &self.pins[pin];
        let touching: Vec<ArcId> = p
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
        n.stamp = stamp;
        if let Some(moved) = moved {
            self.pins[moved].index_in_net = index as u32;
        }
        let p = &mut self.pins[pin];
        p.net = None;
        p.index_in_net = 0;
        p.stamp = stamp;
        self.invalidate_topology();

        tracing::debug!(pin = %self.pin_path(pin), net = self.net_name(net), "pin disconnected");
        true
    }

    /// Binds `cell` to another library cell without touching its connectivity.
    ///
    /// The new library cell must declare the same ordered sequence of pin
    /// names and directions. Pins keep their positions and therefore their
    /// nets; only the internal arcs are rebuilt. Observers receive the
    /// previous library cell.
    pub fn remap(&mut self, cell: CellId, library_cell: LibraryCellId) -> NetlistResult<()> {
        let inst = cell.instance();
        let previous = self.library_cell_of(cell);
        if previous == library_cell {
            return Ok(());
        }
        self.library
            .check_remap_compatible(previous, library_cell)
            .map_err(|err| match err {
                LibraryError::IncompatibleInterface { from, to, reason } => {
                    NetlistError::IncompatibleLibraryCellForRemapping {
                        instance: self.instance_name(inst).to_string(),
                        from,
                        to,
                        reason,
                    }
                }
                other => other.into(),
            })?;

        let stamp = self.bump();
        self.clear_instance_arcs(inst);
        let size = self.library.cell(library_cell).size;
        let record = &mut self.instances[inst];
        record.kind = InstanceKind::Cell { library_cell };
        record.placement.bounds =
            Rect::with_size(record.placement.bounds.min, size.width, size.height);
        record.stamp = stamp;
        self.build_instance_arcs(inst, library_cell);
        self.invalidate_topology();

        tracing::debug!(
            instance = self.instance_name(inst),
            from = self.library.cell_name(previous),
            to = self.library.cell_name(library_cell),
            "cell remapped"
        );
        self.notify(Event::PostCellRemap { cell, previous });
        Ok(())
    }

    /// Moves an instance so its lower-left corner sits at `position`.
    pub fn move_instance(&mut self, instance: impl Into<InstanceId>, position: Point) {
        let id = instance.into();
        self.notify(Event::PreInstanceMove { instance: id });
        let stamp = self.bump();
        let record = &mut self.instances[id];
        record.placement.position = position;
        record.placement.bounds = record.placement.bounds.moved_to(position);
        record.stamp = stamp;
        tracing::trace!(
            instance = self.instance_name(id),
            x = position.x,
            y = position.y,
            "instance moved"
        );
        self.notify(Event::PostInstanceMove { instance: id });
    }

    /// Sets the placement orientation of an instance.
    pub fn set_orientation(&mut self, instance: impl Into<InstanceId>, orientation: Orientation) {
        let id = instance.into();
        let stamp = self.bump();
        let record = &mut self.instances[id];
        record.placement.orientation = orientation;
        record.stamp = stamp;
    }

    /// Instantiates the library cell's arc template on `inst`.
    pub(crate) fn build_instance_arcs(&mut self, inst: InstanceId, library_cell: LibraryCellId) {
        let template: Vec<_> = self
            .library
            .arcs(library_cell)
            .iter()
            .map(|&a| {
                let arc = self.library.arc(a);
                (
                    a,
                    self.library.pin(arc.from).index as usize,
                    self.library.pin(arc.to).index as usize,
                )
            })
            .collect();
        for (library_arc, from_index, to_index) in template {
            let from = self.instances[inst].pins[from_index];
            let to = self.instances[inst].pins[to_index];
            let id = self.arcs.alloc(Arc {
                from,
                to,
                kind: ArcKind::Instance { library_arc },
            });
            self.pins[from].outgoing.push(id);
            self.pins[to].incoming.push(id);
            self.instances[inst].arcs.push(id);
        }
    }

    pub(crate) fn clear_instance_arcs(&mut self, inst: InstanceId) {
        for arc in self.instances[inst].arcs.clone() {
            self.release_arc(arc);
        }
    }

    fn alloc_net_arc(&mut self, net: NetId, from: PinId, to: PinId) -> ArcId {
        let id = self.arcs.alloc(Arc {
            from,
            to,
            kind: ArcKind::Net { net },
        });
        self.pins[from].outgoing.push(id);
        self.pins[to].incoming.push(id);
        self.nets[net].arcs.push(id);
        id
    }

    /// Unlinks an arc from its pins and owner, then frees it.
    fn release_arc(&mut self, id: ArcId) {
        let Some(arc) = self.arcs.remove(id) else {
            return;
        };
        self.pins[arc.from].outgoing.retain(|&a| a != id);
        self.pins[arc.to].incoming.retain(|&a| a != id);
        match arc.kind {
            ArcKind::Net { net } => self.nets[net].arcs.retain(|&a| a != id),
            ArcKind::Instance { .. } => {
                let owner = self.pins[arc.from].instance;
                self.instances[owner].arcs.retain(|&a| a != id);
            }
        }
    }
}

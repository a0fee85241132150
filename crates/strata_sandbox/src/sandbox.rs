//! The sandbox aggregate: arenas, names, local creation and queries.
//!
//! A [`Sandbox`] is a small netlist of its own. It borrows nothing from the
//! design: operations that need library or design data take them as
//! parameters, and records reach back into the design only through their
//! `related` IDs. Dropping a sandbox discards it; nothing is ever written
//! back implicitly.

use crate::error::{SandboxError, SandboxResult};
use crate::ids::{SandboxArcId, SandboxInstanceId, SandboxNetId, SandboxPinId};
use crate::record::{SandboxArc, SandboxInstance, SandboxInstanceKind, SandboxNet, SandboxPin};
use std::collections::HashMap;
use std::fmt;
use strata_common::{Arena, Ident, Interner};
use strata_library::{Library, LibraryCellId, PinDirection};
use strata_netlist::{InstanceId, NetId, PinId};

const VIRTUAL_PORT_PREFIX: &str = "__vport";

/// A disposable netlist overlay.
pub struct Sandbox {
    pub(crate) name: String,
    pub(crate) names: Interner,
    pub(crate) instances: Arena<SandboxInstanceId, SandboxInstance>,
    pub(crate) pins: Arena<SandboxPinId, SandboxPin>,
    pub(crate) nets: Arena<SandboxNetId, SandboxNet>,
    pub(crate) arcs: Arena<SandboxArcId, SandboxArc>,
    instance_index: HashMap<Ident, SandboxInstanceId>,
    net_index: HashMap<Ident, SandboxNetId>,
    pub(crate) mirrored_instances: HashMap<InstanceId, SandboxInstanceId>,
    pub(crate) mirrored_nets: HashMap<NetId, SandboxNetId>,
    pub(crate) mirrored_pins: HashMap<PinId, SandboxPinId>,
    next_virtual_port: u32,
    sign: u32,
}

impl Sandbox {
    /// Creates an empty sandbox.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            names: Interner::new(),
            instances: Arena::new(),
            pins: Arena::new(),
            nets: Arena::new(),
            arcs: Arena::new(),
            instance_index: HashMap::new(),
            net_index: HashMap::new(),
            mirrored_instances: HashMap::new(),
            mirrored_nets: HashMap::new(),
            mirrored_pins: HashMap::new(),
            next_virtual_port: 0,
            sign: 0,
        }
    }

    /// Returns the sandbox name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn alloc_instance(
        &mut self,
        name: &str,
        kind: SandboxInstanceKind,
        pins: &[(&str, PinDirection)],
    ) -> SandboxResult<SandboxInstanceId> {
        if self.find_instance(name).is_some() {
            return Err(SandboxError::InstanceAlreadyExists(name.to_string()));
        }
        let ident = self.names.get_or_intern(name);
        let id = self.instances.next_id();
        let is_virtual = matches!(kind, SandboxInstanceKind::VirtualPort { .. });
        let pins = pins
            .iter()
            .enumerate()
            .map(|(index, &(pin_name, direction))| {
                let pin_name = self.names.get_or_intern(pin_name);
                self.pins
                    .alloc(SandboxPin::new(pin_name, id, index as u32, direction, is_virtual))
            })
            .collect();
        let allocated = self.instances.alloc(SandboxInstance {
            name: ident,
            kind,
            pins,
            arcs: Vec::new(),
            related: None,
            captured: 0,
        });
        debug_assert_eq!(allocated, id);
        self.instance_index.insert(ident, id);
        Ok(id)
    }

    pub(crate) fn alloc_net(&mut self, name: &str, is_virtual: bool) -> SandboxResult<SandboxNetId> {
        if self.find_net(name).is_some() {
            return Err(SandboxError::NetAlreadyExists(name.to_string()));
        }
        let ident = self.names.get_or_intern(name);
        let id = self.nets.alloc(SandboxNet::new(ident, is_virtual));
        self.net_index.insert(ident, id);
        Ok(id)
    }

    /// Creates a sandbox-local cell of `library_cell`.
    ///
    /// `library` must be the library of the design this sandbox works
    /// against, so that library IDs agree.
    pub fn create_instance(
        &mut self,
        library: &Library,
        name: &str,
        library_cell: LibraryCellId,
    ) -> SandboxResult<SandboxInstanceId> {
        let pins: Vec<(&str, PinDirection)> = library
            .pins(library_cell)
            .iter()
            .map(|&p| (library.pin_name(p), library.pin(p).direction))
            .collect();
        let id = self.alloc_instance(name, SandboxInstanceKind::Cell { library_cell }, &pins)?;
        self.build_instance_arcs(library, id, library_cell);
        tracing::debug!(
            sandbox = %self.name,
            instance = name,
            cell = library.cell_name(library_cell),
            "sandbox instance created"
        );
        Ok(id)
    }

    /// Creates a sandbox-local net.
    pub fn create_net(&mut self, name: &str) -> SandboxResult<SandboxNetId> {
        let id = self.alloc_net(name, false)?;
        tracing::debug!(sandbox = %self.name, net = name, "sandbox net created");
        Ok(id)
    }

    /// Creates a net that exists only to represent a boundary.
    pub fn create_virtual_net(&mut self, name: &str) -> SandboxResult<SandboxNetId> {
        let id = self.alloc_net(name, true)?;
        tracing::debug!(sandbox = %self.name, net = name, "virtual net created");
        Ok(id)
    }

    /// Adds a virtual port on `net` and connects its pin.
    ///
    /// An input port drives the net from outside and an output port sinks
    /// it, so the port pin's direction is the flip of `direction`.
    /// `attached` names the inside pin the port stands in for.
    pub fn add_virtual_port(
        &mut self,
        net: SandboxNetId,
        direction: PinDirection,
        attached: Option<SandboxPinId>,
    ) -> SandboxResult<SandboxInstanceId> {
        if !matches!(direction, PinDirection::Input | PinDirection::Output) {
            return Err(SandboxError::InvalidPortDirection {
                net: self.net_name(net).to_string(),
                direction,
            });
        }
        let name = loop {
            let candidate = format!("{VIRTUAL_PORT_PREFIX}{}", self.next_virtual_port);
            self.next_virtual_port += 1;
            if self.find_instance(&candidate).is_none() {
                break candidate;
            }
        };
        let kind = SandboxInstanceKind::VirtualPort {
            direction,
            attached,
        };
        let id = self.alloc_instance(&name, kind, &[(name.as_str(), direction.flipped())])?;
        let pin = self.instances[id].pins[0];
        self.connect(pin, net)?;
        tracing::debug!(
            sandbox = %self.name,
            port = %name,
            %direction,
            net = self.net_name(net),
            "virtual port added"
        );
        Ok(id)
    }

    /// Removes an instance whose pins are all disconnected.
    pub fn remove_instance(&mut self, instance: SandboxInstanceId) -> SandboxResult<()> {
        let inst = &self.instances[instance];
        if let Some(&pin) = inst.pins.iter().find(|&&p| self.pins[p].net.is_some()) {
            return Err(SandboxError::InstanceHasConnectedPins {
                instance: self.instance_name(instance).to_string(),
                pin: self.pin_path(pin),
            });
        }
        for arc in inst.arcs.clone() {
            self.release_arc(arc);
        }
        let Some(inst) = self.instances.remove(instance) else {
            return Ok(());
        };
        for pin in inst.pins {
            if let Some(record) = self.pins.remove(pin) {
                if let Some(related) = record.related {
                    self.mirrored_pins.remove(&related);
                }
            }
        }
        if let Some(related) = inst.related {
            self.mirrored_instances.remove(&related);
        }
        self.instance_index.remove(&inst.name);
        tracing::debug!(
            sandbox = %self.name,
            instance = self.names.resolve(inst.name),
            "sandbox instance removed"
        );
        Ok(())
    }

    /// Removes a net with no connected pins.
    pub fn remove_net(&mut self, net: SandboxNetId) -> SandboxResult<()> {
        let count = self.nets[net].pins.len();
        if count > 0 {
            return Err(SandboxError::NetHasConnectedPins {
                net: self.net_name(net).to_string(),
                count,
            });
        }
        let Some(record) = self.nets.remove(net) else {
            return Ok(());
        };
        if let Some(related) = record.related {
            self.mirrored_nets.remove(&related);
        }
        self.net_index.remove(&record.name);
        tracing::debug!(
            sandbox = %self.name,
            net = self.names.resolve(record.name),
            "sandbox net removed"
        );
        Ok(())
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// Looks an instance up by name.
    pub fn find_instance(&self, name: &str) -> Option<SandboxInstanceId> {
        let ident = self.names.get(name)?;
        self.instance_index.get(&ident).copied()
    }

    /// Looks a net up by name.
    pub fn find_net(&self, name: &str) -> Option<SandboxNetId> {
        let ident = self.names.get(name)?;
        self.net_index.get(&ident).copied()
    }

    /// Returns an instance record. Panics if `id` was removed.
    pub fn instance(&self, id: SandboxInstanceId) -> &SandboxInstance {
        &self.instances[id]
    }

    /// Returns an instance record, or `None` if it was removed.
    pub fn try_instance(&self, id: SandboxInstanceId) -> Option<&SandboxInstance> {
        self.instances.try_get(id)
    }

    /// Returns a pin record.
    pub fn pin(&self, id: SandboxPinId) -> &SandboxPin {
        &self.pins[id]
    }

    /// Returns a pin record, or `None` if it was removed.
    pub fn try_pin(&self, id: SandboxPinId) -> Option<&SandboxPin> {
        self.pins.try_get(id)
    }

    /// Returns a net record.
    pub fn net(&self, id: SandboxNetId) -> &SandboxNet {
        &self.nets[id]
    }

    /// Returns a net record, or `None` if it was removed.
    pub fn try_net(&self, id: SandboxNetId) -> Option<&SandboxNet> {
        self.nets.try_get(id)
    }

    /// Returns an arc record.
    pub fn arc(&self, id: SandboxArcId) -> &SandboxArc {
        &self.arcs[id]
    }

    /// Returns an instance's name.
    pub fn instance_name(&self, id: SandboxInstanceId) -> &str {
        self.names.resolve(self.instances[id].name)
    }

    /// Returns a net's name.
    pub fn net_name(&self, id: SandboxNetId) -> &str {
        self.names.resolve(self.nets[id].name)
    }

    /// Returns a pin's name.
    pub fn pin_name(&self, id: SandboxPinId) -> &str {
        self.names.resolve(self.pins[id].name)
    }

    /// Returns `instance/pin`, or just the port name for a virtual port pin.
    pub fn pin_path(&self, id: SandboxPinId) -> String {
        let pin = &self.pins[id];
        if pin.is_virtual {
            self.pin_name(id).to_string()
        } else {
            format!("{}/{}", self.instance_name(pin.instance), self.pin_name(id))
        }
    }

    /// Returns an instance's pins in library order.
    pub fn pins(&self, instance: SandboxInstanceId) -> &[SandboxPinId] {
        &self.instances[instance].pins
    }

    /// Looks a pin up by name on `instance`.
    pub fn pin_by_name(&self, instance: SandboxInstanceId, name: &str) -> Option<SandboxPinId> {
        let ident = self.names.get(name)?;
        self.instances[instance]
            .pins
            .iter()
            .copied()
            .find(|&p| self.pins[p].name == ident)
    }

    /// Returns the library cell of a cell instance, or `None` for a virtual port.
    pub fn library_cell_of(&self, instance: SandboxInstanceId) -> Option<LibraryCellId> {
        self.instances[instance].library_cell()
    }

    /// Iterates over live instances in creation order.
    pub fn instances(&self) -> impl Iterator<Item = SandboxInstanceId> + '_ {
        self.instances.ids()
    }

    /// Iterates over live nets in creation order.
    pub fn nets(&self) -> impl Iterator<Item = SandboxNetId> + '_ {
        self.nets.ids()
    }

    /// Returns the pins connected to `net`.
    pub fn net_pins(&self, net: SandboxNetId) -> &[SandboxPinId] {
        &self.nets[net].pins
    }

    /// Returns the number of pins of `direction` on `net`.
    pub fn pin_count(&self, net: SandboxNetId, direction: PinDirection) -> u32 {
        self.nets[net].counts.get(direction)
    }

    /// Iterates over the output pins of `net`.
    pub fn drivers(&self, net: SandboxNetId) -> impl Iterator<Item = SandboxPinId> + '_ {
        self.pins_of_direction(net, PinDirection::Output)
    }

    /// Iterates over the input pins of `net`.
    pub fn sinks(&self, net: SandboxNetId) -> impl Iterator<Item = SandboxPinId> + '_ {
        self.pins_of_direction(net, PinDirection::Input)
    }

    pub(crate) fn pins_of_direction(
        &self,
        net: SandboxNetId,
        direction: PinDirection,
    ) -> impl Iterator<Item = SandboxPinId> + '_ {
        self.nets[net]
            .pins
            .iter()
            .copied()
            .filter(move |&p| self.pins[p].direction == direction)
    }

    /// Returns the cached driver of `net`.
    pub fn any_driver(&self, net: SandboxNetId) -> Option<SandboxPinId> {
        self.nets[net].driver
    }

    /// Returns `true` if `pin` belongs to a virtual port.
    pub fn is_virtual_pin(&self, pin: SandboxPinId) -> bool {
        self.pins[pin].is_virtual
    }

    /// Returns `true` if `net` exists only to represent a boundary.
    pub fn is_virtual_net(&self, net: SandboxNetId) -> bool {
        self.nets[net].is_virtual
    }

    /// Returns the inside pin a virtual port stands in for.
    pub fn attached_pin(&self, port: SandboxInstanceId) -> Option<SandboxPinId> {
        match self.instances[port].kind {
            SandboxInstanceKind::VirtualPort { attached, .. } => attached,
            SandboxInstanceKind::Cell { .. } => None,
        }
    }

    /// Iterates over the virtual ports.
    pub fn virtual_ports(&self) -> impl Iterator<Item = SandboxInstanceId> + '_ {
        self.instances
            .iter()
            .filter(|(_, inst)| inst.is_virtual())
            .map(|(id, _)| id)
    }

    /// Returns every pin reachable from `roots` along arcs, roots included,
    /// sorted by ID.
    pub fn fanout_cone(&mut self, roots: &[SandboxPinId]) -> Vec<SandboxPinId> {
        self.sign = self.sign.wrapping_add(1);
        if self.sign == 0 {
            for (_, pin) in self.pins.iter_mut() {
                pin.mark = 0;
            }
            self.sign = 1;
        }
        let sign = self.sign;

        let mut stack = Vec::new();
        for &root in roots {
            if self.pins[root].mark != sign {
                self.pins[root].mark = sign;
                stack.push(root);
            }
        }
        let mut cone = Vec::new();
        while let Some(pin) = stack.pop() {
            cone.push(pin);
            let next: Vec<SandboxPinId> = self.pins[pin]
                .outgoing
                .iter()
                .map(|&a| self.arcs[a].to)
                .collect();
            for to in next {
                if self.pins[to].mark != sign {
                    self.pins[to].mark = sign;
                    stack.push(to);
                }
            }
        }
        cone.sort_unstable();
        cone
    }
}

impl fmt::Debug for Sandbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sandbox")
            .field("name", &self.name)
            .field("instances", &self.instances.len())
            .field("nets", &self.nets.len())
            .field("pins", &self.pins.len())
            .field("mirrored", &self.mirrored_instances.len())
            .finish()
    }
}

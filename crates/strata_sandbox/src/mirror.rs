//! Mirroring design records into a sandbox and tracking how they age.
//!
//! [`Sandbox::extract`] copies a set of cells with every net they touch and
//! cuts each net at the sandbox boundary with virtual ports. Imports are
//! memoized, so importing the same design record twice yields the same
//! sandbox record.
//!
//! Mirrored records remember the design revision they were copied at.
//! [`Sandbox::related_state`] compares that with the design record's own
//! stamp to tell whether the counterpart is untouched, changed or gone.

use crate::error::SandboxResult;
use crate::ids::{SandboxInstanceId, SandboxNetId, SandboxPinId};
use crate::record::SandboxInstanceKind;
use crate::sandbox::Sandbox;
use std::collections::HashSet;
use strata_library::{LibraryCellId, PinDirection};
use strata_netlist::{CellId, Design, InstanceId, NetId, NetlistError, PinId};

/// How a sandbox record's design counterpart looks now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelatedState {
    /// The record has no design counterpart.
    Unrelated,
    /// The counterpart is unchanged since it was mirrored.
    Live,
    /// The counterpart changed after it was mirrored.
    Modified,
    /// The counterpart was removed from the design.
    Removed,
}

/// Any sandbox record that can have a design counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SandboxItem {
    /// An instance.
    Instance(SandboxInstanceId),
    /// A net.
    Net(SandboxNetId),
    /// A pin.
    Pin(SandboxPinId),
}

impl From<SandboxInstanceId> for SandboxItem {
    fn from(id: SandboxInstanceId) -> Self {
        SandboxItem::Instance(id)
    }
}

impl From<SandboxNetId> for SandboxItem {
    fn from(id: SandboxNetId) -> Self {
        SandboxItem::Net(id)
    }
}

impl From<SandboxPinId> for SandboxItem {
    fn from(id: SandboxPinId) -> Self {
        SandboxItem::Pin(id)
    }
}

fn classify(current_stamp: Option<Option<u64>>, captured: u64) -> RelatedState {
    match current_stamp {
        None => RelatedState::Unrelated,
        Some(None) => RelatedState::Removed,
        Some(Some(stamp)) if stamp > captured => RelatedState::Modified,
        Some(Some(_)) => RelatedState::Live,
    }
}

impl Sandbox {
    /// Builds a sandbox holding `cells`, the nets they touch, and a virtual
    /// port for every side of a net that lies outside the sandbox.
    ///
    /// A net with an outside driver gets a virtual input port attached to
    /// its first inside sink. A net with outside sinks gets a virtual output
    /// port attached to its first inside driver.
    pub fn extract(
        design: &Design,
        cells: impl IntoIterator<Item = CellId>,
    ) -> SandboxResult<Sandbox> {
        let mut sandbox = Sandbox::new(design.name());
        let mut seen = HashSet::new();
        let mut nets = Vec::new();
        for cell in cells {
            sandbox.import_cell(design, cell)?;
            for &pin in design.pins(cell) {
                if let Some(net) = design.pin(pin).net {
                    if seen.insert(net) {
                        nets.push(net);
                    }
                }
            }
        }
        for net in nets {
            sandbox.import_net(design, net)?;
        }
        tracing::debug!(
            sandbox = %sandbox.name,
            instances = sandbox.mirrored_instances.len(),
            nets = sandbox.mirrored_nets.len(),
            virtual_ports = sandbox.virtual_ports().count(),
            revision = design.revision(),
            "sandbox extracted"
        );
        Ok(sandbox)
    }

    /// Mirrors a design cell, its pins and its internal arcs.
    ///
    /// Pins whose design net is already mirrored are connected to it, and
    /// the boundary ports of those nets are brought up to date.
    /// Importing the same cell again returns the existing mirror.
    pub fn import_cell(&mut self, design: &Design, cell: CellId) -> SandboxResult<SandboxInstanceId> {
        let inst: InstanceId = cell.into();
        if let Some(&mirror) = self.mirrored_instances.get(&inst) {
            return Ok(mirror);
        }
        if design.try_instance(inst).is_none() {
            return Err(NetlistError::InstanceNotFound(format!("#{}", inst.as_raw())).into());
        }

        let library_cell = design.library_cell_of(cell);
        let design_pins = design.pins(cell);
        let pins: Vec<(&str, PinDirection)> = design_pins
            .iter()
            .map(|&p| (design.pin_name(p), design.pin(p).direction))
            .collect();
        let id = self.alloc_instance(
            design.instance_name(cell),
            SandboxInstanceKind::Cell { library_cell },
            &pins,
        )?;

        let captured = design.revision();
        let record = &mut self.instances[id];
        record.related = Some(inst);
        record.captured = captured;
        let mirrors = record.pins.clone();
        for (&mirror, &original) in mirrors.iter().zip(design_pins) {
            let pin = &mut self.pins[mirror];
            pin.related = Some(original);
            pin.captured = captured;
            self.mirrored_pins.insert(original, mirror);
        }
        self.mirrored_instances.insert(inst, id);

        self.build_instance_arcs(design.library(), id, library_cell);
        for arc in self.instances[id].arcs.clone() {
            let (from, to) = (self.arcs[arc].from, self.arcs[arc].to);
            let (Some(from), Some(to)) = (self.pins[from].related, self.pins[to].related) else {
                continue;
            };
            self.arcs[arc].related = design.instance_arc(cell, from, to);
        }

        let mut touched = Vec::new();
        for (&mirror, &original) in mirrors.iter().zip(design_pins) {
            let Some(net) = design.pin(original).net else {
                continue;
            };
            if let Some(&sandbox_net) = self.mirrored_nets.get(&net) {
                self.connect(mirror, sandbox_net)?;
                self.relate_net_arcs(design, sandbox_net);
                if !touched.contains(&(net, sandbox_net)) {
                    touched.push((net, sandbox_net));
                }
            }
        }
        for (net, sandbox_net) in touched {
            self.cut(design, net, sandbox_net)?;
        }

        tracing::debug!(
            sandbox = %self.name,
            instance = design.instance_name(cell),
            "cell mirrored"
        );
        Ok(id)
    }

    /// Mirrors a design net and connects the already-mirrored pins on it.
    ///
    /// Each side of the net with pins outside the sandbox gets a virtual
    /// port, as in [`extract`](Self::extract).
    /// Pins moved to another sandbox net by local edits stay where they are.
    /// Importing the same net again returns the existing mirror.
    pub fn import_net(&mut self, design: &Design, net: NetId) -> SandboxResult<SandboxNetId> {
        if let Some(&mirror) = self.mirrored_nets.get(&net) {
            return Ok(mirror);
        }
        if design.try_net(net).is_none() {
            return Err(NetlistError::NetNotFound(format!("#{}", net.as_raw())).into());
        }

        let id = self.alloc_net(design.net_name(net), false)?;
        let record = &mut self.nets[id];
        record.related = Some(net);
        record.captured = design.revision();
        self.mirrored_nets.insert(net, id);

        for &original in design.net_pins(net) {
            let Some(&mirror) = self.mirrored_pins.get(&original) else {
                continue;
            };
            if self.pins[mirror].net.is_none() {
                self.connect(mirror, id)?;
            }
        }
        self.relate_net_arcs(design, id);
        self.cut(design, net, id)?;
        tracing::debug!(sandbox = %self.name, net = design.net_name(net), "net mirrored");
        Ok(id)
    }

    fn relate_net_arcs(&mut self, design: &Design, net: SandboxNetId) {
        let Some(design_net) = self.nets[net].related else {
            return;
        };
        for arc in self.nets[net].arcs.clone() {
            if self.arcs[arc].related.is_some() {
                continue;
            }
            let (from, to) = (self.arcs[arc].from, self.arcs[arc].to);
            if let (Some(from), Some(to)) = (self.pins[from].related, self.pins[to].related) {
                self.arcs[arc].related = design.net_arc(design_net, from, to);
            }
        }
    }

    /// Makes the virtual ports on `mirror` match the sides of `net` that
    /// lie outside the sandbox.
    ///
    /// A missing port is added. A port whose side has since been mirrored is
    /// disconnected and removed. A kept port without an attached pin picks
    /// up the first inside pin on the opposite side.
    fn cut(&mut self, design: &Design, net: NetId, mirror: SandboxNetId) -> SandboxResult<()> {
        let outside: Vec<PinDirection> = design
            .net_pins(net)
            .iter()
            .filter(|&&p| !self.mirrored_pins.contains_key(&p))
            .map(|&p| design.pin(p).direction)
            .collect();
        let outside_driver = outside
            .iter()
            .any(|d| matches!(d, PinDirection::Output | PinDirection::InOut));
        let outside_sink = outside
            .iter()
            .any(|d| matches!(d, PinDirection::Input | PinDirection::InOut));

        let ports: Vec<(SandboxInstanceId, PinDirection, SandboxPinId)> = self.nets[mirror]
            .pins
            .iter()
            .filter_map(|&p| match self.instances[self.pins[p].instance].kind {
                SandboxInstanceKind::VirtualPort { direction, .. } => {
                    Some((self.pins[p].instance, direction, p))
                }
                SandboxInstanceKind::Cell { .. } => None,
            })
            .collect();

        // An input port stands for an outside driver and attaches to an
        // inside sink; an output port is the reverse.
        for (direction, needed) in [
            (PinDirection::Input, outside_driver),
            (PinDirection::Output, outside_sink),
        ] {
            let existing: Vec<_> = ports.iter().filter(|(_, d, _)| *d == direction).collect();
            if !needed {
                for &&(port, _, pin) in &existing {
                    self.disconnect(pin);
                    self.remove_instance(port)?;
                    tracing::debug!(
                        sandbox = %self.name,
                        net = self.net_name(mirror),
                        %direction,
                        "virtual port dropped"
                    );
                }
                continue;
            }
            let inside = self.first_inside_pin(mirror, direction);
            if existing.is_empty() {
                self.add_virtual_port(mirror, direction, inside)?;
                continue;
            }
            for &&(port, _, _) in &existing {
                if let SandboxInstanceKind::VirtualPort { attached, .. } =
                    &mut self.instances[port].kind
                {
                    if attached.is_none() {
                        *attached = inside;
                    }
                }
            }
        }
        Ok(())
    }

    fn first_inside_pin(&self, net: SandboxNetId, direction: PinDirection) -> Option<SandboxPinId> {
        self.nets[net].pins.iter().copied().find(|&p| {
            let pin = &self.pins[p];
            !pin.is_virtual && pin.direction == direction
        })
    }

    /// Returns the sandbox mirror of a design instance.
    pub fn mirror_of_instance(&self, instance: impl Into<InstanceId>) -> Option<SandboxInstanceId> {
        self.mirrored_instances.get(&instance.into()).copied()
    }

    /// Returns the sandbox mirror of a design net.
    pub fn mirror_of_net(&self, net: NetId) -> Option<SandboxNetId> {
        self.mirrored_nets.get(&net).copied()
    }

    /// Returns the sandbox mirror of a design pin.
    pub fn mirror_of_pin(&self, pin: PinId) -> Option<SandboxPinId> {
        self.mirrored_pins.get(&pin).copied()
    }

    /// Reports whether `item`'s design counterpart is still as mirrored.
    pub fn related_state(&self, design: &Design, item: impl Into<SandboxItem>) -> RelatedState {
        match item.into() {
            SandboxItem::Instance(id) => {
                let record = &self.instances[id];
                let stamp = record
                    .related
                    .map(|rel| design.try_instance(rel).map(|i| i.stamp));
                classify(stamp, record.captured)
            }
            SandboxItem::Net(id) => {
                let record = &self.nets[id];
                let stamp = record
                    .related
                    .map(|rel| design.try_net(rel).map(|n| n.stamp));
                classify(stamp, record.captured)
            }
            SandboxItem::Pin(id) => {
                let record = &self.pins[id];
                let stamp = record
                    .related
                    .map(|rel| design.try_pin(rel).map(|p| p.stamp));
                classify(stamp, record.captured)
            }
        }
    }

    /// Lists mirrored cells whose library cell now differs from their
    /// design counterpart, in sandbox order.
    ///
    /// The caller applies them with [`Design::remap`].
    pub fn pending_remaps(&self, design: &Design) -> Vec<(CellId, LibraryCellId)> {
        self.instances
            .values()
            .filter_map(|inst| {
                let library_cell = inst.library_cell()?;
                let related = inst.related?;
                design.try_instance(related)?;
                let cell = design.as_cell(related)?;
                (design.library_cell_of(cell) != library_cell).then_some((cell, library_cell))
            })
            .collect()
    }
}

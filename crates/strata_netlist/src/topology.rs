//! Lazily maintained topological order of pins and nets.
//!
//! The order is recomputed on demand after any structural mutation. A pass
//! runs an iterative depth-first search from the structural startpoints (pins
//! with no incoming arc and no hierarchy predecessor, in ID order) and then
//! from any pin not yet reached. Successors are the pin's outgoing arcs plus
//! the hierarchy link across a module boundary. Pin order is the position in
//! reverse postorder, starting at 1.
//!
//! Each pass takes two fresh values of the design's sign counter, one for
//! "entered" and one for "finished", so marks left by earlier passes never
//! need clearing.
//!
//! An edge that reaches a pin still on the search stack closes a
//! combinational cycle. The first such edge seen wins: it is recorded in
//! [`Topology::cycle_arcs`] and ignored for ordering, which keeps the pass
//! terminating and deterministic.

use crate::design::Design;
use crate::error::{NetlistError, NetlistResult};
use crate::ids::{NetId, PinId};
use crate::instance::InstanceKind;
use crate::types::{InstanceType, EMPTY_NET_ORDER};
use strata_library::PinDirection;

/// The result of one topological pass.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    nets: Vec<NetId>,
    startpoints: Vec<PinId>,
    endpoints: Vec<PinId>,
    cycle_arcs: Vec<(PinId, PinId)>,
    pass: u32,
}

impl Topology {
    /// Nets sorted by order, ties broken by ID.
    pub fn nets(&self) -> &[NetId] {
        &self.nets
    }

    /// Pins with no incoming arc and no hierarchy predecessor, in ID order.
    pub fn startpoints(&self) -> &[PinId] {
        &self.startpoints
    }

    /// Pins with no outgoing arc and no hierarchy successor, in ID order.
    pub fn endpoints(&self) -> &[PinId] {
        &self.endpoints
    }

    /// Edges that closed a combinational cycle, as `(from, to)` pins.
    pub fn cycle_arcs(&self) -> &[(PinId, PinId)] {
        &self.cycle_arcs
    }

    /// Returns `true` if the pass found a combinational cycle.
    pub fn has_cycle(&self) -> bool {
        !self.cycle_arcs.is_empty()
    }

    /// The sign value that marked pins finished during this pass.
    pub fn pass(&self) -> u32 {
        self.pass
    }
}

struct Frame {
    pin: PinId,
    successors: Vec<PinId>,
    next: usize,
}

impl Design {
    /// Recomputes the topological order if a mutation invalidated it.
    pub fn refresh(&mut self) {
        if self.topology.is_none() {
            let topology = self.compute_topology();
            self.topology = Some(topology);
        }
    }

    /// Returns the current topology, recomputing it first if needed.
    pub fn topology(&mut self) -> &Topology {
        let topology = match self.topology.take() {
            Some(topology) => topology,
            None => self.compute_topology(),
        };
        self.topology.insert(topology)
    }

    /// Returns the topology if it reflects the latest mutation.
    pub fn cached_topology(&self) -> Option<&Topology> {
        self.topology.as_ref()
    }

    /// Returns all nets in topological order.
    ///
    /// Fails with `CombinationalCycle` naming the first closing edge when the
    /// combinational graph is cyclic.
    pub fn topological_order(&mut self) -> NetlistResult<&[NetId]> {
        let cycle = self.topology().cycle_arcs.first().copied();
        if let Some((from, to)) = cycle {
            return Err(NetlistError::CombinationalCycle {
                from: self.pin_path(from),
                to: self.pin_path(to),
            });
        }
        Ok(&self.topology().nets)
    }

    /// Returns `true` if the combinational graph contains a cycle.
    pub fn has_combinational_cycle(&mut self) -> bool {
        self.topology().has_cycle()
    }

    /// Returns the structural startpoints.
    pub fn structural_startpoints(&mut self) -> &[PinId] {
        &self.topology().startpoints
    }

    /// Returns the structural endpoints.
    pub fn structural_endpoints(&mut self) -> &[PinId] {
        &self.topology().endpoints
    }

    /// Returns a pin's order, or `None` while the topology is stale.
    pub fn pin_order(&self, pin: PinId) -> Option<u32> {
        self.topology.as_ref().map(|_| self.pins[pin].order)
    }

    /// Returns a net's order, or `None` while the topology is stale.
    pub fn net_order(&self, net: NetId) -> Option<u32> {
        self.topology.as_ref().map(|_| self.nets[net].order)
    }

    /// The pin on the other side of a hierarchy boundary that `pin` feeds.
    pub(crate) fn hierarchy_successor(&self, pin: PinId) -> Option<PinId> {
        let p = &self.pins[pin];
        match (p.owner, p.direction) {
            (InstanceType::Module, PinDirection::Input) => {
                let port = self.inner_port(pin)?;
                Some(self.port_pin(port))
            }
            (InstanceType::Port, PinDirection::Input) => match self.instances[p.instance].kind {
                InstanceKind::Port { outer_pin, .. } => outer_pin,
                _ => None,
            },
            _ => None,
        }
    }

    /// The pin on the other side of a hierarchy boundary that feeds `pin`.
    pub(crate) fn hierarchy_predecessor(&self, pin: PinId) -> Option<PinId> {
        let p = &self.pins[pin];
        match (p.owner, p.direction) {
            (InstanceType::Module, PinDirection::Output) => {
                let port = self.inner_port(pin)?;
                Some(self.port_pin(port))
            }
            (InstanceType::Port, PinDirection::Output) => match self.instances[p.instance].kind {
                InstanceKind::Port { outer_pin, .. } => outer_pin,
                _ => None,
            },
            _ => None,
        }
    }

    fn successors(&self, pin: PinId) -> Vec<PinId> {
        let p = &self.pins[pin];
        p.outgoing
            .iter()
            .map(|&a| self.arcs[a].to)
            .chain(self.hierarchy_successor(pin))
            .collect()
    }

    /// Takes the next `(entered, finished)` sign pair. When the counter would
    /// wrap, every mark is cleared and counting restarts, so a stale mark can
    /// never alias a fresh sign.
    fn next_signs(&mut self) -> (u32, u32) {
        if self.sign > u32::MAX - 2 {
            for (_, pin) in self.pins.iter_mut() {
                pin.mark = 0;
            }
            self.sign = 0;
        }
        let entered = self.sign + 1;
        let finished = self.sign + 2;
        self.sign = finished;
        (entered, finished)
    }

    fn compute_topology(&mut self) -> Topology {
        let (entered, finished) = self.next_signs();

        let all: Vec<PinId> = self.pins.ids().collect();
        let startpoints: Vec<PinId> = all
            .iter()
            .copied()
            .filter(|&p| {
                self.pins[p].incoming.is_empty() && self.hierarchy_predecessor(p).is_none()
            })
            .collect();
        let endpoints: Vec<PinId> = all
            .iter()
            .copied()
            .filter(|&p| {
                self.pins[p].outgoing.is_empty() && self.hierarchy_successor(p).is_none()
            })
            .collect();

        let mut postorder = Vec::with_capacity(all.len());
        let mut cycle_arcs = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();
        for &root in startpoints.iter().chain(&all) {
            let mark = self.pins[root].mark;
            if mark == entered || mark == finished {
                continue;
            }
            self.pins[root].mark = entered;
            stack.push(Frame {
                pin: root,
                successors: self.successors(root),
                next: 0,
            });
            while let Some(frame) = stack.last_mut() {
                let from = frame.pin;
                let Some(&to) = frame.successors.get(frame.next) else {
                    self.pins[from].mark = finished;
                    postorder.push(from);
                    stack.pop();
                    continue;
                };
                frame.next += 1;
                let mark = self.pins[to].mark;
                if mark == entered {
                    cycle_arcs.push((from, to));
                } else if mark != finished {
                    self.pins[to].mark = entered;
                    let successors = self.successors(to);
                    stack.push(Frame {
                        pin: to,
                        successors,
                        next: 0,
                    });
                }
            }
        }

        for (rank, &pin) in postorder.iter().rev().enumerate() {
            self.pins[pin].order = rank as u32 + 1;
        }

        let mut nets: Vec<NetId> = self.nets.ids().collect();
        for &net in &nets {
            let pins = &self.nets[net].pins;
            let order = pins
                .iter()
                .filter(|&&p| self.pins[p].direction == PinDirection::Output)
                .map(|&p| self.pins[p].order)
                .max()
                // Undriven: the earliest sink, so no instance arc can lead
                // into a net ordered before the net it leaves.
                .or_else(|| pins.iter().map(|&p| self.pins[p].order).min())
                .unwrap_or(EMPTY_NET_ORDER);
            self.nets[net].order = order;
        }
        nets.sort_by_key(|&n| (self.nets[n].order, n));

        tracing::trace!(
            pass = finished,
            pins = all.len(),
            nets = nets.len(),
            startpoints = startpoints.len(),
            "topology recomputed"
        );
        if let Some(&(from, to)) = cycle_arcs.first() {
            tracing::warn!(
                cycles = cycle_arcs.len(),
                from = %self.pin_path(from),
                to = %self.pin_path(to),
                "combinational cycle detected"
            );
        }

        Topology {
            nets,
            startpoints,
            endpoints,
            cycle_arcs,
            pass: finished,
        }
    }
}

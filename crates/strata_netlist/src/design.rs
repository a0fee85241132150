//! The design aggregate: arenas, name indices, hierarchy, and lifecycle.
//!
//! [`Design`] owns every netlist record and is the only place they are
//! mutated. Instance, net and module creation and removal live here;
//! connectivity edits are in [`edit`](crate::edit), user tags in
//! [`tags`](crate::tags), and topological ordering in
//! [`topology`](crate::topology).

use crate::arc::Arc;
use crate::error::{NetlistError, NetlistResult};
use crate::ids::{ArcId, CellId, InstanceId, ModuleId, NetId, PinId, PortId};
use crate::instance::{Instance, InstanceKind};
use crate::module::Module;
use crate::net::Net;
use crate::observer::{Event, ObserverRegistry};
use crate::pin::Pin;
use crate::topology::Topology;
use crate::types::{DesignState, InstanceTags, InstanceType, Placement, Point, Rect};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;
use strata_common::{Arena, Ident, Interner};
use strata_config::{NetlistSection, StrataConfig};
use strata_library::{Library, LibraryCellDef, LibraryCellId, LibraryPinId, PinDirection};

/// A hierarchical netlist together with the library it instantiates.
///
/// Every operation validates before it mutates, so a failed call leaves the
/// design untouched. Structural mutations invalidate the cached topology and
/// notify the matching observers.
///
/// The design is single-threaded: its observer plumbing is reference-counted,
/// which makes `Design` neither `Send` nor `Sync`.
pub struct Design {
    pub(crate) name: String,
    pub(crate) library: Library,
    pub(crate) names: Interner,
    pub(crate) modules: Arena<ModuleId, Module>,
    pub(crate) instances: Arena<InstanceId, Instance>,
    pub(crate) pins: Arena<PinId, Pin>,
    pub(crate) nets: Arena<NetId, Net>,
    pub(crate) arcs: Arena<ArcId, Arc>,
    module_index: HashMap<Ident, ModuleId>,
    instance_index: HashMap<Ident, InstanceId>,
    net_index: HashMap<Ident, NetId>,
    top: ModuleId,
    pub(crate) settings: NetlistSection,
    next_anonymous_instance: u32,
    next_anonymous_net: u32,
    default_cells: [Option<LibraryCellId>; 4],
    pending_default_cells: Vec<(PinDirection, String)>,
    ports: [BTreeSet<PortId>; 4],
    instance_counts: [usize; 3],
    pub(crate) topology: Option<Topology>,
    pub(crate) sign: u32,
    initialized_at: Option<u64>,
    revision: u64,
    observers: Rc<ObserverRegistry>,
}

impl Design {
    /// Creates an empty design whose top module is named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_config(&StrataConfig::new(name))
    }

    /// Creates an empty design configured by `config`.
    ///
    /// Default cell names are resolved against the library by
    /// [`initialize`](Self::initialize).
    pub fn from_config(config: &StrataConfig) -> Self {
        let names = Interner::new();
        let mut modules = Arena::new();
        let top_name = names.get_or_intern(config.top_module_name());
        let top = modules.alloc(Module::new(top_name));

        let mut pending_default_cells = Vec::new();
        if let Some(cell) = &config.library.default_input_cell {
            pending_default_cells.push((PinDirection::Input, cell.clone()));
        }
        if let Some(cell) = &config.library.default_output_cell {
            pending_default_cells.push((PinDirection::Output, cell.clone()));
        }

        tracing::debug!(
            design = %config.design.name,
            top = config.top_module_name(),
            "design created"
        );
        Self {
            name: config.design.name.clone(),
            library: Library::new(),
            names,
            modules,
            instances: Arena::with_capacity(config.capacity.instances),
            pins: Arena::with_capacity(config.capacity.pins),
            nets: Arena::with_capacity(config.capacity.nets),
            arcs: Arena::new(),
            module_index: HashMap::from([(top_name, top)]),
            instance_index: HashMap::with_capacity(config.capacity.instances),
            net_index: HashMap::with_capacity(config.capacity.nets),
            top,
            settings: config.netlist.clone(),
            next_anonymous_instance: 0,
            next_anonymous_net: 0,
            default_cells: [None; 4],
            pending_default_cells,
            ports: Default::default(),
            instance_counts: [0; 3],
            topology: None,
            sign: 0,
            initialized_at: None,
            revision: 0,
            observers: Rc::new(ObserverRegistry::new()),
        }
    }

    /// Returns the design name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the library.
    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Returns the library for loading. Registration fails once the design is initialized.
    pub fn library_mut(&mut self) -> &mut Library {
        &mut self.library
    }

    /// Registers a library cell.
    pub fn register_library_cell(&mut self, def: &LibraryCellDef) -> NetlistResult<LibraryCellId> {
        Ok(self.library.register(def)?)
    }

    /// Returns the observer registry.
    pub fn observers(&self) -> &Rc<ObserverRegistry> {
        &self.observers
    }

    /// Freezes the library, resolves configured default cells, and computes
    /// the topological order.
    pub fn initialize(&mut self) -> NetlistResult<()> {
        let resolved = self
            .pending_default_cells
            .iter()
            .map(|(direction, name)| Ok((*direction, self.library.cell_by_name(name)?)))
            .collect::<NetlistResult<Vec<_>>>()?;
        for (direction, cell) in resolved {
            self.default_cells[direction.index()] = Some(cell);
        }
        self.pending_default_cells.clear();
        self.library.freeze();
        self.refresh();
        self.initialized_at = Some(self.revision);
        tracing::info!(
            design = %self.name,
            instances = self.instances.len(),
            nets = self.nets.len(),
            library_cells = self.library.len(),
            "design initialized"
        );
        Ok(())
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> DesignState {
        match self.initialized_at {
            None => DesignState::Uninitialized,
            Some(_) if self.topology.is_none() => DesignState::Mutating,
            Some(at) if at == self.revision => DesignState::Initialized,
            Some(_) => DesignState::Consistent,
        }
    }

    /// Returns the mutation counter. Every change to the design increases it.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn bump(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    pub(crate) fn invalidate_topology(&mut self) {
        if self.topology.take().is_some() {
            tracing::trace!(revision = self.revision, "topology invalidated");
        }
    }

    pub(crate) fn notify(&self, event: Event) {
        self.observers.dispatch(self, &event);
    }

    // ---------------------------------------------------------------
    // Modules
    // ---------------------------------------------------------------

    /// Returns the top module.
    pub fn top_module(&self) -> ModuleId {
        self.top
    }

    /// Creates an empty module.
    pub fn create_module(&mut self, name: &str) -> NetlistResult<ModuleId> {
        if self.find_module(name).is_some() {
            return Err(NetlistError::ModuleAlreadyExists(name.to_string()));
        }
        let ident = self.names.get_or_intern(name);
        let id = self.modules.alloc(Module::new(ident));
        self.module_index.insert(ident, id);
        self.bump();
        tracing::debug!(module = name, "module created");
        Ok(id)
    }

    /// Looks a module up by name.
    pub fn find_module(&self, name: &str) -> Option<ModuleId> {
        let ident = self.names.get(name)?;
        self.module_index.get(&ident).copied()
    }

    /// Looks a module up by name, failing with `ModuleNotFound`.
    pub fn module_by_name(&self, name: &str) -> NetlistResult<ModuleId> {
        self.find_module(name)
            .ok_or_else(|| NetlistError::ModuleNotFound(name.to_string()))
    }

    /// Returns the module record.
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id]
    }

    /// Returns the module name.
    pub fn module_name(&self, id: ModuleId) -> &str {
        self.names.resolve(self.modules[id].name)
    }

    /// Iterates over all modules in creation order.
    pub fn modules(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.modules.ids()
    }

    // ---------------------------------------------------------------
    // Instances
    // ---------------------------------------------------------------

    fn ensure_instance_name_free(&self, name: &str) -> NetlistResult<()> {
        match self.find_instance(name) {
            Some(_) => Err(NetlistError::CellAlreadyExists(name.to_string())),
            None => Ok(()),
        }
    }

    /// Allocates an instance and its pins and links it into `parent`.
    fn alloc_instance(
        &mut self,
        name: &str,
        parent: ModuleId,
        kind: InstanceKind,
        directions: &[PinDirection],
    ) -> InstanceId {
        let stamp = self.bump();
        let ident = self.names.get_or_intern(name);
        let id = self.instances.next_id();
        let owner = kind.instance_type();
        let pins = directions
            .iter()
            .enumerate()
            .map(|(index, &direction)| {
                self.pins
                    .alloc(Pin::new(id, index as u32, direction, owner, stamp))
            })
            .collect();
        let module = &mut self.modules[parent];
        let index_in_parent = module.instances.len() as u32;
        module.instances.push(id);
        self.instances.alloc(Instance {
            name: ident,
            parent,
            index_in_parent,
            pins,
            arcs: Vec::new(),
            kind,
            tags: InstanceTags::default(),
            placement: Placement::default(),
            stamp,
        });
        self.instance_index.insert(ident, id);
        self.instance_counts[owner.index()] += 1;
        self.invalidate_topology();
        id
    }

    /// Creates a leaf cell of `library_cell` inside `parent`.
    ///
    /// The instance gets one pin per library pin, in the same order and with
    /// the same direction, plus one instance arc per library arc.
    pub fn create_instance(
        &mut self,
        name: &str,
        library_cell: LibraryCellId,
        parent: ModuleId,
    ) -> NetlistResult<CellId> {
        self.ensure_instance_name_free(name)?;
        let directions: Vec<PinDirection> = self
            .library
            .pins(library_cell)
            .iter()
            .map(|&p| self.library.pin(p).direction)
            .collect();
        let id = self.alloc_instance(
            name,
            parent,
            InstanceKind::Cell { library_cell },
            &directions,
        );
        let size = self.library.cell(library_cell).size;
        self.instances[id].placement.bounds =
            Rect::with_size(Point::default(), size.width, size.height);
        self.build_instance_arcs(id, library_cell);
        tracing::debug!(
            instance = name,
            cell = self.library.cell_name(library_cell),
            module = self.module_name(parent),
            "instance created"
        );
        self.notify(Event::PostInstanceCreate { instance: id });
        Ok(CellId::new(id))
    }

    /// Creates a leaf cell with a generated name.
    pub fn create_anonymous_instance(
        &mut self,
        library_cell: LibraryCellId,
        parent: ModuleId,
    ) -> NetlistResult<CellId> {
        let name = loop {
            let candidate = format!(
                "{}{}",
                self.settings.anonymous_instance_prefix, self.next_anonymous_instance
            );
            self.next_anonymous_instance += 1;
            if self.find_instance(&candidate).is_none() {
                break candidate;
            }
        };
        self.create_instance(&name, library_cell, parent)
    }

    /// Creates a port of `parent`.
    ///
    /// The port's single pin has the direction seen from inside the module:
    /// an input port drives its net, so its pin is an output. If the module
    /// is already instantiated, the hierarchical instance gains a matching pin.
    pub fn create_port(
        &mut self,
        name: &str,
        direction: PinDirection,
        parent: ModuleId,
    ) -> NetlistResult<PortId> {
        if direction == PinDirection::Unknown {
            return Err(NetlistError::InvalidPortDirection {
                port: name.to_string(),
                direction: direction.to_string(),
            });
        }
        self.ensure_instance_name_free(name)?;
        let id = self.alloc_instance(
            name,
            parent,
            InstanceKind::Port {
                direction,
                outer_pin: None,
            },
            &[direction.flipped()],
        );
        let port = PortId::new(id);
        self.modules[parent].ports.push(port);
        self.ports[direction.index()].insert(port);

        if let Some(outer) = self.modules[parent].parent_instance {
            let stamp = self.revision;
            let index = self.instances[outer].pins.len() as u32;
            let pin = self
                .pins
                .alloc(Pin::new(outer, index, direction, InstanceType::Module, stamp));
            self.instances[outer].pins.push(pin);
            self.instances[outer].stamp = stamp;
            self.set_outer_pin(port, Some(pin));
        }

        tracing::debug!(port = name, %direction, module = self.module_name(parent), "port created");
        self.notify(Event::PostInstanceCreate { instance: id });
        Ok(port)
    }

    fn set_outer_pin(&mut self, port: PortId, pin: Option<PinId>) {
        if let InstanceKind::Port { outer_pin, .. } = &mut self.instances[port.instance()].kind {
            *outer_pin = pin;
        }
    }

    /// Instantiates `module` inside `parent`.
    ///
    /// The new instance has one pin per port of `module`, with the port's
    /// outside direction. Modules are uniquified, so each one can be
    /// instantiated only once.
    pub fn instantiate_module(
        &mut self,
        name: &str,
        module: ModuleId,
        parent: ModuleId,
    ) -> NetlistResult<InstanceId> {
        let invalid = |reason: &str| NetlistError::InvalidHierarchy {
            module: self.module_name(module).to_string(),
            reason: reason.to_string(),
        };
        if module == self.top {
            return Err(invalid("the top module cannot be instantiated"));
        }
        if module == parent {
            return Err(invalid("a module cannot contain itself"));
        }
        if let Some(existing) = self.modules[module].parent_instance {
            return Err(NetlistError::ModuleAlreadyInstantiated {
                module: self.module_name(module).to_string(),
                instance: self.instance_name(existing).to_string(),
            });
        }
        let mut level = parent;
        while let Some(inst) = self.modules[level].parent_instance {
            level = self.instances[inst].parent;
            if level == module {
                return Err(invalid("the module is an ancestor of the parent"));
            }
        }
        self.ensure_instance_name_free(name)?;

        let ports = self.modules[module].ports.clone();
        let directions: Vec<PinDirection> = ports.iter().map(|&p| self.port_direction(p)).collect();
        let id = self.alloc_instance(name, parent, InstanceKind::Module { module }, &directions);
        for (port, pin) in ports.into_iter().zip(self.instances[id].pins.clone()) {
            self.set_outer_pin(port, Some(pin));
        }
        self.modules[module].parent_instance = Some(id);
        tracing::debug!(
            instance = name,
            module = self.module_name(module),
            parent = self.module_name(parent),
            "module instantiated"
        );
        self.notify(Event::PostInstanceCreate { instance: id });
        Ok(id)
    }

    /// Removes an instance whose pins are all disconnected.
    ///
    /// For a port, the matching pin on the module's hierarchical instance must
    /// be disconnected too and is removed with it.
    pub fn remove_instance(&mut self, instance: impl Into<InstanceId>) -> NetlistResult<()> {
        let id = instance.into();
        let inst = &self.instances[id];
        let outer = match inst.kind {
            InstanceKind::Port { outer_pin, .. } => outer_pin,
            _ => None,
        };
        if let Some(&pin) = inst
            .pins
            .iter()
            .chain(outer.iter())
            .find(|&&p| self.pins[p].net.is_some())
        {
            return Err(NetlistError::InstanceHasConnectedPins {
                instance: self.instance_name(id).to_string(),
                pin: self.pin_path(pin),
            });
        }

        self.notify(Event::PreInstanceRemove { instance: id });
        let stamp = self.bump();
        self.clear_instance_arcs(id);

        let Some(inst) = self.instances.remove(id) else {
            return Ok(());
        };
        for pin in &inst.pins {
            self.pins.remove(*pin);
        }
        match inst.kind {
            InstanceKind::Port { direction, outer_pin } => {
                let port = PortId::new(id);
                self.modules[inst.parent].ports.retain(|&p| p != port);
                self.ports[direction.index()].remove(&port);
                if let Some(pin) = outer_pin {
                    self.remove_boundary_pin(pin, stamp);
                }
            }
            InstanceKind::Module { module } => {
                self.modules[module].parent_instance = None;
                for port in self.modules[module].ports.clone() {
                    self.set_outer_pin(port, None);
                }
            }
            InstanceKind::Cell { .. } => {}
        }

        let module = &mut self.modules[inst.parent];
        let index = inst.index_in_parent as usize;
        module.instances.swap_remove(index);
        if let Some(&moved) = module.instances.get(index) {
            self.instances[moved].index_in_parent = index as u32;
        }
        self.instance_index.remove(&inst.name);
        self.instance_counts[inst.kind.instance_type().index()] -= 1;
        self.invalidate_topology();
        tracing::debug!(instance = self.names.resolve(inst.name), "instance removed");
        Ok(())
    }

    /// Drops a module-instance pin and renumbers the pins after it.
    fn remove_boundary_pin(&mut self, pin: PinId, stamp: u64) {
        let Some(record) = self.pins.remove(pin) else {
            return;
        };
        let owner = &mut self.instances[record.instance];
        owner.pins.remove(record.index as usize);
        owner.stamp = stamp;
        for &later in &owner.pins[record.index as usize..] {
            let p = &mut self.pins[later];
            p.index -= 1;
            p.stamp = stamp;
        }
    }

    /// Looks an instance up by name.
    pub fn find_instance(&self, name: &str) -> Option<InstanceId> {
        let ident = self.names.get(name)?;
        self.instance_index.get(&ident).copied()
    }

    /// Looks an instance up by name, failing with `InstanceNotFound`.
    pub fn instance_by_name(&self, name: &str) -> NetlistResult<InstanceId> {
        self.find_instance(name)
            .ok_or_else(|| NetlistError::InstanceNotFound(name.to_string()))
    }

    /// Returns the instance record.
    ///
    /// # Panics
    ///
    /// Panics if the instance was removed.
    pub fn instance(&self, id: impl Into<InstanceId>) -> &Instance {
        &self.instances[id.into()]
    }

    /// Returns the instance record, or `None` if it was removed.
    pub fn try_instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.try_get(id)
    }

    /// Returns the instance name.
    pub fn instance_name(&self, id: impl Into<InstanceId>) -> &str {
        self.names.resolve(self.instances[id.into()].name)
    }

    /// Returns the instance's pins in library (or port) order.
    pub fn pins(&self, id: impl Into<InstanceId>) -> &[PinId] {
        &self.instances[id.into()].pins
    }

    /// Views an instance as a cell, if it is one.
    pub fn as_cell(&self, id: InstanceId) -> Option<CellId> {
        match self.instances.try_get(id)?.kind {
            InstanceKind::Cell { .. } => Some(CellId::new(id)),
            _ => None,
        }
    }

    /// Views an instance as a port, if it is one.
    pub fn as_port(&self, id: InstanceId) -> Option<PortId> {
        match self.instances.try_get(id)?.kind {
            InstanceKind::Port { .. } => Some(PortId::new(id)),
            _ => None,
        }
    }

    /// Returns the library cell a cell is bound to.
    pub fn library_cell_of(&self, cell: CellId) -> LibraryCellId {
        self.instances[cell.instance()]
            .library_cell()
            .unwrap_or_else(|| panic!("instance {} is not a cell", cell.instance().as_raw()))
    }

    /// Returns the outside direction of a port.
    pub fn port_direction(&self, port: PortId) -> PinDirection {
        match self.instances[port.instance()].kind {
            InstanceKind::Port { direction, .. } => direction,
            _ => panic!("instance {} is not a port", port.instance().as_raw()),
        }
    }

    /// Returns the single pin of a port.
    pub fn port_pin(&self, port: PortId) -> PinId {
        self.instances[port.instance()].pins[0]
    }

    /// Returns the pin on the module's hierarchical instance matching `port`.
    pub fn outer_pin(&self, port: PortId) -> Option<PinId> {
        match self.instances[port.instance()].kind {
            InstanceKind::Port { outer_pin, .. } => outer_pin,
            _ => None,
        }
    }

    /// Returns the port behind a module-instance pin.
    pub fn inner_port(&self, pin: PinId) -> Option<PortId> {
        let p = &self.pins[pin];
        match self.instances[p.instance].kind {
            InstanceKind::Module { module } => self.modules[module].ports.get(p.index as usize).copied(),
            _ => None,
        }
    }

    /// Iterates over all ports with the given outside direction, in ID order.
    pub fn ports_of(&self, direction: PinDirection) -> impl Iterator<Item = PortId> + '_ {
        self.ports[direction.index()].iter().copied()
    }

    /// Returns the number of live instances of a type.
    pub fn instance_count(&self, ty: InstanceType) -> usize {
        self.instance_counts[ty.index()]
    }

    /// Iterates over all live instances in creation order.
    pub fn instances(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.instances.ids()
    }

    /// Iterates over all live leaf cells in creation order.
    pub fn cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.instances
            .iter()
            .filter(|(_, inst)| inst.instance_type() == InstanceType::Cell)
            .map(|(id, _)| CellId::new(id))
    }

    /// Sets the default library cell used to synthesize boundary cells of a direction.
    pub fn set_default_cell(&mut self, direction: PinDirection, cell: LibraryCellId) {
        self.default_cells[direction.index()] = Some(cell);
        self.bump();
    }

    /// Returns the default library cell for a direction.
    pub fn default_cell(&self, direction: PinDirection) -> Option<LibraryCellId> {
        self.default_cells[direction.index()]
    }

    // ---------------------------------------------------------------
    // Nets
    // ---------------------------------------------------------------

    /// Creates an empty net inside `parent`.
    pub fn create_net(&mut self, name: &str, parent: ModuleId) -> NetlistResult<NetId> {
        if self.find_net(name).is_some() {
            return Err(NetlistError::NetAlreadyExists(name.to_string()));
        }
        let stamp = self.bump();
        let ident = self.names.get_or_intern(name);
        let module = &mut self.modules[parent];
        let index_in_parent = module.nets.len() as u32;
        let id = self.nets.alloc(Net::new(ident, parent, index_in_parent, stamp));
        module.nets.push(id);
        self.net_index.insert(ident, id);
        self.invalidate_topology();
        tracing::debug!(net = name, module = self.module_name(parent), "net created");
        self.notify(Event::PostNetCreate { net: id });
        Ok(id)
    }

    /// Creates a net with a generated name.
    pub fn create_anonymous_net(&mut self, parent: ModuleId) -> NetlistResult<NetId> {
        let name = loop {
            let candidate = format!(
                "{}{}",
                self.settings.anonymous_net_prefix, self.next_anonymous_net
            );
            self.next_anonymous_net += 1;
            if self.find_net(&candidate).is_none() {
                break candidate;
            }
        };
        self.create_net(&name, parent)
    }

    /// Removes a net with no connected pins.
    pub fn remove_net(&mut self, net: NetId) -> NetlistResult<()> {
        let count = self.nets[net].pins.len();
        if count > 0 {
            return Err(NetlistError::NetHasConnectedPins {
                net: self.net_name(net).to_string(),
                count,
            });
        }
        self.notify(Event::PreNetRemove { net });
        self.bump();
        let Some(record) = self.nets.remove(net) else {
            return Ok(());
        };
        let module = &mut self.modules[record.parent];
        let index = record.index_in_parent as usize;
        module.nets.swap_remove(index);
        if let Some(&moved) = module.nets.get(index) {
            self.nets[moved].index_in_parent = index as u32;
        }
        self.net_index.remove(&record.name);
        self.invalidate_topology();
        tracing::debug!(net = self.names.resolve(record.name), "net removed");
        Ok(())
    }

    /// Looks a net up by name.
    pub fn find_net(&self, name: &str) -> Option<NetId> {
        let ident = self.names.get(name)?;
        self.net_index.get(&ident).copied()
    }

    /// Looks a net up by name, failing with `NetNotFound`.
    pub fn net_by_name(&self, name: &str) -> NetlistResult<NetId> {
        self.find_net(name)
            .ok_or_else(|| NetlistError::NetNotFound(name.to_string()))
    }

    /// Returns the net record.
    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id]
    }

    /// Returns the net record, or `None` if it was removed.
    pub fn try_net(&self, id: NetId) -> Option<&Net> {
        self.nets.try_get(id)
    }

    /// Returns the net name.
    pub fn net_name(&self, id: NetId) -> &str {
        self.names.resolve(self.nets[id].name)
    }

    /// Iterates over all live nets in creation order.
    pub fn nets(&self) -> impl Iterator<Item = NetId> + '_ {
        self.nets.ids()
    }

    /// Returns the pins connected to a net.
    pub fn net_pins(&self, net: NetId) -> &[PinId] {
        &self.nets[net].pins
    }

    /// Iterates over the pins of a net with the given direction.
    pub fn pins_of_direction(
        &self,
        net: NetId,
        direction: PinDirection,
    ) -> impl Iterator<Item = PinId> + '_ {
        self.nets[net]
            .pins
            .iter()
            .copied()
            .filter(move |&p| self.pins[p].direction == direction)
    }

    /// Returns the number of pins of a net with the given direction.
    pub fn pin_count(&self, net: NetId, direction: PinDirection) -> u32 {
        self.nets[net].counts.get(direction)
    }

    /// Iterates over the output pins of a net.
    pub fn drivers(&self, net: NetId) -> impl Iterator<Item = PinId> + '_ {
        self.pins_of_direction(net, PinDirection::Output)
    }

    /// Iterates over the input pins of a net.
    pub fn sinks(&self, net: NetId) -> impl Iterator<Item = PinId> + '_ {
        self.pins_of_direction(net, PinDirection::Input)
    }

    /// Returns one output pin of the net, or `None` if it has none.
    pub fn any_driver(&self, net: NetId) -> Option<PinId> {
        self.nets[net].driver
    }

    /// Returns `true` if the net has at least one output pin.
    pub fn has_driver(&self, net: NetId) -> bool {
        self.nets[net].driver.is_some()
    }

    // ---------------------------------------------------------------
    // Pins and arcs
    // ---------------------------------------------------------------

    /// Returns the pin record.
    pub fn pin(&self, id: PinId) -> &Pin {
        &self.pins[id]
    }

    /// Returns the pin record, or `None` if it was removed.
    pub fn try_pin(&self, id: PinId) -> Option<&Pin> {
        self.pins.try_get(id)
    }

    /// Iterates over all live pins in creation order.
    pub fn all_pins(&self) -> impl Iterator<Item = PinId> + '_ {
        self.pins.ids()
    }

    /// Returns the pin's own name: the library pin name for cells, the port
    /// name for ports and module-instance pins.
    pub fn pin_name(&self, id: PinId) -> &str {
        let pin = &self.pins[id];
        let inst = &self.instances[pin.instance];
        match inst.kind {
            InstanceKind::Cell { library_cell } => self
                .library
                .pin_name(self.library.pin_at(library_cell, pin.index as usize)),
            InstanceKind::Port { .. } => self.names.resolve(inst.name),
            InstanceKind::Module { module } => {
                let port = self.modules[module].ports[pin.index as usize];
                self.names.resolve(self.instances[port.instance()].name)
            }
        }
    }

    /// Returns `instance/pin` for messages.
    pub fn pin_path(&self, id: PinId) -> String {
        let pin = &self.pins[id];
        if pin.owner == InstanceType::Port {
            return self.pin_name(id).to_string();
        }
        format!("{}/{}", self.instance_name(pin.instance), self.pin_name(id))
    }

    /// Returns the library pin behind a cell pin.
    pub fn library_pin(&self, id: PinId) -> Option<LibraryPinId> {
        let pin = &self.pins[id];
        let cell = self.instances[pin.instance].library_cell()?;
        Some(self.library.pin_at(cell, pin.index as usize))
    }

    /// Returns the cell pin matching a library pin, if the library pin belongs
    /// to the cell's library cell.
    pub fn pin_by_library_pin(&self, cell: CellId, library_pin: LibraryPinId) -> Option<PinId> {
        let lib_pin = self.library.pin(library_pin);
        if lib_pin.cell != self.library_cell_of(cell) {
            return None;
        }
        self.instances[cell.instance()]
            .pins
            .get(lib_pin.index as usize)
            .copied()
    }

    /// Looks a pin up by name.
    pub fn pin_by_name(&self, instance: impl Into<InstanceId>, name: &str) -> NetlistResult<PinId> {
        let id = instance.into();
        self.instances[id]
            .pins
            .iter()
            .copied()
            .find(|&p| self.pin_name(p) == name)
            .ok_or_else(|| NetlistError::PinNotFound {
                instance: self.instance_name(id).to_string(),
                pin: name.to_string(),
            })
    }

    /// Returns the arc record.
    pub fn arc(&self, id: ArcId) -> &Arc {
        &self.arcs[id]
    }

    /// Returns the arc record, or `None` if it was removed.
    pub fn try_arc(&self, id: ArcId) -> Option<&Arc> {
        self.arcs.try_get(id)
    }

    /// Returns the internal arc of `instance` from `from` to `to`, if any.
    pub fn instance_arc(
        &self,
        instance: impl Into<InstanceId>,
        from: PinId,
        to: PinId,
    ) -> Option<ArcId> {
        self.instances[instance.into()]
            .arcs
            .iter()
            .copied()
            .find(|&a| self.arcs[a].from == from && self.arcs[a].to == to)
    }

    /// Returns the wire arc of `net` from driver `from` to sink `to`, if materialized.
    pub fn net_arc(&self, net: NetId, from: PinId, to: PinId) -> Option<ArcId> {
        self.pins[from]
            .outgoing
            .iter()
            .copied()
            .find(|&a| {
                let arc = &self.arcs[a];
                arc.to == to && arc.net() == Some(net)
            })
    }
}

impl Drop for Design {
    fn drop(&mut self) {
        self.notify(Event::DesignDestruction);
        self.observers.clear();
        tracing::info!(design = %self.name, "design destroyed");
    }
}

impl fmt::Debug for Design {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Design")
            .field("name", &self.name)
            .field("modules", &self.modules.len())
            .field("instances", &self.instances.len())
            .field("nets", &self.nets.len())
            .field("pins", &self.pins.len())
            .field("revision", &self.revision)
            .field("state", &self.state())
            .finish()
    }
}

//! The library: one frozen template per cell type.

use crate::cell::{LibraryArc, LibraryCell, LibraryCellDef, LibraryPin};
use crate::error::{LibraryError, LibraryResult};
use crate::ids::{LibraryArcId, LibraryCellId, LibraryPinId};
use crate::types::{DirectionCounts, PinDirection};
use std::collections::HashMap;
use strata_common::{Arena, ContentHash, Ident, Interner};
use strata_diagnostics::{Diagnostic, DiagnosticSink};

/// A collection of cell-type templates.
///
/// Cells are registered from [`LibraryCellDef`]s during loading and are
/// immutable afterwards. [`freeze`](Self::freeze) closes the library to new
/// registrations; the design freezes its library when it is initialized.
#[derive(Debug, Default)]
pub struct Library {
    names: Interner,
    cells: Arena<LibraryCellId, LibraryCell>,
    pins: Arena<LibraryPinId, LibraryPin>,
    arcs: Arena<LibraryArcId, LibraryArc>,
    by_name: HashMap<Ident, LibraryCellId>,
    frozen: bool,
}

impl Library {
    /// Creates an empty, unfrozen library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `def` and registers it as a new cell.
    ///
    /// Fails without registering anything if the definition is inconsistent,
    /// the name is taken, or the library is frozen.
    pub fn register(&mut self, def: &LibraryCellDef) -> LibraryResult<LibraryCellId> {
        if self.frozen {
            return Err(LibraryError::LibraryFrozen(def.name.clone()));
        }
        def.check_consistency()?;
        if self.find_cell(&def.name).is_some() {
            return Err(LibraryError::LibraryCellAlreadyExists(def.name.clone()));
        }

        let cell_id = self.cells.next_id();
        let mut pins = Vec::with_capacity(def.pins.len());
        let mut by_pin_name = HashMap::with_capacity(def.pins.len());
        let mut counts = DirectionCounts::default();
        for (index, pin) in def.pins.iter().enumerate() {
            let name = self.names.get_or_intern(&pin.name);
            let id = self.pins.alloc(LibraryPin {
                name,
                cell: cell_id,
                index: index as u32,
                direction: pin.direction,
                pin_use: pin.pin_use,
            });
            counts.increment(pin.direction);
            by_pin_name.insert(pin.name.as_str(), id);
            pins.push(id);
        }

        let arcs = def
            .arcs
            .iter()
            .map(|arc| {
                self.arcs.alloc(LibraryArc {
                    cell: cell_id,
                    from: by_pin_name[arc.from.as_str()],
                    to: by_pin_name[arc.to.as_str()],
                })
            })
            .collect();

        let name = self.names.get_or_intern(&def.name);
        let id = self.cells.alloc(LibraryCell {
            name,
            pins,
            arcs,
            size: def.size,
            tags: def.tags,
            input_count: counts.get(PinDirection::Input),
            output_count: counts.get(PinDirection::Output),
            inout_count: counts.get(PinDirection::InOut),
            interface: def.interface_hash(),
        });
        debug_assert_eq!(id, cell_id);
        self.by_name.insert(name, id);
        tracing::debug!(cell = %def.name, pins = def.pins.len(), arcs = def.arcs.len(), "registered library cell");
        Ok(id)
    }

    /// Registers every definition, reporting rejected ones to `sink`.
    ///
    /// Returns the IDs of the cells that were accepted, in input order.
    pub fn load_cells<'a>(
        &mut self,
        defs: impl IntoIterator<Item = &'a LibraryCellDef>,
        sink: &DiagnosticSink,
    ) -> Vec<LibraryCellId> {
        let mut accepted = Vec::new();
        for def in defs {
            match self.register(def) {
                Ok(id) => accepted.push(id),
                Err(err) => sink.emit(
                    Diagnostic::error(err.code(), err.to_string())
                        .with_subject(def.name.clone())
                        .with_note("the whole cell definition was rejected"),
                ),
            }
        }
        accepted
    }

    /// Closes the library to further registrations.
    pub fn freeze(&mut self) {
        if !self.frozen {
            tracing::debug!(cells = self.cells.len(), "library frozen");
        }
        self.frozen = true;
    }

    /// Returns `true` once [`freeze`](Self::freeze) has been called.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Returns the number of registered cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if no cell is registered.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterates over registered cells in registration order.
    pub fn cells(&self) -> impl Iterator<Item = LibraryCellId> + '_ {
        self.cells.ids()
    }

    /// Looks a cell up by name.
    pub fn find_cell(&self, name: &str) -> Option<LibraryCellId> {
        let ident = self.names.get(name)?;
        self.by_name.get(&ident).copied()
    }

    /// Looks a cell up by name, failing with `LibraryCellNotFound`.
    pub fn cell_by_name(&self, name: &str) -> LibraryResult<LibraryCellId> {
        self.find_cell(name)
            .ok_or_else(|| LibraryError::LibraryCellNotFound(name.to_string()))
    }

    /// Returns the cell record.
    pub fn cell(&self, id: LibraryCellId) -> &LibraryCell {
        &self.cells[id]
    }

    /// Returns the pin record.
    pub fn pin(&self, id: LibraryPinId) -> &LibraryPin {
        &self.pins[id]
    }

    /// Returns the arc record.
    pub fn arc(&self, id: LibraryArcId) -> &LibraryArc {
        &self.arcs[id]
    }

    /// Returns the name of a cell.
    pub fn cell_name(&self, id: LibraryCellId) -> &str {
        self.names.resolve(self.cells[id].name)
    }

    /// Returns the name of a pin.
    pub fn pin_name(&self, id: LibraryPinId) -> &str {
        self.names.resolve(self.pins[id].name)
    }

    /// Returns the pins of a cell in declaration order.
    pub fn pins(&self, cell: LibraryCellId) -> &[LibraryPinId] {
        &self.cells[cell].pins
    }

    /// Returns the arcs of a cell in declaration order.
    pub fn arcs(&self, cell: LibraryCellId) -> &[LibraryArcId] {
        &self.cells[cell].arcs
    }

    /// Returns the pin at `index` in the cell's declaration order.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a valid pin position.
    pub fn pin_at(&self, cell: LibraryCellId, index: usize) -> LibraryPinId {
        self.cells[cell].pins[index]
    }

    /// Looks a pin up by name within a cell.
    pub fn pin_by_name(&self, cell: LibraryCellId, name: &str) -> LibraryResult<LibraryPinId> {
        let not_found = || LibraryError::LibraryPinNotFound {
            cell: self.cell_name(cell).to_string(),
            pin: name.to_string(),
        };
        let ident = self.names.get(name).ok_or_else(not_found)?;
        self.cells[cell]
            .pins
            .iter()
            .copied()
            .find(|&p| self.pins[p].name == ident)
            .ok_or_else(not_found)
    }

    /// Returns the arc from `from` to `to`, if the cell declares one.
    pub fn arc_between(&self, from: LibraryPinId, to: LibraryPinId) -> Option<LibraryArcId> {
        let cell = self.pins[from].cell;
        self.cells[cell]
            .arcs
            .iter()
            .copied()
            .find(|&a| self.arcs[a].from == from && self.arcs[a].to == to)
    }

    /// Returns the number of pins of a cell with the given direction.
    pub fn pin_count(&self, cell: LibraryCellId, direction: PinDirection) -> u32 {
        let c = &self.cells[cell];
        match direction {
            PinDirection::Input => c.input_count,
            PinDirection::Output => c.output_count,
            PinDirection::InOut => c.inout_count,
            PinDirection::Unknown => 0,
        }
    }

    /// Returns the fingerprint of a cell's ordered pin interface.
    pub fn interface_hash(&self, cell: LibraryCellId) -> ContentHash {
        self.cells[cell].interface
    }

    /// Checks that `to` can replace `from` without touching connectivity.
    ///
    /// Both cells must declare the same ordered sequence of pin names and
    /// directions. The error names the first mismatching position.
    pub fn check_remap_compatible(
        &self,
        from: LibraryCellId,
        to: LibraryCellId,
    ) -> LibraryResult<()> {
        let incompatible = |reason: String| LibraryError::IncompatibleInterface {
            from: self.cell_name(from).to_string(),
            to: self.cell_name(to).to_string(),
            reason,
        };
        let (old, new) = (&self.cells[from], &self.cells[to]);
        if old.pins.len() != new.pins.len() {
            return Err(incompatible(format!(
                "{} pins versus {}",
                old.pins.len(),
                new.pins.len()
            )));
        }
        for (index, (&a, &b)) in old.pins.iter().zip(&new.pins).enumerate() {
            let (a, b) = (&self.pins[a], &self.pins[b]);
            if a.name != b.name {
                return Err(incompatible(format!(
                    "pin {index} is '{}' versus '{}'",
                    self.names.resolve(a.name),
                    self.names.resolve(b.name)
                )));
            }
            if a.direction != b.direction {
                return Err(incompatible(format!(
                    "pin '{}' is {} versus {}",
                    self.names.resolve(a.name),
                    a.direction,
                    b.direction
                )));
            }
        }
        // Equal fingerprints never stand in for the walk above; unequal ones
        // after a clean walk mean the cached fingerprint is stale.
        if old.interface != new.interface {
            return Err(incompatible("interface fingerprints differ".to_string()));
        }
        Ok(())
    }
}

//! Library cell templates and their construction-time definitions.
//!
//! A [`LibraryCellDef`] is the mutable, string-keyed description of one cell
//! type as it comes out of a cell-description source. Once it passes
//! [`LibraryCellDef::check_consistency`] it is registered into a
//! [`Library`](crate::Library) as an immutable [`LibraryCell`] with its
//! [`LibraryPin`]s and [`LibraryArc`]s.

use crate::error::{LibraryError, LibraryResult};
use crate::ids::{LibraryArcId, LibraryCellId, LibraryPinId};
use crate::types::{CellTags, PinDirection, PinUse, Size};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use strata_common::{ContentHash, Ident};

/// A registered cell-type template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryCell {
    /// The cell-type name.
    pub name: Ident,
    /// Pins in declaration order; a pin's position here is its index.
    pub pins: Vec<LibraryPinId>,
    /// Internal timing arcs in declaration order.
    pub arcs: Vec<LibraryArcId>,
    /// Footprint.
    pub size: Size,
    /// Classification tags.
    pub tags: CellTags,
    /// Number of input pins.
    pub input_count: u32,
    /// Number of output pins.
    pub output_count: u32,
    /// Number of bidirectional pins.
    pub inout_count: u32,
    /// Fingerprint of the ordered `(name, direction)` pin sequence.
    pub interface: ContentHash,
}

/// A pin of a library cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryPin {
    /// The pin name, unique within its cell.
    pub name: Ident,
    /// The owning cell.
    pub cell: LibraryCellId,
    /// Position of this pin in the owning cell's pin list.
    pub index: u32,
    /// Signal direction.
    pub direction: PinDirection,
    /// Electrical use.
    pub pin_use: PinUse,
}

/// An internal timing arc of a library cell, from an input pin to an output pin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryArc {
    /// The owning cell.
    pub cell: LibraryCellId,
    /// The input pin the arc starts at.
    pub from: LibraryPinId,
    /// The output pin the arc ends at.
    pub to: LibraryPinId,
}

/// One pin of a [`LibraryCellDef`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinDef {
    /// The pin name.
    pub name: String,
    /// Signal direction.
    pub direction: PinDirection,
    /// Electrical use.
    pub pin_use: PinUse,
}

/// One arc of a [`LibraryCellDef`], by pin name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcDef {
    /// Name of the from-pin.
    pub from: String,
    /// Name of the to-pin.
    pub to: String,
}

/// A cell-type definition under construction.
///
/// Pins and arcs are appended with [`add_pin`](Self::add_pin) /
/// [`add_arc`](Self::add_arc) (or the consuming [`pin`](Self::pin) /
/// [`arc`](Self::arc) builders). Nothing is validated until
/// [`check_consistency`](Self::check_consistency) runs, which
/// [`Library::register`](crate::Library::register) does before allocating
/// anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryCellDef {
    /// The cell-type name.
    pub name: String,
    /// Pins in declaration order.
    pub pins: Vec<PinDef>,
    /// Arcs in declaration order.
    pub arcs: Vec<ArcDef>,
    /// Footprint.
    pub size: Size,
    /// Classification tags.
    pub tags: CellTags,
}

impl LibraryCellDef {
    /// Starts an empty definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pins: Vec::new(),
            arcs: Vec::new(),
            size: Size::default(),
            tags: CellTags::default(),
        }
    }

    /// Appends a pin.
    pub fn add_pin(&mut self, name: impl Into<String>, direction: PinDirection, pin_use: PinUse) {
        self.pins.push(PinDef {
            name: name.into(),
            direction,
            pin_use,
        });
    }

    /// Appends an arc between two pins named in this definition.
    pub fn add_arc(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.arcs.push(ArcDef {
            from: from.into(),
            to: to.into(),
        });
    }

    /// Builder form of [`add_pin`](Self::add_pin) for signal pins.
    pub fn pin(mut self, name: impl Into<String>, direction: PinDirection) -> Self {
        self.add_pin(name, direction, PinUse::Signal);
        self
    }

    /// Builder form of [`add_pin`](Self::add_pin) with an explicit use.
    pub fn pin_with_use(
        mut self,
        name: impl Into<String>,
        direction: PinDirection,
        pin_use: PinUse,
    ) -> Self {
        self.add_pin(name, direction, pin_use);
        self
    }

    /// Builder form of [`add_arc`](Self::add_arc).
    pub fn arc(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.add_arc(from, to);
        self
    }

    /// Sets the footprint.
    pub fn size(mut self, width: i64, height: i64) -> Self {
        self.size = Size::new(width, height);
        self
    }

    /// Sets the classification tags.
    pub fn tags(mut self, tags: CellTags) -> Self {
        self.tags = tags;
        self
    }

    /// Validates the definition.
    ///
    /// Every pin must have a non-empty, unique name and be an input or an
    /// output. Every arc must name two distinct declared pins, run from an
    /// input to an output, and appear once.
    pub fn check_consistency(&self) -> LibraryResult<()> {
        if self.name.is_empty() {
            return Err(LibraryError::EmptyCellName);
        }

        let mut directions: HashMap<&str, PinDirection> = HashMap::new();
        for pin in &self.pins {
            if pin.name.is_empty() {
                return Err(LibraryError::EmptyPinName {
                    cell: self.name.clone(),
                });
            }
            if !matches!(pin.direction, PinDirection::Input | PinDirection::Output) {
                return Err(LibraryError::InvalidPinDirection {
                    cell: self.name.clone(),
                    pin: pin.name.clone(),
                    direction: pin.direction,
                });
            }
            if directions.insert(pin.name.as_str(), pin.direction).is_some() {
                return Err(LibraryError::DuplicatePin {
                    cell: self.name.clone(),
                    pin: pin.name.clone(),
                });
            }
        }

        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        for arc in &self.arcs {
            if arc.from == arc.to {
                return Err(LibraryError::SelfLoopArc {
                    cell: self.name.clone(),
                    pin: arc.from.clone(),
                });
            }
            let lookup = |name: &String| {
                directions
                    .get(name.as_str())
                    .copied()
                    .ok_or_else(|| LibraryError::DanglingArcEndpoint {
                        cell: self.name.clone(),
                        pin: name.clone(),
                    })
            };
            let from = lookup(&arc.from)?;
            let to = lookup(&arc.to)?;
            if from != PinDirection::Input || to != PinDirection::Output {
                return Err(LibraryError::WrongArcDirection {
                    cell: self.name.clone(),
                    from: arc.from.clone(),
                    to: arc.to.clone(),
                });
            }
            if !seen.insert((arc.from.as_str(), arc.to.as_str())) {
                return Err(LibraryError::DuplicateArc {
                    cell: self.name.clone(),
                    from: arc.from.clone(),
                    to: arc.to.clone(),
                });
            }
        }
        Ok(())
    }

    /// Fingerprint of the ordered `(name, direction)` pin sequence.
    pub fn interface_hash(&self) -> ContentHash {
        interface_hash(self.pins.iter().map(|p| (p.name.as_str(), p.direction)))
    }
}

/// Hashes an ordered `(name, direction)` pin sequence.
pub(crate) fn interface_hash<'a>(
    pins: impl Iterator<Item = (&'a str, PinDirection)>,
) -> ContentHash {
    let mut fields: Vec<Vec<u8>> = Vec::new();
    for (name, direction) in pins {
        fields.push(name.as_bytes().to_vec());
        fields.push(vec![direction.index() as u8]);
    }
    ContentHash::from_fields(fields.iter().map(Vec::as_slice))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn and2() -> LibraryCellDef {
        LibraryCellDef::new("AND2")
            .pin("A", PinDirection::Input)
            .pin("B", PinDirection::Input)
            .pin("Y", PinDirection::Output)
            .arc("A", "Y")
            .arc("B", "Y")
    }

    #[test]
    fn well_formed_cell_passes() {
        assert_eq!(and2().check_consistency(), Ok(()));
    }

    #[test]
    fn cell_without_arcs_passes() {
        let def = LibraryCellDef::new("TIEHI").pin("Y", PinDirection::Output);
        assert!(def.check_consistency().is_ok());
    }

    #[test]
    fn empty_cell_name_rejected() {
        let def = LibraryCellDef::new("").pin("A", PinDirection::Input);
        assert_eq!(def.check_consistency(), Err(LibraryError::EmptyCellName));
    }

    #[test]
    fn empty_pin_name_rejected() {
        let def = LibraryCellDef::new("BAD").pin("", PinDirection::Input);
        assert!(matches!(
            def.check_consistency(),
            Err(LibraryError::EmptyPinName { .. })
        ));
    }

    #[test]
    fn bidirectional_pin_rejected() {
        let def = LibraryCellDef::new("IO").pin("PAD", PinDirection::InOut);
        assert!(matches!(
            def.check_consistency(),
            Err(LibraryError::InvalidPinDirection { direction: PinDirection::InOut, .. })
        ));
    }

    #[test]
    fn unknown_direction_rejected() {
        let def = LibraryCellDef::new("BB").pin("X", PinDirection::Unknown);
        assert!(matches!(
            def.check_consistency(),
            Err(LibraryError::InvalidPinDirection { .. })
        ));
    }

    #[test]
    fn duplicate_pin_rejected() {
        let def = LibraryCellDef::new("DUP")
            .pin("A", PinDirection::Input)
            .pin("A", PinDirection::Output);
        assert!(matches!(
            def.check_consistency(),
            Err(LibraryError::DuplicatePin { .. })
        ));
    }

    #[test]
    fn self_loop_rejected() {
        let def = and2().arc("Y", "Y");
        assert_eq!(
            def.check_consistency(),
            Err(LibraryError::SelfLoopArc {
                cell: "AND2".into(),
                pin: "Y".into()
            })
        );
    }

    #[test]
    fn dangling_endpoint_rejected() {
        let def = and2().arc("C", "Y");
        assert_eq!(
            def.check_consistency(),
            Err(LibraryError::DanglingArcEndpoint {
                cell: "AND2".into(),
                pin: "C".into()
            })
        );
    }

    #[test]
    fn reversed_arc_rejected() {
        let def = LibraryCellDef::new("INV")
            .pin("A", PinDirection::Input)
            .pin("Y", PinDirection::Output)
            .arc("Y", "A");
        assert!(matches!(
            def.check_consistency(),
            Err(LibraryError::WrongArcDirection { .. })
        ));
    }

    #[test]
    fn input_to_input_arc_rejected() {
        let def = and2().arc("A", "B");
        assert!(matches!(
            def.check_consistency(),
            Err(LibraryError::WrongArcDirection { .. })
        ));
    }

    #[test]
    fn duplicate_arc_rejected() {
        let def = and2().arc("A", "Y");
        assert!(matches!(
            def.check_consistency(),
            Err(LibraryError::DuplicateArc { .. })
        ));
    }

    #[test]
    fn add_pin_and_add_arc_append() {
        let mut def = LibraryCellDef::new("INV");
        def.add_pin("A", PinDirection::Input, PinUse::Signal);
        def.add_pin("Y", PinDirection::Output, PinUse::Signal);
        def.add_arc("A", "Y");
        assert_eq!(def.pins.len(), 2);
        assert_eq!(def.arcs, vec![ArcDef { from: "A".into(), to: "Y".into() }]);
    }

    #[test]
    fn interface_hash_ignores_cell_name_and_arcs() {
        let nand2 = LibraryCellDef::new("NAND2")
            .pin("A", PinDirection::Input)
            .pin("B", PinDirection::Input)
            .pin("Y", PinDirection::Output)
            .arc("A", "Y");
        assert_eq!(and2().interface_hash(), nand2.interface_hash());
    }

    #[test]
    fn interface_hash_sensitive_to_order() {
        let swapped = LibraryCellDef::new("AND2")
            .pin("B", PinDirection::Input)
            .pin("A", PinDirection::Input)
            .pin("Y", PinDirection::Output);
        assert_ne!(and2().interface_hash(), swapped.interface_hash());
    }
}

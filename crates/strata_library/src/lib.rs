//! Cell-type library for the Strata netlist database.
//!
//! A [`Library`] holds one immutable [`LibraryCell`] per cell type, each with
//! an ordered pin list ([`LibraryPin`]) and internal timing-arc templates
//! ([`LibraryArc`]). Cells are described with a [`LibraryCellDef`], validated
//! by [`LibraryCellDef::check_consistency`], and registered atomically. The
//! library is the authority the netlist consults when it builds instance
//! pins and when it checks whether a remap preserves a cell's interface.

#![warn(missing_docs)]

pub mod cell;
pub mod error;
pub mod ids;
pub mod library;
pub mod types;

pub use cell::{ArcDef, LibraryArc, LibraryCell, LibraryCellDef, LibraryPin, PinDef};
pub use error::{LibraryError, LibraryResult};
pub use ids::{LibraryArcId, LibraryCellId, LibraryPinId};
pub use library::Library;
pub use types::{
    BufferKind, CellTags, DirectionCounts, LogicKind, PinDirection, PinUse, Size, TieKind,
};

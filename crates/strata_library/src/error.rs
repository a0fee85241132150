//! Error types for library construction and lookup.

use crate::types::PinDirection;
use strata_diagnostics::{Category, DiagnosticCode};

/// Result alias for library operations.
pub type LibraryResult<T> = Result<T, LibraryError>;

/// Errors raised while building or querying a [`Library`](crate::Library).
///
/// Structural variants reject a whole cell definition; nothing from a rejected
/// definition is registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LibraryError {
    /// A cell definition has an empty name.
    #[error("library cell has an empty name")]
    EmptyCellName,

    /// A cell with the same name is already registered.
    #[error("library cell '{0}' already exists")]
    LibraryCellAlreadyExists(String),

    /// A pin of the cell has an empty name.
    #[error("library cell '{cell}' declares a pin with an empty name")]
    EmptyPinName {
        /// The cell being defined.
        cell: String,
    },

    /// Two pins of the cell share a name.
    #[error("library cell '{cell}' declares pin '{pin}' more than once")]
    DuplicatePin {
        /// The cell being defined.
        cell: String,
        /// The repeated pin name.
        pin: String,
    },

    /// A pin is neither input nor output.
    #[error("pin '{cell}/{pin}' has unsupported direction {direction}")]
    InvalidPinDirection {
        /// The cell being defined.
        cell: String,
        /// The offending pin.
        pin: String,
        /// The declared direction.
        direction: PinDirection,
    },

    /// An arc starts and ends on the same pin.
    #[error("library cell '{cell}' has an arc from pin '{pin}' to itself")]
    SelfLoopArc {
        /// The cell being defined.
        cell: String,
        /// The pin on both ends.
        pin: String,
    },

    /// An arc names a pin the cell does not declare.
    #[error("library cell '{cell}' has an arc endpoint '{pin}' that is not a declared pin")]
    DanglingArcEndpoint {
        /// The cell being defined.
        cell: String,
        /// The unresolved endpoint name.
        pin: String,
    },

    /// An arc does not run from an input pin to an output pin.
    #[error("library cell '{cell}' has arc {from} -> {to} that does not run from an input to an output")]
    WrongArcDirection {
        /// The cell being defined.
        cell: String,
        /// The arc's from-pin.
        from: String,
        /// The arc's to-pin.
        to: String,
    },

    /// The same arc is declared twice.
    #[error("library cell '{cell}' declares arc {from} -> {to} more than once")]
    DuplicateArc {
        /// The cell being defined.
        cell: String,
        /// The arc's from-pin.
        from: String,
        /// The arc's to-pin.
        to: String,
    },

    /// No cell with this name is registered.
    #[error("library cell '{0}' not found")]
    LibraryCellNotFound(String),

    /// The cell has no pin with this name.
    #[error("library pin '{pin}' not found in library cell '{cell}'")]
    LibraryPinNotFound {
        /// The cell searched.
        cell: String,
        /// The missing pin name.
        pin: String,
    },

    /// The library no longer accepts new cells.
    #[error("cannot register library cell '{0}': the library is frozen")]
    LibraryFrozen(String),

    /// Two cells do not expose the same ordered pin interface.
    #[error("library cell '{to}' is not interface-compatible with '{from}': {reason}")]
    IncompatibleInterface {
        /// The current cell.
        from: String,
        /// The proposed replacement.
        to: String,
        /// The first mismatch found.
        reason: String,
    },
}

impl LibraryError {
    /// Returns the diagnostic code reported for this error.
    pub fn code(&self) -> DiagnosticCode {
        let number = match self {
            LibraryError::EmptyCellName => 1,
            LibraryError::LibraryCellAlreadyExists(_) => 2,
            LibraryError::EmptyPinName { .. } => 3,
            LibraryError::DuplicatePin { .. } => 4,
            LibraryError::InvalidPinDirection { .. } => 5,
            LibraryError::SelfLoopArc { .. } => 6,
            LibraryError::DanglingArcEndpoint { .. } => 7,
            LibraryError::WrongArcDirection { .. } => 8,
            LibraryError::DuplicateArc { .. } => 9,
            LibraryError::LibraryCellNotFound(_) => 10,
            LibraryError::LibraryPinNotFound { .. } => 11,
            LibraryError::LibraryFrozen(_) => 12,
            LibraryError::IncompatibleInterface { .. } => 13,
        };
        DiagnosticCode::new(Category::Library, number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_self_loop() {
        let err = LibraryError::SelfLoopArc {
            cell: "AND2".into(),
            pin: "A".into(),
        };
        assert_eq!(
            err.to_string(),
            "library cell 'AND2' has an arc from pin 'A' to itself"
        );
    }

    #[test]
    fn display_invalid_direction() {
        let err = LibraryError::InvalidPinDirection {
            cell: "IO".into(),
            pin: "PAD".into(),
            direction: PinDirection::InOut,
        };
        assert_eq!(err.to_string(), "pin 'IO/PAD' has unsupported direction inout");
    }

    #[test]
    fn codes_are_library_category() {
        let err = LibraryError::LibraryCellNotFound("X".into());
        assert_eq!(err.code().to_string(), "L010");
    }
}

//! Errors raised by sandbox operations.

use strata_library::{LibraryError, PinDirection};
use strata_netlist::NetlistError;

/// Result alias for sandbox operations.
pub type SandboxResult<T> = Result<T, SandboxError>;

/// Failures of sandbox operations. A failing call leaves the sandbox unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SandboxError {
    /// A sandbox instance with this name already exists.
    #[error("sandbox instance '{0}' already exists")]
    InstanceAlreadyExists(String),

    /// A sandbox net with this name already exists.
    #[error("sandbox net '{0}' already exists")]
    NetAlreadyExists(String),

    /// The pin is already connected to a different net.
    #[error("pin '{pin}' is already connected to sandbox net '{net}'")]
    PinAlreadyConnected {
        /// Pin path.
        pin: String,
        /// Current net.
        net: String,
    },

    /// An instance cannot be removed while one of its pins is on a net.
    #[error("sandbox instance '{instance}' still has pin '{pin}' connected")]
    InstanceHasConnectedPins {
        /// Instance name.
        instance: String,
        /// First connected pin.
        pin: String,
    },

    /// A net cannot be removed while pins are connected to it.
    #[error("sandbox net '{net}' still has {count} connected pin(s)")]
    NetHasConnectedPins {
        /// Net name.
        net: String,
        /// Number of connected pins.
        count: usize,
    },

    /// Virtual ports must be inputs or outputs.
    #[error("virtual port on '{net}' cannot have direction {direction}")]
    InvalidPortDirection {
        /// Net the port was meant for.
        net: String,
        /// Requested direction.
        direction: PinDirection,
    },

    /// Virtual ports have no library cell to remap.
    #[error("'{0}' is a virtual port, not a cell")]
    NotACell(String),

    /// The remap target does not declare the same ordered pin interface.
    #[error("cannot remap sandbox instance '{instance}' from '{from}' to '{to}': {reason}")]
    IncompatibleLibraryCellForRemapping {
        /// Instance name.
        instance: String,
        /// Current library cell.
        from: String,
        /// Requested library cell.
        to: String,
        /// First mismatch found.
        reason: String,
    },

    /// A library lookup failed.
    #[error(transparent)]
    Library(#[from] LibraryError),

    /// The design rejected a request made on the sandbox's behalf.
    #[error(transparent)]
    Netlist(#[from] NetlistError),
}

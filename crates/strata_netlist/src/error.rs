//! Errors raised by netlist operations.

use strata_library::LibraryError;

/// Result alias for netlist operations.
pub type NetlistResult<T> = Result<T, NetlistError>;

/// Failures of design operations.
///
/// Every failing operation leaves the design exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetlistError {
    /// An instance with this name already exists.
    #[error("cell '{0}' already exists")]
    CellAlreadyExists(String),

    /// A net with this name already exists.
    #[error("net '{0}' already exists")]
    NetAlreadyExists(String),

    /// A module with this name already exists.
    #[error("module '{0}' already exists")]
    ModuleAlreadyExists(String),

    /// No instance has this name.
    #[error("instance '{0}' not found")]
    InstanceNotFound(String),

    /// No net has this name.
    #[error("net '{0}' not found")]
    NetNotFound(String),

    /// No module has this name.
    #[error("module '{0}' not found")]
    ModuleNotFound(String),

    /// The instance has no pin with this name.
    #[error("pin '{pin}' not found on instance '{instance}'")]
    PinNotFound {
        /// Instance name.
        instance: String,
        /// Requested pin name.
        pin: String,
    },

    /// The remap target does not declare the same ordered pin interface.
    #[error("cannot remap '{instance}' from '{from}' to '{to}': {reason}")]
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

    /// An instance cannot be removed while one of its pins is on a net.
    #[error("instance '{instance}' still has pin '{pin}' connected")]
    InstanceHasConnectedPins {
        /// Instance name.
        instance: String,
        /// First connected pin.
        pin: String,
    },

    /// A net cannot be removed while pins are connected to it.
    #[error("net '{net}' still has {count} connected pin(s)")]
    NetHasConnectedPins {
        /// Net name.
        net: String,
        /// Number of connected pins.
        count: usize,
    },

    /// The pin is already connected to a different net.
    #[error("pin '{pin}' is already connected to net '{net}'")]
    PinAlreadyConnected {
        /// Pin path.
        pin: String,
        /// The net it is connected to.
        net: String,
    },

    /// The pin and the net live in different modules.
    #[error("pin '{pin}' and net '{net}' belong to different modules")]
    CrossModuleConnection {
        /// Pin path.
        pin: String,
        /// Net name.
        net: String,
    },

    /// The module already has a hierarchical instance.
    #[error("module '{module}' is already instantiated as '{instance}'")]
    ModuleAlreadyInstantiated {
        /// Module name.
        module: String,
        /// Existing instance name.
        instance: String,
    },

    /// The instantiation would break the module tree.
    #[error("cannot instantiate module '{module}': {reason}")]
    InvalidHierarchy {
        /// Module name.
        module: String,
        /// Why the hierarchy would be invalid.
        reason: String,
    },

    /// Ports must be input, output or inout.
    #[error("port '{port}' cannot have direction {direction}")]
    InvalidPortDirection {
        /// Port name.
        port: String,
        /// Rejected direction.
        direction: String,
    },

    /// The combinational graph contains a cycle.
    #[error("combinational cycle through '{from}' -> '{to}'")]
    CombinationalCycle {
        /// Pin at the tail of the closing edge.
        from: String,
        /// Pin at the head of the closing edge.
        to: String,
    },

    /// A net tag was queried before being set.
    #[error("tag '{tag}' of net '{net}' has not been set")]
    UnsetNetTag {
        /// Net name.
        net: String,
        /// Tag name.
        tag: &'static str,
    },

    /// A library error surfaced through the design.
    #[error(transparent)]
    Library(#[from] LibraryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_pin_already_connected() {
        let err = NetlistError::PinAlreadyConnected {
            pin: "u1/A".into(),
            net: "n1".into(),
        };
        assert_eq!(err.to_string(), "pin 'u1/A' is already connected to net 'n1'");
    }

    #[test]
    fn library_errors_convert() {
        let err: NetlistError = LibraryError::LibraryCellNotFound("OR2".into()).into();
        assert!(matches!(err, NetlistError::Library(_)));
        assert_eq!(err.to_string(), "library cell 'OR2' not found");
    }

    #[test]
    fn display_unset_tag() {
        let err = NetlistError::UnsetNetTag {
            net: "clk".into(),
            tag: "ideal",
        };
        assert_eq!(err.to_string(), "tag 'ideal' of net 'clk' has not been set");
    }
}

//! Small value types shared by library cells and netlist pins.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The signal direction of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PinDirection {
    /// Data flows into the owning cell.
    Input,
    /// Data flows out of the owning cell.
    Output,
    /// Bidirectional pin.
    InOut,
    /// Direction not known (e.g. a black-box pin).
    Unknown,
}

impl PinDirection {
    /// All directions, in counter-slot order.
    pub const ALL: [PinDirection; 4] = [
        PinDirection::Input,
        PinDirection::Output,
        PinDirection::InOut,
        PinDirection::Unknown,
    ];

    /// Returns the slot of this direction in per-direction counters.
    pub fn index(self) -> usize {
        match self {
            PinDirection::Input => 0,
            PinDirection::Output => 1,
            PinDirection::InOut => 2,
            PinDirection::Unknown => 3,
        }
    }

    /// Returns the direction seen from the other side of a boundary.
    ///
    /// An input port drives the nets inside its module, so the port's own
    /// pin is an output from the inside.
    pub fn flipped(self) -> PinDirection {
        match self {
            PinDirection::Input => PinDirection::Output,
            PinDirection::Output => PinDirection::Input,
            other => other,
        }
    }
}

impl fmt::Display for PinDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinDirection::Input => write!(f, "input"),
            PinDirection::Output => write!(f, "output"),
            PinDirection::InOut => write!(f, "inout"),
            PinDirection::Unknown => write!(f, "unknown"),
        }
    }
}

/// Per-direction pin counters, indexed by [`PinDirection::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionCounts([u32; 4]);

impl DirectionCounts {
    /// Returns the count for one direction.
    pub fn get(&self, direction: PinDirection) -> u32 {
        self.0[direction.index()]
    }

    /// Increments the count for one direction.
    pub fn increment(&mut self, direction: PinDirection) {
        self.0[direction.index()] += 1;
    }

    /// Decrements the count for one direction.
    ///
    /// # Panics
    ///
    /// Panics if the count is already zero.
    pub fn decrement(&mut self, direction: PinDirection) {
        let slot = &mut self.0[direction.index()];
        *slot = slot
            .checked_sub(1)
            .unwrap_or_else(|| panic!("{direction} pin count underflow"));
    }

    /// Returns the sum over all directions.
    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

/// What a pin carries electrically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinUse {
    /// Ordinary logic signal.
    #[default]
    Signal,
    /// Clock input.
    Clock,
    /// Power supply.
    Power,
    /// Ground.
    Ground,
    /// Analog signal.
    Analog,
}

/// Whether a cell holds state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicKind {
    /// Output is a function of the current inputs only.
    #[default]
    Combinational,
    /// Flip-flops, latches, and other state-holding cells.
    Sequential,
}

/// Buffering behavior of a single-input, single-output cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferKind {
    /// Not a buffer.
    #[default]
    None,
    /// Non-inverting buffer.
    Buffer,
    /// Inverter.
    Inverter,
}

/// Constant-driver classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TieKind {
    /// Not a tie cell.
    #[default]
    None,
    /// Drives logic one.
    High,
    /// Drives logic zero.
    Low,
}

/// Classification tags of a library cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellTags {
    /// Combinational or sequential.
    pub logic: LogicKind,
    /// Buffer/inverter classification.
    pub buffer: BufferKind,
    /// Tie-cell classification.
    pub tie: TieKind,
}

/// Footprint of a library cell in database units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    /// Width in database units.
    pub width: i64,
    /// Height in database units.
    pub height: i64,
}

impl Size {
    /// Creates a size.
    pub fn new(width: i64, height: i64) -> Self {
        Self { width, height }
    }

    /// Returns `width * height`.
    pub fn area(&self) -> i64 {
        self.width * self.height
    }
}

//! Small value types shared by netlist records: kinds, tags, and placement.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order assigned to a net with no pins at all. Pin orders start at 1.
pub const EMPTY_NET_ORDER: u32 = 0;

/// The kind of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstanceType {
    /// A leaf cell bound to a library cell.
    Cell,
    /// A module port.
    Port,
    /// A hierarchical instance of a module.
    Module,
}

impl InstanceType {
    /// All instance types, in index order.
    pub const ALL: [InstanceType; 3] = [InstanceType::Cell, InstanceType::Port, InstanceType::Module];

    /// Returns a dense index for per-type tables.
    pub fn index(self) -> usize {
        match self {
            InstanceType::Cell => 0,
            InstanceType::Port => 1,
            InstanceType::Module => 2,
        }
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InstanceType::Cell => "cell",
            InstanceType::Port => "port",
            InstanceType::Module => "module instance",
        })
    }
}

/// Electrical classification of a net.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetType {
    /// An ordinary routed net.
    #[default]
    Regular,
    /// A pre-routed special net.
    Special,
}

/// What a net carries, following the DEF `USE` keywords.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetUse {
    /// Logic signal.
    #[default]
    Signal,
    /// Clock distribution.
    Clock,
    /// Supply.
    Power,
    /// Ground.
    Ground,
    /// Analog signal.
    Analog,
    /// Reset distribution.
    Reset,
    /// Scan chain.
    Scan,
    /// Tie-off.
    Tieoff,
}

/// User tags on a net. Every field is unset until explicitly assigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetTags {
    /// Whether the net is ideal (zero wire delay).
    pub ideal: Option<bool>,
    /// Whether the net belongs to a clock network.
    pub clock_network: Option<bool>,
    /// Net classification.
    pub net_type: Option<NetType>,
    /// Net use.
    pub net_use: Option<NetUse>,
}

/// Tri-state user tags on an instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceTags {
    /// Whether the instance is fixed in place.
    pub fixed: Option<bool>,
    /// Whether placement over the instance is blocked.
    pub placement_blocked: Option<bool>,
}

/// A point in database units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i64,
    /// Vertical coordinate.
    pub y: i64,
}

impl Point {
    /// Creates a point.
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in database units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Lower-left corner.
    pub min: Point,
    /// Upper-right corner.
    pub max: Point,
}

impl Rect {
    /// Creates a rectangle of `width` by `height` with its lower-left corner at `origin`.
    pub fn with_size(origin: Point, width: i64, height: i64) -> Self {
        Self {
            min: origin,
            max: Point::new(origin.x + width, origin.y + height),
        }
    }

    /// Returns the rectangle moved so its lower-left corner sits at `origin`.
    pub fn moved_to(self, origin: Point) -> Self {
        Self::with_size(origin, self.width(), self.height())
    }

    /// Horizontal extent.
    pub fn width(&self) -> i64 {
        self.max.x - self.min.x
    }

    /// Vertical extent.
    pub fn height(&self) -> i64 {
        self.max.y - self.min.y
    }
}

/// Placement orientation, using the DEF names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Orientation {
    #[default]
    N,
    S,
    W,
    E,
    FN,
    FS,
    FW,
    FE,
}

/// Physical attributes of an instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Footprint in database units.
    pub bounds: Rect,
    /// Orientation.
    pub orientation: Orientation,
    /// Explicit position; meaningful for ports.
    pub position: Point,
}

/// Lifecycle state of a design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DesignState {
    /// `initialize` has not run yet.
    Uninitialized,
    /// Initialized and untouched since.
    Initialized,
    /// Structure changed since the last topological recomputation.
    Mutating,
    /// Topological data reflects the latest structural change.
    Consistent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_type_indices_are_dense() {
        for (i, ty) in InstanceType::ALL.iter().enumerate() {
            assert_eq!(ty.index(), i);
        }
    }

    #[test]
    fn rect_move_keeps_size() {
        let r = Rect::with_size(Point::new(0, 0), 10, 20);
        let moved = r.moved_to(Point::new(5, -5));
        assert_eq!(moved.width(), 10);
        assert_eq!(moved.height(), 20);
        assert_eq!(moved.min, Point::new(5, -5));
        assert_eq!(moved.max, Point::new(15, 15));
    }

    #[test]
    fn tags_start_unset() {
        let tags = NetTags::default();
        assert!(tags.ideal.is_none());
        assert!(tags.net_use.is_none());
        assert_eq!(InstanceTags::default().fixed, None);
    }
}

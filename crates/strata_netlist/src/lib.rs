//! Hierarchical netlist database for Strata.
//!
//! A [`Design`] owns every module, instance, pin, net and arc of a netlist,
//! stored in tombstoning arenas and addressed by typed IDs. All mutations go
//! through `Design` methods that validate first, then update connectivity
//! caches (net drivers, per-direction counts, instance and net arcs), bump
//! the design revision, invalidate the cached [`Topology`] and notify the
//! [`ObserverRegistry`]. Topological ordering, structural start and end
//! points, and combinational-cycle detection are computed lazily.

#![warn(missing_docs)]

pub mod arc;
pub mod design;
pub mod edit;
pub mod error;
pub mod ids;
pub mod instance;
pub mod integrity;
pub mod module;
pub mod net;
pub mod observer;
pub mod pin;
pub mod tags;
pub mod topology;
pub mod types;

pub use arc::{Arc, ArcKind};
pub use design::Design;
pub use error::{NetlistError, NetlistResult};
pub use ids::{ArcId, CellId, InstanceId, ModuleId, NetId, PinId, PortId};
pub use instance::{Instance, InstanceKind};
pub use module::Module;
pub use net::Net;
pub use observer::{Event, EventKind, ObserverRegistry, Subscription};
pub use pin::Pin;
pub use topology::Topology;
pub use types::{
    DesignState, InstanceTags, InstanceType, NetTags, NetType, NetUse, Orientation, Placement,
    Point, Rect, EMPTY_NET_ORDER,
};

//! Disposable overlay netlists for speculative editing.
//!
//! A [`Sandbox`] mirrors part of a [`Design`](strata_netlist::Design): cells,
//! the nets they touch, and virtual ports wherever a net is cut by the
//! sandbox boundary. Algorithms edit the sandbox freely (connect, disconnect,
//! remap, create local cells) while the design stays untouched. Every
//! sandbox record keeps a `related` link to its design counterpart, and
//! [`Sandbox::related_state`] reports when that counterpart has since
//! changed or disappeared. Changes reach the design only when the caller
//! applies them, for example the list returned by
//! [`Sandbox::pending_remaps`].

#![warn(missing_docs)]

pub mod edit;
pub mod error;
pub mod ids;
pub mod mirror;
pub mod record;
pub mod sandbox;

pub use error::{SandboxError, SandboxResult};
pub use ids::{SandboxArcId, SandboxInstanceId, SandboxNetId, SandboxPinId};
pub use mirror::{RelatedState, SandboxItem};
pub use record::{
    SandboxArc, SandboxArcKind, SandboxInstance, SandboxInstanceKind, SandboxNet, SandboxPin,
};
pub use sandbox::Sandbox;

//! Opaque IDs for sandbox records.
//!
//! Sandbox IDs live in their own arenas and are unrelated to design IDs of
//! the same raw value; the `related` field of each record is the only bridge.

use strata_common::define_id;

define_id!(
    /// Opaque ID for a sandbox instance: a mirrored or local cell, or a virtual port.
    SandboxInstanceId
);

define_id!(
    /// Opaque ID for a sandbox pin.
    SandboxPinId
);

define_id!(
    /// Opaque ID for a sandbox net.
    SandboxNetId
);

define_id!(
    /// Opaque ID for a sandbox arc.
    SandboxArcId
);

//! Shared foundational types used across the Strata netlist database.
//!
//! This crate provides the tombstoning [`Arena`] that owns every netlist and
//! library record, the [`define_id!`] macro for opaque arena keys, interned
//! identifiers, content hashing, and the internal error type.

#![warn(missing_docs)]

pub mod arena;
pub mod hash;
pub mod ident;
pub mod result;

pub use arena::{Arena, ArenaId};
pub use hash::ContentHash;
pub use ident::{Ident, Interner};
pub use result::{InternalError, StrataResult};

//! Diagnostic creation, severity management, and accumulation.
//!
//! This crate provides structured [`Diagnostic`] messages with severity levels,
//! codes, and the netlist entity they concern. The thread-safe
//! [`DiagnosticSink`] accumulates diagnostics raised by bulk library loading
//! and by the netlist integrity checker.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use severity::Severity;
pub use sink::DiagnosticSink;

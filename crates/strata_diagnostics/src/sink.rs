//! Thread-safe diagnostic accumulator.

use crate::code::DiagnosticCode;
use crate::diagnostic::Diagnostic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Collects diagnostics from library loading and integrity checks.
///
/// `emit` takes `&self`, so one sink can be shared between a host's worker
/// threads. Errors are counted separately so [`has_errors`](Self::has_errors)
/// never takes the lock. Each emitted diagnostic is logged through `tracing`
/// as it arrives.
#[derive(Default)]
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    errors: AtomicUsize,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking emitter leaves the vector intact; keep using it.
    fn entries(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a diagnostic.
    pub fn emit(&self, diag: Diagnostic) {
        if diag.severity.is_error() {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        diag.log();
        self.entries().push(diag);
    }

    /// Returns `true` once any error has been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Number of errors emitted over the sink's lifetime. Draining with
    /// [`take_all`](Self::take_all) does not reset it.
    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    /// Number of currently held diagnostics carrying `code`.
    pub fn count_with_code(&self, code: DiagnosticCode) -> usize {
        self.entries().iter().filter(|d| d.code == code).count()
    }

    /// Clones the held diagnostics that concern `subject`.
    pub fn about(&self, subject: &str) -> Vec<Diagnostic> {
        self.entries()
            .iter()
            .filter(|d| d.subject.as_deref() == Some(subject))
            .cloned()
            .collect()
    }

    /// Drains every held diagnostic in emission order.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries())
    }

    /// Clones every held diagnostic in emission order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.entries().clone()
    }
}

//! Common result and error types shared by the Strata crates.

/// The result type for operations that can only fail because of a bug.
///
/// User-facing failures (name collisions, incompatible remaps, malformed
/// library cells) have their own typed errors in each crate. `Err` here means
/// a broken internal invariant inside Strata itself.
pub type StrataResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in Strata, not a problem with the caller's input.
///
/// These errors should never occur during normal operation. If one does occur,
/// it means a netlist invariant was violated by Strata's own bookkeeping.
#[derive(Debug, thiserror::Error)]
#[error("internal netlist error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_driver(has_driver: bool) -> StrataResult<()> {
        if has_driver {
            Ok(())
        } else {
            Err(format!("net {} lost its driver", "n1").into())
        }
    }

    #[test]
    fn converts_from_formatted_messages() {
        assert!(check_driver(true).is_ok());
        let err = check_driver(false).unwrap_err();
        assert_eq!(err.message, "net n1 lost its driver");
        assert_eq!(err.to_string(), "internal netlist error: net n1 lost its driver");
    }
}

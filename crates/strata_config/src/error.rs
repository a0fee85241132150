//! Why a `strata.toml` was rejected.

use std::path::PathBuf;

/// A `strata.toml` that could not be read, parsed, or accepted.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        /// The file that was opened.
        path: PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the config schema.
    #[error("malformed strata.toml: {0}")]
    Parse(#[from] toml::de::Error),

    /// A name or prefix that must be non-empty is empty.
    #[error("`{field}` must not be empty")]
    EmptyField {
        /// Dotted path of the offending key, e.g. `design.name`.
        field: &'static str,
    },

    /// Anonymous nets and instances would be generated with the same prefix.
    #[error("anonymous nets and instances would both be named '{prefix}<n>'")]
    PrefixCollision {
        /// The shared prefix.
        prefix: String,
    },
}

impl ConfigError {
    /// The dotted key the error is about, when it concerns a single key.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ConfigError::EmptyField { field } => Some(*field),
            ConfigError::PrefixCollision { .. } => Some("netlist.anonymous_instance_prefix"),
            ConfigError::Read { .. } | ConfigError::Parse(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_names_the_key() {
        let err = ConfigError::EmptyField {
            field: "design.top_module",
        };
        assert_eq!(err.to_string(), "`design.top_module` must not be empty");
        assert_eq!(err.field(), Some("design.top_module"));
    }

    #[test]
    fn prefix_collision_shows_generated_names() {
        let err = ConfigError::PrefixCollision {
            prefix: "anon".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "anonymous nets and instances would both be named 'anon<n>'"
        );
    }

    #[test]
    fn read_failure_mentions_the_path() {
        let err = ConfigError::Read {
            path: PathBuf::from("/designs/alu/strata.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().starts_with("cannot read /designs/alu/strata.toml"));
        assert_eq!(err.field(), None);
    }
}

//! Error types for the trellis ACL graph.
//!
//! Only genuine faults are errors. Lookups that find nothing (`get`, `find`,
//! `get_key`) return `None` instead.

use thiserror::Error;

/// The unified error type for the trellis crates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AclError {
    /// Linking `parent` to `child` would make `child` its own ancestor.
    ///
    /// Parents linked earlier in the same batch call stay attached.
    #[error("cannot add '{parent}' as a parent of '{child}': '{child}' is already an ancestor of '{parent}'")]
    CycleViolation { child: String, parent: String },

    /// An entity ID passed to the registry is not registered.
    #[error("entity '{id}' is not registered")]
    EntityNotFound { id: String },

    /// An ACL document could not be read or does not describe a valid graph.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

/// Convenience alias used throughout the trellis crates.
pub type AclResult<T> = Result<T, AclError>;

//! Driver error types.
//!
//! Every failure produced by the control-plane client, the host filesystem
//! layer, or request validation is a [`FlexError`].  The orchestrator
//! classifies outcomes by matching on variants, never on message text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for lifecycle operations.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum FlexError {
    /// The control plane has no volume with this name.
    #[error("volume {0} not found")]
    VolumeNotFound(String),

    /// A volume with this name already exists.
    #[error("volume `{0}` already exists")]
    VolumeAlreadyExists(String),

    /// Detach was requested for a volume that is not currently linked.
    #[error("fileset {0} not linked")]
    NotLinked(String),

    /// The mount target could not be inspected.
    #[error("failed checking mount target {path}: {reason}")]
    MountCheckFailed {
        /// Path whose existence check failed.
        path: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// Parent directories of the mount target could not be created.
    #[error("failed creating volume directory {path}: {reason}")]
    CreateDirFailed {
        /// Directory that could not be created.
        path: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// The mount target symlink could not be created.
    #[error("failed linking {path}: {reason}")]
    SymlinkFailed {
        /// Link path that could not be created.
        path: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// The storage backend returned an error.
    #[error("backend error: {0}")]
    BackendError(String),

    /// The control-plane transport failed.
    #[error("transport error: {0}")]
    TransportError(String),

    /// The caller supplied an invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An unclassified internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FlexError {
    /// Create a [`FlexError::BackendError`] from anything that implements
    /// [`std::fmt::Display`].
    pub fn backend<E: std::fmt::Display>(e: E) -> Self {
        Self::BackendError(e.to_string())
    }

    /// Create a [`FlexError::TransportError`] from anything that implements
    /// [`std::fmt::Display`].
    pub fn transport<E: std::fmt::Display>(e: E) -> Self {
        Self::TransportError(e.to_string())
    }

    /// Create a [`FlexError::Internal`] from anything that implements
    /// [`std::fmt::Display`].
    pub fn internal<E: std::fmt::Display>(e: E) -> Self {
        Self::Internal(e.to_string())
    }
}

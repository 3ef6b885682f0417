//! Control-plane client trait.
//!
//! The control plane owns volume existence and attach/detach state.  The
//! orchestrator only talks to it through [`StorageClient`], so any transport
//! (or an in-process backend) can be plugged in.

use async_trait::async_trait;

use crate::error::FlexError;
use crate::types::{Options, VolumeMetadata};

/// Client for the remote storage control plane.
///
/// Implementations report failures with the closed [`FlexError`] set:
/// `get_volume` uses [`FlexError::VolumeNotFound`], `create_volume` uses
/// [`FlexError::VolumeAlreadyExists`] and `detach` uses
/// [`FlexError::NotLinked`] for the conditions the orchestrator treats as
/// benign.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Prepare the control plane for use by this node.
    async fn activate(&self) -> Result<(), FlexError>;

    /// Look up a single volume by name.
    async fn get_volume(&self, name: &str) -> Result<VolumeMetadata, FlexError>;

    /// Create a volume, forwarding the option bag uninterpreted.
    async fn create_volume(&self, name: &str, options: &Options) -> Result<(), FlexError>;

    /// Link the volume identified by `device` and return the host path at
    /// which its data is reachable.
    async fn attach(&self, device: &str) -> Result<String, FlexError>;

    /// Unlink a volume.
    async fn detach(&self, name: &str) -> Result<(), FlexError>;

    /// List every volume known to the control plane.
    async fn list_volumes(&self) -> Result<Vec<VolumeMetadata>, FlexError>;
}

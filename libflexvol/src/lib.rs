//! # libflexvol: FlexVolume lifecycle orchestration for RK8s
//!
//! `libflexvol` turns the node agent's FlexVolume verbs (init, attach, mount,
//! unmount, ...) into calls against a storage control plane and reconciles
//! the result with the host filesystem.  It follows the RK8s conventions:
//! Tokio async runtime, `tracing` for observability, `thiserror` for
//! structured errors.
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |---|---|
//! | [`types`] | Volume metadata, option bags, validated requests. |
//! | [`error`] | [`FlexError`] enum covering all failure modes. |
//! | [`response`] | [`FlexResponse`] envelope returned by every verb. |
//! | [`client`] | [`StorageClient`] trait, the control-plane contract. |
//! | [`hostfs`] | [`HostFs`] trait and the `tokio::fs` implementation. |
//! | [`reconciler`] | Links a mount path to the control plane's source path. |
//! | [`resolver`] | Maps a mountpoint back to its volume. |
//! | [`controller`] | [`Controller`], the lifecycle orchestrator. |
//! | [`backend`] | Control-plane implementations (local state directory). |

pub mod backend;
pub mod client;
pub mod controller;
pub mod error;
pub mod hostfs;
pub mod reconciler;
pub mod resolver;
pub mod response;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-export the most commonly used items at crate root for convenience.
pub use backend::local::LocalBackend;
pub use client::StorageClient;
pub use controller::Controller;
pub use error::FlexError;
pub use hostfs::{HostFs, LocalFs};
pub use response::{FlexResponse, Status};
pub use types::*;

//! Control-plane backends.
//!
//! Each backend module provides a concrete type that implements
//! [`StorageClient`](crate::client::StorageClient).

pub mod local;

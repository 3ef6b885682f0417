//! The response envelope returned by every lifecycle operation.
//!
//! The node agent parses a single JSON shape for success and failure alike,
//! so [`FlexResponse`] is the only return type of the orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome reported to the node agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
    /// The verb is not implemented by this driver.
    #[serde(rename = "Not supported")]
    NotSupported,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("Success"),
            Self::Failure => f.write_str("Failure"),
            Self::NotSupported => f.write_str("Not supported"),
        }
    }
}

/// Uniform `{status, message, device, attached, volumeName}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FlexResponse {
    pub status: Status,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub attached: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub volume_name: String,
}

impl FlexResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            device: String::new(),
            attached: false,
            volume_name: String::new(),
        }
    }

    /// A failed outcome.  An empty message is replaced so that a failure
    /// always carries a diagnostic.
    pub fn failure(message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.is_empty() {
            message = "unknown failure".to_owned();
        }
        Self {
            status: Status::Failure,
            message,
            ..Self::success("")
        }
    }

    pub fn not_supported(verb: &str) -> Self {
        Self {
            status: Status::NotSupported,
            message: format!("{verb} is not supported by this driver"),
            ..Self::success("")
        }
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    pub fn with_attached(mut self, attached: bool) -> Self {
        self.attached = attached;
        self
    }

    pub fn with_volume_name(mut self, volume_name: impl Into<String>) -> Self {
        self.volume_name = volume_name.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

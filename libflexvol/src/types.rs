//! Core driver types: volume metadata, option bags, and the validated
//! per-operation requests.
//!
//! Raw requests arrive from the node agent as string-keyed JSON maps.  They
//! are converted into typed requests here so that a missing required key is
//! rejected at the boundary instead of deep inside the lifecycle logic.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::FlexError;

/// Key carrying the cluster-unique volume name in a raw request.
pub const VOLUME_NAME_KEY: &str = "volumeName";

/// Open option bag forwarded verbatim to volume creation.
pub type Options = HashMap<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Volume metadata
// ---------------------------------------------------------------------------

/// The control plane's view of a volume and where it is reachable locally.
///
/// Every value of this type is a snapshot; the control plane owns the
/// authoritative copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumeMetadata {
    /// Cluster-unique volume name.
    pub name: String,
    /// Host path at which the volume's data is made available.
    pub mountpoint: String,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Request to ensure a volume exists.
#[derive(Debug, Clone)]
pub struct AttachRequest {
    pub volume_name: String,
    /// Every key of the raw request, `volumeName` included.
    pub options: Options,
}

impl TryFrom<Options> for AttachRequest {
    type Error = FlexError;

    fn try_from(options: Options) -> Result<Self, Self::Error> {
        let volume_name = required_volume_name(&options)?;
        Ok(Self {
            volume_name,
            options,
        })
    }
}

/// Request to resolve the cluster-wide name of a volume.
#[derive(Debug, Clone)]
pub struct GetVolumeNameRequest {
    pub volume_name: String,
}

impl TryFrom<Options> for GetVolumeNameRequest {
    type Error = FlexError;

    fn try_from(options: Options) -> Result<Self, Self::Error> {
        Ok(Self {
            volume_name: required_volume_name(&options)?,
        })
    }
}

/// Request to detach a volume from a node.
#[derive(Debug, Clone, Default)]
pub struct DetachRequest {
    pub name: String,
    pub node: Option<String>,
}

/// Request to make a volume visible at a pod mount path.
#[derive(Debug, Clone, Default)]
pub struct MountRequest {
    /// Target path the node agent expects the volume at,
    /// e.g. `/var/lib/kubelet/pods/<uid>/volumes/<driver>/<name>`.
    pub mount_path: PathBuf,
    /// Device identifier handed to the control plane's attach call.
    pub mount_device: String,
    pub options: Options,
}

/// Request to remove a volume from a pod mount path.
#[derive(Debug, Clone, Default)]
pub struct UnmountRequest {
    pub mount_path: PathBuf,
}

/// The key must be present; an empty name is passed through unchanged.
fn required_volume_name(options: &Options) -> Result<String, FlexError> {
    match options.get(VOLUME_NAME_KEY) {
        Some(serde_json::Value::String(name)) => Ok(name.clone()),
        None => Err(FlexError::InvalidArgument(format!(
            "{VOLUME_NAME_KEY} not found"
        ))),
        Some(other) => Err(FlexError::InvalidArgument(format!(
            "{VOLUME_NAME_KEY} must be a string, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: serde_json::Value) -> Options {
        serde_json::from_value(value).expect("options")
    }

    #[test]
    fn attach_request_keeps_all_options() {
        let req = AttachRequest::try_from(options(json!({
            "volumeName": "v1",
            "size": "10Gi",
            "kubernetes.io/fsType": "ext4",
        })))
        .unwrap();

        assert_eq!(req.volume_name, "v1");
        assert_eq!(req.options.len(), 3);
        assert_eq!(req.options["size"], json!("10Gi"));
    }

    #[test]
    fn attach_request_requires_volume_name() {
        let err = AttachRequest::try_from(options(json!({ "size": "1Gi" }))).unwrap_err();
        assert!(matches!(err, FlexError::InvalidArgument(_)));
    }

    #[test]
    fn empty_volume_name_is_present() {
        let req = AttachRequest::try_from(options(json!({ "volumeName": "" }))).unwrap();
        assert_eq!(req.volume_name, "");

        let req = GetVolumeNameRequest::try_from(options(json!({ "volumeName": "" }))).unwrap();
        assert_eq!(req.volume_name, "");
    }

    #[test]
    fn non_string_volume_name_is_rejected() {
        let err = GetVolumeNameRequest::try_from(options(json!({ "volumeName": 7 }))).unwrap_err();
        assert!(err.to_string().contains("must be a string"));
    }
}

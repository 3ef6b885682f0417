//! Mountpoint to volume lookup.

use crate::types::VolumeMetadata;

/// Return the first volume whose recorded mountpoint equals `mount_path`.
///
/// Matching is plain string equality; no path normalization is applied.
pub fn volume_for_mountpoint<'a>(
    mount_path: &str,
    volumes: &'a [VolumeMetadata],
) -> Option<&'a VolumeMetadata> {
    volumes.iter().find(|volume| volume.mountpoint == mount_path)
}

//! Mount reconciliation: make a pod mount path resolve to the source path
//! handed out by the control plane.

use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::error::FlexError;
use crate::hostfs::HostFs;

/// What [`reconcile_mount`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// The directory tree and link were created.
    Linked,
    /// `<mount_path>/<device>` was already present; nothing was touched.
    AlreadyPresent,
}

/// Ensure `mount_path` is a symlink to `source`.
///
/// Presence is judged by `<mount_path>/<device>`.  When it is absent the
/// parent of `mount_path` is created (an existing directory is fine) and the
/// link is placed.  No locking is done here; concurrent callers rely on the
/// filesystem's own create-if-absent semantics.
pub async fn reconcile_mount<F>(
    fs: &F,
    source: &Path,
    device: &str,
    mount_path: &Path,
) -> Result<MountOutcome, FlexError>
where
    F: HostFs + ?Sized,
{
    let probe = mount_path.join(device);
    let present = fs
        .exists(&probe)
        .await
        .map_err(|e| FlexError::MountCheckFailed {
            path: probe.display().to_string(),
            reason: e.to_string(),
        })?;

    if present {
        debug!(path = %probe.display(), "mount target already present");
        return Ok(MountOutcome::AlreadyPresent);
    }

    if let Some(dir) = mount_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        debug!(dir = %dir.display(), "creating volume directory");
        match fs.create_dir_all(dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(FlexError::CreateDirFailed {
                    path: dir.display().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    fs.symlink(source, mount_path)
        .await
        .map_err(|e| FlexError::SymlinkFailed {
            path: mount_path.display().to_string(),
            reason: e.to_string(),
        })?;

    info!(
        source = %source.display(),
        mount_path = %mount_path.display(),
        "volume linked",
    );
    Ok(MountOutcome::Linked)
}

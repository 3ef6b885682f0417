//! Lifecycle orchestrator.
//!
//! [`Controller`] exposes one method per lifecycle verb.  Each method calls
//! the control plane and the host filesystem as needed and always returns a
//! [`FlexResponse`]; no error escapes to the caller and nothing is retried.

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::client::StorageClient;
use crate::error::FlexError;
use crate::hostfs::{HostFs, LocalFs};
use crate::reconciler::{MountOutcome, reconcile_mount};
use crate::resolver::volume_for_mountpoint;
use crate::response::FlexResponse;
use crate::types::*;

/// Drives volume lifecycle requests against a [`StorageClient`].
pub struct Controller<C, F = LocalFs> {
    client: C,
    fs: F,
}

impl<C: StorageClient> Controller<C, LocalFs> {
    /// Create a controller operating on the local filesystem.
    pub fn new(client: C) -> Self {
        Self { client, fs: LocalFs }
    }
}

impl<C, F> Controller<C, F>
where
    C: StorageClient,
    F: HostFs,
{
    /// Create a controller with a substitute filesystem layer.
    pub fn with_fs(client: C, fs: F) -> Self {
        Self { client, fs }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Activate the control plane for this node.
    #[instrument(skip(self))]
    pub async fn init(&self) -> FlexResponse {
        match self.client.activate().await {
            Ok(()) => {
                info!("plugin activated");
                FlexResponse::success("Plugin init successfully")
            }
            Err(e) => {
                warn!(error = %e, "plugin activation failed");
                FlexResponse::failure(format!("Plugin init failed: {e}"))
            }
        }
    }

    /// Ensure the named volume exists, creating it on first sight.
    #[instrument(skip_all)]
    pub async fn attach(&self, request: Options) -> FlexResponse {
        let request = match AttachRequest::try_from(request) {
            Ok(req) => req,
            Err(e) => {
                warn!(error = %e, "rejecting attach request");
                return FlexResponse::failure(format!("Failed to attach volume: {e}"));
            }
        };
        let name = request.volume_name.as_str();
        debug!(volume = name, options = ?request.options, "attach");

        match self.client.get_volume(name).await {
            Ok(_) => {
                debug!(volume = name, "volume already known to the control plane");
                FlexResponse::success("Volume already attached").with_device(name)
            }
            Err(FlexError::VolumeNotFound(_)) => self.create(name, &request.options).await,
            Err(e) => {
                warn!(volume = name, error = %e, "volume lookup failed");
                FlexResponse::failure("Failed checking volume").with_device(name)
            }
        }
    }

    async fn create(&self, name: &str, options: &Options) -> FlexResponse {
        match self.client.create_volume(name, options).await {
            Ok(()) => {
                info!(volume = name, "volume created");
                FlexResponse::success("Volume attached successfully").with_device(name)
            }
            // Lost a race with another creator.
            Err(FlexError::VolumeAlreadyExists(_)) => {
                debug!(volume = name, "volume created concurrently");
                FlexResponse::success("Volume already attached").with_device(name)
            }
            Err(e) => {
                warn!(volume = name, error = %e, "volume creation failed");
                FlexResponse::failure(format!("Failed to attach volume: {e}")).with_device(name)
            }
        }
    }

    /// Echo back the cluster-unique volume name.
    #[instrument(skip_all)]
    pub async fn get_volume_name(&self, request: Options) -> FlexResponse {
        match GetVolumeNameRequest::try_from(request) {
            Ok(req) => FlexResponse::success("Volume Name retrieved").with_volume_name(req.volume_name),
            Err(e) => {
                debug!(error = %e, "no volume name in request");
                FlexResponse::failure("Failed getting volumeName")
            }
        }
    }

    /// The device is available as soon as attach returns.
    pub fn wait_for_attach(&self, request: &Options) -> FlexResponse {
        debug!(?request, "wait for attach");
        FlexResponse::success("Volume is attached").with_attached(true)
    }

    /// The control plane offers no finer-grained probe; report attached.
    pub fn is_attached(&self, request: &Options) -> FlexResponse {
        debug!(?request, "is attached");
        FlexResponse::success("Volume is attached").with_attached(true)
    }

    /// Detach is a no-op; unlinking happens in [`Self::unmount`].
    #[instrument(skip(self))]
    pub async fn detach(&self, request: DetachRequest) -> FlexResponse {
        FlexResponse::success("Volume detached successfully").with_device(request.name)
    }

    /// Attach the volume on the control plane and link it at the mount path.
    #[instrument(skip(self), fields(device = %request.mount_device, mount_path = %request.mount_path.display()))]
    pub async fn mount(&self, request: MountRequest) -> FlexResponse {
        let source = match self.client.attach(&request.mount_device).await {
            Ok(source) => source,
            Err(e) => {
                warn!(error = %e, "control plane attach failed");
                return FlexResponse::failure(format!("Failed to mount volume: {e}"));
            }
        };
        debug!(%source, "volume attached on control plane");

        match reconcile_mount(
            &self.fs,
            Path::new(&source),
            &request.mount_device,
            &request.mount_path,
        )
        .await
        {
            Ok(outcome) => {
                if outcome == MountOutcome::AlreadyPresent {
                    debug!("mount path already in place");
                }
                FlexResponse::success(format!("Volume mounted successfully to {source}"))
            }
            Err(e) => {
                warn!(error = %e, "mount reconciliation failed");
                FlexResponse::failure(e.to_string())
            }
        }
    }

    /// Map the mount path back to its volume and unlink it.
    #[instrument(skip(self), fields(mount_path = %request.mount_path.display()))]
    pub async fn unmount(&self, request: UnmountRequest) -> FlexResponse {
        let volumes = match self.client.list_volumes().await {
            Ok(volumes) => volumes,
            Err(e) => {
                warn!(error = %e, "listing volumes failed");
                return FlexResponse::failure(format!("Error finding the volume: {e}"));
            }
        };

        let Some(volume) = self.volume_at(&request.mount_path, &volumes).await else {
            return FlexResponse::failure(format!(
                "Error finding the volume: no volume is mounted at {}",
                request.mount_path.display()
            ));
        };

        match self.client.detach(&volume.name).await {
            Ok(()) => info!(volume = %volume.name, "volume unlinked"),
            Err(FlexError::NotLinked(_)) => {
                debug!(volume = %volume.name, "volume was not linked");
            }
            Err(e) => {
                warn!(volume = %volume.name, error = %e, "control plane detach failed");
                return FlexResponse::failure(format!("Failed to unmount volume: {e}"));
            }
        }

        FlexResponse::success("Volume unmounted successfully")
    }

    /// Resolve `mount_path` exactly, then retry with the link target when
    /// `mount_path` is a symlink placed by [`Self::mount`].
    async fn volume_at<'a>(
        &self,
        mount_path: &Path,
        volumes: &'a [VolumeMetadata],
    ) -> Option<&'a VolumeMetadata> {
        if let Some(volume) = lookup_path(mount_path, volumes) {
            return Some(volume);
        }
        let target = self.fs.read_link(mount_path).await.ok()?;
        debug!(target = %target.display(), "retrying lookup with link target");
        lookup_path(&target, volumes)
    }
}

/// Mountpoints are UTF-8, so a path that is not can never match one.
fn lookup_path<'a>(path: &Path, volumes: &'a [VolumeMetadata]) -> Option<&'a VolumeMetadata> {
    let Some(path) = path.to_str() else {
        warn!(path = %path.display(), "path is not valid UTF-8");
        return None;
    };
    volume_for_mountpoint(path, volumes)
}

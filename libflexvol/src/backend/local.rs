//! Directory-backed control plane.
//!
//! [`LocalBackend`] implements [`StorageClient`] on a state directory on the
//! node itself, so the driver can run without a remote storage service.
//! Every call reads and writes the on-disk records directly; separate driver
//! processes therefore always see each other's changes.
//!
//! # On-disk layout
//!
//! ```text
//! <state_root>/
//!   volumes/
//!     <name>/              # volume root, handed out as the attach source path
//!       <name>/            # volume data
//!   meta/
//!     <name>.meta.json     # persisted VolumeRecord
//!     <name>.meta.json.tmp # in-flight record update
//! ```
//!
//! Volume directories and record files live in separate directories, so no
//! volume name can collide with another volume's record or temp file.
//!
//! A mount path linked to the volume root therefore exposes
//! `<mount_path>/<name>`, which is the entry the mount reconciler probes.

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

use crate::client::StorageClient;
use crate::error::FlexError;
use crate::types::{Options, VolumeMetadata};

const META_SUFFIX: &str = ".meta.json";
const VOLUMES_DIR: &str = "volumes";
const META_DIR: &str = "meta";

/// Persisted state of one volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeRecord {
    pub name: String,
    /// Volume root directory.
    pub mountpoint: String,
    /// Whether the volume is currently attached.
    #[serde(default)]
    pub linked: bool,
    /// Options supplied at creation time.
    #[serde(default)]
    pub options: Options,
}

impl From<VolumeRecord> for VolumeMetadata {
    fn from(record: VolumeRecord) -> Self {
        Self {
            name: record.name,
            mountpoint: record.mountpoint,
        }
    }
}

/// [`StorageClient`] storing volumes under a local state directory.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    state_root: PathBuf,
}

impl LocalBackend {
    pub fn new(state_root: impl Into<PathBuf>) -> Self {
        Self {
            state_root: state_root.into(),
        }
    }

    pub fn state_root(&self) -> &Path {
        &self.state_root
    }

    fn volume_root(&self, name: &str) -> PathBuf {
        self.state_root.join(VOLUMES_DIR).join(name)
    }

    fn meta_dir(&self) -> PathBuf {
        self.state_root.join(META_DIR)
    }

    fn meta_path(&self, name: &str) -> PathBuf {
        self.meta_dir().join(format!("{name}{META_SUFFIX}"))
    }

    async fn read_record(&self, name: &str) -> Result<VolumeRecord, FlexError> {
        validate_name(name)?;
        let path = self.meta_path(name);
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FlexError::VolumeNotFound(name.to_owned()));
            }
            Err(e) => {
                return Err(FlexError::BackendError(format!(
                    "read {}: {e}",
                    path.display()
                )));
            }
        };
        serde_json::from_str(&json)
            .map_err(|e| FlexError::BackendError(format!("parse {}: {e}", path.display())))
    }

    /// Replace a record atomically via a temp file and rename.
    async fn write_record(&self, record: &VolumeRecord) -> Result<(), FlexError> {
        let path = self.meta_path(&record.name);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(record).map_err(FlexError::internal)?;
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| FlexError::BackendError(format!("write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| FlexError::BackendError(format!("rename {}: {e}", path.display())))
    }
}

/// Volume names become file names, so path separators and dot entries are
/// refused.
fn validate_name(name: &str) -> Result<(), FlexError> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') || name.contains('\0')
    {
        return Err(FlexError::InvalidArgument(format!(
            "invalid volume name {name:?}"
        )));
    }
    Ok(())
}

async fn create_new(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(contents).await?;
    file.sync_all().await
}

#[async_trait]
impl StorageClient for LocalBackend {
    #[instrument(skip(self), fields(state_root = %self.state_root.display()))]
    async fn activate(&self) -> Result<(), FlexError> {
        for dir in [self.state_root.join(VOLUMES_DIR), self.meta_dir()] {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| FlexError::BackendError(format!("create {}: {e}", dir.display())))?;
        }
        info!("local backend activated");
        Ok(())
    }

    async fn get_volume(&self, name: &str) -> Result<VolumeMetadata, FlexError> {
        self.read_record(name).await.map(Into::into)
    }

    #[instrument(skip(self, options))]
    async fn create_volume(&self, name: &str, options: &Options) -> Result<(), FlexError> {
        validate_name(name)?;
        let vol_root = self.volume_root(name);
        let mountpoint = vol_root.to_str().ok_or_else(|| {
            FlexError::InvalidArgument(format!(
                "volume root {} is not valid UTF-8",
                vol_root.display()
            ))
        })?;
        let record = VolumeRecord {
            name: name.to_owned(),
            mountpoint: mountpoint.to_owned(),
            linked: false,
            options: options.clone(),
        };
        let json = serde_json::to_vec_pretty(&record).map_err(FlexError::internal)?;

        // The data directory exists before any record points at it.  An
        // existing directory may belong to a concurrent creator and is reused.
        let data_dir = vol_root.join(name);
        tokio::fs::create_dir_all(&data_dir).await.map_err(|e| {
            FlexError::BackendError(format!("create dir {}: {e}", data_dir.display()))
        })?;

        // The create-new open of the sidecar decides which creator wins.
        let meta_dir = self.meta_dir();
        tokio::fs::create_dir_all(&meta_dir).await.map_err(|e| {
            FlexError::BackendError(format!("create dir {}: {e}", meta_dir.display()))
        })?;
        let meta_path = self.meta_path(name);
        match create_new(&meta_path, &json).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(FlexError::VolumeAlreadyExists(name.to_owned()));
            }
            Err(e) => {
                return Err(FlexError::BackendError(format!(
                    "create {}: {e}",
                    meta_path.display()
                )));
            }
        }

        info!(volume = name, "volume created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn attach(&self, device: &str) -> Result<String, FlexError> {
        let mut record = self.read_record(device).await?;
        // Records written before their data directory existed are repaired
        // here so the mount presence check can succeed.
        let data_dir = self.volume_root(device).join(device);
        tokio::fs::create_dir_all(&data_dir).await.map_err(|e| {
            FlexError::BackendError(format!("create dir {}: {e}", data_dir.display()))
        })?;
        if !record.linked {
            record.linked = true;
            self.write_record(&record).await?;
            info!(volume = device, "volume linked");
        } else {
            debug!(volume = device, "volume already linked");
        }
        Ok(record.mountpoint)
    }

    #[instrument(skip(self))]
    async fn detach(&self, name: &str) -> Result<(), FlexError> {
        let mut record = self.read_record(name).await?;
        if !record.linked {
            return Err(FlexError::NotLinked(name.to_owned()));
        }
        record.linked = false;
        self.write_record(&record).await?;
        info!(volume = name, "volume unlinked");
        Ok(())
    }

    async fn list_volumes(&self) -> Result<Vec<VolumeMetadata>, FlexError> {
        let meta_dir = self.meta_dir();
        let mut dir = match tokio::fs::read_dir(&meta_dir).await {
            Ok(d) => d,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(FlexError::BackendError(format!(
                    "read_dir {}: {e}",
                    meta_dir.display()
                )));
            }
        };

        let mut volumes = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(FlexError::backend)? {
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !file_name.ends_with(META_SUFFIX) {
                continue;
            }

            let json = match tokio::fs::read_to_string(&path).await {
                Ok(s) => s,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read volume record, skipping");
                    continue;
                }
            };
            match serde_json::from_str::<VolumeRecord>(&json) {
                Ok(record) => volumes.push(VolumeMetadata::from(record)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to parse volume record, skipping");
                }
            }
        }

        volumes.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = volumes.len(), "listed volumes");
        Ok(volumes)
    }
}

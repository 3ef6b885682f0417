//! In-memory doubles for [`StorageClient`] and [`HostFs`] used by unit tests.

use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::StorageClient;
use crate::error::FlexError;
use crate::hostfs::HostFs;
use crate::types::{Options, VolumeMetadata};

/// Control-plane call observed by [`FakeClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCall {
    Activate,
    GetVolume(String),
    CreateVolume(String),
    Attach(String),
    Detach(String),
    ListVolumes,
}

/// Scriptable control plane.  Volumes created through it become visible to
/// later `get_volume` and `list_volumes` calls.
#[derive(Default)]
pub struct FakeClient {
    pub volumes: Mutex<BTreeMap<String, VolumeMetadata>>,
    pub calls: Mutex<Vec<ClientCall>>,
    pub activate_error: Option<FlexError>,
    pub get_error: Option<FlexError>,
    pub create_error: Option<FlexError>,
    pub attach_error: Option<FlexError>,
    pub detach_error: Option<FlexError>,
    pub list_error: Option<FlexError>,
}

impl FakeClient {
    pub fn with_volume(self, name: &str, mountpoint: &str) -> Self {
        self.volumes.lock().unwrap().insert(
            name.to_owned(),
            VolumeMetadata {
                name: name.to_owned(),
                mountpoint: mountpoint.to_owned(),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<ClientCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&ClientCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: ClientCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl StorageClient for FakeClient {
    async fn activate(&self) -> Result<(), FlexError> {
        self.record(ClientCall::Activate);
        self.activate_error.clone().map_or(Ok(()), Err)
    }

    async fn get_volume(&self, name: &str) -> Result<VolumeMetadata, FlexError> {
        self.record(ClientCall::GetVolume(name.to_owned()));
        if let Some(err) = &self.get_error {
            return Err(err.clone());
        }
        self.volumes
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| FlexError::VolumeNotFound(name.to_owned()))
    }

    async fn create_volume(&self, name: &str, _options: &Options) -> Result<(), FlexError> {
        self.record(ClientCall::CreateVolume(name.to_owned()));
        if let Some(err) = &self.create_error {
            return Err(err.clone());
        }
        let mut volumes = self.volumes.lock().unwrap();
        if volumes.contains_key(name) {
            return Err(FlexError::VolumeAlreadyExists(name.to_owned()));
        }
        volumes.insert(
            name.to_owned(),
            VolumeMetadata {
                name: name.to_owned(),
                mountpoint: format!("/ubiquity/{name}"),
            },
        );
        Ok(())
    }

    async fn attach(&self, device: &str) -> Result<String, FlexError> {
        self.record(ClientCall::Attach(device.to_owned()));
        match &self.attach_error {
            Some(err) => Err(err.clone()),
            None => Ok(format!("/ubiquity/{device}")),
        }
    }

    async fn detach(&self, name: &str) -> Result<(), FlexError> {
        self.record(ClientCall::Detach(name.to_owned()));
        self.detach_error.clone().map_or(Ok(()), Err)
    }

    async fn list_volumes(&self) -> Result<Vec<VolumeMetadata>, FlexError> {
        self.record(ClientCall::ListVolumes);
        if let Some(err) = &self.list_error {
            return Err(err.clone());
        }
        Ok(self.volumes.lock().unwrap().values().cloned().collect())
    }
}

/// Filesystem call observed by [`FakeFs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsCall {
    Exists(PathBuf),
    CreateDirAll(PathBuf),
    Symlink(PathBuf, PathBuf),
    ReadLink(PathBuf),
}

/// Recording filesystem with no real side effects.
#[derive(Default)]
pub struct FakeFs {
    existing: HashSet<PathBuf>,
    links: BTreeMap<PathBuf, PathBuf>,
    calls: Mutex<Vec<FsCall>>,
    exists_error: Option<io::ErrorKind>,
    create_dir_error: Option<io::ErrorKind>,
    symlink_error: Option<io::ErrorKind>,
}

impl FakeFs {
    pub fn with_existing(mut self, path: impl Into<PathBuf>) -> Self {
        self.existing.insert(path.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        self.links.insert(link.into(), target.into());
        self
    }

    pub fn failing_exists(mut self, kind: io::ErrorKind) -> Self {
        self.exists_error = Some(kind);
        self
    }

    pub fn failing_create_dir(mut self, kind: io::ErrorKind) -> Self {
        self.create_dir_error = Some(kind);
        self
    }

    pub fn failing_symlink(mut self, kind: io::ErrorKind) -> Self {
        self.symlink_error = Some(kind);
        self
    }

    pub fn calls(&self) -> Vec<FsCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: FsCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl HostFs for FakeFs {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        self.record(FsCall::Exists(path.to_owned()));
        match self.exists_error {
            Some(kind) => Err(kind.into()),
            None => Ok(self.existing.contains(path)),
        }
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.record(FsCall::CreateDirAll(path.to_owned()));
        self.create_dir_error.map_or(Ok(()), |kind| Err(kind.into()))
    }

    async fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        self.record(FsCall::Symlink(target.to_owned(), link.to_owned()));
        self.symlink_error.map_or(Ok(()), |kind| Err(kind.into()))
    }

    async fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.record(FsCall::ReadLink(path.to_owned()));
        self.links
            .get(path)
            .cloned()
            .ok_or_else(|| io::ErrorKind::NotFound.into())
    }
}

//! Host filesystem primitives used by the mount reconciler.
//!
//! [`HostFs`] is the seam between lifecycle logic and the real filesystem;
//! [`LocalFs`] is the production implementation on top of `tokio::fs`.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Filesystem operations needed to place a volume at a mount path.
#[async_trait]
pub trait HostFs: Send + Sync {
    /// `Ok(false)` when `path` does not exist; any other lookup failure is an
    /// error.  Symlinks are followed.
    async fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Create `path` and all missing parents.
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create a symbolic link at `link` pointing to `target`.
    async fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;

    /// Return the target of the symbolic link at `path`.
    async fn read_link(&self, path: &Path) -> io::Result<PathBuf>;
}

/// [`HostFs`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

#[async_trait]
impl HostFs for LocalFs {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        match tokio::fs::metadata(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        tokio::fs::symlink(target, link).await
    }

    async fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        tokio::fs::read_link(path).await
    }
}

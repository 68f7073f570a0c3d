//! Disposable staging area for the renamed mirror.
//!
//! A `StagingDirectory` owns one randomly named directory under the temp root plus the sibling
//! `<dir>.zip` the archiver writes into. Both are removed by [`StagingDirectory::release`] or,
//! failing that, when the guard is dropped, so every exit path of a run cleans up.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::ArchiverError;

const STAGING_PREFIX: &str = "sjzip-";
const STAGING_RAND_BYTES: usize = 16;

#[derive(Debug)]
pub struct StagingDirectory {
    dir: Option<TempDir>,
    path: PathBuf,
    archive_path: PathBuf,
}

impl StagingDirectory {
    /// Creates a fresh staging directory under the OS temp location.
    pub fn acquire() -> Result<Self, ArchiverError> {
        Self::acquire_in(&env::temp_dir())
    }

    /// Creates a fresh staging directory under `root`.
    pub fn acquire_in(root: &Path) -> Result<Self, ArchiverError> {
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .rand_bytes(STAGING_RAND_BYTES)
            .tempdir_in(root)
            .map_err(|e| ArchiverError::io(e, root))?;
        let path = dir.path().to_path_buf();
        let mut archive_name = path.file_name().unwrap_or_default().to_os_string();
        archive_name.push(".zip");
        let archive_path = path.with_file_name(archive_name);
        debug!(staging = %path.display(), "staging directory acquired");
        Ok(Self { dir: Some(dir), path, archive_path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the archiver writes before the archive is moved next to the input.
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Removes the directory tree and any leftover staged archive. Safe to call more than once.
    pub fn release(&mut self) -> Result<(), ArchiverError> {
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };
        let tree = dir.close().map_err(|e| ArchiverError::io(e, &self.path));
        let archive = match std::fs::remove_file(&self.archive_path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(ArchiverError::io(e, &self.archive_path)),
            _ => Ok(()),
        };
        debug!(staging = %self.path.display(), "staging directory released");
        tree.and(archive)
    }
}

impl Drop for StagingDirectory {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = %e, "failed to clean up staging directory");
        }
    }
}

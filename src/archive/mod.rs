//! # Zip Archive Writer
//!
//! Turns a staged directory into a single `.zip` file.
//!
//! Every file and directory below the staged root is written, recursively, with paths relative to
//! that root and `/` as separator. Entries are emitted in name order so the same staging tree
//! always produces the same entry list. File data is deflated; with a password each file entry is
//! protected with traditional PKWARE (ZipCrypto) encryption, which is what legacy extractors
//! understand.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};
use walkdir::WalkDir;
use zip::unstable::write::FileOptionsExt;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::progress::{self, ProgressCallback, ProgressEvent};
use crate::ArchiverError;

/// What ended up inside a written archive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub files: usize,
    pub directories: usize,
    /// Uncompressed bytes of all file entries.
    pub bytes: u64,
    pub encrypted: bool,
}

/// Anything that can turn a directory into an archive file.
pub trait ArchiveWriter {
    /// Writes everything below `from` into a new archive at `output`, replacing any file there.
    fn create_archive(
        &self,
        from: &Path,
        output: &Path,
        password: Option<&str>,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<ArchiveSummary, ArchiverError>;
}

/// [`ArchiveWriter`] backed by the `zip` crate.
#[derive(Debug, Clone, Copy)]
pub struct ZipArchiver {
    compression: CompressionMethod,
}

impl Default for ZipArchiver {
    fn default() -> Self {
        Self { compression: CompressionMethod::Deflated }
    }
}

impl ArchiveWriter for ZipArchiver {
    fn create_archive(
        &self,
        from: &Path,
        output: &Path,
        password: Option<&str>,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<ArchiveSummary, ArchiverError> {
        let file = File::create(output).map_err(|e| ArchiverError::io(e, output))?;
        let mut zip = ZipWriter::new(BufWriter::new(file));

        let dir_options = SimpleFileOptions::default();
        let mut file_options = SimpleFileOptions::default().compression_method(self.compression);
        if let Some(pass) = password {
            file_options = file_options.with_deprecated_encryption(pass.as_bytes());
        }

        let mut summary = ArchiveSummary { encrypted: password.is_some(), ..Default::default() };

        for entry in WalkDir::new(from).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            let rel = entry
                .path()
                .strip_prefix(from)
                .map_err(|e| ArchiverError::Other(Box::new(e)))?;
            let name = entry_name(rel)?;

            if entry.file_type().is_dir() {
                zip.add_directory(name.as_str(), dir_options)?;
                summary.directories += 1;
            } else if entry.file_type().is_file() {
                zip.start_file(name.as_str(), file_options)?;
                let mut reader = File::open(entry.path()).map_err(|e| ArchiverError::io(e, entry.path()))?;
                let n = io::copy(&mut reader, &mut zip).map_err(|e| ArchiverError::io(e, entry.path()))?;
                summary.files += 1;
                summary.bytes += n;
            } else {
                debug!(path = %entry.path().display(), "not a regular file, left out of archive");
                continue;
            }
            debug!(entry = %name, "archived");
            progress::emit(progress, ProgressEvent::Archived { entry: name });
        }

        let mut inner = zip.finish()?;
        inner.flush().map_err(|e| ArchiverError::io(e, output))?;

        info!(
            path = %output.display(),
            files = summary.files,
            directories = summary.directories,
            bytes = summary.bytes,
            encrypted = summary.encrypted,
            "archive written"
        );
        Ok(summary)
    }
}

/// Zip entry name for a path relative to the archive root.
fn entry_name(rel: &Path) -> Result<String, ArchiverError> {
    let mut parts = Vec::new();
    for component in rel.components() {
        let part = component.as_os_str().to_str().ok_or_else(|| {
            ArchiverError::Other(format!("entry name is not valid Unicode: {}", rel.display()).into())
        })?;
        parts.push(part);
    }
    Ok(parts.join("/"))
}

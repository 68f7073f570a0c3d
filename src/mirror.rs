//! # Directory Mirror
//!
//! Reproduces a source directory inside the staging area under transcoded names.
//!
//! The walk is depth-limited: depth 1 is the input directory's own children, depth 2 their
//! children. Directories are only descended into while `depth < max_depth`, and `max_depth` never
//! exceeds [`MAX_DEPTH`], so with the default limit a sub-directory contributes its regular files
//! and nothing below them.
//!
//! Per entry, in the order the filesystem lists them:
//! - excluded names are skipped at every level;
//! - regular files are copied byte for byte under their transcoded name;
//! - directories become a transcoded, freshly created directory and are walked one level further;
//! - anything else (symlinks, sockets, devices) is skipped, as is the staging directory itself
//!   when it happens to sit inside the source.
//!
//! Any transcoding, collision or I/O failure aborts the whole mirror.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::exclude::ExclusionMatcher;
use crate::fsx;
use crate::progress::{self, ProgressCallback, ProgressEvent, SkipReason};
use crate::transcode::NameTranscoder;
use crate::ArchiverError;

/// Deepest level the mirror will ever reach.
pub const MAX_DEPTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry that made it into the staging tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredEntry {
    pub source: PathBuf,
    pub staged: PathBuf,
    pub staged_name: String,
    pub kind: EntryKind,
    pub depth: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MirrorSummary {
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
    pub excluded: usize,
    /// Special files and directories past the depth limit.
    pub skipped: usize,
}

#[derive(Debug, Default, Clone)]
pub struct MirrorReport {
    pub entries: Vec<MirroredEntry>,
    pub summary: MirrorSummary,
}

pub struct DirectoryMirror<'a> {
    transcoder: &'a NameTranscoder,
    exclusions: &'a ExclusionMatcher,
    max_depth: usize,
    progress: Option<ProgressCallback<'a>>,
}

impl<'a> DirectoryMirror<'a> {
    pub fn new(transcoder: &'a NameTranscoder, exclusions: &'a ExclusionMatcher) -> Self {
        Self { transcoder, exclusions, max_depth: MAX_DEPTH, progress: None }
    }

    /// Sets the depth limit, clamped to `1..=MAX_DEPTH`.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.clamp(1, MAX_DEPTH);
        self
    }

    pub fn progress(mut self, cb: ProgressCallback<'a>) -> Self {
        self.progress = Some(cb);
        self
    }

    /// Mirrors `source` into the existing, empty directory `staging`.
    pub fn mirror(&self, source: &Path, staging: &Path) -> Result<MirrorReport, ArchiverError> {
        let mut report = MirrorReport::default();
        // The staging area may live inside the source (e.g. archiving the temp directory itself).
        let staging_root = staging.canonicalize().map_err(|e| ArchiverError::io(e, staging))?;
        self.mirror_level(source, staging, &staging_root, 1, &mut report)?;
        info!(
            files = report.summary.files,
            directories = report.summary.directories,
            bytes = report.summary.bytes,
            excluded = report.summary.excluded,
            skipped = report.summary.skipped,
            "mirror complete"
        );
        Ok(report)
    }

    fn mirror_level(
        &self,
        src_dir: &Path,
        dst_dir: &Path,
        staging_root: &Path,
        depth: usize,
        report: &mut MirrorReport,
    ) -> Result<(), ArchiverError> {
        let listing = fs::read_dir(src_dir).map_err(|e| ArchiverError::io(e, src_dir))?;
        for entry in listing {
            let entry = entry.map_err(|e| ArchiverError::io(e, src_dir))?;
            let src_path = entry.path();
            let name = entry.file_name();
            let display = name.to_string_lossy().into_owned();

            if self.exclusions.is_excluded(&display) {
                debug!(path = %src_path.display(), "excluded");
                report.summary.excluded += 1;
                self.emit(ProgressEvent::Skipped { name: display, reason: SkipReason::Excluded, depth });
                continue;
            }

            // DirEntry::file_type does not follow symlinks.
            let file_type = entry.file_type().map_err(|e| ArchiverError::io(e, &src_path))?;
            if file_type.is_dir() && src_path.canonicalize().map_or(false, |p| p.as_path() == staging_root) {
                debug!(path = %src_path.display(), "staging area inside source, skipped");
                report.summary.skipped += 1;
                self.emit(ProgressEvent::Skipped { name: display, reason: SkipReason::StagingArea, depth });
                continue;
            }
            let kind = if file_type.is_file() {
                EntryKind::File
            } else if file_type.is_dir() && depth < self.max_depth {
                EntryKind::Directory
            } else {
                let reason = if file_type.is_dir() { SkipReason::TooDeep } else { SkipReason::NotRegular };
                debug!(path = %src_path.display(), ?reason, "skipped");
                report.summary.skipped += 1;
                self.emit(ProgressEvent::Skipped { name: display, reason, depth });
                continue;
            };

            let staged_name = self.transcoder.transcode_os(&name)?;
            let dst_path = dst_dir.join(&staged_name);

            let bytes = match kind {
                EntryKind::File => {
                    let n = fsx::copy_new(&src_path, &dst_path)
                        .map_err(|e| staging_error(e, &staged_name, &src_path, &dst_path))?;
                    report.summary.files += 1;
                    report.summary.bytes += n;
                    n
                }
                EntryKind::Directory => {
                    fs::create_dir(&dst_path).map_err(|e| staging_error(e, &staged_name, &src_path, &dst_path))?;
                    report.summary.directories += 1;
                    0
                }
            };
            debug!(source = %src_path.display(), staged = %dst_path.display(), depth, "staged");

            self.emit(ProgressEvent::Staged {
                source_name: display,
                staged_name: staged_name.clone(),
                kind,
                depth,
                bytes,
            });
            report.entries.push(MirroredEntry {
                source: src_path.clone(),
                staged: dst_path.clone(),
                staged_name,
                kind,
                depth,
            });

            if kind == EntryKind::Directory {
                self.mirror_level(&src_path, &dst_path, staging_root, depth + 1, report)?;
            }
        }
        Ok(())
    }

    fn emit(&self, event: ProgressEvent) {
        progress::emit(self.progress, event);
    }
}

fn staging_error(err: io::Error, staged_name: &str, src: &Path, dst: &Path) -> ArchiverError {
    if err.kind() == io::ErrorKind::AlreadyExists {
        ArchiverError::NameCollision { name: staged_name.to_string(), path: dst.to_path_buf() }
    } else {
        ArchiverError::io(err, src)
    }
}

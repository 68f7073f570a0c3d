//! Progress reporting for mirror and archive operations.
//!
//! The library never prints; it hands [`ProgressEvent`]s to an optional callback and the CLI
//! decides what a line on the console looks like.

use std::path::PathBuf;

use crate::mirror::EntryKind;

/// Why an entry was left out of the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Matched an exclusion pattern.
    Excluded,
    /// Symlink, socket, device, or similar.
    NotRegular,
    /// A directory below the depth limit.
    TooDeep,
    /// The staging directory, found inside the source tree.
    StagingArea,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// An entry was staged under `staged_name`. `depth` is 1 for direct children of the input.
    Staged { source_name: String, staged_name: String, kind: EntryKind, depth: usize, bytes: u64 },
    Skipped { name: String, reason: SkipReason, depth: usize },
    /// The archiver is about to write `path`.
    CreatingArchive { path: PathBuf },
    /// One entry has been written into the archive.
    Archived { entry: String },
}

/// Callback receiving progress events, invoked synchronously on the calling thread.
pub type ProgressCallback<'a> = &'a dyn Fn(&ProgressEvent);

pub(crate) fn emit(cb: Option<ProgressCallback<'_>>, event: ProgressEvent) {
    if let Some(cb) = cb {
        cb(&event);
    }
}

/// Renders the line the CLI prints for an event, or `None` for events it keeps quiet about.
pub fn console_line(event: &ProgressEvent) -> Option<String> {
    match event {
        ProgressEvent::Staged { staged_name, kind: EntryKind::Directory, depth: 1, .. } => {
            Some(format!("adding: {}/", staged_name))
        }
        ProgressEvent::Staged { staged_name, kind: EntryKind::File, depth: 1, bytes, .. } => {
            Some(format!("adding: {} ({} bytes)", staged_name, bytes))
        }
        ProgressEvent::Skipped { name, reason: SkipReason::Excluded, depth: 1 } => {
            Some(format!("skipping: {} (excluded)", name))
        }
        ProgressEvent::CreatingArchive { .. } => Some("creating zip file...".to_string()),
        _ => None,
    }
}

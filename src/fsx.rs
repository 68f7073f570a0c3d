//! Filesystem helpers the mirror and the runner share.
//!
//! Staged entries are created with "must not exist yet" semantics so a transcoding collision shows
//! up as `AlreadyExists` instead of silently overwriting an earlier entry. Moving the finished
//! archive falls back to copy + remove when the temp area lives on another filesystem; the copy
//! goes through a sibling temporary file so `dst` is only ever the old or the new archive.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

use tempfile::NamedTempFile;

/// Copies `src` to `dst`, failing with `AlreadyExists` if `dst` is already there.
/// Permission bits follow the source file.
pub fn copy_new(src: &Path, dst: &Path) -> io::Result<u64> {
    let mut reader = File::open(src)?;
    let perms = reader.metadata()?.permissions();
    let mut writer = OpenOptions::new().write(true).create_new(true).open(dst)?;
    let copied = io::copy(&mut reader, &mut writer)?;
    writer.sync_all()?;
    fs::set_permissions(dst, perms)?;
    Ok(copied)
}

/// Moves `src` onto `dst`, replacing an existing file at `dst`.
pub fn move_replace(src: &Path, dst: &Path) -> io::Result<()> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => {
            copy_replace(src, dst)?;
            fs::remove_file(src)
        }
        Err(e) => Err(e),
    }
}

/// Copies `src` next to `dst` and renames the copy over `dst`. A failed copy leaves `dst` as it was.
pub fn copy_replace(src: &Path, dst: &Path) -> io::Result<()> {
    let dir = match dst.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut reader = File::open(src)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    io::copy(&mut reader, &mut tmp)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dst).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn is_cross_device(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::EXDEV)
}

#[cfg(windows)]
fn is_cross_device(err: &io::Error) -> bool {
    // ERROR_NOT_SAME_DEVICE
    err.raw_os_error() == Some(17)
}

#[cfg(not(any(unix, windows)))]
fn is_cross_device(_err: &io::Error) -> bool {
    false
}

//! The end-to-end run: validate, stage, mirror, archive, relocate, clean up.
//!
//! Shared by the `sjzip` binary and by library callers. The order matters:
//!
//! 1. the input must be an existing directory, otherwise a usage error is returned before anything
//!    is created;
//! 2. encoding, exclusions and the password decision are resolved, still without side effects;
//! 3. a staging directory is acquired;
//! 4. the input is mirrored into it under transcoded names;
//! 5. the staged tree is archived into `<staging>.zip`;
//! 6. that archive is moved next to the input as `<input>.zip`, replacing an older one;
//! 7. the staging directory is released, on success and on every error after step 3.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::archive::{ArchiveSummary, ArchiveWriter, ZipArchiver};
use crate::exclude::ExclusionMatcher;
use crate::fsx;
use crate::mirror::{DirectoryMirror, MirrorSummary};
use crate::password::PasswordDecision;
use crate::progress::{self, ProgressCallback, ProgressEvent};
use crate::staging::StagingDirectory;
use crate::transcode::{NameTranscoder, DEFAULT_ENCODING};
use crate::ArchiverError;

/// Everything one run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub input: PathBuf,
    /// Explicit password; wins over `password_length`.
    pub password: Option<String>,
    /// Generate a password of this many characters when no explicit one is set.
    pub password_length: Option<usize>,
    /// Exclusion globs added to the defaults.
    pub excludes: Vec<String>,
    /// WHATWG label of the target encoding.
    pub encoding: String,
    /// Staging root; `None` means the OS temp directory.
    pub temp_dir: Option<PathBuf>,
}

impl RunOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            password: None,
            password_length: None,
            excludes: Vec::new(),
            encoding: DEFAULT_ENCODING.to_string(),
            temp_dir: None,
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Final location of the archive, next to the input directory.
    pub archive: PathBuf,
    pub mirror: MirrorSummary,
    pub archive_summary: ArchiveSummary,
    /// A generated password is only recoverable from here.
    pub password: PasswordDecision,
}

/// Runs with the default zip writer.
pub fn run(opts: &RunOptions, progress: Option<ProgressCallback<'_>>) -> Result<RunOutcome, ArchiverError> {
    run_with(opts, &ZipArchiver::default(), progress)
}

/// Runs with a caller-supplied archive writer.
pub fn run_with(
    opts: &RunOptions,
    archiver: &dyn ArchiveWriter,
    progress: Option<ProgressCallback<'_>>,
) -> Result<RunOutcome, ArchiverError> {
    validate_input(&opts.input)?;
    let destination = archive_destination(&opts.input)?;
    let transcoder = NameTranscoder::for_label(&opts.encoding)?;
    let exclusions = ExclusionMatcher::with_defaults(&opts.excludes)?;
    debug!(patterns = ?exclusions.patterns(), encoding = transcoder.encoding_name(), "name rules");
    let password = PasswordDecision::resolve(opts.password.clone(), opts.password_length)?;

    let mut staging = match &opts.temp_dir {
        Some(root) => StagingDirectory::acquire_in(root)?,
        None => StagingDirectory::acquire()?,
    };
    info!(input = %opts.input.display(), staging = %staging.path().display(), "staging");

    let result = stage_and_archive(
        opts,
        &staging,
        &transcoder,
        &exclusions,
        archiver,
        password.password(),
        &destination,
        progress,
    );
    let released = staging.release();

    let (mirror, archive_summary) = match (result, released) {
        (Ok(done), Ok(())) => done,
        (Ok(_), Err(e)) => return Err(e),
        (Err(e), released) => {
            if let Err(cleanup) = released {
                warn!(error = %cleanup, "staging cleanup failed after error");
            }
            return Err(e);
        }
    };

    info!(archive = %destination.display(), "done");
    Ok(RunOutcome { archive: destination, mirror, archive_summary, password })
}

#[allow(clippy::too_many_arguments)]
fn stage_and_archive(
    opts: &RunOptions,
    staging: &StagingDirectory,
    transcoder: &NameTranscoder,
    exclusions: &ExclusionMatcher,
    archiver: &dyn ArchiveWriter,
    password: Option<&str>,
    destination: &Path,
    progress: Option<ProgressCallback<'_>>,
) -> Result<(MirrorSummary, ArchiveSummary), ArchiverError> {
    let mut mirror = DirectoryMirror::new(transcoder, exclusions);
    if let Some(cb) = progress {
        mirror = mirror.progress(cb);
    }
    let report = mirror.mirror(&opts.input, staging.path())?;
    if report.entries.is_empty() {
        warn!(input = %opts.input.display(), "nothing left to archive after exclusions");
    }

    progress::emit(progress, ProgressEvent::CreatingArchive { path: destination.to_path_buf() });
    let summary = archiver.create_archive(staging.path(), staging.archive_path(), password, progress)?;

    fsx::move_replace(staging.archive_path(), destination).map_err(|e| ArchiverError::io(e, destination))?;
    Ok((report.summary, summary))
}

/// Fails with a usage error unless `input` is an existing directory.
pub fn validate_input(input: &Path) -> Result<(), ArchiverError> {
    match fs::metadata(input) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ArchiverError::Usage(format!("Input path is not a directory: {}", input.display()))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(ArchiverError::Usage(format!("Input directory does not exist: {}", input.display())))
        }
        Err(e) => Err(ArchiverError::io(e, input)),
    }
}

/// `<parent>/<name>.zip` for an input directory `<parent>/<name>`, ignoring trailing separators.
pub fn archive_destination(input: &Path) -> Result<PathBuf, ArchiverError> {
    let base = if input.file_name().is_some() {
        input.to_path_buf()
    } else {
        input.canonicalize().map_err(|e| ArchiverError::io(e, input))?
    };
    let name = base.file_name().ok_or_else(|| {
        ArchiverError::Usage(format!("Cannot name an archive after '{}'.", input.display()))
    })?;
    let mut zip_name = name.to_os_string();
    zip_name.push(".zip");
    Ok(base.with_file_name(zip_name))
}

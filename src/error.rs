use std::path::PathBuf;

/// The primary error type for all operations in the `sjzip` crate.
#[derive(Debug)]
pub enum ArchiverError {
    /// The invocation itself is unusable: missing input, input is not a directory,
    /// a zero password length, an unknown encoding label or a malformed pattern.
    /// Reported before any side effect happens.
    Usage(String),

    /// A file or directory name could not survive the sanitize + legacy-encoding round trip.
    NameTranscode { name: String, encoding: &'static str },

    /// Two source names transcode to the same staged name inside one directory.
    NameCollision { name: String, path: PathBuf },

    /// An I/O error occurred while listing, copying, creating, moving or removing.
    /// Includes the path where the error happened.
    Io { source: std::io::Error, path: PathBuf },

    /// The zip writer reported a failure.
    Archive(zip::result::ZipError),

    /// A wrapper for any other error that doesn't fit the specific variants.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl ArchiverError {
    pub(crate) fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ArchiverError::Io { source, path: path.into() }
    }

    /// True for errors that mean "nothing was attempted"; the CLI exits without an error banner.
    pub fn is_usage(&self) -> bool {
        matches!(self, ArchiverError::Usage(_))
    }
}

impl std::fmt::Display for ArchiverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiverError::Usage(msg) => write!(f, "{}", msg),
            ArchiverError::NameTranscode { name, encoding } => {
                write!(f, "Name '{}' cannot be represented in {}", name, encoding)
            }
            ArchiverError::NameCollision { name, path } => write!(
                f,
                "Name '{}' collides with an already staged entry at '{}'",
                name,
                path.display()
            ),
            ArchiverError::Io { source, path } => write!(f, "I/O error on path '{}': {}", path.display(), source),
            ArchiverError::Archive(e) => write!(f, "Archive error: {}", e),
            ArchiverError::Other(e) => write!(f, "An unexpected error occurred: {}", e),
        }
    }
}

impl std::error::Error for ArchiverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArchiverError::Io { source, .. } => Some(source),
            ArchiverError::Archive(e) => Some(e),
            ArchiverError::Other(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<zip::result::ZipError> for ArchiverError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(source) => ArchiverError::Io { source, path: PathBuf::new() },
            other => ArchiverError::Archive(other),
        }
    }
}

impl From<walkdir::Error> for ArchiverError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
        match err.into_io_error() {
            Some(source) => ArchiverError::Io { source, path },
            None => ArchiverError::Other(format!("directory walk failed at '{}'", path.display()).into()),
        }
    }
}

// Generic IO error conversion that doesn't require a path
impl From<std::io::Error> for ArchiverError {
    fn from(err: std::io::Error) -> Self {
        ArchiverError::Io { source: err, path: PathBuf::new() }
    }
}

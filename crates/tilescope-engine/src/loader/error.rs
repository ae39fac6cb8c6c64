use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Why an image could not be loaded.
#[derive(Debug)]
pub enum LoadError {
    FileNotFound(PathBuf),

    /// No registered decoder handles the file.
    UnsupportedFormat(String),

    /// A decoder accepted the file but could not decode it.
    DecodeFailure {
        format: &'static str,
        message: String,
    },

    /// Any other read failure (permissions, is a directory, ...).
    Io {
        path: PathBuf,
        source: io::Error,
    },
}

impl LoadError {
    pub(crate) fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => LoadError::FileNotFound(path.to_path_buf()),
            _ => LoadError::Io { path: path.to_path_buf(), source },
        }
    }

    pub(crate) fn decode(format: &'static str, message: impl Into<String>) -> Self {
        LoadError::DecodeFailure { format, message: message.into() }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::FileNotFound(path) => write!(f, "file not found: {}", path.display()),
            LoadError::UnsupportedFormat(what) => write!(f, "unsupported image format: {what}"),
            LoadError::DecodeFailure { format, message } => {
                write!(f, "failed to decode {format} image: {message}")
            }
            LoadError::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

use std::fmt;
use std::path::{Path, PathBuf};

/// Fatal failure reading one of the input files.
#[derive(Debug)]
pub enum LoadError {
    /// Input file does not exist.
    MissingFile { path: PathBuf },
    /// File exists but its contents could not be understood.
    Parse { path: PathBuf, message: String },
    /// Any other read/write failure.
    Io { path: PathBuf, message: String },
}

impl LoadError {
    pub(crate) fn parse(path: &Path, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Classify an `std::io::Error` raised while opening `path`.
    pub(crate) fn from_io(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFile { path } => write!(f, "input file not found: {}", path.display()),
            Self::Parse { path, message } => write!(f, "cannot parse {}: {message}", path.display()),
            Self::Io { path, message } => write!(f, "cannot access {}: {message}", path.display()),
        }
    }
}

impl std::error::Error for LoadError {}

use std::fmt;
use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, LoaderError>;

#[derive(Debug)]
pub enum LoaderError {
    Config(String),
    NoSplits,
    UnrecognizedSource { split: String, path: PathBuf },
    InvalidShardName(PathBuf),
    IndexOverflow(usize),
    Read { path: PathBuf, source: io::Error },
    Write { path: PathBuf, source: io::Error },
    CacheExists(PathBuf),
    CacheMissing(PathBuf),
    Serialization(Box<bincode::error::EncodeError>),
    Deserialization(Box<bincode::error::DecodeError>),
    Pool(String),
    Io(io::Error),
}

impl LoaderError {
    /// Wrap an I/O failure with the file it happened on.
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LoaderError::Read { path: path.into(), source }
    }

    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LoaderError::Write { path: path.into(), source }
    }
}

impl fmt::Display for LoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderError::Config(e) => write!(f, "Configuration error: {}", e),
            LoaderError::NoSplits => write!(f, "Configuration error: no splits found"),
            LoaderError::UnrecognizedSource { split, path } => write!(
                f,
                "Unrecognized source for split {}: {} is neither a .jsonl.gz file nor a directory",
                split,
                path.display()
            ),
            LoaderError::InvalidShardName(p) => {
                write!(f, "Shard file name is not an integer index: {}", p.display())
            }
            LoaderError::IndexOverflow(i) => {
                write!(f, "Shard index {} is too large to address", i)
            }
            LoaderError::Read { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            LoaderError::Write { path, source } => {
                write!(f, "Failed to write {}: {}", path.display(), source)
            }
            LoaderError::CacheExists(p) => {
                write!(f, "Refusing to overwrite existing cache artifact {}", p.display())
            }
            LoaderError::CacheMissing(p) => write!(f, "Cache artifact not found: {}", p.display()),
            LoaderError::Serialization(e) => write!(f, "Serialization error: {}", e),
            LoaderError::Deserialization(e) => write!(f, "Deserialization error: {}", e),
            LoaderError::Pool(e) => write!(f, "Worker pool error: {}", e),
            LoaderError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for LoaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoaderError::Read { source, .. } => Some(source),
            LoaderError::Write { source, .. } => Some(source),
            LoaderError::Io(e) => Some(e),
            LoaderError::Serialization(e) => Some(&**e),
            LoaderError::Deserialization(e) => Some(&**e),
            _ => None,
        }
    }
}

impl From<Box<bincode::error::EncodeError>> for LoaderError {
    fn from(err: Box<bincode::error::EncodeError>) -> Self {
        LoaderError::Serialization(err)
    }
}

impl From<bincode::error::EncodeError> for LoaderError {
    fn from(err: bincode::error::EncodeError) -> Self {
        LoaderError::Serialization(Box::new(err))
    }
}

impl From<Box<bincode::error::DecodeError>> for LoaderError {
    fn from(err: Box<bincode::error::DecodeError>) -> Self {
        LoaderError::Deserialization(err)
    }
}

impl From<bincode::error::DecodeError> for LoaderError {
    fn from(err: bincode::error::DecodeError) -> Self {
        LoaderError::Deserialization(Box::new(err))
    }
}

impl From<io::Error> for LoaderError {
    fn from(err: io::Error) -> Self {
        LoaderError::Io(err)
    }
}

impl From<rayon::ThreadPoolBuildError> for LoaderError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        LoaderError::Pool(err.to_string())
    }
}

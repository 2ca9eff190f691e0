use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("unsupported config format: .{0}")]
    UnsupportedFormat(String),
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),
}

impl Error {
    pub(crate) fn parse(path: &Path, source: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            message: source.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

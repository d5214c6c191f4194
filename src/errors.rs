use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{} is not a directory", .path.display())]
pub struct NotADirectory {
    pub path: PathBuf,
}

impl NotADirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

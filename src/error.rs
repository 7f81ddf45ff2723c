use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("failed to create log directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to open log file {}: {source}", .path.display())]
    OpenFile { path: PathBuf, source: io::Error },

    #[error("failed to copy log file to {}: {source}", .dest.display())]
    Copy { dest: PathBuf, source: io::Error },
}

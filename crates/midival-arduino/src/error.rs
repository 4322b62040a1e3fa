//! Error types for toolchain invocation and library staging.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Unsupported platform {0}")]
    UnsupportedPlatform(String),

    #[error("Home directory could not be determined")]
    NoHomeDir,

    #[error("Failed to launch {binary}: {source}")]
    Launch {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing library resource: {0}")]
    MissingResource(PathBuf),

    #[error("Unknown board: {0}")]
    UnknownBoard(String),
}

pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the MIDI message model.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("MIDI message must contain at least a status byte")]
    EmptyMessage,
}

pub type Result<T> = std::result::Result<T, Error>;

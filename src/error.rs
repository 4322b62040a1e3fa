//! Centralized error type for the midival umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Message(#[from] midival_midi::Error),

    #[cfg(feature = "runtime")]
    #[error("MIDI: {0}")]
    Midi(#[from] midival_midi_io::Error),

    #[cfg(feature = "compile")]
    #[error("Arduino: {0}")]
    Arduino(#[from] midival_arduino::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

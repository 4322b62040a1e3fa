//! Error types for the MIDI device interface and round-trip tester.

use std::time::Duration;

use midival_midi::MidiMessage;
use thiserror::Error;

use crate::port::PortDirection;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Message(#[from] midival_midi::Error),

    #[error("No MIDI {0} ports available")]
    NoPortsAvailable(PortDirection),

    #[error("Invalid {direction} port selection: {input:?}")]
    InvalidSelection {
        direction: PortDirection,
        input: String,
    },

    #[error("MIDI interface is not connected")]
    NotConnected,

    #[error("No echo received for {sent} within {waited:?}")]
    EchoTimeout { sent: MidiMessage, waited: Duration },

    #[error("Echo mismatch: expected {expected}, received {received}")]
    ContentMismatch {
        expected: MidiMessage,
        received: MidiMessage,
    },

    #[error("MIDI port error: {0}")]
    MidiPort(String),

    #[error("MIDI device error: {0}")]
    MidiDevice(String),

    #[error("MIDI send error: {0}")]
    MidiSend(String),
}

#[cfg(feature = "midi-io")]
impl From<midir::InitError> for Error {
    fn from(e: midir::InitError) -> Self {
        Error::MidiDevice(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::ConnectError<midir::MidiOutput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiOutput>) -> Self {
        Error::MidiPort(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::ConnectError<midir::MidiInput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiInput>) -> Self {
        Error::MidiPort(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::SendError> for Error {
    fn from(e: midir::SendError) -> Self {
        Error::MidiSend(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

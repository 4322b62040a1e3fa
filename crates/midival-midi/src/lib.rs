//! MIDI message model for the midival round-trip validator.
//!
//! A [`MidiMessage`] is an ordered sequence of raw bytes. Its first byte (the
//! status byte) is classified into a message type and, for channel messages,
//! a channel number. Classification only ever looks at the status byte.
//!
//! # Example
//!
//! ```
//! use midival_midi::{classify_channel, classify_type, MidiMessage, MidiType};
//!
//! assert_eq!(classify_type(0x93), 0x90);
//! assert_eq!(classify_channel(0x93), 3);
//! assert_eq!(classify_type(0xF8), 0xF8);
//!
//! let msg = MidiMessage::note_on(0, 64, 80);
//! assert_eq!(msg.as_bytes(), &[0x90, 64, 80]);
//! assert_eq!(msg.kind(), Some(MidiType::NoteOn));
//! ```

pub mod error;
pub use error::{Error, Result};

mod status;
pub use status::{classify_channel, classify_type, is_system_status, MidiType};

mod message;
pub use message::MidiMessage;

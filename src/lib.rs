//! # midival - Arduino MIDI library validator
//!
//! Hardware-in-the-loop validation for an Arduino MIDI library.
//!
//! ## Architecture
//!
//! midival is an umbrella crate that coordinates:
//! - **midival-midi** - Raw MIDI messages and status byte classification
//! - **midival-midi-io** - Port selection, device interface, round-trip tester
//! - **midival-arduino** - Library staging and example compilation via the Arduino IDE
//!
//! ## Quick Start
//!
//! ```ignore
//! use midival::prelude::*;
//!
//! let validator = Validator::builder()
//!     .root("path/to/arduino_midi_library")
//!     .build();
//!
//! // Compile every example for every board
//! let report = validator.compile()?;
//!
//! // Round-trip the thru suite against the connected board
//! let summary = validator.runtime(&mut LinePrompt::stdio())?;
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Everything enabled
//! - `compile` - Arduino toolchain checks
//! - `runtime` - Round-trip checks (loopback driver only)
//! - `midi-hardware` - System MIDI ports through midir

mod error;
pub use error::{Error, Result};

/// Message model
pub use midival_midi as midi;
pub use midival_midi::{MidiMessage, MidiType};

// MIDI device interface and tester
#[cfg(feature = "runtime")]
pub use midival_midi_io as io;

#[cfg(feature = "runtime")]
pub use midival_midi_io::{
    default_thru_suite, CheckOutcome, CheckResult, LinePrompt, LoopbackDriver, MidiInterface,
    PortPrompt, RoundTripTester, RunSummary,
};

#[cfg(feature = "midi-hardware")]
pub use midival_midi_io::MidirDriver;

// Arduino toolchain
#[cfg(feature = "compile")]
pub use midival_arduino as arduino;

#[cfg(feature = "compile")]
pub use midival_arduino::{default_boards, Board, CompileReport, Toolchain, VerifyOutcome};

mod builder;
mod validator;

#[cfg(feature = "runtime")]
pub use builder::MidiBackend;
pub use builder::ValidatorBuilder;
pub use validator::Validator;

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{Validator, ValidatorBuilder};

    pub use crate::midi::MidiMessage;

    pub use std::time::Duration;

    #[cfg(feature = "runtime")]
    pub use crate::io::{LinePrompt, RunSummary};
    #[cfg(feature = "runtime")]
    pub use crate::MidiBackend;

    #[cfg(feature = "compile")]
    pub use crate::arduino::{Board, CompileReport};
}

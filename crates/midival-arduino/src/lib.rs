//! Arduino toolchain driver for the compile validator.
//!
//! Stages the MIDI library sources and resources into a sketchbook, then runs
//! the Arduino IDE in `--verify` mode over every bundled example for a set of
//! boards.
//!
//! ```no_run
//! use midival_arduino::{default_boards, ArduinoMidiLibrary, LibraryLayout, Toolchain};
//!
//! # fn main() -> midival_arduino::Result<()> {
//! let toolchain = Toolchain::platform_default()?;
//! ArduinoMidiLibrary::scan(LibraryLayout::new("."))?.install(&toolchain)?;
//! let report = ArduinoMidiLibrary::validate(&toolchain, &default_boards())?;
//! assert!(report.passed());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

mod board;
pub use board::{default_boards, Board};

pub mod toolchain;
pub use toolchain::{CommandRunner, ProcessRunner, Toolchain, VerifyOutcome};

pub mod library;
pub use library::{
    ArduinoMidiLibrary, CompileCheck, CompileReport, Example, LibraryLayout, LIBRARY_NAME,
};

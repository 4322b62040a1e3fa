//! MIDI device interface and round-trip validator.
//!
//! Connects to one input and one output port through a [`MidiDriver`],
//! forwards everything received to an observer, and checks that a device
//! under test retransmits each message it is sent.
//!
//! ```no_run
//! use midival_midi_io::{default_thru_suite, LinePrompt, MidiInterface, MidirDriver, RoundTripTester};
//!
//! # fn main() -> midival_midi_io::Result<()> {
//! let interface = MidiInterface::open(MidirDriver::new(), None, &mut LinePrompt::stdio())?;
//! let mut tester = RoundTripTester::builder(interface).build()?;
//! let summary = tester.run(&default_thru_suite())?;
//! println!("{}", summary);
//! # Ok(())
//! # }
//! ```
//!
//! Feature gates: `midi-io` (system MIDI through midir, on by default).

pub mod error;
pub use error::{Error, Result};

pub mod port;
pub use port::{
    choose_port, choose_ports, AvailablePorts, LinePrompt, PortDirection, PortInfo, PortLayout,
    PortPrompt, PortSelection,
};

pub mod driver;
#[cfg(feature = "midi-io")]
pub use driver::MidirDriver;
pub use driver::{
    Echo, InputConnection, InputHandler, LoopbackDriver, LoopbackDriverBuilder, LoopbackHandle,
    MidiDriver, OutputConnection,
};

mod interface;
pub use interface::{MidiInterface, Observer, Session};

pub mod tester;
pub use tester::{
    default_thru_suite, CheckOutcome, CheckResult, RoundTripTester, RoundTripTesterBuilder,
    RunSummary, DEFAULT_ECHO_TIMEOUT,
};

pub use midival_midi::{MidiMessage, MidiType};

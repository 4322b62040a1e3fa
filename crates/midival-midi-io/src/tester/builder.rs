//! RoundTripTester builder.

use std::sync::Arc;
use std::time::Duration;

use midival_midi::MidiMessage;

use crate::error::Result;
use crate::interface::MidiInterface;

use super::{EchoSlot, RoundTripTester, DEFAULT_ECHO_TIMEOUT};

pub struct RoundTripTesterBuilder {
    pub(super) interface: MidiInterface,
    pub(super) echo_timeout: Duration,
}

impl RoundTripTesterBuilder {
    pub(super) fn new(interface: MidiInterface) -> Self {
        Self {
            interface,
            echo_timeout: DEFAULT_ECHO_TIMEOUT,
        }
    }

    /// Upper bound on how long each check waits for its echo.
    pub fn echo_timeout(mut self, timeout: Duration) -> Self {
        self.echo_timeout = timeout;
        self
    }

    /// Fails if the interface never connected; replaces any observer already
    /// installed on it.
    pub fn build(self) -> Result<RoundTripTester> {
        self.interface.ensure_connected()?;

        let echo = Arc::new(EchoSlot::default());
        let slot = echo.clone();
        self.interface.set_observer(Some(Box::new(move |message: &MidiMessage| {
            slot.handle_midi_input(message)
        })));

        Ok(RoundTripTester {
            interface: self.interface,
            echo,
            echo_timeout: self.echo_timeout,
        })
    }
}

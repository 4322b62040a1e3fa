//! Round-trip (thru) testing against a device that echoes what it receives.
//!
//! Each check arms the echo slot, sends one message and blocks on a condition
//! variable until the first incoming message arrives or the echo timeout
//! elapses. Checks run strictly one after another, so at most one echo is
//! outstanding at any time.

mod builder;
mod result;
mod suite;

pub use builder::RoundTripTesterBuilder;
pub use result::{CheckOutcome, CheckResult, RunSummary};
pub use suite::default_thru_suite;

use std::sync::Arc;
use std::time::{Duration, Instant};

use midival_midi::MidiMessage;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::interface::MidiInterface;

pub const DEFAULT_ECHO_TIMEOUT: Duration = Duration::from_millis(1000);

#[derive(Debug, Default)]
struct EchoState {
    armed: bool,
    received: Option<MidiMessage>,
}

/// Hand-off point between the input callback thread and the waiting check.
#[derive(Debug, Default)]
pub(crate) struct EchoSlot {
    state: Mutex<EchoState>,
    arrived: Condvar,
}

impl EchoSlot {
    /// Called on the driver's input thread.
    pub(crate) fn handle_midi_input(&self, message: &MidiMessage) {
        let mut state = self.state.lock();
        if !state.armed || state.received.is_some() {
            debug!("Dropping unsolicited MIDI message {}", message);
            return;
        }
        state.received = Some(message.clone());
        self.arrived.notify_one();
    }

    fn arm(&self) {
        let mut state = self.state.lock();
        state.armed = true;
        state.received = None;
    }

    fn disarm(&self) {
        let mut state = self.state.lock();
        state.armed = false;
        state.received = None;
    }

    /// Block until the first echo arrives or `deadline` passes. Always leaves
    /// the slot disarmed.
    fn wait_until(&self, deadline: Instant) -> Option<MidiMessage> {
        let mut state = self.state.lock();
        while state.received.is_none() {
            if self.arrived.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        state.armed = false;
        state.received.take()
    }
}

/// Sends messages through a connected [`MidiInterface`] and compares each
/// with the first message that comes back.
pub struct RoundTripTester {
    interface: MidiInterface,
    echo: Arc<EchoSlot>,
    echo_timeout: Duration,
}

impl RoundTripTester {
    pub fn builder(interface: MidiInterface) -> RoundTripTesterBuilder {
        RoundTripTesterBuilder::new(interface)
    }

    pub fn echo_timeout(&self) -> Duration {
        self.echo_timeout
    }

    pub fn interface(&self) -> &MidiInterface {
        &self.interface
    }

    /// Send `message` and wait for it to come back unchanged.
    ///
    /// A mismatching or missing echo is reported in the returned
    /// [`CheckResult`]; only a failed send is an `Err`.
    pub fn check_thru(&mut self, message: &MidiMessage) -> Result<CheckResult> {
        // Armed before sending so a fast echo cannot slip past.
        self.echo.arm();
        let started = Instant::now();
        if let Err(e) = self.interface.send(message) {
            self.echo.disarm();
            return Err(e);
        }

        let received = self.echo.wait_until(started + self.echo_timeout);
        let waited = started.elapsed();
        let result = CheckResult::new(message.clone(), received, waited);

        match result.outcome {
            CheckOutcome::Passed => debug!("Echo for {} after {:?}", message, waited),
            CheckOutcome::Mismatch => warn!("{}", result),
            CheckOutcome::NoResponse => {
                warn!("{}", result);
                self.drain_late_echo();
            }
        }
        Ok(result)
    }

    /// After a timeout the echo may still be in flight. Give it one more
    /// timeout period to land while armed, and discard it, so it is never
    /// taken for the next check's reply.
    fn drain_late_echo(&self) {
        self.echo.arm();
        if let Some(late) = self.echo.wait_until(Instant::now() + self.echo_timeout) {
            debug!("Discarding late echo {}", late);
        }
    }

    /// Run every check in order. Failed checks do not stop the run.
    pub fn run(&mut self, messages: &[MidiMessage]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for message in messages {
            let result = self.check_thru(message)?;
            info!("{}", result);
            summary.results.push(result);
        }
        info!("{}", summary);
        Ok(summary)
    }

    /// Detach from the interface; the echo observer is removed.
    pub fn into_interface(self) -> MidiInterface {
        self.interface.set_observer(None);
        self.interface
    }
}

impl std::fmt::Debug for RoundTripTester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundTripTester")
            .field("interface", &self.interface)
            .field("echo_timeout", &self.echo_timeout)
            .finish()
    }
}

//! Device interface: owns the session with the device under test and bridges
//! asynchronous receipt into an observer callback.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use midival_midi::MidiMessage;
use tracing::{debug, info, trace, warn};

use crate::driver::{InputConnection, MidiDriver, OutputConnection};
use crate::error::{Error, Result};
use crate::port::{
    choose_ports, AvailablePorts, PortDirection, PortInfo, PortPrompt, PortSelection,
};

/// Receives every inbound message. Runs on the driver's delivery thread and
/// must not block.
pub type Observer = Box<dyn Fn(&MidiMessage) + Send + Sync>;

type ObserverSlot = ArcSwapOption<Observer>;

/// Forward one inbound message to the registered observer, if any.
///
/// Lock-free: the observer slot is read through `arc-swap`, so swapping the
/// observer never stalls delivery.
fn handle_midi_input(observer: &ObserverSlot, timestamp: u64, bytes: &[u8]) {
    let message = match MidiMessage::from_bytes(bytes) {
        Ok(message) => message,
        Err(_) => {
            trace!("Ignoring empty MIDI packet at {}us", timestamp);
            return;
        }
    };
    trace!("Received {} at {}us", message, timestamp);
    if let Some(observer) = observer.load().as_deref() {
        observer(&message);
    }
}

/// Opened input and output connections. Both close when the session drops.
pub struct Session {
    input_port: PortInfo,
    output_port: PortInfo,
    // Input closes first, then output.
    input: Option<Box<dyn InputConnection>>,
    output: Option<Box<dyn OutputConnection>>,
}

impl Session {
    pub fn input_port(&self) -> &PortInfo {
        &self.input_port
    }

    pub fn output_port(&self) -> &PortInfo {
        &self.output_port
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.output.as_mut().ok_or(Error::NotConnected)?.send(bytes)
    }

    /// Close both connections now instead of at drop.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(input) = self.input.take() {
            input.close();
        }
        if let Some(output) = self.output.take() {
            output.close();
            info!(
                "Closed MIDI session (input {}, output {})",
                self.input_port, self.output_port
            );
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("input_port", &self.input_port)
            .field("output_port", &self.output_port)
            .field("open", &self.output.is_some())
            .finish()
    }
}

/// Interface to one device under test.
///
/// Construction enumerates ports, resolves one per direction, opens them and
/// installs the receive handler. When a direction has no port the interface
/// stays disconnected: [`send`](Self::send) fails with
/// [`Error::NotConnected`] and [`ensure_connected`](Self::ensure_connected)
/// reports which direction was missing.
pub struct MidiInterface {
    // Dropped before the driver.
    session: Option<Session>,
    driver: Box<dyn MidiDriver>,
    observer: Arc<ObserverSlot>,
    ports: AvailablePorts,
    missing: Option<PortDirection>,
}

impl MidiInterface {
    pub fn open<D>(
        driver: D,
        observer: Option<Observer>,
        prompt: &mut dyn PortPrompt,
    ) -> Result<Self>
    where
        D: MidiDriver + 'static,
    {
        let driver: Box<dyn MidiDriver> = Box::new(driver);
        let observer = Arc::new(ArcSwapOption::new(observer.map(Arc::new)));

        let ports = driver.available_ports()?;
        debug!(
            "{} driver: {} input / {} output port(s)",
            driver.name(),
            ports.inputs.len(),
            ports.outputs.len()
        );
        let selection = choose_ports(&ports, driver.layout(), prompt)?;
        let missing = selection.missing();
        let session = Self::connect(&*driver, selection, &observer)?;

        Ok(Self {
            session,
            driver,
            observer,
            ports,
            missing,
        })
    }

    /// Open the selected ports. Returns `None` without opening anything when
    /// a direction is unresolved.
    fn connect(
        driver: &dyn MidiDriver,
        selection: PortSelection,
        observer: &Arc<ObserverSlot>,
    ) -> Result<Option<Session>> {
        let (input_port, output_port) = match selection {
            PortSelection {
                input: Some(input),
                output: Some(output),
            } => (input, output),
            _ => return Ok(None),
        };

        info!("Connecting input to {}", input_port.name);
        info!("Connecting output to {}", output_port.name);

        // If opening the input fails the output is dropped, and closed, here.
        let output = driver.open_output(&output_port)?;
        let slot = Arc::clone(observer);
        let input = driver.open_input(
            &input_port,
            Box::new(move |timestamp, bytes: &[u8]| handle_midi_input(&slot, timestamp, bytes)),
        )?;

        Ok(Some(Session {
            input_port,
            output_port,
            input: Some(input),
            output: Some(output),
        }))
    }

    /// Replace the observer. `None` detaches it; inbound messages are then
    /// dropped.
    pub fn set_observer(&self, observer: Option<Observer>) {
        self.observer.store(observer.map(Arc::new));
    }

    /// Transmit one message synchronously.
    pub fn send(&mut self, message: &MidiMessage) -> Result<()> {
        let session = self.session.as_mut().ok_or(Error::NotConnected)?;
        info!("Sending {}", message);
        session.send(message.as_bytes()).inspect_err(|e| {
            warn!("Failed to send {}: {}", message, e);
        })
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// `Ok` when a session is open, otherwise the reason there is none.
    pub fn ensure_connected(&self) -> Result<()> {
        match (&self.session, self.missing) {
            (Some(_), _) => Ok(()),
            (None, Some(direction)) => Err(Error::NoPortsAvailable(direction)),
            (None, None) => Err(Error::NotConnected),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Ports seen when the interface was opened.
    pub fn available_ports(&self) -> &AvailablePorts {
        &self.ports
    }

    pub fn driver_name(&self) -> &str {
        self.driver.name()
    }

    /// Close the session and detach the observer now instead of at drop.
    pub fn disconnect(&mut self) {
        self.observer.store(None);
        if let Some(session) = self.session.take() {
            session.close();
        }
    }
}

impl Drop for MidiInterface {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl std::fmt::Debug for MidiInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidiInterface")
            .field("driver", &self.driver.name())
            .field("session", &self.session)
            .field("missing", &self.missing)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{Echo, InputHandler, LoopbackDriver};
    use crate::port::PortInfo;
    use crossbeam_channel::unbounded;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    struct NoPrompt;

    impl PortPrompt for NoPrompt {
        fn choose(&mut self, direction: PortDirection, _ports: &[PortInfo]) -> Result<usize> {
            panic!("unexpected {} prompt", direction);
        }
    }

    fn forwarding_observer() -> (Observer, crossbeam_channel::Receiver<MidiMessage>) {
        let (tx, rx) = unbounded();
        let observer: Observer = Box::new(move |msg: &MidiMessage| {
            let _ = tx.send(msg.clone());
        });
        (observer, rx)
    }

    #[test]
    fn test_open_single_ports_without_prompt() {
        let interface = MidiInterface::open(LoopbackDriver::new(), None, &mut NoPrompt).unwrap();
        assert!(interface.is_connected());
        assert!(interface.ensure_connected().is_ok());
        let session = interface.session().unwrap();
        assert_eq!(session.input_port().name, "Loopback In");
        assert_eq!(session.output_port().name, "Loopback Out");
        assert_eq!(interface.driver_name(), "loopback");
    }

    #[test]
    fn test_observer_receives_echo() {
        let (observer, rx) = forwarding_observer();
        let mut interface =
            MidiInterface::open(LoopbackDriver::new(), Some(observer), &mut NoPrompt).unwrap();

        let msg = MidiMessage::note_on(0, 64, 80);
        interface.send(&msg).unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), msg);
    }

    #[test]
    fn test_observer_can_be_replaced() {
        let mut interface = MidiInterface::open(LoopbackDriver::new(), None, &mut NoPrompt).unwrap();
        let (observer, rx) = forwarding_observer();
        interface.set_observer(Some(observer));

        let msg = MidiMessage::from_bytes(&[0xF8]).unwrap();
        interface.send(&msg).unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), msg);

        interface.set_observer(None);
        interface.send(&msg).unwrap();
        // Observer detached, its sender dropped with it.
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn test_no_output_ports_leaves_interface_disconnected() {
        let driver = LoopbackDriver::builder()
            .output_ports(Vec::<String>::new())
            .build();
        let handle = driver.handle();
        let mut interface = MidiInterface::open(driver, None, &mut NoPrompt).unwrap();

        assert!(!interface.is_connected());
        assert!(matches!(
            interface.ensure_connected(),
            Err(Error::NoPortsAvailable(PortDirection::Output))
        ));
        let msg = MidiMessage::note_on(0, 60, 1);
        assert!(matches!(interface.send(&msg), Err(Error::NotConnected)));
        assert!(handle.sent().is_empty());
    }

    #[test]
    fn test_no_input_ports_reported_first() {
        let driver = LoopbackDriver::builder()
            .input_ports(Vec::<String>::new())
            .output_ports(Vec::<String>::new())
            .build();
        let interface = MidiInterface::open(driver, None, &mut NoPrompt).unwrap();
        assert!(matches!(
            interface.ensure_connected(),
            Err(Error::NoPortsAvailable(PortDirection::Input))
        ));
    }

    #[test]
    fn test_invalid_selection_aborts_open() {
        let driver = LoopbackDriver::builder()
            .input_ports(["A", "B"])
            .build();
        let mut prompt = crate::port::LinePrompt::new(Cursor::new(b"7\n".to_vec()), Vec::new());
        let result = MidiInterface::open(driver, None, &mut prompt);
        assert!(matches!(result, Err(Error::InvalidSelection { .. })));
    }

    #[test]
    fn test_shared_port_layout() {
        let driver = LoopbackDriver::builder()
            .shared_ports(["Loop A", "Loop B"])
            .build();
        let mut prompt = crate::port::LinePrompt::new(Cursor::new(b"1\n".to_vec()), Vec::new());
        let (observer, rx) = forwarding_observer();
        let mut interface = MidiInterface::open(driver, Some(observer), &mut prompt).unwrap();

        let session = interface.session().unwrap();
        assert_eq!(session.input_port().name, "Loop B");
        assert_eq!(session.output_port().index, 1);

        let msg = MidiMessage::control_change(3, 7, 100);
        interface.send(&msg).unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), msg);
    }

    #[test]
    fn test_empty_packets_are_not_forwarded() {
        let driver = LoopbackDriver::builder()
            .echo(Echo::transform(|_| Some(Vec::new())))
            .build();
        let (observer, rx) = forwarding_observer();
        let mut interface = MidiInterface::open(driver, Some(observer), &mut NoPrompt).unwrap();
        interface.send(&MidiMessage::note_on(0, 1, 1)).unwrap();
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn test_disconnect_releases_session_and_observer() {
        let driver = LoopbackDriver::new();
        let handle = driver.handle();
        let (observer, rx) = forwarding_observer();
        let mut interface = MidiInterface::open(driver, Some(observer), &mut NoPrompt).unwrap();

        interface.disconnect();
        assert!(!interface.is_connected());
        assert!(matches!(
            interface.send(&MidiMessage::note_on(0, 60, 100)),
            Err(Error::NotConnected)
        ));
        // Delivery thread is gone, the observer with it.
        assert!(handle.inject(&[0xF8]).is_err());
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    /// One port each way; the input refuses to open.
    struct InputFailsDriver {
        output_released: Arc<AtomicBool>,
    }

    struct TrackedOutput {
        released: Arc<AtomicBool>,
    }

    impl OutputConnection for TrackedOutput {
        fn send(&mut self, _bytes: &[u8]) -> Result<()> {
            Ok(())
        }

        fn close(self: Box<Self>) {}
    }

    impl Drop for TrackedOutput {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    impl MidiDriver for InputFailsDriver {
        fn name(&self) -> &str {
            "input-fails"
        }

        fn port_names(&self, _direction: PortDirection) -> Result<Vec<String>> {
            Ok(vec!["Port A".to_string()])
        }

        fn open_input(
            &self,
            port: &PortInfo,
            _handler: InputHandler,
        ) -> Result<Box<dyn InputConnection>> {
            Err(Error::MidiPort(format!("{} is busy", port.name)))
        }

        fn open_output(&self, _port: &PortInfo) -> Result<Box<dyn OutputConnection>> {
            Ok(Box::new(TrackedOutput {
                released: Arc::clone(&self.output_released),
            }))
        }
    }

    #[test]
    fn test_failed_input_open_releases_output() {
        let output_released = Arc::new(AtomicBool::new(false));
        let driver = InputFailsDriver {
            output_released: Arc::clone(&output_released),
        };

        let result = MidiInterface::open(driver, None, &mut NoPrompt);
        assert!(matches!(result, Err(Error::MidiPort(_))));
        assert!(output_released.load(Ordering::SeqCst));
    }
}

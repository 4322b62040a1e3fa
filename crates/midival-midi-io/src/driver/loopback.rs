//! In-memory loopback driver.
//!
//! Everything sent to an output port is handed back to the open input port on
//! a dedicated delivery thread, optionally delayed or rewritten. Stands in for
//! a device under test that retransmits whatever it receives.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use tracing::debug;

use super::{InputConnection, InputHandler, MidiDriver, OutputConnection};
use crate::error::{Error, Result};
use crate::port::{PortDirection, PortInfo, PortLayout};

type EchoFn = dyn Fn(&[u8]) -> Option<Vec<u8>> + Send + Sync;

/// What the far end sends back for each message it receives.
#[derive(Clone)]
pub enum Echo {
    /// Retransmit the bytes unchanged.
    Exact,
    /// Never answer.
    Silent,
    /// Answer with the returned bytes, or stay silent on `None`.
    Transform(Arc<EchoFn>),
}

impl Echo {
    pub fn transform<F>(f: F) -> Self
    where
        F: Fn(&[u8]) -> Option<Vec<u8>> + Send + Sync + 'static,
    {
        Echo::Transform(Arc::new(f))
    }

    fn apply(&self, bytes: &[u8]) -> Option<Vec<u8>> {
        match self {
            Echo::Exact => Some(bytes.to_vec()),
            Echo::Silent => None,
            Echo::Transform(f) => f(bytes),
        }
    }
}

impl fmt::Debug for Echo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Echo::Exact => f.write_str("Exact"),
            Echo::Silent => f.write_str("Silent"),
            Echo::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

enum LoopbackCommand {
    Deliver(Vec<u8>),
    Shutdown,
}

pub struct LoopbackDriverBuilder {
    inputs: Vec<String>,
    outputs: Vec<String>,
    layout: PortLayout,
    echo: Echo,
    latency: Duration,
}

impl Default for LoopbackDriverBuilder {
    fn default() -> Self {
        Self {
            inputs: vec!["Loopback In".to_string()],
            outputs: vec!["Loopback Out".to_string()],
            layout: PortLayout::Directional,
            echo: Echo::Exact,
            latency: Duration::ZERO,
        }
    }
}

impl LoopbackDriverBuilder {
    pub fn input_ports<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn output_ports<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = names.into_iter().map(Into::into).collect();
        self
    }

    /// One list of bidirectional ports.
    pub fn shared_ports<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = names.into_iter().map(Into::into).collect();
        self.outputs = self.inputs.clone();
        self.layout = PortLayout::Shared;
        self
    }

    pub fn echo(mut self, echo: Echo) -> Self {
        self.echo = echo;
        self
    }

    /// Delay applied before each delivery.
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn build(self) -> LoopbackDriver {
        let (command_sender, command_receiver) = bounded(1024);
        LoopbackDriver {
            inputs: self.inputs,
            outputs: self.outputs,
            layout: self.layout,
            echo: self.echo,
            latency: self.latency,
            command_sender,
            command_receiver: Mutex::new(Some(command_receiver)),
            sent: Arc::new(Mutex::new(Vec::new())),
            started: Instant::now(),
        }
    }
}

pub struct LoopbackDriver {
    inputs: Vec<String>,
    outputs: Vec<String>,
    layout: PortLayout,
    echo: Echo,
    latency: Duration,
    command_sender: Sender<LoopbackCommand>,
    /// Taken by the first `open_input`.
    command_receiver: Mutex<Option<Receiver<LoopbackCommand>>>,
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    started: Instant,
}

impl LoopbackDriver {
    pub fn builder() -> LoopbackDriverBuilder {
        LoopbackDriverBuilder::default()
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Handle for observing traffic and injecting unsolicited input.
    pub fn handle(&self) -> LoopbackHandle {
        LoopbackHandle {
            command_sender: self.command_sender.clone(),
            sent: Arc::clone(&self.sent),
        }
    }

    fn check_index(&self, port: &PortInfo) -> Result<()> {
        let names = self.names(port.direction);
        if port.index < names.len() {
            Ok(())
        } else {
            Err(Error::MidiPort(format!(
                "Loopback {} port {} not found",
                port.direction, port.index
            )))
        }
    }

    fn names(&self, direction: PortDirection) -> &[String] {
        match (self.layout, direction) {
            (PortLayout::Shared, _) | (_, PortDirection::Input) => &self.inputs,
            (PortLayout::Directional, PortDirection::Output) => &self.outputs,
        }
    }

    fn delivery_thread(
        command_receiver: Receiver<LoopbackCommand>,
        mut handler: InputHandler,
        latency: Duration,
        started: Instant,
    ) {
        loop {
            match command_receiver.recv() {
                Ok(LoopbackCommand::Deliver(bytes)) => {
                    if !latency.is_zero() {
                        thread::sleep(latency);
                    }
                    let timestamp = started.elapsed().as_micros() as u64;
                    handler(timestamp, &bytes);
                }
                Ok(LoopbackCommand::Shutdown) | Err(_) => break,
            }
        }
        debug!("Loopback delivery thread stopped");
    }
}

impl Default for LoopbackDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MidiDriver for LoopbackDriver {
    fn name(&self) -> &str {
        "loopback"
    }

    fn layout(&self) -> PortLayout {
        self.layout
    }

    fn port_names(&self, direction: PortDirection) -> Result<Vec<String>> {
        Ok(self.names(direction).to_vec())
    }

    fn open_input(
        &self,
        port: &PortInfo,
        handler: InputHandler,
    ) -> Result<Box<dyn InputConnection>> {
        self.check_index(port)?;
        let command_receiver = self
            .command_receiver
            .lock()
            .take()
            .ok_or_else(|| Error::MidiPort("Loopback input is already open".to_string()))?;

        let latency = self.latency;
        let started = self.started;
        let thread = thread::Builder::new()
            .name("midival-loopback".to_string())
            .spawn(move || Self::delivery_thread(command_receiver, handler, latency, started))?;

        Ok(Box::new(LoopbackInput {
            command_sender: self.command_sender.clone(),
            thread: Some(thread),
        }))
    }

    fn open_output(&self, port: &PortInfo) -> Result<Box<dyn OutputConnection>> {
        self.check_index(port)?;
        Ok(Box::new(LoopbackOutput {
            command_sender: self.command_sender.clone(),
            echo: self.echo.clone(),
            sent: Arc::clone(&self.sent),
        }))
    }
}

struct LoopbackInput {
    command_sender: Sender<LoopbackCommand>,
    thread: Option<JoinHandle<()>>,
}

impl InputConnection for LoopbackInput {
    fn close(self: Box<Self>) {}
}

impl Drop for LoopbackInput {
    fn drop(&mut self) {
        let _ = self.command_sender.send(LoopbackCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

struct LoopbackOutput {
    command_sender: Sender<LoopbackCommand>,
    echo: Echo,
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl OutputConnection for LoopbackOutput {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.sent.lock().push(bytes.to_vec());
        match self.echo.apply(bytes) {
            Some(reply) => self
                .command_sender
                .try_send(LoopbackCommand::Deliver(reply))
                .map_err(|e| match e {
                    TrySendError::Full(_) => Error::MidiSend("Loopback queue full".to_string()),
                    TrySendError::Disconnected(_) => {
                        Error::MidiSend("Loopback delivery stopped".to_string())
                    }
                }),
            None => Ok(()),
        }
    }

    fn close(self: Box<Self>) {}
}

/// Observes and feeds a [`LoopbackDriver`] from outside the interface.
#[derive(Clone)]
pub struct LoopbackHandle {
    command_sender: Sender<LoopbackCommand>,
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl LoopbackHandle {
    /// Deliver bytes to the input as if the device had sent them unprompted.
    pub fn inject(&self, bytes: &[u8]) -> Result<()> {
        self.command_sender
            .send(LoopbackCommand::Deliver(bytes.to_vec()))
            .map_err(|_| Error::MidiSend("Loopback delivery stopped".to_string()))
    }

    /// Everything written to output ports so far.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().clone()
    }
}

//! Hardware driver backed by midir.

use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use tracing::{debug, warn};

use super::{InputConnection, InputHandler, MidiDriver, OutputConnection};
use crate::error::{Error, Result};
use crate::port::{PortDirection, PortInfo};

/// Opens system MIDI ports (ALSA, CoreMIDI, WinMM) through midir.
///
/// Every call creates a fresh midir client, so enumeration and opening are
/// two separate driver queries. Port indices are re-resolved at open time and
/// a renamed port is reported but still opened.
#[derive(Debug, Clone)]
pub struct MidirDriver {
    client_name: String,
}

impl MidirDriver {
    pub fn new() -> Self {
        Self::with_client_name("midival")
    }

    pub fn with_client_name(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
        }
    }

    fn client(&self, suffix: &str) -> String {
        format!("{}-{}", self.client_name, suffix)
    }

    fn check_name(port: &PortInfo, actual: Option<String>) {
        match actual {
            Some(actual) if actual != port.name => warn!(
                "MIDI {} port {} is now named {:?}, device list changed since enumeration",
                port.direction, port, actual
            ),
            _ => {}
        }
    }
}

impl Default for MidirDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MidiDriver for MidirDriver {
    fn name(&self) -> &str {
        "midir"
    }

    fn port_names(&self, direction: PortDirection) -> Result<Vec<String>> {
        let names = match direction {
            PortDirection::Input => {
                let midi_in = MidiInput::new(&self.client("enumerate-in"))?;
                midi_in
                    .ports()
                    .iter()
                    .enumerate()
                    .map(|(index, port)| {
                        midi_in
                            .port_name(port)
                            .unwrap_or_else(|_| format!("Unknown Device {}", index))
                    })
                    .collect::<Vec<_>>()
            }
            PortDirection::Output => {
                let midi_out = MidiOutput::new(&self.client("enumerate-out"))?;
                midi_out
                    .ports()
                    .iter()
                    .enumerate()
                    .map(|(index, port)| {
                        midi_out
                            .port_name(port)
                            .unwrap_or_else(|_| format!("Unknown Device {}", index))
                    })
                    .collect::<Vec<_>>()
            }
        };
        debug!("midir reports {} {} port(s)", names.len(), direction);
        Ok(names)
    }

    fn open_input(
        &self,
        port: &PortInfo,
        mut handler: InputHandler,
    ) -> Result<Box<dyn InputConnection>> {
        let mut midi_in = MidiInput::new(&self.client("input"))?;
        // SysEx, timing and active sensing must come back too.
        midi_in.ignore(Ignore::None);

        let ports = midi_in.ports();
        let midir_port = ports.get(port.index).ok_or_else(|| {
            Error::MidiPort(format!("MIDI input port {} not found", port.index))
        })?;
        Self::check_name(port, midi_in.port_name(midir_port).ok());

        let connection = midi_in.connect(
            midir_port,
            "midival-input",
            move |timestamp, message, _| handler(timestamp, message),
            (),
        )?;
        Ok(Box::new(MidirInput { connection }))
    }

    fn open_output(&self, port: &PortInfo) -> Result<Box<dyn OutputConnection>> {
        let midi_out = MidiOutput::new(&self.client("output"))?;

        let ports = midi_out.ports();
        let midir_port = ports.get(port.index).ok_or_else(|| {
            Error::MidiPort(format!("MIDI output port {} not found", port.index))
        })?;
        Self::check_name(port, midi_out.port_name(midir_port).ok());

        let connection = midi_out.connect(midir_port, "midival-output")?;
        Ok(Box::new(MidirOutput { connection }))
    }
}

struct MidirInput {
    connection: MidiInputConnection<()>,
}

impl InputConnection for MidirInput {
    fn close(self: Box<Self>) {
        let _ = self.connection.close();
    }
}

struct MidirOutput {
    connection: MidiOutputConnection,
}

impl OutputConnection for MidirOutput {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.connection.send(bytes)?;
        Ok(())
    }

    fn close(self: Box<Self>) {
        let _ = self.connection.close();
    }
}

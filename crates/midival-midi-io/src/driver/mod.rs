//! MIDI driver abstraction.
//!
//! The interface only needs four capabilities from a driver: list port names
//! per direction, open an output by index, open an input by index with a
//! receive callback, and report whether inputs and outputs share one port
//! list. Closing happens when a connection is closed or dropped.

mod loopback;
#[cfg(feature = "midi-io")]
mod midir_backend;

pub use loopback::{Echo, LoopbackDriver, LoopbackDriverBuilder, LoopbackHandle};
#[cfg(feature = "midi-io")]
pub use midir_backend::MidirDriver;

use crate::error::Result;
use crate::port::{AvailablePorts, PortDirection, PortInfo, PortLayout};

/// Receive callback installed on an input connection.
///
/// Called on the driver's delivery thread with a timestamp in microseconds
/// and the raw message bytes. Must return promptly.
pub type InputHandler = Box<dyn FnMut(u64, &[u8]) + Send + 'static>;

pub trait InputConnection {
    fn close(self: Box<Self>);
}

pub trait OutputConnection {
    fn send(&mut self, bytes: &[u8]) -> Result<()>;

    fn close(self: Box<Self>);
}

pub trait MidiDriver {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn layout(&self) -> PortLayout {
        PortLayout::Directional
    }

    /// Port names in enumeration order; the position is the port handle.
    fn port_names(&self, direction: PortDirection) -> Result<Vec<String>>;

    fn open_input(&self, port: &PortInfo, handler: InputHandler)
        -> Result<Box<dyn InputConnection>>;

    fn open_output(&self, port: &PortInfo) -> Result<Box<dyn OutputConnection>>;

    /// Enumerate both directions.
    fn available_ports(&self) -> Result<AvailablePorts> {
        let inputs = self.port_names(PortDirection::Input)?;
        let outputs = match self.layout() {
            PortLayout::Directional => self.port_names(PortDirection::Output)?,
            PortLayout::Shared => inputs.clone(),
        };
        Ok(AvailablePorts::from_names(inputs, outputs))
    }
}

impl<D: MidiDriver + ?Sized> MidiDriver for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn layout(&self) -> PortLayout {
        (**self).layout()
    }

    fn port_names(&self, direction: PortDirection) -> Result<Vec<String>> {
        (**self).port_names(direction)
    }

    fn open_input(
        &self,
        port: &PortInfo,
        handler: InputHandler,
    ) -> Result<Box<dyn InputConnection>> {
        (**self).open_input(port, handler)
    }

    fn open_output(&self, port: &PortInfo) -> Result<Box<dyn OutputConnection>> {
        (**self).open_output(port)
    }
}

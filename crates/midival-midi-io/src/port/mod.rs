//! Hardware port model and port selection.
//!
//! Ports are identified by the ordinal index the driver reported at
//! enumeration time. They are re-enumerated for every session; the driver does
//! not guarantee that an index still names the same device on the next call.

mod info;
mod select;

pub use info::{AvailablePorts, PortDirection, PortInfo, PortLayout};
pub use select::{choose_port, choose_ports, LinePrompt, PortPrompt, PortSelection};

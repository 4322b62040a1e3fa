//! Raw MIDI messages.

use std::fmt;

use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::status::{classify_channel, classify_type, is_system_status, MidiType};

/// An ordered sequence of raw MIDI bytes, status byte first.
///
/// Channel and system common messages fit inline (1-3 bytes). Longer
/// sequences such as SysEx spill to the heap so echoes can still be compared
/// byte for byte.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MidiMessage {
    bytes: SmallVec<[u8; 3]>,
}

impl MidiMessage {
    /// Wrap raw bytes. Fails only for an empty slice; the status byte is not
    /// validated, so malformed messages such as `[2]` are accepted as-is.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::EmptyMessage);
        }
        Ok(Self {
            bytes: SmallVec::from_slice(bytes),
        })
    }

    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::channel_voice(0x90, channel, &[note, velocity])
    }

    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Self {
        Self::channel_voice(0x80, channel, &[note, velocity])
    }

    pub fn control_change(channel: u8, cc_number: u8, value: u8) -> Self {
        Self::channel_voice(0xB0, channel, &[cc_number, value])
    }

    pub fn program_change(channel: u8, program: u8) -> Self {
        Self::channel_voice(0xC0, channel, &[program])
    }

    pub fn after_touch_channel(channel: u8, pressure: u8) -> Self {
        Self::channel_voice(0xD0, channel, &[pressure])
    }

    /// `value`: signed 14-bit (-8192 to 8191).
    pub fn pitch_bend(channel: u8, value: i16) -> Self {
        let unsigned = (value as i32 + 8192).clamp(0, 16383) as u16;
        let lsb = (unsigned & 0x7F) as u8;
        let msb = ((unsigned >> 7) & 0x7F) as u8;
        Self::channel_voice(0xE0, channel, &[lsb, msb])
    }

    fn channel_voice(kind: u8, channel: u8, data: &[u8]) -> Self {
        let mut bytes = SmallVec::new();
        bytes.push(kind | channel.min(15));
        bytes.extend(data.iter().map(|b| b & 0x7F));
        Self { bytes }
    }

    #[inline]
    pub fn status(&self) -> u8 {
        self.bytes[0]
    }

    /// Classified type value of the status byte, see [`classify_type`].
    #[inline]
    pub fn message_type(&self) -> u8 {
        classify_type(self.status())
    }

    /// Named type, if the classified value is a known one.
    #[inline]
    pub fn kind(&self) -> Option<MidiType> {
        MidiType::from_type(self.message_type())
    }

    /// Channel of a channel message, `None` for system messages.
    #[inline]
    pub fn channel(&self) -> Option<u8> {
        if self.is_system_message() {
            None
        } else {
            Some(classify_channel(self.status()))
        }
    }

    #[inline]
    pub fn is_system_message(&self) -> bool {
        is_system_status(self.status())
    }

    #[inline]
    pub fn is_channel_message(&self) -> bool {
        !self.is_system_message()
    }

    /// Bytes following the status byte.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.bytes[1..]
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; kept for the `len`/`is_empty` pair.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }
}

impl AsRef<[u8]> for MidiMessage {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl TryFrom<&[u8]> for MidiMessage {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes(bytes)
    }
}

impl TryFrom<Vec<u8>> for MidiMessage {
    type Error = Error;

    fn try_from(bytes: Vec<u8>) -> Result<Self> {
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.bytes.iter()).finish()
    }
}

impl fmt::Debug for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MidiMessage(")?;
        for (i, byte) in self.bytes.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        write!(f, ")")
    }
}

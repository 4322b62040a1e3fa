//! Status byte classification.

use std::fmt;

/// Message type of a status byte.
///
/// System messages (`>= 0xF0`) describe themselves fully and are returned
/// unchanged. Channel messages have the channel nibble masked off.
#[inline]
pub const fn classify_type(status: u8) -> u8 {
    if status >= 0xF0 {
        status
    } else {
        status & 0xF0
    }
}

/// Channel nibble of a status byte.
///
/// Total over the byte domain. The value is meaningless for system messages;
/// callers check [`is_system_status`] first when it matters.
#[inline]
pub const fn classify_channel(status: u8) -> u8 {
    status & 0x0F
}

#[inline]
pub const fn is_system_status(status: u8) -> bool {
    status >= 0xF0
}

/// Known MIDI message types, keyed by their classified type value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MidiType {
    /// Used to flag errors; never sent on the wire.
    InvalidType = 0x00,
    NoteOff = 0x80,
    NoteOn = 0x90,
    AfterTouchPoly = 0xA0,
    ControlChange = 0xB0,
    ProgramChange = 0xC0,
    AfterTouchChannel = 0xD0,
    PitchBend = 0xE0,
    SystemExclusive = 0xF0,
    TimeCodeQuarterFrame = 0xF1,
    SongPosition = 0xF2,
    SongSelect = 0xF3,
    TuneRequest = 0xF6,
    Clock = 0xF8,
    Start = 0xFA,
    Continue = 0xFB,
    Stop = 0xFC,
    ActiveSensing = 0xFE,
    SystemReset = 0xFF,
}

impl MidiType {
    /// Look up a classified type value (the output of [`classify_type`]).
    ///
    /// Returns `None` for values outside the table: data-range values such as
    /// `0x02` and undefined system statuses such as `0xF4`.
    pub const fn from_type(value: u8) -> Option<Self> {
        let kind = match value {
            0x00 => Self::InvalidType,
            0x80 => Self::NoteOff,
            0x90 => Self::NoteOn,
            0xA0 => Self::AfterTouchPoly,
            0xB0 => Self::ControlChange,
            0xC0 => Self::ProgramChange,
            0xD0 => Self::AfterTouchChannel,
            0xE0 => Self::PitchBend,
            0xF0 => Self::SystemExclusive,
            0xF1 => Self::TimeCodeQuarterFrame,
            0xF2 => Self::SongPosition,
            0xF3 => Self::SongSelect,
            0xF6 => Self::TuneRequest,
            0xF8 => Self::Clock,
            0xFA => Self::Start,
            0xFB => Self::Continue,
            0xFC => Self::Stop,
            0xFE => Self::ActiveSensing,
            0xFF => Self::SystemReset,
            _ => return None,
        };
        Some(kind)
    }

    /// Classify a status byte and look up its type.
    #[inline]
    pub const fn from_status(status: u8) -> Option<Self> {
        Self::from_type(classify_type(status))
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn is_channel_message(self) -> bool {
        matches!(
            self,
            Self::NoteOff
                | Self::NoteOn
                | Self::AfterTouchPoly
                | Self::ControlChange
                | Self::ProgramChange
                | Self::AfterTouchChannel
                | Self::PitchBend
        )
    }

    /// Number of bytes a complete message of this type occupies, status
    /// included. `None` for SysEx (variable length) and `InvalidType`.
    pub const fn expected_len(self) -> Option<usize> {
        match self {
            Self::NoteOff
            | Self::NoteOn
            | Self::AfterTouchPoly
            | Self::ControlChange
            | Self::PitchBend
            | Self::SongPosition => Some(3),
            Self::ProgramChange
            | Self::AfterTouchChannel
            | Self::TimeCodeQuarterFrame
            | Self::SongSelect => Some(2),
            Self::TuneRequest
            | Self::Clock
            | Self::Start
            | Self::Continue
            | Self::Stop
            | Self::ActiveSensing
            | Self::SystemReset => Some(1),
            Self::SystemExclusive | Self::InvalidType => None,
        }
    }
}

impl From<MidiType> for u8 {
    fn from(kind: MidiType) -> Self {
        kind.as_u8()
    }
}

impl fmt::Display for MidiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_statuses_are_self_describing() {
        for status in 0xF0..=0xFFu8 {
            assert_eq!(classify_type(status), status);
            assert!(is_system_status(status));
        }
    }

    #[test]
    fn test_channel_statuses_mask_channel() {
        for status in 0x00..0xF0u8 {
            assert_eq!(classify_type(status), status & 0xF0);
            assert_eq!(classify_channel(status), status & 0x0F);
            assert!(!is_system_status(status));
        }
    }

    #[test]
    fn test_pitch_bend_system_boundary() {
        assert_eq!(classify_type(0xEF), 0xE0);
        assert_eq!(classify_type(0xF0), 0xF0);
        assert_eq!(MidiType::from_status(0xEF), Some(MidiType::PitchBend));
        assert_eq!(
            MidiType::from_status(0xF0),
            Some(MidiType::SystemExclusive)
        );
    }

    #[test]
    fn test_channel_is_total_for_system_statuses() {
        // No range check: system statuses still yield their low nibble.
        assert_eq!(classify_channel(0xF8), 0x08);
        assert_eq!(classify_channel(0xFF), 0x0F);
    }

    #[test]
    fn test_type_table_roundtrips_through_value() {
        let all = [
            MidiType::InvalidType,
            MidiType::NoteOff,
            MidiType::NoteOn,
            MidiType::AfterTouchPoly,
            MidiType::ControlChange,
            MidiType::ProgramChange,
            MidiType::AfterTouchChannel,
            MidiType::PitchBend,
            MidiType::SystemExclusive,
            MidiType::TimeCodeQuarterFrame,
            MidiType::SongPosition,
            MidiType::SongSelect,
            MidiType::TuneRequest,
            MidiType::Clock,
            MidiType::Start,
            MidiType::Continue,
            MidiType::Stop,
            MidiType::ActiveSensing,
            MidiType::SystemReset,
        ];
        for kind in all {
            assert_eq!(MidiType::from_type(kind.as_u8()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_types() {
        assert_eq!(MidiType::from_type(0x02), None);
        assert_eq!(MidiType::from_type(0x40), None);
        assert_eq!(MidiType::from_type(0xF4), None);
        assert_eq!(MidiType::from_type(0xFD), None);
        // Data bytes below 0x10 classify to 0x00
        assert_eq!(MidiType::from_status(0x02), Some(MidiType::InvalidType));
        assert_eq!(MidiType::from_status(0x41), None);
    }

    #[test]
    fn test_expected_len() {
        assert_eq!(MidiType::NoteOn.expected_len(), Some(3));
        assert_eq!(MidiType::AfterTouchChannel.expected_len(), Some(2));
        assert_eq!(MidiType::Clock.expected_len(), Some(1));
        assert_eq!(MidiType::SystemExclusive.expected_len(), None);
        assert!(MidiType::PitchBend.is_channel_message());
        assert!(!MidiType::SongSelect.is_channel_message());
    }
}

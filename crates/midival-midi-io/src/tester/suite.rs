use midival_midi::{MidiMessage, MidiType};

/// Checks run by the runtime validator, in order.
///
/// Covers a regular Note On, a two-byte channel message, bare data bytes with
/// no valid status, Note On with velocity 0, and two-byte data-only pairs. A
/// pure retransmitter must echo all of them byte for byte, whatever their
/// classification.
pub fn default_thru_suite() -> Vec<MidiMessage> {
    let note_on = MidiType::NoteOn.as_u8();
    let after_touch = MidiType::AfterTouchChannel.as_u8();
    let raw: [&[u8]; 9] = [
        &[note_on, 64, 80],
        &[after_touch, 1],
        &[2],
        &[3],
        &[note_on, 64, 0],
        &[65, 127],
        &[65, 0],
        &[66, 127],
        &[66, 0],
    ];
    raw.iter()
        .filter_map(|bytes| MidiMessage::from_bytes(bytes).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_suite() {
        let suite = default_thru_suite();
        assert_eq!(suite.len(), 9);
        assert_eq!(suite[0].as_bytes(), &[0x90, 64, 80]);
        assert_eq!(suite[1].as_bytes(), &[0xD0, 1]);
        assert_eq!(suite[2].as_bytes(), &[2]);
        assert_eq!(suite[4].as_bytes(), &[0x90, 64, 0]);
        assert_eq!(suite[8].as_bytes(), &[66, 0]);
    }
}

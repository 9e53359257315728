#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    /// Decode one channel-voice message from raw bytes.
    ///
    /// Returns `None` for system messages, running status and truncated or
    /// malformed input (data bytes with the high bit set).
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        if status < 0x80 || data.iter().any(|b| *b > 0x7f) {
            return None;
        }

        let channel = status & 0x0f;
        let event = match (status & 0xf0, data) {
            (0x80, [key, velocity, ..]) => MidiEvent::NoteOff {
                channel,
                key: *key,
                velocity: *velocity,
            },
            (0x90, [key, velocity, ..]) => MidiEvent::NoteOn {
                channel,
                key: *key,
                velocity: *velocity,
            },
            (0xb0, [controller, value, ..]) => MidiEvent::ControlChange {
                channel,
                controller: *controller,
                value: *value,
            },
            (0xc0, [program, ..]) => MidiEvent::ProgramChange {
                channel,
                program: *program,
            },
            (0xe0, [lsb, msb, ..]) => MidiEvent::PitchBend {
                channel,
                value: (((*msb as i16) << 7) | *lsb as i16) - 8192,
            },
            _ => return None,
        };
        Some(event)
    }
}

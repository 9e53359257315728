use crate::{io::midi::MidiEvent, synth::message::SynthMessage};

/// Translate a MIDI event on `channel_filter` into a synth message.
///
/// A note-on with velocity 0 is a note-off, as the MIDI spec allows.
pub fn midi_to_synth(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity: 0,
        } if channel == channel_filter => Some(SynthMessage::NoteOff { note: key }),
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } if channel == channel_filter => Some(SynthMessage::NoteOn {
            note: key,
            velocity,
        }),
        MidiEvent::NoteOff { channel, key, .. } if channel == channel_filter => {
            Some(SynthMessage::NoteOff { note: key })
        }
        // CC 120 all sound off, CC 123 all notes off
        MidiEvent::ControlChange {
            channel,
            controller: 120,
            ..
        } if channel == channel_filter => Some(SynthMessage::AllSoundOff),
        MidiEvent::ControlChange {
            channel,
            controller: 123,
            ..
        } if channel == channel_filter => Some(SynthMessage::AllNotesOff),
        _ => None,
    }
}

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

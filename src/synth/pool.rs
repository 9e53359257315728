//! Fixed-size voice pool and note-to-voice dispatch.
//!
//! # Allocation policy
//!
//! `note_on` resolves a voice in three passes, in order:
//!
//! 1. **Retrigger** - the note is already mapped: restart that same voice
//!    from its current envelope level. One sounding note never occupies two
//!    voices.
//! 2. **Free** - the first voice in pool order whose envelope has finished
//!    (`is_active() == false`).
//! 3. **Steal** - every voice is busy. The voice whose latest note-on is the
//!    oldest is stopped and immediately restarted for the new note; its old
//!    note (if still held) is unmapped. Note-on order is tracked with a
//!    monotonically increasing serial, ties go to the lowest voice index.
//!    Stealing is expected degradation under load, not an error; it is
//!    reported through [`Allocation::Stolen`] and [`VoicePool::steal_count`].
//!
//! `note_off` unmaps the note immediately while the voice keeps sounding its
//! release tail. The voice becomes reusable once its envelope reaches Idle.
//!
//! All tables are sized at construction; nothing here allocates afterwards.

use crate::{
    config::{EnvelopeParam, EnvelopeParams},
    dsp::oscillator::Oscillator,
    error::{check_note, Result, SynthError},
    synth::{factory::VoiceFactory, voice::Voice},
};

const NOTE_COUNT: usize = 128;

/// How a note-on was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    /// The note was already sounding on this voice and was restarted.
    Retrigger(usize),
    /// A free voice was bound to the note.
    Fresh(usize),
    /// No voice was free; `voice` was taken over. `evicted` is the note that
    /// lost its mapping, if it was still held.
    Stolen { voice: usize, evicted: Option<u8> },
}

impl Allocation {
    pub fn voice(&self) -> usize {
        match *self {
            Allocation::Retrigger(voice) | Allocation::Fresh(voice) => voice,
            Allocation::Stolen { voice, .. } => voice,
        }
    }
}

pub struct VoicePool<O: Oscillator> {
    voices: Vec<Voice<O>>,
    /// note -> voice index
    notes: [Option<usize>; NOTE_COUNT],
    /// voice index -> note, the inverse of `notes`
    bound: Vec<Option<u8>>,
    /// voice index -> serial of its latest note-on
    started: Vec<u64>,
    serial: u64,
    steals: u64,
}

impl<O: Oscillator> VoicePool<O> {
    pub fn new<F>(voice_count: usize, sample_rate: f32, factory: &F) -> Result<Self>
    where
        F: VoiceFactory<Oscillator = O> + ?Sized,
    {
        if voice_count == 0 {
            return Err(SynthError::InvalidConfig("voice count must be at least 1"));
        }

        let voices = (0..voice_count)
            .map(|_| Voice::new(factory.create_oscillator(sample_rate), sample_rate))
            .collect();

        Ok(Self {
            voices,
            notes: [None; NOTE_COUNT],
            bound: vec![None; voice_count],
            started: vec![0; voice_count],
            serial: 0,
            steals: 0,
        })
    }

    /// Route a note-on to a voice and start it.
    pub fn note_on(&mut self, note: u8, frequency: f32, amplitude: f32) -> Result<Allocation> {
        check_note(note)?;

        let allocation = if let Some(idx) = self.notes[note as usize] {
            Allocation::Retrigger(idx)
        } else if let Some(idx) = self.voices.iter().position(|v| !v.is_active()) {
            Allocation::Fresh(idx)
        } else {
            let idx = self.oldest_voice();
            self.voices[idx].stop();
            self.steals += 1;
            Allocation::Stolen {
                voice: idx,
                evicted: self.bound[idx],
            }
        };

        let idx = allocation.voice();
        self.bind(idx, note);
        self.serial += 1;
        self.started[idx] = self.serial;
        self.voices[idx].start(frequency, amplitude);

        Ok(allocation)
    }

    /// Release a note. Returns the voice it was sounding on, or `None` for a
    /// stray note-off.
    pub fn note_off(&mut self, note: u8) -> Result<Option<usize>> {
        check_note(note)?;

        let Some(idx) = self.notes[note as usize].take() else {
            return Ok(None);
        };
        self.bound[idx] = None;
        self.voices[idx].stop();
        Ok(Some(idx))
    }

    /// Release every held note.
    pub fn all_notes_off(&mut self) {
        for idx in 0..self.voices.len() {
            if let Some(note) = self.bound[idx].take() {
                self.notes[note as usize] = None;
                self.voices[idx].stop();
            }
        }
    }

    /// Cut every voice dead, release tails included.
    pub fn all_sound_off(&mut self) {
        self.notes = [None; NOTE_COUNT];
        self.bound.fill(None);
        for voice in &mut self.voices {
            voice.kill();
        }
    }

    /// Sum every sounding voice into `out` (overwritten).
    pub fn render_block(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        for voice in &mut self.voices {
            if voice.is_active() {
                voice.render_add(out);
            }
        }

        for sample in out.iter_mut() {
            if !sample.is_finite() {
                *sample = 0.0;
            }
        }
    }

    /// Broadcast one envelope parameter to every voice, sounding ones included.
    pub fn set_envelope_param(&mut self, param: EnvelopeParam, value: f32) {
        for voice in &mut self.voices {
            voice.set_envelope_param(param, value);
        }
    }

    pub fn apply_envelope(&mut self, params: EnvelopeParams) {
        for voice in &mut self.voices {
            voice.set_envelope(params);
        }
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn voice(&self, idx: usize) -> Option<&Voice<O>> {
        self.voices.get(idx)
    }

    pub fn voices(&self) -> impl Iterator<Item = &Voice<O>> + '_ {
        self.voices.iter()
    }

    pub fn voice_for_note(&self, note: u8) -> Option<usize> {
        self.notes.get(note as usize).copied().flatten()
    }

    pub fn note_for_voice(&self, idx: usize) -> Option<u8> {
        self.bound.get(idx).copied().flatten()
    }

    /// Number of notes currently mapped to a voice. Never exceeds `voice_count`.
    pub fn mapped_notes(&self) -> usize {
        self.bound.iter().filter(|n| n.is_some()).count()
    }

    /// Voices still producing sound, release tails included.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Number of note-ons that had to steal a busy voice.
    pub fn steal_count(&self) -> u64 {
        self.steals
    }

    fn bind(&mut self, idx: usize, note: u8) {
        if let Some(previous) = self.bound[idx].take() {
            self.notes[previous as usize] = None;
        }
        self.notes[note as usize] = Some(idx);
        self.bound[idx] = Some(note);
    }

    fn oldest_voice(&self) -> usize {
        // min_by_key keeps the first minimum, i.e. the lowest index on ties
        self.started
            .iter()
            .enumerate()
            .min_by_key(|(_, serial)| **serial)
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }
}

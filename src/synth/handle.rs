//! Control-path handle for a [`PolySynth`] running on the audio thread.
//!
//! # Usage
//!
//! ```
//! use saavy_poly::{config::InstrumentConfig, dsp::Waveform, synth::handle::channel};
//!
//! let (mut handle, mut synth) = channel(InstrumentConfig::new(4), &Waveform::Triangle, 64).unwrap();
//!
//! // control thread
//! handle.note_on(60, 100).unwrap();
//! assert!(handle.note_on(60, 200).is_err());
//!
//! // audio thread
//! let mut block = [0.0f32; 128];
//! synth.render_block(&mut block);
//!
//! assert_eq!(handle.diagnostics().active_voices, 1);
//! ```

use std::sync::Arc;

use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    config::{validate_peak_scale, EnvelopeParam, InstrumentConfig},
    dsp::envelope::EnvelopeStage,
    error::{check_note, check_velocity, Result, SynthError},
    synth::{
        factory::VoiceFactory,
        instrument::Instrument,
        message::SynthMessage,
        monitor::{Diagnostics, VoiceMonitor},
        poly::PolySynth,
    },
};

/// Render side of a [`channel`].
pub type ChannelSynth<O> = PolySynth<O, Consumer<SynthMessage>>;

/// Build an instrument and split it into a control handle and a render-side
/// synth joined by a ring buffer of `capacity` messages.
pub fn channel<F>(
    config: InstrumentConfig,
    factory: &F,
    capacity: usize,
) -> Result<(SynthHandle, ChannelSynth<F::Oscillator>)>
where
    F: VoiceFactory + ?Sized,
{
    if capacity == 0 {
        return Err(SynthError::InvalidConfig("message queue capacity must be at least 1"));
    }

    let instrument = Instrument::new(config, factory)?;
    let (tx, rx) = RingBuffer::<SynthMessage>::new(capacity);
    let synth = PolySynth::new(instrument, rx);

    log::info!(
        "instrument ready: {} voices at {} Hz, queue capacity {}",
        config.voice_count,
        config.sample_rate,
        capacity
    );

    let handle = SynthHandle {
        tx,
        monitor: synth.monitor(),
        voice_count: config.voice_count,
        seen_steals: 0,
    };
    Ok((handle, synth))
}

/// Validates control events synchronously and forwards them to the audio
/// thread without blocking.
pub struct SynthHandle {
    tx: Producer<SynthMessage>,
    monitor: Arc<VoiceMonitor>,
    voice_count: usize,
    seen_steals: u64,
}

impl SynthHandle {
    pub fn note_on(&mut self, note: u8, velocity: u8) -> Result<()> {
        check_note(note).and_then(|_| check_velocity(velocity)).map_err(|err| {
            log::debug!("rejected note-on: {err}");
            err
        })?;
        self.send(SynthMessage::NoteOn { note, velocity })
    }

    pub fn note_off(&mut self, note: u8) -> Result<()> {
        check_note(note).map_err(|err| {
            log::debug!("rejected note-off: {err}");
            err
        })?;
        self.send(SynthMessage::NoteOff { note })
    }

    pub fn all_notes_off(&mut self) -> Result<()> {
        self.send(SynthMessage::AllNotesOff)
    }

    pub fn all_sound_off(&mut self) -> Result<()> {
        self.send(SynthMessage::AllSoundOff)
    }

    pub fn set_envelope_param(&mut self, param: EnvelopeParam, value: f32) -> Result<()> {
        let value = param.validate(value)?;
        self.send(SynthMessage::SetEnvelope { param, value })
    }

    pub fn set_attack_duration(&mut self, seconds: f32) -> Result<()> {
        self.set_envelope_param(EnvelopeParam::Attack, seconds)
    }

    pub fn set_decay_duration(&mut self, seconds: f32) -> Result<()> {
        self.set_envelope_param(EnvelopeParam::Decay, seconds)
    }

    pub fn set_sustain_level(&mut self, level: f32) -> Result<()> {
        self.set_envelope_param(EnvelopeParam::Sustain, level)
    }

    pub fn set_release_duration(&mut self, seconds: f32) -> Result<()> {
        self.set_envelope_param(EnvelopeParam::Release, seconds)
    }

    pub fn set_peak_scale(&mut self, peak_scale: f32) -> Result<()> {
        let value = validate_peak_scale(peak_scale)?;
        self.send(SynthMessage::SetPeakScale { value })
    }

    pub fn voice_count(&self) -> usize {
        self.voice_count
    }

    /// Whether `voice` was still sounding at the end of the last rendered block.
    pub fn is_voice_active(&self, voice: usize) -> bool {
        self.monitor.is_voice_active(voice)
    }

    pub fn voice_stage(&self, voice: usize) -> Option<EnvelopeStage> {
        self.monitor.stage(voice)
    }

    /// Latest readback from the render thread. Logs a warning when voices
    /// were stolen since the previous call.
    pub fn diagnostics(&mut self) -> Diagnostics {
        let snapshot = self.monitor.snapshot();
        if snapshot.steals > self.seen_steals {
            log::warn!(
                "voice starvation: {} note(s) stole a busy voice ({} voices)",
                snapshot.steals - self.seen_steals,
                self.voice_count
            );
            self.seen_steals = snapshot.steals;
        }
        snapshot
    }

    fn send(&mut self, msg: SynthMessage) -> Result<()> {
        self.tx.push(msg).map_err(|_| {
            log::warn!("control queue full, dropping {msg:?}");
            SynthError::QueueFull
        })
    }
}

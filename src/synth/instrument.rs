use crate::{
    config::{validate_peak_scale, EnvelopeParam, EnvelopeParams, InstrumentConfig},
    dsp::oscillator::{BasicOscillator, Oscillator, Waveform},
    error::{check_note, check_velocity, Result},
    io::converter::midi_note_to_freq,
    synth::{
        factory::VoiceFactory,
        message::SynthMessage,
        pool::{Allocation, VoicePool},
    },
};

/// A playable polyphonic instrument: MIDI-style note events in, summed voice
/// audio out.
///
/// The instrument owns the voice pool and the shared envelope shape. Every
/// envelope setter is broadcast to all voices at once, sounding ones included.
///
/// ```
/// use saavy_poly::{config::InstrumentConfig, synth::instrument::Instrument};
///
/// let mut synth = Instrument::triangle(InstrumentConfig::new(4)).unwrap();
/// synth.note_on(60, 100).unwrap();
///
/// let mut block = [0.0f32; 256];
/// synth.render_block(&mut block);
/// synth.note_off(60).unwrap();
/// ```
pub struct Instrument<O: Oscillator> {
    pool: VoicePool<O>,
    envelope: EnvelopeParams,
    peak_scale: f32,
    sample_rate: f32,
}

impl Instrument<BasicOscillator> {
    /// Build an instrument on the configured stock waveform.
    pub fn from_config(config: InstrumentConfig) -> Result<Self> {
        Self::new(config, &config.waveform)
    }

    /// A triangle-wave instrument, whatever waveform `config` names.
    pub fn triangle(config: InstrumentConfig) -> Result<Self> {
        Self::new(config, &Waveform::Triangle)
    }
}

impl<O: Oscillator> Instrument<O> {
    pub fn new<F>(config: InstrumentConfig, factory: &F) -> Result<Self>
    where
        F: VoiceFactory<Oscillator = O> + ?Sized,
    {
        config.validate()?;

        let mut pool = VoicePool::new(config.voice_count, config.sample_rate, factory)?;
        pool.apply_envelope(config.envelope);

        Ok(Self {
            pool,
            envelope: config.envelope,
            peak_scale: config.peak_scale,
            sample_rate: config.sample_rate,
        })
    }

    /// Start (or retrigger) `note`. Velocity 0 is a valid, silent note-on;
    /// the MIDI "velocity 0 means note-off" rule belongs to
    /// [`midi_to_synth`](crate::io::converter::midi_to_synth).
    pub fn note_on(&mut self, note: u8, velocity: u8) -> Result<Allocation> {
        check_note(note)?;
        check_velocity(velocity)?;

        let frequency = midi_note_to_freq(note);
        let amplitude = self.velocity_to_amplitude(velocity);
        self.pool.note_on(note, frequency, amplitude)
    }

    /// Release `note`. Returns the voice that was released, `None` if the note
    /// was not sounding.
    pub fn note_off(&mut self, note: u8) -> Result<Option<usize>> {
        self.pool.note_off(note)
    }

    pub fn all_notes_off(&mut self) {
        self.pool.all_notes_off();
    }

    pub fn all_sound_off(&mut self) {
        self.pool.all_sound_off();
    }

    /// Apply one control message.
    pub fn handle_message(&mut self, msg: SynthMessage) -> Result<()> {
        match msg {
            SynthMessage::NoteOn { note, velocity } => self.note_on(note, velocity).map(|_| ()),
            SynthMessage::NoteOff { note } => self.note_off(note).map(|_| ()),
            SynthMessage::SetEnvelope { param, value } => self.set_envelope_param(param, value),
            SynthMessage::SetPeakScale { value } => self.set_peak_scale(value),
            SynthMessage::AllNotesOff => {
                self.all_notes_off();
                Ok(())
            }
            SynthMessage::AllSoundOff => {
                self.all_sound_off();
                Ok(())
            }
        }
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        self.pool.render_block(out);
    }

    /// `velocity / 127 * peak_scale`
    pub fn velocity_to_amplitude(&self, velocity: u8) -> f32 {
        velocity.min(127) as f32 / 127.0 * self.peak_scale
    }

    pub fn set_envelope_param(&mut self, param: EnvelopeParam, value: f32) -> Result<()> {
        let value = param.validate(value)?;
        self.envelope.set(param, value);
        self.pool.set_envelope_param(param, value);
        Ok(())
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

    pub fn attack_duration(&self) -> f32 {
        self.envelope.attack
    }

    pub fn decay_duration(&self) -> f32 {
        self.envelope.decay
    }

    pub fn sustain_level(&self) -> f32 {
        self.envelope.sustain
    }

    pub fn release_duration(&self) -> f32 {
        self.envelope.release
    }

    pub fn envelope(&self) -> EnvelopeParams {
        self.envelope
    }

    pub fn set_peak_scale(&mut self, peak_scale: f32) -> Result<()> {
        self.peak_scale = validate_peak_scale(peak_scale)?;
        Ok(())
    }

    pub fn peak_scale(&self) -> f32 {
        self.peak_scale
    }

    pub fn voice_count(&self) -> usize {
        self.pool.voice_count()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn pool(&self) -> &VoicePool<O> {
        &self.pool
    }
}

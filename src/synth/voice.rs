use crate::{
    config::{EnvelopeParam, EnvelopeParams},
    dsp::{
        envelope::{Envelope, EnvelopeStage},
        oscillator::Oscillator,
    },
};

/// One monophonic voice: an oscillator gated by its own ADSR envelope.
pub struct Voice<O: Oscillator> {
    oscillator: O,
    envelope: Envelope,
}

impl<O: Oscillator> Voice<O> {
    pub fn new(oscillator: O, sample_rate: f32) -> Self {
        Self {
            oscillator,
            envelope: Envelope::new(sample_rate),
        }
    }

    pub fn with_envelope(oscillator: O, envelope: Envelope) -> Self {
        Self {
            oscillator,
            envelope,
        }
    }

    /// Point the oscillator at a new note and (re)open the envelope.
    pub fn start(&mut self, frequency: f32, amplitude: f32) {
        self.oscillator.set_frequency(frequency);
        self.oscillator.set_amplitude(amplitude);
        self.oscillator.start();
        self.envelope.start();
    }

    /// Begin the release tail. The oscillator keeps running until the
    /// envelope reaches Idle.
    pub fn stop(&mut self) {
        self.envelope.stop();
    }

    /// Silence immediately, skipping the release tail.
    pub fn kill(&mut self) {
        self.envelope.reset();
        self.oscillator.stop();
    }

    pub fn next_sample(&mut self) -> f32 {
        if !self.oscillator.is_playing() {
            return 0.0;
        }

        let gain = self.envelope.next_sample();
        let sample = self.oscillator.next_sample() * gain;

        // Envelope finished its release: hand the voice back to the pool
        if !self.envelope.is_active() {
            self.oscillator.stop();
        }

        if sample.is_finite() {
            sample
        } else {
            0.0
        }
    }

    /// Add this voice's output into `out`.
    pub fn render_add(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample += self.next_sample();
        }
    }

    pub fn is_active(&self) -> bool {
        self.oscillator.is_playing() && self.envelope.is_active()
    }

    /// Instantaneous output gain: oscillator amplitude times envelope level.
    pub fn current_amplitude(&self) -> f32 {
        let amp = self.oscillator.amplitude() * self.envelope.level();
        if amp.is_finite() {
            amp
        } else {
            0.0
        }
    }

    pub fn set_envelope_param(&mut self, param: EnvelopeParam, value: f32) {
        self.envelope.set_param(param, value);
    }

    pub fn set_envelope(&mut self, params: EnvelopeParams) {
        self.envelope.set_params(params);
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.envelope.stage()
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn oscillator(&self) -> &O {
        &self.oscillator
    }
}

/// Test source that emits one constant sample, NaN and overflow included.
#[cfg(test)]
pub(crate) struct FixedOscillator {
    output: f32,
    playing: bool,
}

#[cfg(test)]
impl FixedOscillator {
    pub(crate) fn new(output: f32) -> Self {
        Self {
            output,
            playing: false,
        }
    }
}

#[cfg(test)]
impl Oscillator for FixedOscillator {
    fn set_frequency(&mut self, _hz: f32) {}

    fn set_amplitude(&mut self, _gain: f32) {}

    fn frequency(&self) -> f32 {
        440.0
    }

    fn amplitude(&self) -> f32 {
        self.output
    }

    fn start(&mut self) {
        self.playing = true;
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn next_sample(&mut self) -> f32 {
        if self.playing {
            self.output
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::BasicOscillator;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn voice() -> Voice<BasicOscillator> {
        let env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.01, 0.5, 0.02);
        Voice::with_envelope(BasicOscillator::square(SAMPLE_RATE), env)
    }

    #[test]
    fn fresh_voice_is_free() {
        let v = voice();
        assert!(!v.is_active());
        assert_eq!(v.stage(), EnvelopeStage::Idle);
        assert_eq!(v.current_amplitude(), 0.0);
    }

    #[test]
    fn start_sets_oscillator_targets() {
        let mut v = voice();
        v.start(220.0, 0.25);

        assert!(v.is_active());
        assert_eq!(v.oscillator().frequency(), 220.0);
        assert_eq!(v.oscillator().amplitude(), 0.25);
        assert_eq!(v.stage(), EnvelopeStage::Attack);
    }

    #[test]
    fn stays_active_through_release_then_frees() {
        let mut v = voice();
        v.start(100.0, 1.0);
        for _ in 0..30 {
            v.next_sample();
        }

        v.stop();
        assert!(v.is_active());
        assert_eq!(v.stage(), EnvelopeStage::Release);

        for _ in 0..19 {
            v.next_sample();
        }
        assert!(v.is_active());

        v.next_sample();
        assert!(!v.is_active());
        assert!(!v.oscillator().is_playing());
        assert_eq!(v.next_sample(), 0.0);
    }

    #[test]
    fn kill_skips_release() {
        let mut v = voice();
        v.start(100.0, 1.0);
        v.next_sample();
        v.kill();
        assert!(!v.is_active());
        assert_eq!(v.current_amplitude(), 0.0);
    }

    #[test]
    fn current_amplitude_tracks_envelope() {
        let mut v = voice();
        v.start(100.0, 0.5);
        for _ in 0..10 {
            v.next_sample();
        }
        assert!((v.current_amplitude() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn non_finite_oscillator_output_is_silenced() {
        let env = Envelope::adsr(SAMPLE_RATE, 0.0, 0.0, 1.0, 0.02);
        let mut v = Voice::with_envelope(FixedOscillator::new(f32::NAN), env);
        v.start(100.0, 1.0);

        assert!(v.is_active());
        assert_eq!(v.current_amplitude(), 0.0);
        for _ in 0..8 {
            assert_eq!(v.next_sample(), 0.0);
        }

        let mut block = [0.5; 8];
        v.render_add(&mut block);
        assert!(block.iter().all(|&s| s == 0.5));
    }
}

use crate::dsp::oscillator::{BasicOscillator, Oscillator, Waveform};

/// Factory for the oscillators behind each voice.
///
/// This is the "instrument design" layer - you pick your sound source once,
/// then the pool calls the factory `voice_count` times at construction so
/// every voice owns an independent oscillator. Nothing is created afterwards.
pub trait VoiceFactory {
    type Oscillator: Oscillator;

    fn create_oscillator(&self, sample_rate: f32) -> Self::Oscillator;
}

impl<F, O> VoiceFactory for F
where
    F: Fn(f32) -> O,
    O: Oscillator,
{
    type Oscillator = O;

    fn create_oscillator(&self, sample_rate: f32) -> Self::Oscillator {
        self(sample_rate)
    }
}

impl VoiceFactory for Waveform {
    type Oscillator = BasicOscillator;

    fn create_oscillator(&self, sample_rate: f32) -> Self::Oscillator {
        BasicOscillator::new(*self, sample_rate)
    }
}

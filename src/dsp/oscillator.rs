#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f32::consts::TAU;

/*
Oscillators
===========

The voice pool never looks inside an oscillator. It only needs to point one
at a frequency, give it a gain, switch it on and off, and pull one sample per
frame. That narrow surface is the `Oscillator` trait; anything that can do
those five things can be played polyphonically.

`BasicOscillator` is the stock implementation: a phase accumulator feeding
one of a closed set of naive (non band-limited) waveforms.

    phase += frequency / sample_rate      (wrapped to 0..1)

  Sine      sin(2π·phase)
  Triangle  1 - 4·|phase - 0.5|           soft, odd harmonics falling as 1/n²
  Square    ±1 split at phase 0.5          hollow, odd harmonics as 1/n
  Saw       2·phase - 1                    bright, all harmonics as 1/n
*/

/// Capability set the voice pool needs from a sound source.
pub trait Oscillator: Send {
    /// Target pitch in Hz (positive).
    fn set_frequency(&mut self, hz: f32);

    /// Output gain in 0.0 - 1.0.
    fn set_amplitude(&mut self, gain: f32);

    fn frequency(&self) -> f32;

    fn amplitude(&self) -> f32;

    fn start(&mut self);

    fn stop(&mut self);

    fn is_playing(&self) -> bool;

    /// Produce the next sample. Silent (0.0) while stopped.
    fn next_sample(&mut self) -> f32;
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Saw,
}

impl Waveform {
    /// Evaluate the waveform at `phase` in 0..1.
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Saw => 2.0 * phase - 1.0,
        }
    }
}

pub struct BasicOscillator {
    waveform: Waveform,
    sample_rate: f32,
    frequency: f32,
    amplitude: f32,
    phase: f32,
    playing: bool,
}

impl BasicOscillator {
    pub fn new(waveform: Waveform, sample_rate: f32) -> Self {
        Self {
            waveform,
            sample_rate,
            frequency: 440.0,
            amplitude: 0.5,
            phase: 0.0,
            playing: false,
        }
    }

    pub fn sine(sample_rate: f32) -> Self {
        Self::new(Waveform::Sine, sample_rate)
    }

    pub fn triangle(sample_rate: f32) -> Self {
        Self::new(Waveform::Triangle, sample_rate)
    }

    pub fn square(sample_rate: f32) -> Self {
        Self::new(Waveform::Square, sample_rate)
    }

    pub fn saw(sample_rate: f32) -> Self {
        Self::new(Waveform::Saw, sample_rate)
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }
}

impl Oscillator for BasicOscillator {
    fn set_frequency(&mut self, hz: f32) {
        if hz.is_finite() && hz > 0.0 {
            self.frequency = hz;
        }
    }

    fn set_amplitude(&mut self, gain: f32) {
        self.amplitude = gain.max(0.0).min(1.0);
    }

    fn frequency(&self) -> f32 {
        self.frequency
    }

    fn amplitude(&self) -> f32 {
        self.amplitude
    }

    fn start(&mut self) {
        // Keep the running phase on retrigger so the waveform stays continuous
        self.playing = true;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.phase = 0.0;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    #[inline]
    fn next_sample(&mut self) -> f32 {
        if !self.playing {
            return 0.0;
        }

        let out = self.waveform.sample(self.phase) * self.amplitude;
        self.phase += self.frequency / self.sample_rate;
        self.phase -= self.phase.floor();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let mut osc = BasicOscillator::sine(sample_rate);
        osc.set_frequency(440.0);
        osc.set_amplitude(1.0);
        osc.start();

        let samples: Vec<f32> = (0..16).map(|_| osc.next_sample()).collect();

        let n = 12;
        let expected = (TAU * 440.0 * n as f32 / sample_rate).sin();
        assert!(
            (samples[n] - expected).abs() < 1e-4,
            "expected {expected}, got {}",
            samples[n]
        );
    }

    #[test]
    fn triangle_shape() {
        assert_eq!(Waveform::Triangle.sample(0.0), -1.0);
        assert_eq!(Waveform::Triangle.sample(0.5), 1.0);
        assert_eq!(Waveform::Triangle.sample(0.25), 0.0);
    }

    #[test]
    fn stopped_oscillator_is_silent() {
        let mut osc = BasicOscillator::square(48_000.0);
        osc.set_amplitude(1.0);
        assert!(!osc.is_playing());
        assert_eq!(osc.next_sample(), 0.0);

        osc.start();
        assert_eq!(osc.next_sample(), 1.0);
        osc.stop();
        assert_eq!(osc.next_sample(), 0.0);
    }

    #[test]
    fn rejects_non_positive_frequency_and_clamps_gain() {
        let mut osc = BasicOscillator::saw(48_000.0);
        osc.set_frequency(-10.0);
        osc.set_frequency(f32::NAN);
        assert_eq!(osc.frequency(), 440.0);

        osc.set_amplitude(4.0);
        assert_eq!(osc.amplitude(), 1.0);
        osc.set_amplitude(f32::NAN);
        assert_eq!(osc.amplitude(), 0.0);
    }
}

//! Construction-time configuration for an instrument.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::oscillator::Waveform,
    error::{Result, SynthError},
};

/// Default ceiling for a full-velocity note. Low enough that several voices
/// summed together stay out of clipping.
pub const DEFAULT_PEAK_SCALE: f32 = 0.3;

/// Default sample rate when the host does not specify one.
pub const DEFAULT_SAMPLE_RATE: f32 = 48_000.0;

/// One of the four shared envelope parameters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeParam {
    /// Seconds to ramp to full level.
    Attack,
    /// Seconds to fall from full level to the sustain level.
    Decay,
    /// Level held while the key is down (0.0 - 1.0).
    Sustain,
    /// Seconds to fall to silence after the key is released.
    Release,
}

impl EnvelopeParam {
    pub fn name(self) -> &'static str {
        match self {
            EnvelopeParam::Attack => "attack duration",
            EnvelopeParam::Decay => "decay duration",
            EnvelopeParam::Sustain => "sustain level",
            EnvelopeParam::Release => "release duration",
        }
    }

    /// Reject values the envelope cannot represent.
    pub fn validate(self, value: f32) -> Result<f32> {
        let ok = match self {
            EnvelopeParam::Sustain => (0.0..=1.0).contains(&value),
            _ => value.is_finite() && value >= 0.0,
        };

        if ok {
            Ok(value)
        } else {
            Err(SynthError::InvalidParameter {
                name: self.name(),
                value,
            })
        }
    }
}

/// ADSR shape shared by every voice of an instrument.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl EnvelopeParams {
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    pub fn get(&self, param: EnvelopeParam) -> f32 {
        match param {
            EnvelopeParam::Attack => self.attack,
            EnvelopeParam::Decay => self.decay,
            EnvelopeParam::Sustain => self.sustain,
            EnvelopeParam::Release => self.release,
        }
    }

    pub fn set(&mut self, param: EnvelopeParam, value: f32) {
        match param {
            EnvelopeParam::Attack => self.attack = value,
            EnvelopeParam::Decay => self.decay = value,
            EnvelopeParam::Sustain => self.sustain = value,
            EnvelopeParam::Release => self.release = value,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for param in [
            EnvelopeParam::Attack,
            EnvelopeParam::Decay,
            EnvelopeParam::Sustain,
            EnvelopeParam::Release,
        ] {
            param.validate(self.get(param))?;
        }
        Ok(())
    }
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack: 0.1,
            decay: 0.1,
            sustain: 0.66,
            release: 0.5,
        }
    }
}

/// Everything needed to build an [`Instrument`](crate::synth::instrument::Instrument).
///
/// ```
/// use saavy_poly::config::{EnvelopeParams, InstrumentConfig};
///
/// let config = InstrumentConfig::new(8)
///     .with_sample_rate(44_100.0)
///     .with_envelope(EnvelopeParams::new(0.01, 0.2, 0.5, 1.0));
/// assert!(config.validate().is_ok());
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentConfig {
    pub sample_rate: f32,
    pub voice_count: usize,
    pub envelope: EnvelopeParams,
    pub peak_scale: f32,
    pub waveform: Waveform,
}

impl InstrumentConfig {
    pub fn new(voice_count: usize) -> Self {
        Self {
            voice_count,
            ..Self::default()
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_envelope(mut self, envelope: EnvelopeParams) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_peak_scale(mut self, peak_scale: f32) -> Self {
        self.peak_scale = peak_scale;
        self
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.voice_count == 0 {
            return Err(SynthError::InvalidConfig("voice count must be at least 1"));
        }
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(SynthError::InvalidConfig("sample rate must be positive"));
        }
        validate_peak_scale(self.peak_scale)?;
        self.envelope.validate()
    }
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            voice_count: 8,
            envelope: EnvelopeParams::default(),
            peak_scale: DEFAULT_PEAK_SCALE,
            waveform: Waveform::Triangle,
        }
    }
}

pub(crate) fn validate_peak_scale(peak_scale: f32) -> Result<f32> {
    if peak_scale > 0.0 && peak_scale <= 1.0 {
        Ok(peak_scale)
    } else {
        Err(SynthError::InvalidParameter {
            name: "peak scale",
            value: peak_scale,
        })
    }
}

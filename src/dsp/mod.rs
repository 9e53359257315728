//! Low-level DSP primitives owned by each voice.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! tick from the audio callback. They stay focused on the per-sample math so
//! the synth layer can layer voice management on top.

/// Attack/decay/sustain/release envelope engine.
pub mod envelope;
/// Oscillator capability trait and stock waveforms.
pub mod oscillator;

pub use envelope::{Envelope, EnvelopeStage};
pub use oscillator::{BasicOscillator, Oscillator, Waveform};

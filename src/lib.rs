pub mod config; // Instrument construction parameters
pub mod dsp;
pub mod error;
pub mod io;
pub mod synth; // Voice management and polyphony

pub use config::{EnvelopeParam, EnvelopeParams, InstrumentConfig};
pub use error::{Result, SynthError};
pub use synth::instrument::Instrument;

pub const MAX_BLOCK_SIZE: usize = 2048;

// Shortest ramp a parameter change may force on a sounding envelope
pub(crate) const MIN_RAMP_TIME: f32 = 0.005;

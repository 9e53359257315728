use thiserror::Error;

/// Errors raised on the control path.
///
/// None of these ever reach the render path: the render side either applies a
/// message that was already validated or drops it.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SynthError {
    /// A MIDI note or velocity outside `0..=127`.
    #[error("{what} {value} is outside the MIDI range 0..=127")]
    InvalidInput { what: &'static str, value: u8 },

    /// An envelope or gain parameter outside its legal range (or NaN).
    #[error("{name} cannot be set to {value}")]
    InvalidParameter { name: &'static str, value: f32 },

    /// Construction parameters that cannot describe an instrument.
    #[error("invalid instrument configuration: {0}")]
    InvalidConfig(&'static str),

    /// The control queue to the render thread is full.
    #[error("control queue is full, message dropped")]
    QueueFull,
}

pub type Result<T> = std::result::Result<T, SynthError>;

pub(crate) const MIDI_MAX: u8 = 127;

pub(crate) fn check_note(note: u8) -> Result<u8> {
    if note > MIDI_MAX {
        return Err(SynthError::InvalidInput { what: "note", value: note });
    }
    Ok(note)
}

pub(crate) fn check_velocity(velocity: u8) -> Result<u8> {
    if velocity > MIDI_MAX {
        return Err(SynthError::InvalidInput {
            what: "velocity",
            value: velocity,
        });
    }
    Ok(velocity)
}

// Purpose: Voice management, polyphony, control/render split
// This layer sits above the DSP primitives and manages a fixed pool of voices

pub mod factory;
#[cfg(feature = "rtrb")]
pub mod handle;
pub mod instrument;
pub mod message;
pub mod monitor;
pub mod poly;
pub mod pool;
pub mod voice;

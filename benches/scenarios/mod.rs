//! Real-world scenario benchmarks.
//!
//! These model how a host drives the instrument: whole pools rendering
//! chords, and note floods that force constant voice stealing.

mod dispatch;
mod voices;

pub use dispatch::bench_dispatch;
pub use voices::bench_voices;

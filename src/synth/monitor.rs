//! Lock-free readback from the render thread to the control thread.
//!
//! The render path publishes a snapshot of the pool once per block with
//! relaxed atomic stores; the control path polls it. Nothing here blocks or
//! allocates after construction. f32 levels are stored as their bit patterns
//! (there is no `AtomicF32` in std).

use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, AtomicUsize, Ordering};

use crate::{
    dsp::{envelope::EnvelopeStage, oscillator::Oscillator},
    synth::pool::VoicePool,
};

/// Point-in-time counters for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Diagnostics {
    pub active_voices: usize,
    pub mapped_notes: usize,
    pub steals: u64,
    pub frames_rendered: u64,
}

pub struct VoiceMonitor {
    stages: Box<[AtomicU8]>,
    levels: Box<[AtomicU32]>,
    active_voices: AtomicUsize,
    mapped_notes: AtomicUsize,
    steals: AtomicU64,
    frames: AtomicU64,
}

impl VoiceMonitor {
    pub fn new(voice_count: usize) -> Self {
        Self {
            stages: (0..voice_count)
                .map(|_| AtomicU8::new(EnvelopeStage::Idle as u8))
                .collect(),
            levels: (0..voice_count)
                .map(|_| AtomicU32::new(0.0_f32.to_bits()))
                .collect(),
            active_voices: AtomicUsize::new(0),
            mapped_notes: AtomicUsize::new(0),
            steals: AtomicU64::new(0),
            frames: AtomicU64::new(0),
        }
    }

    /// Called by the render path after each block.
    pub fn publish<O: Oscillator>(&self, pool: &VoicePool<O>, frames: usize) {
        let mut active = 0;
        for ((voice, stage), level) in pool.voices().zip(self.stages.iter()).zip(self.levels.iter()) {
            let current = if voice.is_active() {
                active += 1;
                voice.stage()
            } else {
                EnvelopeStage::Idle
            };
            stage.store(current as u8, Ordering::Relaxed);
            level.store(voice.current_amplitude().to_bits(), Ordering::Relaxed);
        }

        self.active_voices.store(active, Ordering::Relaxed);
        self.mapped_notes.store(pool.mapped_notes(), Ordering::Relaxed);
        self.steals.store(pool.steal_count(), Ordering::Relaxed);
        self.frames.fetch_add(frames as u64, Ordering::Relaxed);
    }

    pub fn voice_count(&self) -> usize {
        self.stages.len()
    }

    pub fn stage(&self, voice: usize) -> Option<EnvelopeStage> {
        self.stages
            .get(voice)
            .map(|s| EnvelopeStage::from_u8(s.load(Ordering::Relaxed)))
    }

    pub fn is_voice_active(&self, voice: usize) -> bool {
        matches!(self.stage(voice), Some(stage) if stage != EnvelopeStage::Idle)
    }

    /// Output gain of `voice` at the end of the last block.
    pub fn level(&self, voice: usize) -> Option<f32> {
        self.levels
            .get(voice)
            .map(|l| f32::from_bits(l.load(Ordering::Relaxed)))
    }

    pub fn snapshot(&self) -> Diagnostics {
        Diagnostics {
            active_voices: self.active_voices.load(Ordering::Relaxed),
            mapped_notes: self.mapped_notes.load(Ordering::Relaxed),
            steals: self.steals.load(Ordering::Relaxed),
            frames_rendered: self.frames.load(Ordering::Relaxed),
        }
    }
}

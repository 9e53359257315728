use crate::{
    config::{EnvelopeParam, EnvelopeParams},
    MIN_RAMP_TIME,
};

/*
ADSR Envelope Engine
====================

One envelope lives inside every voice and turns elapsed time into an
amplitude multiplier. The render path ticks it once per sample; the control
path only flips its gate (start/stop) and rewrites its parameters.

Vocabulary
----------

  level       The multiplier currently applied to the oscillator (0.0 - 1.0).

  stage       Idle, Attack, Decay, Sustain or Release.

  elapsed     Samples spent in the current stage. Reset on every stage entry.

  target      Where the current stage is heading: 1.0 for Attack, the
              sustain level for Decay, 0.0 for Release.


The Shape
---------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release


The Ramp: Approach Over Remaining Samples
-----------------------------------------

Every timed stage moves toward its target with

    level += (target - level) / (total - elapsed)

where `total` is the stage duration in samples, re-read from the current
parameters on every tick. With fixed parameters this is an exact linear
ramp that lands on the target at `elapsed == total`. When a duration changes
mid-stage the slope changes from the next tick on, but the level never
jumps: the time already spent in the stage is kept, only the remainder is
re-spread.

A cut can leave less time than has already passed (or almost none). The
stage then finishes over a short tail of at most MIN_RAMP_TIME instead of
snapping to its target. Moving the sustain level while sustaining glides
over the same tail.

Example: Release of 0.5 s at 48 kHz starting from 0.66
  - total = 24000 samples
  - tick 1: level = 0.66 - 0.66 / 24000
  - tick 24000: level = 0.0, stage -> Idle


Retrigger
---------

start() always enters Attack from the CURRENT level:

    Idle      level 0.0 ─→ Attack from 0.0
    Decay     level 0.8 ─→ Attack from 0.8   (no drop to zero, no click)
    Release   level 0.3 ─→ Attack from 0.3

stop() enters Release from the current level and is a no-op when Idle or
already releasing.


Zero Durations
--------------

A stage of zero samples completes on entry: the level is set to its target
and the next stage is entered in the same call. Attack can fall straight
through Decay into Sustain, Release falls straight to Idle. At most four
stages can chain, so this terminates in O(1).
*/

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EnvelopeStage {
    Idle,    // Silent, voice can be reused
    Attack,  // Ramping up to 1.0
    Decay,   // Ramping down to the sustain level
    Sustain, // Holding while the key is down
    Release, // Ramping down to 0.0
}

impl EnvelopeStage {
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => EnvelopeStage::Attack,
            2 => EnvelopeStage::Decay,
            3 => EnvelopeStage::Sustain,
            4 => EnvelopeStage::Release,
            _ => EnvelopeStage::Idle,
        }
    }
}

pub struct Envelope {
    // Shape (seconds / level)
    params: EnvelopeParams,
    sample_rate: f32,

    // Runtime state
    stage: EnvelopeStage,
    level: f32,
    elapsed: u32,
    // Forced remaining samples after a parameter cut, overrides the duration
    tail: Option<u32>,
}

impl Envelope {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_params(sample_rate, EnvelopeParams::default())
    }

    pub fn adsr(sample_rate: f32, attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self::with_params(sample_rate, EnvelopeParams::new(attack, decay, sustain, release))
    }

    pub fn with_params(sample_rate: f32, params: EnvelopeParams) -> Self {
        let mut env = Self {
            params: EnvelopeParams::default(),
            sample_rate,
            stage: EnvelopeStage::Idle,
            level: 0.0,
            elapsed: 0,
            tail: None,
        };
        env.set_params(params);
        env
    }

    /// Gate high: (re)enter Attack from the current level.
    pub fn start(&mut self) {
        if !self.level.is_finite() {
            self.level = 0.0;
        }
        self.enter(EnvelopeStage::Attack);
    }

    /// Gate low: enter Release from the current level.
    pub fn stop(&mut self) {
        match self.stage {
            EnvelopeStage::Idle | EnvelopeStage::Release => {}
            _ => self.enter(EnvelopeStage::Release),
        }
    }

    /// Advance one sample and return the new level.
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }
            EnvelopeStage::Attack => {
                if self.ramp(1.0, self.samples(self.params.attack)) {
                    self.enter(EnvelopeStage::Decay);
                }
            }
            EnvelopeStage::Decay => {
                if self.ramp(self.params.sustain, self.samples(self.params.decay)) {
                    self.enter(EnvelopeStage::Sustain);
                }
            }
            EnvelopeStage::Sustain => {
                if self.tail.is_some() {
                    self.ramp(self.params.sustain, 0);
                } else {
                    self.level = self.params.sustain;
                    self.elapsed = self.elapsed.saturating_add(1);
                }
            }
            EnvelopeStage::Release => {
                if self.ramp(0.0, self.samples(self.params.release)) {
                    self.enter(EnvelopeStage::Idle);
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level()
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Force the envelope silent and idle.
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
        self.elapsed = 0;
        self.tail = None;
    }

    /// Update one parameter. A sounding stage keeps its elapsed time; if the
    /// change would finish it abruptly it ends over a short tail instead.
    pub fn set_param(&mut self, param: EnvelopeParam, value: f32) {
        let value = match param {
            // f32::max/min discard NaN in favour of the other operand
            EnvelopeParam::Sustain => value.max(0.0).min(1.0),
            _ => value.max(0.0),
        };

        let before = self.remaining();
        self.params.set(param, value);
        let floor = self.samples(MIN_RAMP_TIME).max(1);

        if self.stage == EnvelopeStage::Sustain {
            if param == EnvelopeParam::Sustain && self.level != self.params.sustain {
                self.tail = Some(floor);
            }
        } else if let (Some(before), Some(after)) = (before, self.remaining()) {
            let shortest = before.min(floor);
            if after < shortest {
                self.tail = Some(shortest);
            } else if self.stage == EnvelopeStage::Decay
                && param == EnvelopeParam::Sustain
                && after < floor
            {
                // Decay target moved with almost no time left to reach it
                self.tail = Some(floor);
            }
        }
    }

    pub fn set_params(&mut self, params: EnvelopeParams) {
        self.set_param(EnvelopeParam::Attack, params.attack);
        self.set_param(EnvelopeParam::Decay, params.decay);
        self.set_param(EnvelopeParam::Sustain, params.sustain);
        self.set_param(EnvelopeParam::Release, params.release);
    }

    pub fn params(&self) -> EnvelopeParams {
        self.params
    }

    /// Current amplitude multiplier (0.0 to 1.0). Never NaN.
    pub fn level(&self) -> f32 {
        if self.level.is_finite() {
            self.level
        } else {
            0.0
        }
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    /// Samples spent in the current stage.
    pub fn stage_elapsed(&self) -> u32 {
        self.elapsed
    }

    /// True unless the envelope is Idle.
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    fn samples(&self, seconds: f32) -> u32 {
        (seconds * self.sample_rate).round() as u32
    }

    /// Samples left in a timed stage, `None` outside one or during a tail.
    fn remaining(&self) -> Option<u32> {
        if self.tail.is_some() {
            return None;
        }
        let duration = match self.stage {
            EnvelopeStage::Attack => self.params.attack,
            EnvelopeStage::Decay => self.params.decay,
            EnvelopeStage::Release => self.params.release,
            EnvelopeStage::Idle | EnvelopeStage::Sustain => return None,
        };
        Some(self.samples(duration).saturating_sub(self.elapsed))
    }

    /// Step toward `target`; returns true once the stage is complete.
    fn ramp(&mut self, target: f32, total: u32) -> bool {
        let remaining = self
            .tail
            .unwrap_or_else(|| total.saturating_sub(self.elapsed));
        self.elapsed = self.elapsed.saturating_add(1);

        if remaining <= 1 {
            self.level = target;
            self.tail = None;
            return true;
        }

        self.level += (target - self.level) / remaining as f32;
        if let Some(tail) = self.tail.as_mut() {
            *tail -= 1;
        }
        false
    }

    fn enter(&mut self, stage: EnvelopeStage) {
        self.stage = stage;
        self.elapsed = 0;
        self.tail = None;

        let (duration, target, next) = match stage {
            EnvelopeStage::Attack => (self.params.attack, 1.0, EnvelopeStage::Decay),
            EnvelopeStage::Decay => (self.params.decay, self.params.sustain, EnvelopeStage::Sustain),
            EnvelopeStage::Release => (self.params.release, 0.0, EnvelopeStage::Idle),
            EnvelopeStage::Sustain => {
                self.level = self.params.sustain;
                return;
            }
            EnvelopeStage::Idle => {
                self.level = 0.0;
                return;
            }
        };

        if self.samples(duration) == 0 {
            self.level = target;
            self.enter(next);
        }
    }
}

use std::sync::Arc;

use crate::{
    dsp::oscillator::Oscillator,
    synth::{instrument::Instrument, message::MessageReceiver, monitor::VoiceMonitor},
};

/// Render-side owner of an [`Instrument`].
///
/// Lives on the audio thread. Each `render_block` first drains pending
/// control messages, then renders, then publishes a readback snapshot. The
/// control side talks to it only through the message queue and the shared
/// [`VoiceMonitor`], so the callback never waits on the control thread.
pub struct PolySynth<O: Oscillator, R: MessageReceiver> {
    instrument: Instrument<O>,
    rx: R,
    monitor: Arc<VoiceMonitor>,
}

impl<O: Oscillator, R: MessageReceiver> PolySynth<O, R> {
    pub fn new(instrument: Instrument<O>, rx: R) -> Self {
        let monitor = Arc::new(VoiceMonitor::new(instrument.voice_count()));
        Self {
            instrument,
            rx,
            monitor,
        }
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        // Messages were validated on the control side; anything that still
        // fails here is dropped rather than surfaced on the audio thread.
        while let Some(msg) = self.rx.pop() {
            let _ = self.instrument.handle_message(msg);
        }

        self.instrument.render_block(out);
        self.monitor.publish(self.instrument.pool(), out.len());
    }

    /// Shared readback, cloned once when wiring up the control side.
    pub fn monitor(&self) -> Arc<VoiceMonitor> {
        Arc::clone(&self.monitor)
    }

    pub fn instrument(&self) -> &Instrument<O> {
        &self.instrument
    }

    pub fn instrument_mut(&mut self) -> &mut Instrument<O> {
        &mut self.instrument
    }
}

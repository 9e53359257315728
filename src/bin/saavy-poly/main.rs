//! saavy-poly - plays a short chord progression on the default output device
//!
//! Run with: cargo run
//! Set RUST_LOG=debug to see control-path diagnostics.

use std::{
    thread,
    time::{Duration, Instant},
};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use saavy_poly::{
    dsp::Waveform,
    synth::handle::{channel, SynthHandle},
    EnvelopeParams, InstrumentConfig, MAX_BLOCK_SIZE,
};

const VOICES: usize = 6;
const QUEUE_CAPACITY: usize = 64;
/// Longest wait for release tails after the last note-off (release is 1.5 s).
const RING_OUT: Duration = Duration::from_secs(4);

// C, Am, F, G
const PROGRESSION: [[u8; 3]; 4] = [[60, 64, 67], [57, 60, 64], [53, 57, 60], [55, 59, 62]];

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    env_logger::init();

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;
    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let instrument = InstrumentConfig::new(VOICES)
        .with_sample_rate(sample_rate)
        .with_envelope(EnvelopeParams::new(0.02, 0.2, 0.6, 0.8));
    let (mut handle, mut synth) = channel(instrument, &Waveform::Triangle, QUEUE_CAPACITY)?;

    // Buffer reused by audio callback
    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;
                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut render_buf[..frames_to_render];
                    synth.render_block(block);

                    // Duplicate mono to all channels
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                    }
                    frames_written += frames_to_render;
                }
            },
            move |err| log::error!("stream error: {err}"),
            None,
        )
        .wrap_err("failed to build output stream")?;
    stream.play().wrap_err("failed to start output stream")?;

    play(&mut handle)?;

    // Let the release tails ring out, unless the stream stopped calling back
    let deadline = Instant::now() + RING_OUT;
    while handle.diagnostics().active_voices > 0 {
        if Instant::now() >= deadline {
            log::warn!("voices still sounding after {RING_OUT:?}, giving up");
            break;
        }
        thread::sleep(Duration::from_millis(50));
    }
    let diag = handle.diagnostics();
    log::info!(
        "done: {} frames rendered, {} voice steals",
        diag.frames_rendered,
        diag.steals
    );
    Ok(())
}

fn play(handle: &mut SynthHandle) -> EyreResult<()> {
    let beat = Duration::from_millis(600);

    for (i, chord) in PROGRESSION.iter().enumerate() {
        for &note in chord {
            handle.note_on(note, 96)?;
        }
        // Extra notes on the last chord overflow the pool and force steals
        if i == PROGRESSION.len() - 1 {
            for note in [43, 31, 74, 79] {
                handle.note_on(note, 110)?;
            }
        }
        thread::sleep(beat);

        for &note in chord {
            handle.note_off(note)?;
        }
        let diag = handle.diagnostics();
        log::debug!(
            "chord {i}: {} voices sounding, {} notes held",
            diag.active_voices,
            diag.mapped_notes
        );
    }

    handle.set_release_duration(1.5)?;
    handle.all_notes_off()?;
    Ok(())
}

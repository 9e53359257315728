//! Benchmarks for rendering a full voice pool.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_poly::{EnvelopeParams, Instrument, InstrumentConfig};

use crate::BLOCK_SIZES;

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === TRIAD ===
        // Three held notes in an eight-voice pool, five voices idle
        let config = InstrumentConfig::new(8).with_envelope(EnvelopeParams::new(0.01, 0.1, 0.7, 0.5));
        let mut triad = Instrument::triangle(config).unwrap();
        for note in [60, 64, 67] {
            triad.note_on(note, 100).unwrap();
        }
        group.bench_with_input(BenchmarkId::new("triad_8", size), &size, |b, _| {
            b.iter(|| {
                triad.render_block(black_box(&mut buffer));
            })
        });

        // === FULL POOL ===
        // Every voice of a 32-voice pool sounding
        let config = InstrumentConfig::new(32).with_envelope(EnvelopeParams::new(0.01, 0.1, 0.7, 0.5));
        let mut full = Instrument::triangle(config).unwrap();
        for note in 40..72 {
            full.note_on(note, 100).unwrap();
        }
        group.bench_with_input(BenchmarkId::new("full_32", size), &size, |b, _| {
            b.iter(|| {
                full.render_block(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}

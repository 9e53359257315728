//! Benchmarks for note dispatch under starvation.
//!
//! Every note-on in the steady state has to steal, which is the worst case
//! for the control path.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_poly::{Instrument, InstrumentConfig};

pub fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/dispatch");

    for &voices in &[4usize, 16, 64] {
        let mut synth = Instrument::triangle(InstrumentConfig::new(voices)).unwrap();
        let mut note = 0u8;

        group.bench_with_input(BenchmarkId::new("steal", voices), &voices, |b, _| {
            b.iter(|| {
                note = (note + 1) % 128;
                black_box(synth.note_on(black_box(note), 100).ok());
            })
        });

        group.bench_with_input(BenchmarkId::new("note_on_off", voices), &voices, |b, _| {
            b.iter(|| {
                note = (note + 1) % 128;
                black_box(synth.note_on(note, 100).ok());
                black_box(synth.note_off(note).ok());
            })
        });
    }

    group.finish();
}

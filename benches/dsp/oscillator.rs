//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_poly::dsp::oscillator::{BasicOscillator, Oscillator, Waveform};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    let waveforms = [
        ("sine", Waveform::Sine),         // sin() transcendental
        ("triangle", Waveform::Triangle), // absolute value
        ("square", Waveform::Square),     // branch per sample
        ("saw", Waveform::Saw),           // linear ramp
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, waveform) in waveforms {
            let mut osc = BasicOscillator::new(waveform, 48_000.0);
            osc.set_frequency(440.0);
            osc.start();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for sample in buffer.iter_mut() {
                        *sample = osc.next_sample();
                    }
                    black_box(&mut buffer);
                })
            });
        }
    }

    group.finish();
}

use saavy_poly::{
    dsp::{BasicOscillator, EnvelopeStage},
    synth::{instrument::Instrument, pool::Allocation},
    EnvelopeParams, InstrumentConfig,
};

const SAMPLE_RATE: f32 = 1_000.0;

fn instrument(voices: usize, envelope: EnvelopeParams) -> Instrument<BasicOscillator> {
    let config = InstrumentConfig::new(voices)
        .with_sample_rate(SAMPLE_RATE)
        .with_envelope(envelope);
    Instrument::triangle(config).unwrap()
}

fn render(synth: &mut Instrument<BasicOscillator>, frames: usize) -> Vec<f32> {
    let mut out = vec![0.0; frames];
    synth.render_block(&mut out);
    out
}

#[test]
fn four_voice_chord_scenario() {
    let mut synth = instrument(4, EnvelopeParams::new(0.01, 0.01, 0.6, 0.1));

    synth.note_on(60, 127).unwrap();
    synth.note_on(64, 127).unwrap();
    synth.note_on(67, 127).unwrap();
    render(&mut synth, 50);

    let pool = synth.pool();
    assert_eq!(pool.active_voice_count(), 3);
    assert_eq!(pool.voices().filter(|v| !v.is_active()).count(), 1);
    let released = pool.voice_for_note(64).unwrap();

    synth.note_off(64).unwrap();
    assert_eq!(synth.pool().voice_for_note(64), None);
    assert_eq!(
        synth.pool().voice(released).unwrap().stage(),
        EnvelopeStage::Release
    );

    render(&mut synth, 99);
    assert!(synth.pool().voice(released).unwrap().is_active());
    render(&mut synth, 1);
    assert!(!synth.pool().voice(released).unwrap().is_active());

    // the freed voice is the first free one in pool order
    let allocation = synth.note_on(72, 100).unwrap();
    assert_eq!(allocation, Allocation::Fresh(released));
}

#[test]
fn note_on_then_off_stays_in_release_until_it_elapses() {
    for (note, velocity) in [(0u8, 0u8), (0, 1), (60, 0), (60, 64), (127, 127)] {
        let mut synth = instrument(2, EnvelopeParams::new(0.05, 0.05, 0.5, 0.2));
        synth.note_on(note, velocity).unwrap();
        synth.note_off(note).unwrap();

        let stage = |synth: &Instrument<BasicOscillator>| synth.pool().voice(0).unwrap().stage();
        assert_eq!(stage(&synth), EnvelopeStage::Release);
        render(&mut synth, 199);
        assert_eq!(stage(&synth), EnvelopeStage::Release);
        render(&mut synth, 1);
        assert_eq!(stage(&synth), EnvelopeStage::Idle);
    }
}

#[test]
fn one_voice_steal() {
    let mut synth = instrument(1, EnvelopeParams::default());
    synth.note_on(60, 100).unwrap();
    let allocation = synth.note_on(64, 100).unwrap();

    assert_eq!(
        allocation,
        Allocation::Stolen {
            voice: 0,
            evicted: Some(60)
        }
    );
    assert_eq!(synth.pool().voice_for_note(64), Some(0));
    assert_eq!(synth.pool().voice_for_note(60), None);
}

#[test]
fn repeated_note_reuses_voice() {
    let mut synth = instrument(4, EnvelopeParams::default());
    synth.note_on(60, 100).unwrap();
    render(&mut synth, 20);
    let allocation = synth.note_on(60, 100).unwrap();

    assert_eq!(allocation, Allocation::Retrigger(0));
    assert_eq!(synth.pool().active_voice_count(), 1);
    assert_eq!(synth.pool().mapped_notes(), 1);
}

#[test]
fn release_change_during_attack_applies_only_to_release() {
    let mut synth = instrument(2, EnvelopeParams::new(0.1, 0.1, 0.5, 0.1));
    synth.note_on(60, 100).unwrap();
    render(&mut synth, 50);

    synth.set_release_duration(2.0).unwrap();
    render(&mut synth, 50);
    assert_eq!(synth.pool().voice(0).unwrap().stage(), EnvelopeStage::Decay);
    render(&mut synth, 100);
    assert_eq!(synth.pool().voice(0).unwrap().stage(), EnvelopeStage::Sustain);

    synth.note_off(60).unwrap();
    render(&mut synth, 1999);
    assert!(synth.pool().voice(0).unwrap().is_active());
    render(&mut synth, 1);
    assert!(!synth.pool().voice(0).unwrap().is_active());
}

#[test]
fn retrigger_mid_decay_never_dips_to_silence() {
    let mut synth = instrument(1, EnvelopeParams::new(0.01, 0.2, 0.3, 0.1));
    synth.note_on(60, 127).unwrap();
    render(&mut synth, 60);

    let before = synth.pool().voice(0).unwrap().envelope().level();
    assert!(before > 0.3 && before < 1.0);

    synth.note_on(60, 127).unwrap();
    let after = synth.pool().voice(0).unwrap().envelope().level();
    assert_eq!(before, after);

    let mut prev = after;
    for _ in 0..10 {
        render(&mut synth, 1);
        let level = synth.pool().voice(0).unwrap().envelope().level();
        assert!(level >= prev);
        prev = level;
    }
}

#[test]
fn flood_of_notes_never_overfills_mapping() {
    let mut synth = instrument(3, EnvelopeParams::new(0.0, 0.01, 0.5, 0.05));
    for round in 0..4u8 {
        for note in (round * 10)..(round * 10 + 20) {
            synth.note_on(note, 90).unwrap();
            assert!(synth.pool().mapped_notes() <= synth.voice_count());
            render(&mut synth, 3);
        }
        for note in (round * 10)..(round * 10 + 5) {
            synth.note_off(note).unwrap();
        }
    }
    assert!(synth.pool().steal_count() > 0);
}

#[test]
fn output_stays_bounded_with_every_voice_sounding() {
    let mut synth = instrument(4, EnvelopeParams::new(0.0, 0.0, 1.0, 0.1));
    for note in [48, 52, 55, 60] {
        synth.note_on(note, 127).unwrap();
    }
    let out = render(&mut synth, 512);
    assert!(out.iter().all(|s| s.is_finite() && s.abs() <= 4.0 * 0.3 + 1e-6));
    assert!(out.iter().any(|s| s.abs() > 0.0));
}

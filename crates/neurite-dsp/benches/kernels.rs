use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use neurite_dsp::stat::{fixed, float, StatCtx};
use neurite_dsp::transform::fft::{amplitude_spectrum, RfftPlan};

fn signal_i16(len: usize, seed: u64) -> Vec<i16> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(-2000..2000)).collect()
}

fn signal_f32(len: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(-1.0f32..1.0)).collect()
}

fn bench_stat_context_reuse(c: &mut Criterion) {
    let v = signal_i16(512, 7);

    c.bench_function("stat/i16_var_cold", |b| {
        b.iter(|| fixed::var(black_box(&v[..]), None))
    });

    c.bench_function("stat/i16_feature_sweep_shared_ctx", |b| {
        b.iter(|| {
            let mut ctx = StatCtx::<i16>::default();
            fixed::tss_sum(&v[..], &mut ctx);
            let mut acc = 0i64;
            acc += fixed::mean(&v[..], Some(&mut ctx)) as i64;
            acc += fixed::var(&v[..], Some(&mut ctx)) as i64;
            acc += fixed::stddev(&v[..], Some(&mut ctx)) as i64;
            acc += fixed::rms(&v[..], Some(&mut ctx)) as i64;
            acc += fixed::mcr(&v[..], Some(&mut ctx)) as i64;
            black_box(acc)
        })
    });

    let f = signal_f32(512, 7);
    c.bench_function("stat/f32_moments", |b| {
        b.iter(|| float::moments(black_box(&f[..]), None))
    });
}

fn bench_rfft(c: &mut Criterion) {
    for len in [128usize, 512] {
        let plan = RfftPlan::new(len).unwrap();
        let frame = signal_f32(len, 11);
        let mut spectrum = vec![0.0f32; len / 2];
        c.bench_function(&format!("fft/rfft_{len}"), |b| {
            b.iter(|| {
                let mut buf = frame.clone();
                plan.process(&mut buf);
                amplitude_spectrum(&buf, len, &mut spectrum);
                black_box(spectrum[1])
            })
        });
    }
}

criterion_group!(benches, bench_stat_context_reuse, bench_rfft);
criterion_main!(benches);

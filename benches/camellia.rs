use corecrypt::camellia::{CamelliaBackend, EcbContext, generate};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_camellia_ecb(c: &mut Criterion) {
    let key = [0x2bu8; 16];
    let plaintext = vec![0x11u8; 1 << 16];
    let mut out = vec![0u8; plaintext.len()];

    let mut group = c.benchmark_group("camellia-128 ecb encrypt 64KiB");
    group.bench_function("portable", |b| {
        let ctx = EcbContext::with_backend(generate(&key, true), CamelliaBackend::Portable);
        b.iter(|| {
            ctx.process_blocks(&mut out, black_box(&plaintext), plaintext.len())
                .unwrap();
            black_box(&out);
        })
    });
    if corecrypt::cpu::features().avx2 {
        group.bench_function("avx2 x8 gather", |b| {
            let ctx = EcbContext::with_backend(generate(&key, true), CamelliaBackend::Avx2x8);
            b.iter(|| {
                ctx.process_blocks(&mut out, black_box(&plaintext), plaintext.len())
                    .unwrap();
                black_box(&out);
            })
        });
        group.bench_function("avx2 x32 gather", |b| {
            let ctx =
                EcbContext::with_backend(generate(&key, true), CamelliaBackend::Avx2x32Gather);
            b.iter(|| {
                ctx.process_blocks(&mut out, black_box(&plaintext), plaintext.len())
                    .unwrap();
                black_box(&out);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_camellia_ecb);
criterion_main!(benches);

use corecrypt::crc32::{Crc32Backend, Crc32Context};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_crc32(c: &mut Criterion) {
    let data = vec![0x5au8; 1 << 16];

    let mut group = c.benchmark_group("crc32 64KiB");
    group.bench_function("portable", |b| {
        b.iter(|| {
            let mut ctx = Crc32Context::with_backend(Crc32Backend::Portable);
            ctx.update(black_box(&data));
            black_box(ctx.current())
        })
    });
    if corecrypt::cpu::features().avx2 {
        group.bench_function("avx2 gather", |b| {
            b.iter(|| {
                let mut ctx = Crc32Context::with_backend(Crc32Backend::Avx2Gather);
                ctx.update(black_box(&data));
                black_box(ctx.current())
            })
        });
    }
    if corecrypt::cpu::features().avx2 && corecrypt::cpu::features().pclmulqdq {
        group.bench_function("avx2 clmul", |b| {
            b.iter(|| {
                let mut ctx = Crc32Context::with_backend(Crc32Backend::Avx2Clmul);
                ctx.update(black_box(&data));
                black_box(ctx.current())
            })
        });
    }
    group.bench_function("crc32fast crate (reference)", |b| {
        b.iter(|| {
            let mut hasher = crc32fast::Hasher::new();
            hasher.update(black_box(&data));
            black_box(hasher.finalize())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_crc32);
criterion_main!(benches);

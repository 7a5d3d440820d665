//! KDF adapter performance benchmarks.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mfkdf_primitives::hash::Digest;
use mfkdf_primitives::kdf::{kdf, KdfAlgorithm};

fn bench_pbkdf2(c: &mut Criterion) {
    let mut group = c.benchmark_group("pbkdf2");
    for rounds in [1_000u32, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(rounds), &rounds, |b, &rounds| {
            let alg = KdfAlgorithm::Pbkdf2 {
                rounds,
                digest: Digest::Sha256,
            };
            b.iter(|| black_box(kdf(&alg, b"hunter2", &[0u8; 16], 32).unwrap()))
        });
    }
    group.finish();
}

fn bench_argon2id(c: &mut Criterion) {
    let mut group = c.benchmark_group("argon2id");
    let alg = KdfAlgorithm::Argon2id {
        rounds: 2,
        memory: 24576,
        parallelism: 1,
    };
    group.bench_function("owasp_default", |b| {
        b.iter(|| black_box(kdf(&alg, b"hunter2", b"0123456789abcdef", 32).unwrap()))
    });
    group.finish();
}

fn bench_scrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("scrypt");
    let alg = KdfAlgorithm::Scrypt {
        rounds: 16384,
        blocksize: 8,
        parallelism: 1,
    };
    group.bench_function("owasp_default", |b| {
        b.iter(|| black_box(kdf(&alg, b"hunter2", b"0123456789abcdef", 32).unwrap()))
    });
    group.finish();
}

fn bench_hkdf_share_derivation(c: &mut Criterion) {
    c.bench_function("hkdf_sha512_share", |b| {
        b.iter(|| black_box(mfkdf_primitives::hash::hkdf(Digest::Sha512, b"material", b"", b"", 32).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_pbkdf2,
    bench_argon2id,
    bench_scrypt,
    bench_hkdf_share_derivation
);
criterion_main!(benches);

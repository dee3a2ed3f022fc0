//! Benchmarks for the per-tick text hot path: fingerprinting and the
//! positional similarity proxy.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vigil::domain::models::ContentFingerprint;
use vigil::services::duplicate_guard::positional_similarity;

fn snapshot_text(seed: usize) -> String {
    let mut text = String::new();
    for i in 0..40 {
        text.push_str(&format!(
            "line {i}: the assistant reported progress on task {} with details\n",
            (seed + i) % 7
        ));
    }
    text
}

fn bench_fingerprint(c: &mut Criterion) {
    let text = snapshot_text(0);
    c.bench_function("fingerprint_2kb_snapshot", |b| {
        b.iter(|| ContentFingerprint::of(black_box(&text)));
    });
}

fn bench_similarity(c: &mut Criterion) {
    let a = snapshot_text(0);
    let b_text = snapshot_text(1);
    c.bench_function("positional_similarity_2kb", |b| {
        b.iter(|| positional_similarity(black_box(&a), black_box(&b_text)));
    });
    c.bench_function("positional_similarity_identical_2kb", |b| {
        b.iter(|| positional_similarity(black_box(&a), black_box(&a)));
    });
}

criterion_group!(benches, bench_fingerprint, bench_similarity);
criterion_main!(benches);

//! Performance benchmarks for store encryption and encoding.
//!
//! Run with: cargo bench
//!
//! These benchmarks establish baseline performance metrics for:
//! - Sealing/opening the store envelope at various payload sizes
//! - Key derivation from a secret
//! - Encoding/decoding calendars of various sizes

use btodo::codec;
use btodo::crypto::{Secret, StoreKey};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Map, Value};

const SIZES: &[(&str, usize)] = &[("1KB", 1024), ("100KB", 100 * 1024), ("1MB", 1024 * 1024)];

fn bench_secret() -> Secret {
    Secret::new("benchmark-secret").expect("non-empty secret")
}

/// A current-version document with `count` events spread over a year.
fn document_with_events(count: usize) -> Vec<u8> {
    let mut buckets = Map::new();
    for n in 0..count {
        let day = format!("2025-{:02}-{:02}", n % 12 + 1, n % 28 + 1);
        let record = json!({
            "id": format!("event-{}", n),
            "title": format!("Event number {}", n),
            "time": if n % 3 == 0 { Value::Null } else { json!("14:30") },
            "description": "Somewhere with a longer note attached",
            "notify": n % 2 == 0,
            "notify_minutes_before": 30,
            "delivered": false,
        });
        buckets
            .entry(day)
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .expect("bucket is an array")
            .push(record);
    }
    serde_json::to_vec(&json!({
        "version": 2,
        "settings": { "theme": "light", "style_name": "Default Light", "accent_color": "#2A82DA" },
        "events": buckets,
    }))
    .expect("document serializes")
}

fn bench_seal(c: &mut Criterion) {
    let mut group = c.benchmark_group("seal");
    let key = StoreKey::generate(&bench_secret()).expect("key generation failed");

    for (name, size) in SIZES {
        let data = vec![b'x'; *size];
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| black_box(key.seal(black_box(data)).expect("seal failed")));
        });
    }

    group.finish();
}

fn bench_open(c: &mut Criterion) {
    let mut group = c.benchmark_group("open");
    let key = StoreKey::generate(&bench_secret()).expect("key generation failed");

    for (name, size) in SIZES {
        let sealed = key.seal(&vec![b'x'; *size]).expect("seal failed");
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &sealed, |b, sealed| {
            b.iter(|| black_box(key.open(black_box(sealed)).expect("open failed")));
        });
    }

    group.finish();
}

/// Argon2id dominates unlock time; this is the cost paid once per open.
fn bench_key_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_derivation");
    group.sample_size(10);
    let secret = bench_secret();
    let salt = [7u8; 16];

    group.bench_function("argon2id", |b| {
        b.iter(|| black_box(StoreKey::derive(black_box(&secret), salt).expect("derive failed")));
    });

    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    for count in [10usize, 1_000, 10_000] {
        let bytes = document_with_events(count);
        let calendar = codec::from_bytes(&bytes).expect("document decodes");

        group.bench_with_input(BenchmarkId::new("decode", count), &bytes, |b, bytes| {
            b.iter(|| black_box(codec::from_bytes(black_box(bytes)).expect("decode failed")));
        });
        group.bench_with_input(BenchmarkId::new("encode", count), &calendar, |b, calendar| {
            b.iter(|| black_box(codec::to_bytes(black_box(calendar)).expect("encode failed")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_seal, bench_open, bench_key_derivation, bench_codec);
criterion_main!(benches);

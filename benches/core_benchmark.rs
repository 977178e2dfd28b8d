//! Benchmarks for the hot-path primitives of the three core subsystems:
//! slot hashing (§4.3), backlog append (§4.4), and RDB encode (§4.6).

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use slotkv::cluster::keyslot;
use slotkv::replication::BacklogRing;
use slotkv::storage::{StorageAdapter, StoredValue};

fn bench_keyslot(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyslot");

    group.bench_function("plain_key", |b| {
        b.iter(|| keyslot(black_box(b"user:1000:session")))
    });

    group.bench_function("hash_tagged_key", |b| {
        b.iter(|| keyslot(black_box(b"{user:1000}:session")))
    });

    for len in [8usize, 64, 512] {
        let key = vec![b'k'; len];
        group.bench_with_input(BenchmarkId::new("by_key_length", len), &key, |b, key| {
            b.iter(|| keyslot(black_box(key)))
        });
    }

    group.finish();
}

fn bench_backlog_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("backlog_append");

    for payload_len in [32usize, 256, 4096] {
        let ring = BacklogRing::new(16 * 1024 * 1024);
        let payload = vec![0x42u8; payload_len];
        group.bench_with_input(
            BenchmarkId::new("resident", payload_len),
            &payload,
            |b, payload| {
                b.iter(|| ring.append(black_box(payload)));
            },
        );
    }

    // Steady-state wraparound: the ring is already full, so every append
    // both writes and evicts (§4.4's common case once a replication stream
    // has been running for a while).
    let wrapped_ring = BacklogRing::new(4096);
    wrapped_ring.append(&vec![0u8; 4096]);
    group.bench_function("wraparound", |b| {
        let chunk = vec![0x7eu8; 64];
        b.iter(|| wrapped_ring.append(black_box(&chunk)));
    });

    group.finish();
}

fn populate(store: &StorageAdapter, db: usize, entries: usize) {
    for i in 0..entries {
        store
            .restore_entry(
                db,
                format!("key:{}", i),
                StoredValue::new_string(Bytes::from(format!("value-{}", i))),
            )
            .unwrap();
    }
}

fn bench_rdb_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("rdb_encode");

    for entries in [100usize, 1_000, 10_000] {
        let store = StorageAdapter::new();
        populate(&store, 0, entries);
        group.bench_with_input(
            BenchmarkId::new("string_keys", entries),
            &store,
            |b, store| {
                b.iter(|| slotkv::rdb::encode(black_box(store), 0).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_keyslot, bench_backlog_append, bench_rdb_encode);
criterion_main!(benches);

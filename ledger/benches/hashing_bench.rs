// Hashing benchmarks for the ledger engine.
//
// Covers the double hash, Merkle roots over growing leaf counts, and
// transaction hashing from an ordered payload.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use ledger_core::crypto::{double_hash, generate_address, merkle_root};
use ledger_core::TransactionBuilder;

fn bench_double_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash/double");

    for size in [64usize, 1024, 16 * 1024] {
        let data = vec![0x5Au8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| double_hash(black_box(data)));
        });
    }

    group.finish();
}

fn bench_merkle_root(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash/merkle_root");

    for leaves in [1usize, 16, 255, 1024] {
        let hashes: Vec<String> = (0..leaves).map(|i| double_hash(i.to_string())).collect();
        group.throughput(Throughput::Elements(leaves as u64));
        group.bench_with_input(BenchmarkId::from_parameter(leaves), &hashes, |b, hashes| {
            b.iter(|| merkle_root(black_box(hashes.as_slice())).unwrap());
        });
    }

    group.finish();
}

fn bench_transaction_hash(c: &mut Criterion) {
    let tx = TransactionBuilder::new()
        .field("date", "2020-10-25 10:55:23")
        .field("to", "jon")
        .field("from", "tony")
        .field("amount", 500)
        .build();

    c.bench_function("hash/transaction", |b| {
        b.iter(|| black_box(&tx).compute_hash());
    });
}

fn bench_address_generation(c: &mut Criterion) {
    c.bench_function("hash/address", |b| {
        b.iter(generate_address);
    });
}

criterion_group!(
    benches,
    bench_double_hash,
    bench_merkle_root,
    bench_transaction_hash,
    bench_address_generation,
);
criterion_main!(benches);

#![forbid(unsafe_code)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use dsgraph::cli::build_from_kill_vectors;
use dsgraph::primitives::bits::BitSequence;
use dsgraph::storage::{GraphReader, GraphWriter, KillVector, TraversalStrategy};
use dsgraph::types::UnitId;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::Cursor;

const UNIT_COUNT: usize = 2_048;
const TEST_COUNT: usize = 48;

/// Kill-vectors biased towards sparse rows, the common shape of mutation results.
fn random_kill_vectors(units: usize, tests: usize, seed: u64) -> Vec<KillVector> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..units)
        .map(|unit| {
            let density = rng.gen_range(0.02..0.35);
            let bits = (0..tests).map(|_| rng.gen_bool(density));
            KillVector::new(UnitId(unit as i64), BitSequence::from_bits(bits.collect::<Vec<_>>()))
        })
        .collect()
}

fn build_graph(c: &mut Criterion) {
    let vectors = random_kill_vectors(UNIT_COUNT, TEST_COUNT, 0xC0FFEE);
    let mut group = c.benchmark_group("build/link");
    group.sample_size(20);
    group.throughput(Throughput::Elements(UNIT_COUNT as u64));

    for strategy in TraversalStrategy::ALL {
        group.bench_function(strategy.as_str(), |b| {
            b.iter_batched(
                || vectors.clone(),
                |input| {
                    let outcome = build_from_kill_vectors(input, strategy).expect("build");
                    black_box(outcome.comparisons)
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn codec(c: &mut Criterion) {
    let vectors = random_kill_vectors(UNIT_COUNT, TEST_COUNT, 0xDEAD_BEEF);
    let built = build_from_kill_vectors(vectors, TraversalStrategy::TopDown)
        .expect("build")
        .graph;
    let mut writer = GraphWriter::new(Vec::new());
    writer.write(&built.graph, &built.index).expect("write");
    let bytes = writer.into_inner();

    let mut group = c.benchmark_group("build/codec");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("write", |b| {
        b.iter(|| {
            let mut writer = GraphWriter::new(Vec::with_capacity(bytes.len()));
            writer.write(&built.graph, &built.index).expect("write");
            black_box(writer.into_inner().len())
        });
    });
    group.bench_function("read", |b| {
        b.iter(|| {
            let loaded = GraphReader::new(Cursor::new(&bytes)).read().expect("read");
            black_box(loaded.graph.len())
        });
    });
    group.finish();
}

criterion_group!(benches, build_graph, codec);
criterion_main!(benches);

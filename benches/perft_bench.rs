//! Perft, move generation, and search benchmarks.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use once_cell::sync::Lazy;

use sable::engine::Engine;
use sable::{AttackTables, Board, MoveGenerator};

static TABLES: Lazy<AttackTables> = Lazy::new(AttackTables::generate);

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");
    let generator = MoveGenerator::new(&TABLES);

    let mut startpos = Board::new();
    for depth in 1..=4usize {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| generator.perft(&mut startpos, black_box(depth)))
        });
    }

    let mut kiwipete = Board::try_from_fen(KIWIPETE).expect("valid");
    for depth in 1..=3usize {
        group.bench_with_input(BenchmarkId::new("kiwipete", depth), &depth, |b, &depth| {
            b.iter(|| generator.perft(&mut kiwipete, black_box(depth)))
        });
    }

    group.finish();
}

fn bench_movegen(c: &mut Criterion) {
    let mut group = c.benchmark_group("movegen");
    let generator = MoveGenerator::new(&TABLES);

    let startpos = Board::new();
    group.bench_function("startpos", |b| {
        b.iter(|| black_box(generator.generate(&startpos)))
    });

    let kiwipete = Board::try_from_fen(KIWIPETE).expect("valid");
    group.bench_function("kiwipete", |b| {
        b.iter(|| black_box(generator.generate(&kiwipete)))
    });

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.measurement_time(Duration::from_secs(20));
    group.sample_size(10);

    let mut engine = Engine::new((*TABLES).clone());
    engine.set_position(KIWIPETE, &[]).expect("valid");
    group.bench_function("kiwipete_depth_5", |b| {
        b.iter(|| black_box(engine.find_best_move(5)))
    });

    group.finish();
}

criterion_group!(benches, bench_perft, bench_movegen, bench_search);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use clvm_puzzle::{Program, RunConfig};

const FACTORIAL: &str = "(a (q . (a 2 (c 2 (c 5 ())))) (c (q . (a (i (= 5 (q . 1)) (q . (q . 1)) (q . (* 5 (a 2 (c 2 (c (- 5 (q . 1)) ())))))) 1)) 1))";

fn build_wide_list(len: i64) -> Program {
    Program::list((0..len).map(Program::from_int))
}

fn bench_decode(c: &mut Criterion) {
    let bytes = build_wide_list(10_000).serialize().unwrap();
    c.bench_function("deserialize_wide_list", |b| {
        b.iter(|| Program::deserialize(black_box(&bytes)).unwrap())
    });

    let program = Program::parse(FACTORIAL).unwrap();
    let text = program.to_string();
    c.bench_function("parse_factorial_text", |b| {
        b.iter(|| Program::parse(black_box(&text)).unwrap())
    });
}

fn bench_tree_hash(c: &mut Criterion) {
    let program = build_wide_list(10_000);
    c.bench_function("tree_hash_wide_list", |b| {
        b.iter(|| black_box(&program).tree_hash())
    });
}

fn bench_eval(c: &mut Criterion) {
    let program = Program::parse(FACTORIAL).unwrap();
    let args = Program::list([Program::from_int(30)]);
    let config = RunConfig::default();
    c.bench_function("run_factorial_30", |b| {
        b.iter(|| program.run(black_box(&args), &config).unwrap())
    });
}

criterion_group!(benches, bench_decode, bench_tree_hash, bench_eval);
criterion_main!(benches);

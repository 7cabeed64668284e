//! Benchmarks the fixed-point cost of transitive closure and the three CFPQ evaluators
//! against the two-cycle synthetic graph generator at a few sizes.
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use pathlang::cfg::{cfg_to_wcnf, Cfg};
use pathlang::cfpq::{cfpq, hellings, matrix as cfpq_matrix, tensor, CfpqAlgorithm};
use pathlang::graph::labeled_two_cycle_graph;
use pathlang::symbol::SymbolTable;

fn anbn_grammar(table: &mut SymbolTable) -> Cfg {
    Cfg::parse("S -> A B | A C\nC -> S B\nA -> a\nB -> b", table).unwrap()
}

fn bench_transitive_closure(c: &mut Criterion) {
    let mut group = c.benchmark_group("transitive_closure");
    for &size in &[8usize, 32, 128] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut table = SymbolTable::new();
            let a = table.intern("a");
            let graph = labeled_two_cycle_graph(size, size, (a, a));
            let abm = graph.to_abm(None, None).unwrap();
            b.iter(|| abm.transitive_closure());
        });
    }
    group.finish();
}

fn bench_cfpq_evaluators(c: &mut Criterion) {
    let mut group = c.benchmark_group("cfpq_evaluators");
    for &size in &[4usize, 16, 64] {
        let mut table = SymbolTable::new();
        let cfg = anbn_grammar(&mut table);
        let a = table.intern("a");
        let b_sym = table.intern("b");
        let graph = labeled_two_cycle_graph(size, size, (a, b_sym));
        let wcnf = cfg_to_wcnf(&cfg, &mut table);

        group.bench_with_input(BenchmarkId::new("hellings", size), &size, |bench, _| {
            bench.iter(|| hellings::closure(&wcnf, &graph));
        });
        group.bench_with_input(BenchmarkId::new("matrix", size), &size, |bench, _| {
            bench.iter(|| cfpq_matrix::closure(&wcnf, &graph));
        });
        group.bench_with_input(BenchmarkId::new("tensor", size), &size, |bench, _| {
            bench.iter(|| tensor::closure(&cfg, &graph));
        });
    }
    group.finish();
}

fn bench_dispatcher(c: &mut Criterion) {
    c.bench_function("cfpq_dispatch_matrix_64", |b| {
        let mut table = SymbolTable::new();
        let cfg = anbn_grammar(&mut table);
        let a = table.intern("a");
        let b_sym = table.intern("b");
        let graph = labeled_two_cycle_graph(64, 64, (a, b_sym));
        let start = table.intern("S");
        b.iter(|| cfpq(CfpqAlgorithm::Matrix, &cfg, &graph, &mut table, start, None, None));
    });
}

criterion_group!(
    benches,
    bench_transitive_closure,
    bench_cfpq_evaluators,
    bench_dispatcher
);
criterion_main!(benches);

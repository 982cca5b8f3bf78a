use chronograph::algorithms::{average_degree, local_triangle_count};
use chronograph::{Direction, Graph, PerspectiveSet, Prop};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

/// Ring with chords: every vertex links to its successor and to the
/// vertex two ahead, one observation per timestamp.
fn build_ring(num_vertices: u64, num_shards: usize) -> Graph {
    let g = Graph::new(num_shards);
    for i in 0..num_vertices {
        let t = i as i64;
        g.add_edge(t, i, (i + 1) % num_vertices, &[]);
        g.add_edge(t, i, (i + 2) % num_vertices, &[]);
    }
    g
}

fn bench_ingestion(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingestion");

    for num_ops in [1_000u64, 10_000] {
        group.throughput(Throughput::Elements(num_ops));

        group.bench_with_input(BenchmarkId::new("add_edge", num_ops), &num_ops, |b, &n| {
            b.iter(|| {
                let g = Graph::new(4);
                for i in 0..n {
                    g.add_edge(i as i64, i % 100, (i + 1) % 100, &[]);
                }
                g
            });
        });

        group.bench_with_input(
            BenchmarkId::new("add_edge_with_props", num_ops),
            &num_ops,
            |b, &n| {
                let props = vec![
                    ("weight".to_string(), Prop::from(1.0)),
                    ("label".to_string(), Prop::from("observed")),
                ];
                b.iter(|| {
                    let g = Graph::new(4);
                    for i in 0..n {
                        g.add_edge(i as i64, i % 100, (i + 1) % 100, &props);
                    }
                    g
                });
            },
        );
    }

    group.finish();
}

fn bench_windowed_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("windowed_queries");

    let g = build_ring(10_000, 4);

    group.bench_function("degree_full_history", |b| {
        b.iter(|| black_box(g.degree(black_box(42u64), Direction::BOTH)));
    });

    group.bench_function("degree_narrow_window", |b| {
        let view = g.window(40, 50);
        b.iter(|| black_box(view.degree(black_box(42u64), Direction::BOTH)));
    });

    group.bench_function("window_len", |b| {
        let view = g.window(0, 5_000);
        b.iter(|| black_box(view.len()));
    });

    group.bench_function("neighbours_ids", |b| {
        let view = g.window(0, 10_000);
        b.iter(|| black_box(view.neighbours_ids(black_box(42u64), Direction::BOTH)));
    });

    group.finish();
}

fn bench_algorithms(c: &mut Criterion) {
    let mut group = c.benchmark_group("algorithms");

    let g = build_ring(1_000, 4);
    let view = g.window(0, 1_000);

    group.bench_function("local_triangle_count", |b| {
        b.iter(|| black_box(local_triangle_count(&view, black_box(42u64))));
    });

    group.bench_function("average_degree", |b| {
        b.iter(|| black_box(average_degree(&view)));
    });

    group.finish();
}

fn bench_perspective_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("perspective_sweep");

    let g = build_ring(10_000, 4);

    group.bench_function("walk_100_windows", |b| {
        b.iter(|| {
            let total: usize = g
                .through(PerspectiveSet::walk(100))
                .map(|w| w.edges_len())
                .sum();
            black_box(total)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_ingestion,
    bench_windowed_queries,
    bench_algorithms,
    bench_perspective_sweep
);
criterion_main!(benches);

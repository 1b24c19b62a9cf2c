use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use futures::StreamExt;
use stepflow::prelude::*;

fn items(count: usize) -> Vec<i64> {
    (0..count as i64).collect()
}

/// Map and filter over a finite input
fn bench_linear_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("linear_chain");

    for count in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || {
                    Pipeline::new(
                        items(count),
                        steps![
                            map(|x: i64| x * 3),
                            filter(|x: &i64| x % 2 == 0),
                            map(|x: i64| x.to_string()),
                        ],
                    )
                },
                |mut pipeline| black_box(pipeline.to_vec()),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Split into two branches and merge back
fn bench_branching(c: &mut Criterion) {
    let mut group = c.benchmark_group("branching");

    for count in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || {
                    Pipeline::new(
                        items(count),
                        steps![
                            split(|x: &i64| (x % 2) as u8),
                            with_branches(vec![
                                steps![map(|x: i64| x * 10)],
                                steps![map(|x: i64| -x)],
                            ]),
                            merge(),
                        ],
                    )
                },
                |mut pipeline| black_box(pipeline.to_vec()),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Group and sum aggregation
fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");

    for count in [1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("sum", count), &count, |b, &count| {
            b.iter_batched(
                || Pipeline::new(items(count), aggregate(sum::<i64>())),
                |mut pipeline| black_box(pipeline.collect::<i64>()),
                BatchSize::SmallInput,
            );
        });
        group.bench_with_input(BenchmarkId::new("group_by", count), &count, |b, &count| {
            b.iter_batched(
                || Pipeline::new(items(count), aggregate(group_by(|x: i64| (x % 16, x)))),
                |mut pipeline| black_box(pipeline.to_multimap::<i64, i64>()),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Queue input fed by a producer task, drained as a stream
fn bench_queue_input(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("queue_input");

    for count in [1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.to_async(&runtime).iter(|| async move {
                let (sender, input) = Input::channel(DEFAULT_CHANNEL_CAPACITY);
                tokio::spawn(async move {
                    for item in items(count) {
                        if sender.send(item).await.is_err() {
                            break;
                        }
                    }
                });
                let mut pipeline = Pipeline::new(input, steps![map(|x: i64| x + 1)]);
                black_box(pipeline.stream().count().await)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_linear_chain,
    bench_branching,
    bench_aggregation,
    bench_queue_input
);
criterion_main!(benches);

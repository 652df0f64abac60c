#![allow(clippy::unwrap_used)]

use criterion::{Criterion, criterion_group, criterion_main};
use skutier_core::rank::percentile_ranks;
use skutier_core::{Dataset, Engine};
use std::hint::black_box;

const CATEGORIES: [&str; 12] = [
    "Dairy", "Snacks", "Frozen", "Bakery", "Beverages", "Produce", "Pantry", "Household",
    "Personal Care", "Baby", "Pet", "",
];

/// A batch of `n` SKUs spread over a dozen categories, with a few gaps.
fn build_batch(n: usize) -> Dataset {
    let headers = [
        "variant_id",
        "group_category",
        "lifetime_lots_sold",
        "lifetime_active_days",
        "lifetime_lots_sold_days",
        "lifetime_net_delivered_buyers",
        "last3_months_lots_sold",
        "last3_months_active_days",
        "last3_months_lots_sold_days",
        "last3_months_net_delivered_buyers",
    ]
    .map(str::to_string)
    .to_vec();

    let rows = (0..n)
        .map(|i| {
            let seed = (i * 7919) % 1000;
            let recent_days = if i % 50 == 0 { 0 } else { 10 + seed % 80 };
            vec![
                format!("V-{i}"),
                CATEGORIES[i % CATEGORIES.len()].to_string(),
                (seed * 3).to_string(),
                (100 + seed % 200).to_string(),
                (seed % 150).to_string(),
                (seed / 2).to_string(),
                (seed % 300).to_string(),
                recent_days.to_string(),
                (recent_days / 2).to_string(),
                if i % 97 == 0 { String::new() } else { (seed % 120).to_string() },
            ]
        })
        .collect();

    Dataset::new(headers, rows)
}

fn bench_engine_run(c: &mut Criterion) {
    let engine = Engine::default();
    let mut group = c.benchmark_group("engine_run");
    for n in [1_000, 10_000] {
        let dataset = build_batch(n);
        group.bench_function(format!("{n}_skus"), |b| {
            b.iter(|| black_box(engine.run(black_box(&dataset)).unwrap().results().len()));
        });
    }
    group.finish();
}

fn bench_percentile_ranks(c: &mut Criterion) {
    let values: Vec<f64> = (0..10_000).map(|i| ((i * 31) % 997) as f64 / 9.97).collect();
    c.bench_function("percentile_ranks_10k", |b| {
        b.iter(|| percentile_ranks(black_box(&values)));
    });
}

fn bench_output_rows(c: &mut Criterion) {
    let engine = Engine::default();
    let dataset = build_batch(10_000);
    let scored = engine.run(&dataset).unwrap();
    c.bench_function("format_rows_10k", |b| {
        b.iter(|| black_box(scored.rows()));
    });
}

criterion_group!(
    benches,
    bench_engine_run,
    bench_percentile_ranks,
    bench_output_rows
);
criterion_main!(benches);

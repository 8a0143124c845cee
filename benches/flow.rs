use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tickbook::sim::{MarketSim, SimConfig};
use tickbook::OrderBook;

const SEED: u64 = 0xC0FFEE;

fn mixed_flow(c: &mut Criterion) {
    c.bench_function("mixed flow 10k ops", |b| {
        b.iter(|| {
            let mut book = OrderBook::default();
            let mut sim = MarketSim::new(SimConfig::default(), SEED);
            let mut trades = 0usize;
            for _ in 0..10_000 {
                trades += sim.step(&mut book).len();
            }
            black_box(trades)
        });
    });
}

fn churn_heavy_flow(c: &mut Criterion) {
    let config = SimConfig {
        add_pct: 40,
        cancel_pct: 40,
        ..SimConfig::default()
    };
    c.bench_function("churn heavy flow 10k ops", |b| {
        b.iter(|| {
            let mut book = OrderBook::default();
            let mut sim = MarketSim::new(config.clone(), SEED);
            for _ in 0..10_000 {
                black_box(sim.step(&mut book));
            }
            black_box(book.order_count())
        });
    });
}

criterion_group!(benches, mixed_flow, churn_heavy_flow);
criterion_main!(benches);

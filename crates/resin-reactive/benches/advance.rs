//! Benchmarks for frame advancement.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rhizome_resin_reactive::{Grid, GridConfig, Level};

fn signal(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 + 0.5 * (i as f32 * 0.05).sin())
        .collect()
}

fn bench_levels(c: &mut Criterion) {
    let samples = signal(1024);

    for level in Level::ALL {
        let mut grid =
            Grid::from_config(GridConfig::new(90, 160).with_level(level).with_seed(1)).unwrap();
        let mut now = 0.0;

        c.bench_function(&format!("advance_160x90_{}", level.name()), |b| {
            b.iter(|| {
                now += 1.0 / 60.0;
                grid.advance(black_box(&samples), now).unwrap();
            })
        });
    }
}

fn bench_signal_shorter_than_grid(c: &mut Criterion) {
    let samples = signal(64);
    let mut grid =
        Grid::from_config(GridConfig::new(90, 160).with_level(Level::Rules).with_seed(1)).unwrap();

    c.bench_function("advance_rules_wrapped_64", |b| {
        b.iter(|| grid.advance(black_box(&samples), 0.0).unwrap())
    });
}

criterion_group!(benches, bench_levels, bench_signal_shorter_than_grid);
criterion_main!(benches);

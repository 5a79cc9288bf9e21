use core::hint::black_box;

use chain_hash::SparseGrid;
use chain_hash::geometry::Circle;
use chain_hash::geometry::Rectangle;
use chain_hash::geometry::Vector2;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand_distr::Normal;

type CircleGrid = SparseGrid<u32, Circle<f32>>;

const COUNTS: &[usize] = &[1 << 8, 1 << 11, 1 << 14];
const TILE_SIDES: &[f32] = &[1.0, 4.0, 16.0];
const WORLD_SPREAD: f32 = 100.0;

/// Circles clustered around the origin.
fn random_circles(rng: &mut SmallRng, count: usize) -> Vec<Circle<f32>> {
    let position = Normal::new(0.0f32, WORLD_SPREAD).unwrap();
    (0..count)
        .map(|_| {
            Circle::new(
                Vector2::new(rng.sample(position), rng.sample(position)),
                rng.random_range(0.1..2.0),
            )
        })
        .collect()
}

fn populated(tile_side: f32, circles: &[Circle<f32>]) -> CircleGrid {
    let mut grid = CircleGrid::new(tile_side);
    for (key, circle) in circles.iter().enumerate() {
        grid.insert(key as u32, *circle);
    }
    grid
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_insert");
    let mut rng = SmallRng::seed_from_u64(0x5eed);

    for &count in COUNTS {
        let circles = random_circles(&mut rng, count);
        group.throughput(Throughput::Elements(count as u64));
        for &tile_side in TILE_SIDES {
            group.bench_function(format!("{tile_side}/{count}"), |b| {
                b.iter(|| black_box(populated(tile_side, &circles)))
            });
        }
    }

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_update");
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    let step = Normal::new(0.0f32, 0.5).unwrap();

    for &count in COUNTS {
        let circles = random_circles(&mut rng, count);
        let moved = circles
            .iter()
            .map(|circle| {
                let offset = Vector2::new(rng.sample(step), rng.sample(step));
                Circle::new(circle.center() + offset, circle.radius())
            })
            .collect::<Vec<_>>();

        group.throughput(Throughput::Elements(count as u64));
        for &tile_side in TILE_SIDES {
            let grid = populated(tile_side, &circles);
            group.bench_function(format!("{tile_side}/{count}"), |b| {
                b.iter_batched(
                    || grid.clone(),
                    |mut grid| {
                        for (key, circle) in moved.iter().enumerate() {
                            black_box(grid.update(key as u32, *circle));
                        }
                        grid
                    },
                    BatchSize::LargeInput,
                )
            });
        }
    }

    group.finish();
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_find");
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    let query_center = Normal::new(0.0f32, WORLD_SPREAD).unwrap();

    for &count in COUNTS {
        let circles = random_circles(&mut rng, count);
        let queries = (0..256)
            .map(|_| {
                let center = Vector2::new(rng.sample(query_center), rng.sample(query_center));
                let half = Vector2::splat(rng.random_range(1.0..10.0));
                Rectangle::new(center - half, center + half)
            })
            .collect::<Vec<_>>();

        group.throughput(Throughput::Elements(queries.len() as u64));
        for &tile_side in TILE_SIDES {
            let grid = populated(tile_side, &circles);
            group.bench_function(format!("{tile_side}/{count}"), |b| {
                b.iter(|| {
                    for query in queries.iter() {
                        black_box(grid.find(query));
                    }
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_update, bench_find);
criterion_main!(benches);

use core::hash::BuildHasher;
use core::hash::Hash;
use core::hint::black_box;
use std::collections::HashMap as StdHashMap;

use chain_hash::HashMap as ChainHashMap;
use chain_hash::HashMultiMap as ChainHashMultiMap;
use chain_hash::hash_table::Unique;
use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::HashMap as HashbrownHashMap;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use siphasher::sip::SipHasher;

/// Every map under test hashes with the same keyed SipHash so only the table
/// layout differs.
#[derive(Clone, Copy, Default)]
struct SipBuildHasher {
    k1: u64,
    k2: u64,
}

impl SipBuildHasher {
    fn random() -> Self {
        Self {
            k1: OsRng.try_next_u64().unwrap(),
            k2: OsRng.try_next_u64().unwrap(),
        }
    }
}

impl BuildHasher for SipBuildHasher {
    type Hasher = SipHasher;

    fn build_hasher(&self) -> Self::Hasher {
        SipHasher::new_with_keys(self.k1, self.k2)
    }
}

type Chain<K> = ChainHashMap<K, u64, Unique, SipBuildHasher>;
type ChainMulti<K> = ChainHashMultiMap<K, u64, SipBuildHasher>;
type Hashbrown<K> = HashbrownHashMap<K, u64, SipBuildHasher>;
type Std<K> = StdHashMap<K, u64, SipBuildHasher>;

trait BenchKey: Clone + Hash + Eq {
    fn new(key: u64) -> Self;
}

impl BenchKey for u64 {
    fn new(key: u64) -> Self {
        black_box(key)
    }
}

impl BenchKey for String {
    fn new(key: u64) -> Self {
        black_box(format!("key_{:016X}", key))
    }
}

const SIZES: &[usize] = &[
    (1 << 8),
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

#[derive(Clone, Copy)]
enum Operation {
    Insert,
    Find,
    Remove,
}

fn random_keys<K: BenchKey>(count: usize) -> Vec<K> {
    let mut rng = SmallRng::from_os_rng();
    (0..count).map(|_| K::new(rng.random())).collect()
}

fn shuffled<T: Clone>(items: &[T]) -> Vec<T> {
    let mut items = items.to_vec();
    items.shuffle(&mut SmallRng::from_os_rng());
    items
}

fn bench_insert_random<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("insert_random_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(size);
        let hasher = SipBuildHasher::random();
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("chain_hash/{size}"), |b| {
            b.iter_batched(
                || shuffled(&keys),
                |keys| {
                    let mut map = Chain::<K>::with_hasher(hasher);
                    for key in keys {
                        black_box(map.insert(key, 0));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || shuffled(&keys),
                |keys| {
                    let mut map = Hashbrown::<K>::with_hasher(hasher);
                    for key in keys {
                        black_box(map.insert(key, 0));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("std/{size}"), |b| {
            b.iter_batched(
                || shuffled(&keys),
                |keys| {
                    let mut map = Std::<K>::with_hasher(hasher);
                    for key in keys {
                        black_box(map.insert(key, 0));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_insert_reserved<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "insert_reserved_{}",
        core::any::type_name::<K>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(size);
        let hasher = SipBuildHasher::random();
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("chain_hash/{size}"), |b| {
            b.iter_batched(
                || shuffled(&keys),
                |keys| {
                    let mut map = Chain::<K>::with_hasher(hasher);
                    map.reserve(size);
                    for key in keys {
                        black_box(map.insert(key, 0));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || shuffled(&keys),
                |keys| {
                    let mut map = Hashbrown::<K>::with_capacity_and_hasher(size, hasher);
                    for key in keys {
                        black_box(map.insert(key, 0));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit_miss<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("find_hit_miss_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let hasher = SipBuildHasher::random();
        // Even keys are stored, odd keys miss.
        let stored = (0..size as u64 * 2)
            .step_by(2)
            .map(K::new)
            .collect::<Vec<_>>();
        let probes = (0..size as u64 * 2).map(K::new).collect::<Vec<_>>();

        let mut chain = Chain::<K>::with_hasher(hasher);
        let mut hashbrown = Hashbrown::<K>::with_hasher(hasher);
        let mut std_map = Std::<K>::with_hasher(hasher);
        for key in stored {
            chain.insert(key.clone(), 0);
            hashbrown.insert(key.clone(), 0);
            std_map.insert(key, 0);
        }

        group.throughput(Throughput::Elements(probes.len() as u64));

        group.bench_function(format!("chain_hash/{size}"), |b| {
            b.iter_batched(
                || shuffled(&probes),
                |probes| {
                    for key in probes.iter() {
                        black_box(chain.get(key));
                    }
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || shuffled(&probes),
                |probes| {
                    for key in probes.iter() {
                        black_box(hashbrown.get(key));
                    }
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("std/{size}"), |b| {
            b.iter_batched(
                || shuffled(&probes),
                |probes| {
                    for key in probes.iter() {
                        black_box(std_map.get(key));
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_by_handle<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "find_by_handle_{}",
        core::any::type_name::<K>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(size);
        let mut map = Chain::<K>::with_hasher(SipBuildHasher::random());
        let handles = keys
            .into_iter()
            .map(|key| map.insert(key, 0).0)
            .collect::<Vec<_>>();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("chain_hash/{size}"), |b| {
            b.iter_batched(
                || shuffled(&handles),
                |handles| {
                    for handle in handles {
                        black_box(map.get_at(handle));
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_remove<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("remove_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(size);
        let hasher = SipBuildHasher::random();
        let entries = keys
            .iter()
            .cloned()
            .map(|key| (key, 0))
            .collect::<Vec<_>>();
        let mut chain_map = Chain::<K>::with_hasher(hasher);
        chain_map.extend(entries.iter().cloned());
        let mut hashbrown_map = Hashbrown::<K>::with_hasher(hasher);
        hashbrown_map.extend(entries);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("chain_hash/{size}"), |b| {
            b.iter_batched(
                || (chain_map.clone(), shuffled(&keys)),
                |(mut map, keys)| {
                    for key in keys.iter() {
                        black_box(map.remove(key));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || (hashbrown_map.clone(), shuffled(&keys)),
                |(mut map, keys)| {
                    for key in keys.iter() {
                        black_box(map.remove(key));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_iteration<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("iteration_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let hasher = SipBuildHasher::random();
        let mut chain = Chain::<K>::with_hasher(hasher);
        let mut hashbrown = Hashbrown::<K>::with_hasher(hasher);
        for key in random_keys::<K>(size) {
            chain.insert(key.clone(), 1);
            hashbrown.insert(key, 1);
        }

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("chain_hash/{size}"), |b| {
            b.iter(|| black_box(chain.values().sum::<u64>()))
        });
        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| black_box(hashbrown.values().sum::<u64>()))
        });
    }

    group.finish();
}

fn bench_mixed_zipf<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("mixed_zipf_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let mut rng = SmallRng::from_os_rng();
        let op_distr = Zipf::new(3.0, 1.0).unwrap();
        let key_distr = Zipf::new(size as f64 * 2.0, 1.0).unwrap();
        let operations = (0..size * 3)
            .map(|_| {
                let op = match rng.sample(op_distr) as u32 {
                    1 => Operation::Find,
                    2 => Operation::Insert,
                    _ => Operation::Remove,
                };
                (op, K::new(rng.sample(key_distr) as u64))
            })
            .collect::<Vec<_>>();
        let hasher = SipBuildHasher::random();

        group.throughput(Throughput::Elements(operations.len() as u64));

        group.bench_function(format!("chain_hash/{size}"), |b| {
            b.iter_batched(
                || shuffled(&operations),
                |operations| {
                    let mut map = Chain::<K>::with_hasher(hasher);
                    for (op, key) in operations {
                        match op {
                            Operation::Insert => {
                                black_box(map.insert_or_assign(key, 1));
                            }
                            Operation::Find => {
                                black_box(map.get(&key));
                            }
                            Operation::Remove => {
                                black_box(map.remove(&key));
                            }
                        }
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || shuffled(&operations),
                |operations| {
                    let mut map = Hashbrown::<K>::with_hasher(hasher);
                    for (op, key) in operations {
                        match op {
                            Operation::Insert => {
                                black_box(map.insert(key, 1));
                            }
                            Operation::Find => {
                                black_box(map.get(&key));
                            }
                            Operation::Remove => {
                                black_box(map.remove(&key));
                            }
                        }
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_max_load_factor<const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group("max_load_factor_u64");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<u64>(size);
        group.throughput(Throughput::Elements(size as u64));

        for max_load_factor in [0.5f32, 1.0, 4.0] {
            group.bench_function(format!("insert_find/{max_load_factor}/{size}"), |b| {
                b.iter_batched(
                    || shuffled(&keys),
                    |keys| {
                        let mut map = Chain::<u64>::with_hasher(SipBuildHasher::random());
                        map.set_max_load_factor(max_load_factor).unwrap();
                        for &key in keys.iter() {
                            map.insert(key, key);
                        }
                        for key in keys.iter() {
                            black_box(map.get(key));
                        }
                        black_box(map)
                    },
                    BatchSize::SmallInput,
                )
            });
        }
    }

    group.finish();
}

fn bench_multimap_equal_range<const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group("multimap_equal_range_u64");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    const DUPLICATES: u64 = 8;

    for &size in SIZES[..=MAX_SIZE].iter() {
        let distinct = size as u64 / DUPLICATES;
        let mut multi = ChainMulti::<u64>::with_hasher(SipBuildHasher::random());
        for key in 0..distinct {
            for value in 0..DUPLICATES {
                multi.insert(key, value);
            }
        }
        let mut probes = (0..distinct).collect::<Vec<_>>();
        probes.shuffle(&mut SmallRng::from_os_rng());

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("chain_hash/{size}"), |b| {
            b.iter(|| {
                for key in probes.iter() {
                    black_box(multi.equal_range(key).map(|(_, v)| *v).sum::<u64>());
                }
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_random::<u64, 5>,
    bench_insert_random::<String, 4>,
    bench_insert_reserved::<u64, 5>,
    bench_insert_reserved::<String, 4>,
    bench_find_hit_miss::<u64, 5>,
    bench_find_hit_miss::<String, 4>,
    bench_find_by_handle::<u64, 5>,
    bench_remove::<u64, 5>,
    bench_remove::<String, 4>,
    bench_iteration::<u64, 5>,
    bench_mixed_zipf::<u64, 5>,
    bench_mixed_zipf::<String, 4>,
    bench_max_load_factor::<4>,
    bench_multimap_equal_range::<5>,
);

criterion_main!(benches);

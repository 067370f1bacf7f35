#![allow(missing_docs)]
//! Benchmarks for light propagation.

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use lumen_core::config::LightConfig;
use lumen_core::light_engine::{LightQueue, LightingEngine, SpatialKey};
use lumen_core::world::LightWorld;
use lumen_utils::{BlockId, BlockPos, ChunkPos};

/// Creates a world with `radius` chunks loaded around the origin chunk.
fn create_world(config: &LightConfig, radius: i32) -> LightWorld {
    let mut world = LightWorld::from_config(config).unwrap();
    for x in -radius..=radius {
        for z in -radius..=radius {
            world.load_chunk(ChunkPos::new(x, z));
        }
    }
    world
}

fn bench_queue(c: &mut Criterion) {
    c.bench_function("queue_enqueue_dequeue_4096", |b| {
        let mut queue = LightQueue::new();
        b.iter(|| {
            queue.new_generation();
            for i in 0..4096 {
                queue.enqueue(SpatialKey::encode(i & 63, 64, i >> 6));
            }
            while let Some(key) = queue.dequeue() {
                black_box(key);
            }
        });
    });
}

fn bench_torches(c: &mut Criterion) {
    let config = LightConfig {
        has_sky: false,
        ..LightConfig::default()
    };
    let mut group = c.benchmark_group("block_light");

    for torches in [1, 16, 64] {
        group.bench_with_input(BenchmarkId::new("place_torches", torches), &torches, |b, &n| {
            b.iter_batched(
                || {
                    let world = create_world(&config, 2);
                    let torch = world.registry().id_of("torch").unwrap();
                    (world, LightingEngine::from_config(&config), torch)
                },
                |(mut world, mut engine, torch)| {
                    for i in 0..n {
                        let pos = BlockPos::new((i * 7) % 48 - 16, 64 + i % 8, (i * 13) % 48 - 16);
                        world.set_block_and_schedule(&mut engine, pos, torch);
                    }
                    black_box(engine.process_updates(&mut world).unwrap());
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.bench_function("remove_torch", |b| {
        b.iter_batched(
            || {
                let mut world = create_world(&config, 1);
                let mut engine = LightingEngine::from_config(&config);
                let torch = world.registry().id_of("torch").unwrap();
                world.set_block_and_schedule(&mut engine, BlockPos::new(8, 64, 8), torch);
                engine.process_updates(&mut world).unwrap();
                (world, engine)
            },
            |(mut world, mut engine)| {
                world.set_block_and_schedule(&mut engine, BlockPos::new(8, 64, 8), BlockId::AIR);
                black_box(engine.process_updates(&mut world).unwrap());
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

fn bench_sky(c: &mut Criterion) {
    let config = LightConfig::default();

    c.bench_function("sky_roof_8x8", |b| {
        b.iter_batched(
            || {
                let world = create_world(&config, 1);
                let stone = world.registry().id_of("stone").unwrap();
                (world, LightingEngine::from_config(&config), stone)
            },
            |(mut world, mut engine, stone)| {
                for x in 0..8 {
                    for z in 0..8 {
                        world.set_block_and_schedule(&mut engine, BlockPos::new(x, 80, z), stone);
                    }
                }
                black_box(engine.process_updates(&mut world).unwrap());
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_queue, bench_torches, bench_sky);
criterion_main!(benches);

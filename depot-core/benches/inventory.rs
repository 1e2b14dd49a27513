#![allow(missing_docs)]
//! Benchmarks for smart fridge inventory grouping and dispensing.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use depot_core::smart_fridge::{self, DispenseRequest};
use depot_core::{DepotConfig, World};
use depot_registry::{Category, EntityPrototype, Transform, Volume};
use depot_utils::{EntityId, FixedPoint2};

const CATEGORIES: [&str; 4] = ["drinks", "produce", "meat", "dairy"];
const NAMES: [&str; 6] = ["Cola", "Water", "apple", "steak", "milk", "cheese"];

/// Builds a fridge holding `count` items spread over a few categories and names.
fn stocked_fridge(count: usize) -> (World, EntityId) {
    let mut world = World::new(DepotConfig::default());
    let fridge = world.spawn(&EntityPrototype {
        transform: Some(Transform {
            anchored: true,
            ..Transform::default()
        }),
        ..EntityPrototype::named("smart fridge")
    });
    smart_fridge::init(&mut world, fridge);

    for i in 0..count {
        let item = world.spawn(&EntityPrototype {
            item: true,
            category: Some(Category(CATEGORIES[i % CATEGORIES.len()].to_string())),
            volume: Some(Volume {
                compartments: vec![FixedPoint2::new((i % 3) as i32 * 10)],
            }),
            ..EntityPrototype::named(NAMES[i % NAMES.len()])
        });
        smart_fridge::after_insert(&mut world, fridge, item, None, true);
    }
    (world, fridge)
}

fn bench_get_inventory(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_inventory");

    for count in [8, 64, 256] {
        let (world, fridge) = stocked_fridge(count);
        group.bench_with_input(BenchmarkId::new("items", count), &count, |b, _| {
            b.iter(|| black_box(smart_fridge::get_inventory(&world, black_box(fridge))));
        });
    }

    group.finish();
}

fn bench_dispense(c: &mut Criterion) {
    c.bench_function("dispense_and_republish", |b| {
        b.iter_batched(
            || {
                let (mut world, fridge) = stocked_fridge(64);
                let actor = world.spawn(&EntityPrototype::named("chef"));
                let item = smart_fridge::get_inventory(&world, fridge)[0].items[0].clone();
                (world, fridge, actor, DispenseRequest { item, amount: 4 })
            },
            |(mut world, fridge, actor, request)| {
                black_box(smart_fridge::dispense(&mut world, fridge, actor, &request));
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_get_inventory, bench_dispense);
criterion_main!(benches);

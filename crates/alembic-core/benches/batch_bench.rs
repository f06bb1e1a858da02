//! Criterion benchmarks for recipe matching and batch arithmetic.
//!
//! - `match`: first-match search over a 200-recipe table.
//! - `batches`: batch limits plus a full apply on a weaver layout.

use alembic_core::craft::{CraftLayout, apply_batches};
use alembic_core::fluid::FluidTank;
use alembic_core::matcher::{BatchInputs, match_recipe, max_batches};
use alembic_core::recipe::{Ingredient, Recipe};
use alembic_core::registry::RecipeBook;
use alembic_core::rng::SimRng;
use alembic_core::test_utils::*;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const CATALYST_SLOTS: [usize; 6] = [1, 2, 3, 4, 5, 6];

fn large_book() -> RecipeBook<Recipe> {
    let mut book = RecipeBook::new();
    for i in 0..200 {
        let recipe = Recipe::new(format!("bench:r{i}"), Ingredient::new(format!("bench:in{}", i % 20), 1), 6400)
            .catalyst(format!("bench:c{}", i % 7), 1)
            .catalyst(format!("bench:c{}", (i + 3) % 7), 2)
            .output(format!("bench:out{i}"), 1);
        let _ = book.upsert(recipe);
    }
    let _ = book.upsert(weave_steel());
    book
}

fn bench_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("match");
    group.sample_size(50);

    let book = large_book();
    let input = stack("minecraft:iron_ingot", 32);
    let catalysts = slots(&[Some(("minecraft:coal", 16)), None, None, None, None, None]);
    let tank = FluidTank::filled("lava", 4000, 4000);

    group.bench_function("last_of_201_recipes", |b| {
        b.iter(|| {
            black_box(match_recipe(
                book.iter(),
                Some(black_box(&input)),
                black_box(&catalysts),
                Some(&tank),
            ))
        });
    });

    group.finish();
}

fn bench_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("batches");
    group.sample_size(50);

    let recipe = weave_steel();
    let inventory = slots(&[
        Some(("minecraft:iron_ingot", 64)),
        Some(("minecraft:coal", 32)),
        None,
        None,
        None,
        None,
        None,
        None,
        None,
    ]);
    let tank = FluidTank::filled("lava", 4000, 4000);

    group.bench_function("max_batches", |b| {
        b.iter(|| {
            let inputs = BatchInputs {
                input: inventory[0].as_ref(),
                catalysts: &inventory[1..7],
                tank: Some(&tank),
                output: inventory[8].as_ref(),
                byproduct: inventory[7].as_ref(),
            };
            black_box(max_batches(&recipe, &inputs))
        });
    });

    let layout = CraftLayout {
        input: 0,
        catalysts: &CATALYST_SLOTS,
        output: Some(8),
        byproduct: Some(7),
    };
    group.bench_function("apply_8_batches", |b| {
        b.iter(|| {
            let mut slots = inventory.clone();
            let mut tank = tank.clone();
            let mut rng = SimRng::new(7);
            black_box(apply_batches(&recipe, 8, &layout, &mut slots, Some(&mut tank), &mut rng))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_match, bench_batches);
criterion_main!(benches);

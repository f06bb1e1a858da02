//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::fixed::Fixed64;
use crate::fluid::{FillableContainer, FluidContainer, LIQUIFIED_AETHERIUM};
use crate::id::{FluidType, ItemId};
use crate::item::ItemStack;
use crate::recipe::{Amount, Ingredient, Recipe};
use crate::registry::Catalog;
use std::collections::BTreeMap;

// ===========================================================================
// Values
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

pub fn stack(item: &str, amount: u32) -> ItemStack {
    ItemStack::new(item, amount)
}

/// Slot contents from `(item, amount)` pairs; `None` is an empty slot.
pub fn slots(contents: &[Option<(&str, u32)>]) -> Vec<Option<ItemStack>> {
    contents
        .iter()
        .map(|slot| slot.map(|(item, amount)| stack(item, amount)))
        .collect()
}

// ===========================================================================
// Recipes
// ===========================================================================

/// `aetherium x1 -> liquified_aetherium 1000 mB`, cost 9600.
pub fn liquify_aetherium() -> Recipe {
    Recipe::new(
        "utilitycraft:liquify_aetherium",
        Ingredient::new("utilitycraft:aetherium", 1),
        9600,
    )
    .produces_fluid(LIQUIFIED_AETHERIUM, 1000)
    .ticks(120)
}

/// Iron into steel with two coal catalysts and a lava draw.
pub fn weave_steel() -> Recipe {
    Recipe::new(
        "test:steel",
        Ingredient::new("minecraft:iron_ingot", 2),
        6400,
    )
    .catalyst("minecraft:coal", 2)
    .consumes_fluid("lava", 250)
    .output("test:steel_ingot", 1)
    .byproduct(
        "test:slag",
        Amount::Range { min: 1, max: 2 },
        fixed(0.5),
    )
}

/// A catalog holding [`weave_steel`] and [`liquify_aetherium`], plus lava
/// buckets and aetherium capsules.
pub fn small_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    let _ = catalog.recipes.weaver.upsert(weave_steel());
    let _ = catalog.recipes.liquifier.upsert(liquify_aetherium());
    let _ = catalog.containers.upsert_container(FluidContainer {
        item: "minecraft:lava_bucket".into(),
        fluid: "lava".into(),
        amount: 1000,
        empty: Some("minecraft:bucket".into()),
    });
    let _ = catalog.containers.upsert_container(FluidContainer {
        item: "utilitycraft:liquified_aetherium_capsule_1".into(),
        fluid: LIQUIFIED_AETHERIUM.into(),
        amount: 1000,
        empty: Some("utilitycraft:empty_liquid_capsule".into()),
    });
    let mut fills = BTreeMap::new();
    fills.insert(
        FluidType::from(LIQUIFIED_AETHERIUM),
        ItemId::from("utilitycraft:liquified_aetherium_capsule_1"),
    );
    let _ = catalog.containers.upsert_fillable(FillableContainer {
        item: "utilitycraft:empty_liquid_capsule".into(),
        fills,
    });
    catalog
}

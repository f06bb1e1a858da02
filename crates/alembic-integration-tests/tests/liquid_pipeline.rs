//! Integration test: Liquified Aetherium Pipeline
//!
//! A liquifier melts aetherium into liquified aetherium; the fluid is then
//! poured into a catalyst weaver and a cloner, both of which draw it per
//! batch. All three machines run in one `MachineWorld` on the native
//! recipe tables.

use alembic_core::event::EffectKind;
use alembic_core::fluid::{FluidTank, LIQUIFIED_AETHERIUM};
use alembic_core::id::MachineId;
use alembic_core::item::{ItemSlots, ItemStack};
use alembic_core::matcher::{BatchInputs, match_recipe, max_batches};
use alembic_core::registry::MachineKind;
use alembic_core::status::MachineStatus;
use alembic_machines::{Machine, MachineSettings, MachineWorld, Upgrades};
use alembic_machines::{cloner, liquifier, weaver};
use proptest::prelude::*;

fn set_slot(world: &mut MachineWorld, id: MachineId, slot: usize, stack: ItemStack) {
    let machine = world.get_mut(id).expect("machine should be placed");
    machine.core_mut().inventory.set_slot(slot, Some(stack));
}

fn slot(world: &MachineWorld, id: MachineId, slot: usize) -> Option<(String, u32)> {
    world
        .get(id)
        .and_then(|m| m.core().inventory.slot(slot))
        .map(|s| (s.item.to_string(), s.amount))
}

fn place_liquifier(world: &mut MachineWorld, tank_capacity: u64) -> MachineId {
    let settings = MachineSettings::for_kind(MachineKind::Liquifier).with_tank_capacity(tank_capacity);
    let (id, _) = world.place(Machine::with_settings(MachineKind::Liquifier, settings));
    world.charge(id, 64_000);
    id
}

/// Drain a machine's first tank and return what came out.
fn drain(world: &mut MachineWorld, id: MachineId) -> u64 {
    world
        .get_mut(id)
        .and_then(|m| m.tank_mut(0))
        .map_or(0, |t| t.consume(t.volume()))
}

#[test]
fn three_ingots_make_three_buckets() {
    let catalog = alembic_data::native_catalog().unwrap();
    let input = ItemStack::new("utilitycraft:aetherium", 3);
    let tank = FluidTank::new(5000);

    let recipe = match_recipe(&catalog.recipes.liquifier, Some(&input), &[], Some(&tank))
        .expect("aetherium should melt");
    let inputs = BatchInputs {
        input: Some(&input),
        tank: Some(&tank),
        ..BatchInputs::default()
    };
    assert_eq!(max_batches(recipe, &inputs), 3);

    let mut world = MachineWorld::new(catalog);
    let id = place_liquifier(&mut world, 5000);
    set_slot(&mut world, id, liquifier::INPUT_SLOT, input);

    // 9600 at 30 per tick: 320 ticks charging plus one completing, per batch.
    let crafted = world.run(1000);
    assert_eq!(crafted.len(), 3);

    let machine = world.get(id).unwrap();
    assert!(machine.core().inventory.slot(liquifier::INPUT_SLOT).is_none());
    let tank = machine.tank(0).unwrap();
    assert_eq!(tank.volume(), 3000);
    assert_eq!(tank.fluid().map(|f| f.as_str()), Some(LIQUIFIED_AETHERIUM));
    assert_eq!(machine.status(), &MachineStatus::NoInput);
}

#[test]
fn liquifier_feeds_the_weaver() {
    let mut world = MachineWorld::new(alembic_data::native_catalog().unwrap());
    let melter = place_liquifier(&mut world, 16_000);
    set_slot(&mut world, melter, liquifier::INPUT_SLOT, ItemStack::new("utilitycraft:aetherium", 1));
    world.run(330);
    let poured = drain(&mut world, melter);
    assert_eq!(poured, 1000);

    let (loom, _) = world.place(Machine::new(MachineKind::Weaver));
    world.charge(loom, 100_000);
    assert_eq!(world.fill(loom, 0, &LIQUIFIED_AETHERIUM.into(), poured), 1000);
    set_slot(&mut world, loom, weaver::INPUT_SLOT, ItemStack::new("utilitycraft:crying_obsidian_dust", 8));
    set_slot(&mut world, loom, weaver::CATALYST_SLOTS[0], ItemStack::new("minecraft:glowstone_dust", 4));
    set_slot(&mut world, loom, weaver::CATALYST_SLOTS[3], ItemStack::new("utilitycraft:energized_iron_dust", 2));

    // Two batches at 5400 each, 180 per tick. Each one completes as soon as
    // it is paid for: 30 ticks charging plus one completing.
    let crafted = world.run(70);
    assert_eq!(crafted.len(), 2);
    for (owner, effect) in &crafted {
        assert_eq!(*owner, loom);
        assert!(matches!(
            &effect.kind,
            EffectKind::Crafted { recipe, batches: 1 } if recipe.as_str() == "utilitycraft:refined_obsidian_conversion"
        ));
    }
    assert_eq!(crafted[1].1.tick - crafted[0].1.tick, 31);

    assert_eq!(
        slot(&world, loom, weaver::OUTPUT_SLOT),
        Some(("utilitycraft:refined_obsidian_dust".to_owned(), 4))
    );
    assert!(slot(&world, loom, weaver::INPUT_SLOT).is_none());
    for catalyst in weaver::CATALYST_SLOTS {
        assert!(slot(&world, loom, catalyst).is_none());
    }
    let obsidian = slot(&world, loom, weaver::BYPRODUCT_SLOT).map_or(0, |(_, n)| n);
    assert!(obsidian <= 2);
    assert_eq!(world.get(loom).and_then(|m| m.tank(0)).map(FluidTank::volume), Some(500));
    assert_eq!(world.get(loom).unwrap().status(), &MachineStatus::NoInput);
}

#[test]
fn liquifier_feeds_the_cloner() {
    let mut world = MachineWorld::new(alembic_data::native_catalog().unwrap());
    let melter = place_liquifier(&mut world, 16_000);
    set_slot(&mut world, melter, liquifier::INPUT_SLOT, ItemStack::new("utilitycraft:aetherium", 3));
    world.run(1000);
    let poured = drain(&mut world, melter);
    assert_eq!(poured, 3000);

    // The fastest speed level takes 60 s and 3 B.
    let settings = MachineSettings::for_kind(MachineKind::Cloner).with_upgrades(Upgrades { speed: 8 });
    let (copier, _) = world.place(Machine::with_settings(MachineKind::Cloner, settings));
    world.charge(copier, 2_000_000);
    world.fill(copier, 0, &LIQUIFIED_AETHERIUM.into(), poured);
    set_slot(&mut world, copier, cloner::TEMPLATE_SLOT, ItemStack::new("minecraft:diamond", 1));

    let crafted = world.run(1300);
    assert_eq!(crafted.len(), 1);
    assert_eq!(crafted[0].0, copier);
    assert_eq!(
        slot(&world, copier, cloner::COPY_SLOT),
        Some(("minecraft:diamond".to_owned(), 1))
    );
    assert_eq!(
        slot(&world, copier, cloner::ORIGINAL_SLOT),
        Some(("minecraft:diamond".to_owned(), 1))
    );
    assert_eq!(world.get(copier).and_then(|m| m.tank(0)).map(FluidTank::volume), Some(0));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn liquifier_never_overfills(ingots in 1u32..6, capacity in 0u64..6000) {
        let mut world = MachineWorld::new(alembic_data::native_catalog().unwrap());
        let id = place_liquifier(&mut world, capacity);
        set_slot(&mut world, id, liquifier::INPUT_SLOT, ItemStack::new("utilitycraft:aetherium", ingots));
        world.run(u64::from(ingots) * 321 + 10);

        let expected = u64::from(ingots).min(capacity / 1000);
        let machine = world.get(id).unwrap();
        prop_assert_eq!(machine.tank(0).map(FluidTank::volume), Some(expected * 1000));
        let left = machine.core().inventory.slot(liquifier::INPUT_SLOT).map_or(0, |s| s.amount);
        prop_assert_eq!(u64::from(left), u64::from(ingots) - expected);
        if expected < u64::from(ingots) {
            prop_assert_eq!(machine.status(), &MachineStatus::TankFull);
        }
    }
}

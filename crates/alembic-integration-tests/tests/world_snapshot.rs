//! Integration test: World Snapshots
//!
//! A world saved mid-run and restored against the same catalog must
//! continue exactly as the original: same effects on the same ticks, same
//! byproduct rolls, same final state.

use alembic_core::fluid::WATER;
use alembic_core::id::MachineId;
use alembic_core::item::{ItemSlots, ItemStack};
use alembic_core::registry::MachineKind;
use alembic_core::snapshot::DeserializeError;
use alembic_machines::cryo::{CATALYST_SLOT, STABILIZER_INPUT_SLOT};
use alembic_machines::{Machine, MachineSettings, MachineWorld};

fn seeded(kind: MachineKind, seed: u64) -> Machine {
    Machine::with_settings(kind, MachineSettings::for_kind(kind).with_seed(seed))
}

fn load(world: &mut MachineWorld, id: MachineId, slot: usize, item: &str, amount: u32) {
    if let Some(m) = world.get_mut(id) {
        m.core_mut()
            .inventory
            .set_slot(slot, Some(ItemStack::new(item, amount)));
    }
}

fn busy_world() -> (MachineWorld, Vec<MachineId>) {
    let mut world = MachineWorld::new(alembic_data::native_catalog().unwrap());

    let (melter, _) = world.place(seeded(MachineKind::Liquifier, 11));
    load(&mut world, melter, 3, "utilitycraft:aetherium", 6);

    let (residue, _) = world.place(seeded(MachineKind::ResidueProcessor, 12));
    load(&mut world, residue, 3, "utilitycraft:void_essence", 16);

    let (cryo, _) = world.place(seeded(MachineKind::CryoChamber, 13));
    world.fill(cryo, 0, &WATER.into(), 6000);
    load(&mut world, cryo, CATALYST_SLOT, "utilitycraft:raw_titanium", 4);
    load(&mut world, cryo, STABILIZER_INPUT_SLOT, "utilitycraft:unstable_aetherium_ingot", 3);

    let ids = vec![melter, residue, cryo];
    for &id in &ids {
        world.charge(id, 256_000);
    }
    (world, ids)
}

#[test]
fn restored_world_replays_identically() {
    let (mut world, ids) = busy_world();
    world.run(250);

    let bytes = world.save().unwrap();
    let mut restored =
        MachineWorld::load(alembic_data::native_catalog().unwrap(), &bytes).unwrap();
    assert_eq!(restored.clock(), world.clock());
    assert_eq!(restored.len(), ids.len());
    for &id in &ids {
        assert_eq!(restored.get(id), world.get(id));
    }

    for _ in 0..1500 {
        assert_eq!(world.step(), restored.step());
    }
    for &id in &ids {
        assert_eq!(restored.get(id), world.get(id));
    }
}

#[test]
fn removed_machines_stay_removed() {
    let (mut world, ids) = busy_world();
    world.run(10);
    let dropped = world.remove(ids[1]).unwrap();
    assert!(!dropped.is_empty());

    let restored =
        MachineWorld::load(alembic_data::native_catalog().unwrap(), &world.save().unwrap()).unwrap();
    assert!(restored.get(ids[1]).is_none());
    assert!(restored.get(ids[0]).is_some());
    assert_eq!(restored.clock().tick(), 10);
}

#[test]
fn truncated_snapshot_is_rejected() {
    let (world, _) = busy_world();
    let bytes = world.save().unwrap();
    let result = MachineWorld::load(
        alembic_data::native_catalog().unwrap(),
        &bytes[..bytes.len() / 2],
    );
    assert!(matches!(result, Err(DeserializeError::Decode(_))));
}

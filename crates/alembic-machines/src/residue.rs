//! Residue processor: breaks residue down into an output and a
//! chance-rolled byproduct.

use crate::common::{Job, MachineCore, MachineSettings, TickContext};
use alembic_core::craft::CraftLayout;
use alembic_core::energy::ChargePolicy;
use alembic_core::event::Effects;
use alembic_core::item::ItemSlots;
use alembic_core::matcher::{BatchInputs, Bottleneck, batch_limits, match_items};
use alembic_core::recipe::Recipe;
use alembic_core::registry::RecipeBook;
use alembic_core::status::MachineStatus;
use serde::{Deserialize, Serialize};

pub const INPUT_SLOT: usize = 3;
pub const BYPRODUCT_SLOT: usize = 18;
pub const OUTPUT_SLOT: usize = 19;

const LAYOUT: CraftLayout<'static> = CraftLayout {
    input: INPUT_SLOT,
    catalysts: &[],
    output: Some(OUTPUT_SLOT),
    byproduct: Some(BYPRODUCT_SLOT),
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidueProcessor {
    pub core: MachineCore,
}

impl ResidueProcessor {
    pub fn new(settings: MachineSettings) -> Self {
        Self {
            core: MachineCore::new(settings),
        }
    }

    pub fn tick(&mut self, ctx: &TickContext<'_>, effects: &mut Effects) {
        match self.check(&ctx.catalog.recipes.residue) {
            Ok((recipe, batches)) => {
                let job = Job {
                    recipe,
                    batches,
                    policy: ChargePolicy::SingleBatch,
                    layout: LAYOUT,
                };
                let rate = self.core.settings.rate;
                self.core.run(job, rate, None, effects);
            }
            Err(status) => self.core.report(status, effects),
        }
    }

    fn check<'r>(&self, recipes: &'r RecipeBook<Recipe>) -> Result<(&'r Recipe, u32), MachineStatus> {
        let inv = &self.core.inventory;
        if self.core.energy.is_empty() {
            return Err(MachineStatus::NoEnergy);
        }
        if recipes.is_empty() {
            return Err(MachineStatus::NoRecipes);
        }
        let input = inv.slot(INPUT_SLOT).ok_or(MachineStatus::NoResidue)?;
        let recipe = match_items(recipes, Some(input), &[]).ok_or(MachineStatus::InvalidResidue)?;

        let output = inv.slot(OUTPUT_SLOT);
        if let (Some(out), Some(slot)) = (&recipe.output, output)
            && !slot.is(&out.item)
        {
            return Err(MachineStatus::OutputConflict);
        }
        let byproduct = inv.slot(BYPRODUCT_SLOT);
        if let (Some(bp), Some(slot)) = (&recipe.byproduct, byproduct)
            && !slot.is(&bp.item)
        {
            return Err(MachineStatus::ByproductSlotBusy);
        }

        let limits = batch_limits(
            recipe,
            &BatchInputs {
                input: Some(input),
                output,
                byproduct,
                ..BatchInputs::default()
            },
        );
        match limits.bottleneck() {
            None => Ok((recipe, limits.batches())),
            Some(Bottleneck::Output) => Err(MachineStatus::OutputFull),
            Some(Bottleneck::Byproduct) => Err(MachineStatus::ResidueFull),
            Some(_) => Err(MachineStatus::MissingItems),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alembic_core::registry::{Catalog, MachineKind};
    use alembic_core::sim::SimClock;
    use alembic_core::test_utils::*;

    fn processor() -> ResidueProcessor {
        let settings = MachineSettings::for_kind(MachineKind::ResidueProcessor)
            .with_rate(10_000)
            .with_seed(7);
        let mut machine = ResidueProcessor::new(settings);
        machine.core.energy.charge(64_000);
        machine
    }

    fn tick(machine: &mut ResidueProcessor, catalog: &Catalog, tick: u64) {
        let ctx = TickContext::new(SimClock::at(tick), catalog);
        let mut effects = Effects::new(tick);
        machine.tick(&ctx, &mut effects);
    }

    #[test]
    fn breaks_down_void_essence() {
        let catalog = alembic_data::native_catalog().unwrap();
        let mut machine = processor();
        machine
            .core
            .inventory
            .set_slot(INPUT_SLOT, Some(stack("utilitycraft:void_essence", 2)));

        // Cost 5200 at 10000 per tick: charge, complete, charge, complete.
        for t in 0..4 {
            tick(&mut machine, &catalog, t);
        }
        let inv = &machine.core.inventory;
        assert!(inv.slot(INPUT_SLOT).is_none());
        assert_eq!(
            inv.slot(OUTPUT_SLOT).map(|s| (s.item.as_str(), s.amount)),
            Some(("utilitycraft:aetherium_shard", 4))
        );
        let nuggets = inv.slot(BYPRODUCT_SLOT).map_or(0, |s| s.amount);
        assert!(nuggets <= 4 && nuggets % 2 == 0);
    }

    #[test]
    fn status_order() {
        let catalog = alembic_data::native_catalog().unwrap();
        let mut machine = processor();
        tick(&mut machine, &catalog, 0);
        assert_eq!(machine.core.status(), &MachineStatus::NoResidue);
        assert_eq!(machine.core.status().to_string(), "Insert Residue");

        let inv = &mut machine.core.inventory;
        inv.set_slot(INPUT_SLOT, Some(stack("minecraft:dirt", 1)));
        tick(&mut machine, &catalog, 1);
        assert_eq!(machine.core.status(), &MachineStatus::InvalidResidue);

        let inv = &mut machine.core.inventory;
        inv.set_slot(INPUT_SLOT, Some(stack("utilitycraft:void_essence", 1)));
        inv.set_slot(OUTPUT_SLOT, Some(stack("minecraft:dirt", 1)));
        tick(&mut machine, &catalog, 2);
        assert_eq!(machine.core.status(), &MachineStatus::OutputConflict);

        let inv = &mut machine.core.inventory;
        inv.set_slot(OUTPUT_SLOT, None);
        inv.set_slot(BYPRODUCT_SLOT, Some(stack("minecraft:dirt", 1)));
        tick(&mut machine, &catalog, 3);
        assert_eq!(machine.core.status(), &MachineStatus::ByproductSlotBusy);

        let inv = &mut machine.core.inventory;
        inv.set_slot(BYPRODUCT_SLOT, Some(stack("minecraft:iron_nugget", 63)));
        tick(&mut machine, &catalog, 4);
        assert_eq!(machine.core.status(), &MachineStatus::ResidueFull);

        let inv = &mut machine.core.inventory;
        inv.set_slot(BYPRODUCT_SLOT, None);
        inv.set_slot(OUTPUT_SLOT, Some(stack("utilitycraft:aetherium_shard", 63)));
        tick(&mut machine, &catalog, 5);
        assert_eq!(machine.core.status(), &MachineStatus::OutputFull);
    }
}

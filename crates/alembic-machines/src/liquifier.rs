//! Liquifier: melts one input item per batch into its tank, with an
//! optional residue item.

use crate::common::{Job, MachineCore, MachineSettings, TickContext};
use alembic_core::craft::CraftLayout;
use alembic_core::energy::ChargePolicy;
use alembic_core::event::{EffectKind, Effects};
use alembic_core::fluid::FluidTank;
use alembic_core::item::ItemSlots;
use alembic_core::matcher::{BatchInputs, Bottleneck, batch_limits};
use alembic_core::recipe::Recipe;
use alembic_core::registry::RecipeBook;
use alembic_core::status::MachineStatus;
use serde::{Deserialize, Serialize};

pub const INPUT_SLOT: usize = 3;
/// Empty containers placed here are filled from the tank.
pub const CONTAINER_SLOT: usize = 10;
pub const RESIDUE_SLOT: usize = 19;

const LAYOUT: CraftLayout<'static> = CraftLayout {
    input: INPUT_SLOT,
    catalysts: &[],
    output: None,
    byproduct: Some(RESIDUE_SLOT),
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liquifier {
    pub core: MachineCore,
    pub tank: FluidTank,
}

impl Liquifier {
    pub fn new(settings: MachineSettings) -> Self {
        Self {
            tank: FluidTank::new(settings.tank_capacity),
            core: MachineCore::new(settings),
        }
    }

    pub fn tick(&mut self, ctx: &TickContext<'_>, effects: &mut Effects) {
        self.bottle(ctx, effects);

        match self.check(&ctx.catalog.recipes.liquifier) {
            Ok((recipe, batches)) => {
                let job = Job {
                    recipe,
                    batches,
                    policy: ChargePolicy::SingleBatch,
                    layout: LAYOUT,
                };
                let rate = self.core.settings.rate;
                self.core.run(job, rate, Some(&mut self.tank), effects);
            }
            Err(status) => self.core.report(status, effects),
        }
    }

    fn bottle(&mut self, ctx: &TickContext<'_>, effects: &mut Effects) {
        let Some(fluid) = self.tank.fluid().cloned() else {
            return;
        };
        if let Some(moved) =
            ctx.catalog
                .containers
                .fill_from(&mut self.core.inventory, CONTAINER_SLOT, &mut self.tank)
        {
            effects.push(EffectKind::FluidChanged {
                tank: 0,
                fluid,
                delta: -i64::try_from(moved).unwrap_or(i64::MAX),
            });
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
        let input = inv.slot(INPUT_SLOT).ok_or(MachineStatus::NoInput)?;
        let recipe = recipes
            .iter()
            .find(|r| input.is(&r.input.item))
            .ok_or(MachineStatus::InvalidInput)?;

        if let Some(spec) = &recipe.fluid
            && !self.tank.accepts(&spec.fluid)
        {
            return Err(MachineStatus::WrongFluid {
                needed: spec.fluid.clone(),
            });
        }
        let residue = inv.slot(RESIDUE_SLOT);
        if let (Some(bp), Some(slot)) = (&recipe.byproduct, residue)
            && !slot.is(&bp.item)
        {
            return Err(MachineStatus::ByproductSlotBusy);
        }

        let limits = batch_limits(
            recipe,
            &BatchInputs {
                input: Some(input),
                tank: Some(&self.tank),
                byproduct: residue,
                ..BatchInputs::default()
            },
        );
        match limits.bottleneck() {
            None => Ok((recipe, limits.batches())),
            Some(Bottleneck::Fluid) => Err(MachineStatus::TankFull),
            Some(Bottleneck::Byproduct) => Err(MachineStatus::ResidueFull),
            Some(_) => Err(MachineStatus::MissingItems),
        }
    }
}

//! Catalyst weaver: a base item, up to six catalysts and an optional fluid
//! woven into one output, with a chance-rolled byproduct.
//!
//! Catalysts are consumed. They must match the recipe's catalyst set
//! exactly; a stray catalyst type blocks the match.

use crate::common::{Job, MachineCore, MachineSettings, TickContext, free_space, scaled_rate};
use alembic_core::craft::CraftLayout;
use alembic_core::energy::ChargePolicy;
use alembic_core::event::Effects;
use alembic_core::fluid::FluidTank;
use alembic_core::item::{ItemSlots, ItemStack};
use alembic_core::matcher::{
    BatchInputs, CatalystStatus, catalyst_status, input_satisfied, match_recipe, max_batches,
};
use alembic_core::recipe::{MAX_CATALYSTS, Recipe};
use alembic_core::registry::RecipeBook;
use alembic_core::status::MachineStatus;
use serde::{Deserialize, Serialize};

pub const INPUT_SLOT: usize = 3;
pub const CATALYST_SLOTS: [usize; MAX_CATALYSTS] = [4, 5, 6, 7, 8, 9];
pub const FLUID_SLOT: usize = 10;
pub const BYPRODUCT_SLOT: usize = 18;
pub const OUTPUT_SLOT: usize = 19;

const LAYOUT: CraftLayout<'static> = CraftLayout {
    input: INPUT_SLOT,
    catalysts: &CATALYST_SLOTS,
    output: Some(OUTPUT_SLOT),
    byproduct: Some(BYPRODUCT_SLOT),
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weaver {
    pub core: MachineCore,
    pub tank: FluidTank,
}

impl Weaver {
    pub fn new(settings: MachineSettings) -> Self {
        Self {
            tank: FluidTank::new(settings.tank_capacity),
            core: MachineCore::new(settings),
        }
    }

    pub fn tick(&mut self, ctx: &TickContext<'_>, effects: &mut Effects) {
        self.core
            .feed_container(&ctx.catalog.containers, FLUID_SLOT, &mut self.tank, 0, effects);

        match self.check(&ctx.catalog.recipes.weaver) {
            Ok((recipe, batches)) => {
                let job = Job {
                    recipe,
                    batches,
                    policy: ChargePolicy::AllBatches,
                    layout: LAYOUT,
                };
                let rate = scaled_rate(self.core.settings.rate, recipe.speed_modifier);
                self.core.run(job, rate, Some(&mut self.tank), effects);
            }
            Err(status) => self.core.report(status, effects),
        }
    }

    /// The recipe to work on and its batch count, or the first reason it
    /// can't run.
    fn check<'r>(&self, recipes: &'r RecipeBook<Recipe>) -> Result<(&'r Recipe, u32), MachineStatus> {
        let inv = &self.core.inventory;
        if self.core.energy.is_empty() {
            return Err(MachineStatus::NoEnergy);
        }
        if recipes.is_empty() {
            return Err(MachineStatus::NoRecipes);
        }
        let input = inv.slot(INPUT_SLOT).ok_or(MachineStatus::NoBaseItem)?;
        let catalysts = inv.stacks(&CATALYST_SLOTS);
        let Some(recipe) = match_recipe(recipes, Some(input), &catalysts, Some(&self.tank)) else {
            return Err(self.diagnose(recipes, input, &catalysts));
        };

        if let Some(spec) = recipe.consumed_fluid() {
            if !self.tank.accepts(&spec.fluid) {
                return Err(MachineStatus::WrongFluid {
                    needed: spec.fluid.clone(),
                });
            }
            if self.tank.volume() < spec.amount {
                return Err(MachineStatus::InsufficientFluid {
                    needed: spec.fluid.clone(),
                    amount: spec.amount,
                });
            }
        }

        let output = inv.slot(OUTPUT_SLOT);
        if let Some(out) = &recipe.output {
            if output.is_some_and(|s| !s.is(&out.item)) {
                return Err(MachineStatus::RecipeConflict);
            }
            if free_space(output) < out.amount {
                return Err(MachineStatus::OutputFull);
            }
        }

        let byproduct = inv.slot(BYPRODUCT_SLOT);
        if let (Some(bp), Some(slot)) = (&recipe.byproduct, byproduct) {
            if !slot.is(&bp.item) {
                return Err(MachineStatus::ByproductSlotBusy);
            }
            if slot.space() < bp.amount.upper() {
                return Err(MachineStatus::ByproductSlotFull);
            }
        }

        let batches = max_batches(
            recipe,
            &BatchInputs {
                input: Some(input),
                catalysts: &catalysts,
                tank: Some(&self.tank),
                output,
                byproduct,
            },
        );
        if batches == 0 {
            return Err(MachineStatus::MissingMaterials);
        }
        Ok((recipe, batches))
    }

    /// Why nothing matched, judged against the first recipe the base item
    /// satisfies.
    fn diagnose(
        &self,
        recipes: &RecipeBook<Recipe>,
        input: &ItemStack,
        catalysts: &[Option<ItemStack>],
    ) -> MachineStatus {
        let mut candidates = recipes
            .iter()
            .filter(|r| input_satisfied(&r.input, Some(input)));
        let potential = candidates.clone().count();
        let Some(first) = candidates.next() else {
            return MachineStatus::InvalidRecipe { potential };
        };
        match catalyst_status(&first.catalysts, catalysts) {
            CatalystStatus::MissingAll => MachineStatus::MissingCatalysts { potential },
            CatalystStatus::MissingSome => MachineStatus::MissingSomeCatalysts { potential },
            CatalystStatus::Insufficient => MachineStatus::InsufficientCatalysts { potential },
            CatalystStatus::Wrong | CatalystStatus::Unexpected => {
                MachineStatus::WrongCatalysts { potential }
            }
            CatalystStatus::Satisfied => match &first.fluid {
                Some(spec) if !self.tank.accepts(&spec.fluid) => MachineStatus::WrongFluid {
                    needed: spec.fluid.clone(),
                },
                _ => MachineStatus::InvalidRecipe { potential },
            },
        }
    }
}

//! Cloner: copies any template item for a flat energy cost, draining
//! liquified aetherium for the length of the run.
//!
//! The speed upgrade picks the target run time and the draw rate follows
//! from it. Templates listed in the clone recipe table are refused; those
//! belong to the singularity fabricator.

use crate::common::{Job, MachineCore, MachineSettings, TickContext, free_space};
use alembic_core::cloning::{CloneRecipe, FLUID_PER_SECOND};
use alembic_core::craft::CraftLayout;
use alembic_core::energy::{Boosts, ChargePolicy};
use alembic_core::event::Effects;
use alembic_core::fixed::{Fixed64, TICKS_PER_SECOND, Ticks};
use alembic_core::fluid::{FluidTank, LIQUIFIED_AETHERIUM};
use alembic_core::id::ItemId;
use alembic_core::item::ItemSlots;
use alembic_core::matcher::{BatchInputs, Bottleneck, batch_limits};
use alembic_core::recipe::{Amount, Ingredient, Recipe};
use alembic_core::registry::RecipeBook;
use alembic_core::status::MachineStatus;
use serde::{Deserialize, Serialize};

pub const TEMPLATE_SLOT: usize = 3;
pub const CONTAINER_SLOT: usize = 10;
pub const ORIGINAL_SLOT: usize = 18;
pub const COPY_SLOT: usize = 19;

/// The machine itself, which can't be cloned.
pub const CLONER_ITEM: &str = "utilitycraft:cloner";

pub const CLONE_COST: u64 = 1_000_000;

/// Target run time in seconds per speed upgrade level.
pub const SPEED_SECONDS: [u32; 9] = [1800, 1200, 900, 600, 480, 360, 240, 120, 60];

const LAYOUT: CraftLayout<'static> = CraftLayout {
    input: TEMPLATE_SLOT,
    catalysts: &[],
    output: Some(COPY_SLOT),
    byproduct: Some(ORIGINAL_SLOT),
};

/// Target seconds for a speed upgrade level; levels past the table use
/// the fastest entry.
pub fn target_seconds(speed_level: u8) -> u32 {
    let index = usize::from(speed_level).min(SPEED_SECONDS.len() - 1);
    SPEED_SECONDS[index]
}

/// Energy drawn per tick to finish one clone in `seconds`.
pub fn clone_rate(seconds: u32) -> u64 {
    let ticks = u64::from(seconds.max(1)) * TICKS_PER_SECOND;
    (CLONE_COST / ticks).max(1)
}

/// The recipe a cloner runs for `item`: the template goes in, comes back
/// in the original slot, and one copy lands in the copy slot.
pub fn generic_recipe(item: &ItemId, seconds: u32) -> Recipe {
    Recipe::new(
        format!("generic:{item}"),
        Ingredient::new(item.clone(), 1),
        CLONE_COST,
    )
    .consumes_fluid(LIQUIFIED_AETHERIUM, u64::from(seconds) * FLUID_PER_SECOND)
    .output(item.clone(), 1)
    .byproduct(item.clone(), Amount::Exact(1), Fixed64::ONE)
    .ticks(u64::from(seconds) * TICKS_PER_SECOND)
}

/// Whether `item` is the template or product of a clone recipe.
pub fn is_reserved(recipes: &RecipeBook<CloneRecipe>, item: &ItemId) -> bool {
    recipes.iter().any(|r| {
        r.template.as_str().eq_ignore_ascii_case(item.as_str())
            || r.output.as_str().eq_ignore_ascii_case(item.as_str())
    })
}

/// "1h 2m 3s", "4m 0s", "12s".
pub fn format_eta(seconds: u64) -> String {
    let (h, m, s) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if h > 0 {
        format!("{h}h {m}m {s}s")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct ProgressSample {
    banked: u64,
    tick: Ticks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cloner {
    pub core: MachineCore,
    pub tank: FluidTank,
    sample: Option<ProgressSample>,
    eta: Option<u64>,
}

impl Cloner {
    /// Boosts in `settings` are ignored; the cloner's speed comes from its
    /// upgrade level alone.
    pub fn new(settings: MachineSettings) -> Self {
        let settings = settings.with_boosts(Boosts::default());
        Self {
            tank: FluidTank::new(settings.tank_capacity),
            core: MachineCore::new(settings),
            sample: None,
            eta: None,
        }
    }

    pub fn target_seconds(&self) -> u32 {
        target_seconds(self.core.settings.upgrades.speed)
    }

    /// Seconds until the current clone completes, while running.
    pub fn eta_seconds(&self) -> Option<u64> {
        self.eta
    }

    pub fn tick(&mut self, ctx: &TickContext<'_>, effects: &mut Effects) {
        self.core
            .feed_container(&ctx.catalog.containers, CONTAINER_SLOT, &mut self.tank, 0, effects);

        let seconds = self.target_seconds();
        match self.check(&ctx.catalog.recipes.cloner, seconds) {
            Ok((recipe, batches)) => {
                let job = Job {
                    recipe: &recipe,
                    batches,
                    policy: ChargePolicy::SingleBatch,
                    layout: LAYOUT,
                };
                let rate = clone_rate(seconds);
                self.core.run(job, rate, Some(&mut self.tank), effects);
                self.update_eta(ctx.clock.tick(), rate);
            }
            Err(status) => {
                self.sample = None;
                self.eta = None;
                self.core.report(status, effects);
            }
        }
    }

    fn update_eta(&mut self, now: Ticks, rate: u64) {
        let banked = self.core.progress.banked().saturating_to_num::<u64>();
        let per_tick = match self.sample {
            Some(prev) if banked > prev.banked && now > prev.tick => {
                (banked - prev.banked) / (now - prev.tick)
            }
            _ => rate,
        }
        .max(1);
        let remaining = CLONE_COST.saturating_sub(banked);
        let ticks = remaining.div_ceil(per_tick);
        self.eta = Some(ticks.div_ceil(TICKS_PER_SECOND));
        self.sample = Some(ProgressSample { banked, tick: now });
    }

    fn check(
        &self,
        reserved: &RecipeBook<CloneRecipe>,
        seconds: u32,
    ) -> Result<(Recipe, u32), MachineStatus> {
        let inv = &self.core.inventory;
        if self.core.energy.is_empty() {
            return Err(MachineStatus::NoEnergy);
        }
        let template = inv.slot(TEMPLATE_SLOT).ok_or(MachineStatus::NoTemplate)?;
        if template.item.as_str() == CLONER_ITEM {
            return Err(MachineStatus::InvalidTemplate);
        }
        if is_reserved(reserved, &template.item) {
            return Err(MachineStatus::ReservedTemplate);
        }

        let recipe = generic_recipe(&template.item, seconds);
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

        let original = inv.slot(ORIGINAL_SLOT);
        let copy = inv.slot(COPY_SLOT);
        if original.is_some_and(|s| !s.is(&template.item)) {
            return Err(MachineStatus::OriginalSlotBusy);
        }
        if copy.is_some_and(|s| !s.is(&template.item)) {
            return Err(MachineStatus::CopySlotBusy);
        }
        if free_space(original) == 0 {
            return Err(MachineStatus::OriginalSlotFull);
        }
        if free_space(copy) == 0 {
            return Err(MachineStatus::CopySlotFull);
        }

        let limits = batch_limits(
            &recipe,
            &BatchInputs {
                input: Some(template),
                tank: Some(&self.tank),
                output: copy,
                byproduct: original,
                ..BatchInputs::default()
            },
        );
        match limits.bottleneck() {
            None => {
                let batches = limits.batches();
                Ok((recipe, batches))
            }
            Some(Bottleneck::Input | Bottleneck::Fluid) => Err(MachineStatus::MissingInput),
            Some(_) => Err(MachineStatus::OutputFull),
        }
    }
}

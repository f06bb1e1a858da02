//! State every machine carries and the tick plumbing they share.

use alembic_core::craft::{CraftLayout, CraftReport, apply_batches};
use alembic_core::energy::{Boosts, Charge, ChargePolicy, EnergyBuffer, ProgressStep, Progress};
use alembic_core::event::{EffectKind, Effects};
use alembic_core::fixed::{Fixed64, fixed_from_u64};
use alembic_core::fluid::{ContainerRegistry, FluidTank};
use alembic_core::id::RecipeId;
use alembic_core::item::{DEFAULT_MAX_STACK, Inventory, ItemStack};
use alembic_core::recipe::Recipe;
use alembic_core::registry::{Catalog, MachineKind};
use alembic_core::rng::SimRng;
use alembic_core::sim::SimClock;
use alembic_core::status::MachineStatus;
use serde::{Deserialize, Serialize};

/// Slots in every machine inventory.
pub const INVENTORY_SIZE: usize = 27;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Installed upgrade levels. Energy upgrades reach machines as
/// [`Boosts`] instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrades {
    pub speed: u8,
}

/// Per-machine configuration fixed at placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSettings {
    /// Energy drawn per tick before boosts.
    pub rate: u64,
    pub energy_capacity: u64,
    /// Capacity of each fluid tank. Machines without a tank ignore it.
    pub tank_capacity: u64,
    pub boosts: Boosts,
    pub upgrades: Upgrades,
    /// Seeds the machine's byproduct rolls.
    pub seed: u64,
}

impl MachineSettings {
    /// Defaults tuned so each machine's default recipe takes its nominal
    /// time at base rate.
    pub fn for_kind(kind: MachineKind) -> Self {
        let (rate, energy_capacity, tank_capacity) = match kind {
            MachineKind::Weaver => (180, 256_000, 8_000),
            MachineKind::Liquifier => (30, 64_000, 16_000),
            MachineKind::Energizer => (96, 64_000, 0),
            MachineKind::ResidueProcessor => (52, 64_000, 0),
            // The cloner derives its rate from the speed upgrade; its tank
            // holds a full 30 minute run.
            MachineKind::Cloner => (1, 2_000_000, 128_000),
            MachineKind::CryoChamber => (100, 256_000, 64_000),
        };
        Self {
            rate,
            energy_capacity,
            tank_capacity,
            boosts: Boosts::default(),
            upgrades: Upgrades::default(),
            seed: 0,
        }
    }

    pub fn with_rate(mut self, rate: u64) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_energy_capacity(mut self, capacity: u64) -> Self {
        self.energy_capacity = capacity;
        self
    }

    pub fn with_tank_capacity(mut self, capacity: u64) -> Self {
        self.tank_capacity = capacity;
        self
    }

    pub fn with_boosts(mut self, boosts: Boosts) -> Self {
        self.boosts = boosts;
        self
    }

    pub fn with_upgrades(mut self, upgrades: Upgrades) -> Self {
        self.upgrades = upgrades;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// What a machine reads during one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub clock: SimClock,
    pub catalog: &'a Catalog,
}

impl<'a> TickContext<'a> {
    pub fn new(clock: SimClock, catalog: &'a Catalog) -> Self {
        Self { clock, catalog }
    }
}

// ---------------------------------------------------------------------------
// Core state
// ---------------------------------------------------------------------------

/// One batch job ready to charge: the recipe, how many batches every
/// resource allows, and where it reads and writes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Job<'a> {
    pub recipe: &'a Recipe,
    pub batches: u32,
    pub policy: ChargePolicy,
    pub layout: CraftLayout<'a>,
}

/// Inventory, energy and progress, plus the status last reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineCore {
    pub inventory: Inventory,
    pub energy: EnergyBuffer,
    pub progress: Progress,
    pub settings: MachineSettings,
    status: MachineStatus,
    active: bool,
    rng: SimRng,
}

impl MachineCore {
    pub fn new(settings: MachineSettings) -> Self {
        Self {
            inventory: Inventory::new(INVENTORY_SIZE),
            energy: EnergyBuffer::new(settings.energy_capacity),
            progress: Progress::new(),
            rng: SimRng::new(settings.seed),
            status: MachineStatus::Idle,
            active: false,
            settings,
        }
    }

    pub fn status(&self) -> &MachineStatus {
        &self.status
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Publish the current status, e.g. on placement.
    pub(crate) fn announce(&self, effects: &mut Effects) {
        effects.push(EffectKind::StatusChanged {
            status: self.status.clone(),
        });
    }

    /// Settle this tick's status. Stalls that do not clear on their own
    /// discard banked progress.
    pub(crate) fn report(&mut self, status: MachineStatus, effects: &mut Effects) {
        if status.resets_progress() {
            self.progress.reset();
        }
        let active = status.is_running();
        if status != self.status {
            log::trace!("status {} -> {}", self.status, status);
            effects.push(EffectKind::StatusChanged {
                status: status.clone(),
            });
            self.status = status;
        }
        self.set_active(active, effects);
    }

    pub(crate) fn set_active(&mut self, active: bool, effects: &mut Effects) {
        if active != self.active {
            self.active = active;
            effects.push(EffectKind::ActivityChanged { active });
        }
    }

    /// Charge toward `job` and apply its batches once paid for.
    pub(crate) fn run(
        &mut self,
        job: Job<'_>,
        rate: u64,
        tank: Option<&mut FluidTank>,
        effects: &mut Effects,
    ) -> Option<CraftReport> {
        let charge = Charge {
            cost: job.recipe.energy_cost,
            max_batches: job.batches,
            policy: job.policy,
        };
        let boosts = self.settings.boosts;
        let step = self.progress.advance(charge, &mut self.energy, rate, &boosts);
        let report = match step {
            ProgressStep::Completed { batches } => {
                let report = apply_batches(
                    job.recipe,
                    batches,
                    &job.layout,
                    &mut self.inventory,
                    tank,
                    &mut self.rng,
                );
                record_craft(&job.recipe.id, &report, effects);
                Some(report)
            }
            ProgressStep::Charged { spent } => {
                effects.push(EffectKind::EnergySpent { amount: spent });
                None
            }
            ProgressStep::Idle => None,
        };
        self.report(MachineStatus::Running, effects);
        report
    }

    /// Empty a filled container from `slot` into `tank`.
    pub(crate) fn feed_container(
        &mut self,
        containers: &ContainerRegistry,
        slot: usize,
        tank: &mut FluidTank,
        tank_index: usize,
        effects: &mut Effects,
    ) {
        if let Some(moved) = containers.drain_into(&mut self.inventory, slot, tank)
            && let Some(fluid) = tank.fluid()
        {
            effects.push(EffectKind::FluidChanged {
                tank: tank_index,
                fluid: fluid.clone(),
                delta: i64::try_from(moved).unwrap_or(i64::MAX),
            });
        }
    }

    /// Drop the inventory and every tank's contents.
    pub(crate) fn break_apart<'t>(
        &mut self,
        tanks: impl IntoIterator<Item = &'t mut FluidTank>,
        effects: &mut Effects,
    ) {
        let stacks = self.inventory.drain();
        let fluids = tanks
            .into_iter()
            .filter_map(|tank| {
                let fluid = tank.fluid()?.clone();
                let amount = tank.consume(tank.volume());
                (amount > 0).then_some((fluid, amount))
            })
            .collect();
        self.progress.reset();
        effects.push(EffectKind::Dropped { stacks, fluids });
        self.set_active(false, effects);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Record a craft, dropping anything that had no slot to go to.
pub(crate) fn record_craft(recipe: &RecipeId, report: &CraftReport, effects: &mut Effects) {
    log::trace!("{recipe}: {} batch(es)", report.batches);
    effects.craft(recipe, report, 0);
    if !report.overflow.is_empty() {
        let stacks = report
            .overflow
            .iter()
            .map(|(item, amount)| ItemStack::new(item.clone(), *amount))
            .collect();
        effects.push(EffectKind::Dropped {
            stacks,
            fluids: Vec::new(),
        });
    }
}

/// Room left in a slot; an empty slot takes a default stack.
pub(crate) fn free_space(slot: Option<&ItemStack>) -> u32 {
    slot.map_or(DEFAULT_MAX_STACK, ItemStack::space)
}

/// `rate * modifier`, never below one.
pub(crate) fn scaled_rate(rate: u64, modifier: Fixed64) -> u64 {
    fixed_from_u64(rate)
        .saturating_mul(modifier.max(Fixed64::ZERO))
        .to_num::<u64>()
        .max(1)
}

/// "250 mB", "1 B", "1.5 B".
pub fn format_fluid(millibuckets: u64) -> String {
    if millibuckets < 1000 {
        return format!("{millibuckets} mB");
    }
    let whole = millibuckets / 1000;
    let tenths = (millibuckets % 1000) / 100;
    if tenths == 0 {
        format!("{whole} B")
    } else {
        format!("{whole}.{tenths} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alembic_core::fixed::Fixed128;
    use alembic_core::test_utils::fixed;

    #[test]
    fn report_resets_progress_only_for_hard_stalls() {
        let mut core = MachineCore::new(MachineSettings::for_kind(MachineKind::Weaver));
        core.energy.charge(1000);
        let charge = Charge {
            cost: 6400,
            max_batches: 1,
            policy: ChargePolicy::SingleBatch,
        };
        core.progress
            .advance(charge, &mut core.energy, 180, &Boosts::default());
        let mut effects = Effects::new(0);

        core.report(MachineStatus::OutputFull, &mut effects);
        assert_eq!(core.progress.banked(), Fixed128::from_num(180));

        core.report(MachineStatus::NoInput, &mut effects);
        assert_eq!(core.progress.banked(), Fixed128::ZERO);
        assert_eq!(effects.len(), 2);
    }

    #[test]
    fn activity_follows_running() {
        let mut core = MachineCore::new(MachineSettings::for_kind(MachineKind::Liquifier));
        let mut effects = Effects::new(0);
        core.report(MachineStatus::Running, &mut effects);
        assert!(core.is_active());
        core.report(MachineStatus::Running, &mut effects);
        // Unchanged status and activity emit nothing the second time.
        assert_eq!(effects.len(), 2);
        core.report(MachineStatus::NoEnergy, &mut effects);
        assert!(!core.is_active());
    }

    #[test]
    fn breaking_drops_everything() {
        use alembic_core::item::ItemSlots;
        let mut core = MachineCore::new(MachineSettings::for_kind(MachineKind::Weaver));
        core.inventory.set_slot(3, Some(ItemStack::new("minecraft:iron_ingot", 5)));
        let mut tank = FluidTank::filled("lava", 700, 8000);
        let mut effects = Effects::new(9);
        core.break_apart([&mut tank], &mut effects);

        assert!(core.inventory.is_vacant());
        assert!(tank.is_empty());
        let dropped = effects.iter().find_map(|e| match &e.kind {
            EffectKind::Dropped { stacks, fluids } => Some((stacks.len(), fluids.clone())),
            _ => None,
        });
        assert_eq!(dropped, Some((1, vec![("lava".into(), 700)])));
    }

    #[test]
    fn fluid_amounts_format() {
        assert_eq!(format_fluid(250), "250 mB");
        assert_eq!(format_fluid(1000), "1 B");
        assert_eq!(format_fluid(1500), "1.5 B");
    }

    #[test]
    fn rate_scales_by_modifier() {
        assert_eq!(scaled_rate(180, fixed(2.5)), 450);
        assert_eq!(scaled_rate(180, fixed(0.5)), 90);
        assert_eq!(scaled_rate(1, Fixed64::ZERO), 1);
    }
}

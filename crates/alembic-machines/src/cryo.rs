//! Cryo chamber: three modules sharing one energy buffer.
//!
//! - The stabilizer runs one stabilization recipe at a time from its input
//!   slot into its output slot.
//! - The cooling grid treats each of its nine slots as an independent job
//!   and converts the whole stack in place.
//! - The generator turns water into cryofluid, optionally paced by a
//!   catalyst item.
//!
//! Each module banks its own progress. Stabilizer progress lives in the
//! core accumulator.

use crate::common::{MachineCore, MachineSettings, TickContext, format_fluid, free_space};
use alembic_core::energy::{Charge, ChargePolicy, Progress, ProgressStep};
use alembic_core::event::{EffectKind, Effects};
use alembic_core::fixed::{Fixed64, fixed_from_u64};
use alembic_core::fluid::{CRYOFLUID, ContainerRegistry, FluidTank, WATER};
use alembic_core::id::{FluidType, ItemId, RecipeId};
use alembic_core::item::{DEFAULT_MAX_STACK, Inventory, ItemSlots, ItemStack};
use alembic_core::recipe::Ingredient;
use alembic_core::registry::RecipeBook;
use alembic_core::sim::{SimClock, TickGate};
use alembic_core::status::MachineStatus;
use alembic_core::thermal::{GeneratorConfig, TankSource, ThermalCategory, ThermalRecipe};
use serde::{Deserialize, Serialize};

pub const STABILIZER_INPUT_SLOT: usize = 3;
pub const STABILIZER_OUTPUT_SLOT: usize = 14;
pub const WATER_SLOT: usize = 10;
pub const CAPSULE_SLOT: usize = 12;
pub const CATALYST_SLOT: usize = 19;
pub const COOLING_GRID: [usize; 9] = [6, 7, 8, 15, 16, 17, 24, 25, 26];

/// Ticks between container transfers.
pub const TRANSFER_INTERVAL: u64 = 4;

const WATER_TANK: usize = 0;
const CRYO_TANK: usize = 1;

// ---------------------------------------------------------------------------
// Module reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CryoModule {
    Stabilizer,
    Cooling,
    Generator,
}

impl CryoModule {
    pub fn label(self) -> &'static str {
        match self {
            CryoModule::Stabilizer => "Cryo Stabilizer",
            CryoModule::Cooling => "Cooling Chamber",
            CryoModule::Generator => "Cryofluid Generator",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleState {
    Processing,
    Waiting,
    Error,
}

/// What one module did this tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleReport {
    pub module: CryoModule,
    pub state: ModuleState,
    pub message: String,
}

impl ModuleReport {
    fn new(module: CryoModule, state: ModuleState, message: impl Into<String>) -> Self {
        Self {
            module,
            state,
            message: message.into(),
        }
    }
}

/// A stalled job. `reset` discards banked progress.
fn stall(
    progress: &mut Progress,
    reset: bool,
    state: ModuleState,
    message: impl Into<String>,
) -> (ModuleState, String) {
    if reset {
        progress.reset();
    }
    (state, message.into())
}

// ---------------------------------------------------------------------------
// Message templates
// ---------------------------------------------------------------------------

/// Values a recipe's UI message may reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageContext {
    pub input: String,
    pub input_amount: u32,
    pub output: String,
    pub output_amount: u32,
    pub energy_cost: u64,
    pub fluid: String,
    pub fluid_amount: u64,
    pub category: String,
}

impl MessageContext {
    fn new(recipe: &ThermalRecipe, variant: &Ingredient, draw: Option<&FluidDraw>) -> Self {
        let first = recipe.fluids.first();
        Self {
            input: variant.item.display_name(),
            input_amount: variant.amount,
            output: recipe.output.item.display_name(),
            output_amount: recipe.output.amount,
            energy_cost: recipe.energy_cost,
            fluid: draw
                .map(|d| d.label.clone())
                .or_else(|| first.map(|f| f.label()))
                .unwrap_or_default(),
            fluid_amount: draw
                .map(|d| d.amount)
                .or_else(|| first.map(|f| f.amount))
                .unwrap_or(0),
            category: match recipe.category {
                ThermalCategory::Stabilization => "stabilization",
                ThermalCategory::Cooling => "cooling",
            }
            .to_owned(),
        }
    }

    fn value(&self, token: &str) -> String {
        match token {
            "input" => self.input.clone(),
            "inputAmount" => self.input_amount.to_string(),
            "output" => self.output.clone(),
            "outputAmount" => self.output_amount.to_string(),
            "energyCost" => self.energy_cost.to_string(),
            "fluid" => self.fluid.clone(),
            "fluidAmount" => self.fluid_amount.to_string(),
            "category" => self.category.clone(),
            _ => String::new(),
        }
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Replace `{{ token }}` placeholders. Unknown tokens render empty;
/// anything that isn't a well-formed placeholder is left as written.
pub fn render_message(template: &str, ctx: &MessageContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) if is_token(after[..end].trim()) => {
                out.push_str(&ctx.value(after[..end].trim()));
                rest = &after[end + 2..];
            }
            _ => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn message_or(template: Option<&String>, ctx: &MessageContext, fallback: String) -> String {
    match template {
        Some(t) if !t.is_empty() => render_message(t, ctx),
        _ => fallback,
    }
}

// ---------------------------------------------------------------------------
// Fluid routing
// ---------------------------------------------------------------------------

/// The fluid option a job will draw, and how much.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FluidDraw {
    source: TankSource,
    fluid: FluidType,
    amount: u64,
    label: String,
}

/// The first fluid option whose tank holds enough for `batches`, `None`
/// for a dry recipe, or the "Need ..." message naming the first option.
fn resolve_fluid(
    recipe: &ThermalRecipe,
    water: &FluidTank,
    cryofluid: &FluidTank,
    batches: u32,
) -> Result<Option<FluidDraw>, String> {
    let Some(first) = recipe.fluids.first() else {
        return Ok(None);
    };
    for option in &recipe.fluids {
        let tank = match option.source {
            TankSource::Water => water,
            TankSource::Cryofluid => cryofluid,
        };
        let amount = option.amount.saturating_mul(u64::from(batches));
        if tank.accepts(&option.fluid) && tank.volume() >= amount {
            return Ok(Some(FluidDraw {
                source: option.source,
                fluid: option.fluid.clone(),
                amount,
                label: option.label(),
            }));
        }
    }
    Err(format!("Need {}", first.label()))
}

fn find_variant<'r>(
    recipes: &'r RecipeBook<ThermalRecipe>,
    stack: &ItemStack,
) -> Option<(&'r ThermalRecipe, &'r Ingredient)> {
    recipes
        .iter()
        .find_map(|r| r.variant_for(stack).map(|v| (r, v)))
}

/// "R1C1" through "R3C3".
pub fn cooling_tag(index: usize) -> String {
    format!("R{}C{}", index / 3 + 1, index % 3 + 1)
}

// ---------------------------------------------------------------------------
// Chamber
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryoChamber {
    pub core: MachineCore,
    pub water: FluidTank,
    pub cryofluid: FluidTank,
    cooling: [Progress; 9],
    generator: Progress,
    gate: TickGate,
    reports: Vec<ModuleReport>,
}

impl CryoChamber {
    pub fn new(settings: MachineSettings) -> Self {
        Self {
            water: FluidTank::dedicated(WATER, settings.tank_capacity),
            cryofluid: FluidTank::dedicated(CRYOFLUID, settings.tank_capacity),
            core: MachineCore::new(settings),
            cooling: [Progress::new(); 9],
            generator: Progress::new(),
            gate: TickGate::new(),
            reports: Vec::new(),
        }
    }

    /// Module reports from the last tick, stabilizer first.
    pub fn reports(&self) -> &[ModuleReport] {
        &self.reports
    }

    pub fn report(&self, module: CryoModule) -> Option<&ModuleReport> {
        self.reports.iter().find(|r| r.module == module)
    }

    /// Banked progress of one cooling slot, by grid index.
    pub fn cooling_progress(&self, index: usize) -> Option<&Progress> {
        self.cooling.get(index)
    }

    pub fn generator_progress(&self) -> &Progress {
        &self.generator
    }

    pub fn tick(&mut self, ctx: &TickContext<'_>, effects: &mut Effects) {
        let recipes = &ctx.catalog.recipes;
        self.transfer(&ctx.clock, &ctx.catalog.containers, effects);

        let stabilizer = self.stabilize(&recipes.stabilization, effects);
        let cooling = self.cool(&recipes.cooling, effects);
        let generator = self.generate(&recipes.generator, effects);
        self.reports = vec![stabilizer, cooling, generator];

        let status = if self
            .reports
            .iter()
            .any(|r| r.state == ModuleState::Processing)
        {
            MachineStatus::Running
        } else if self.core.energy.is_empty() {
            MachineStatus::NoEnergy
        } else {
            MachineStatus::Idle
        };
        self.core.report(status, effects);
    }

    pub(crate) fn tank_mut(&mut self, index: usize) -> Option<&mut FluidTank> {
        match index {
            WATER_TANK => Some(&mut self.water),
            CRYO_TANK => Some(&mut self.cryofluid),
            _ => None,
        }
    }

    fn transfer(&mut self, clock: &SimClock, containers: &ContainerRegistry, effects: &mut Effects) {
        if !self.gate.ready(clock, TRANSFER_INTERVAL) {
            return;
        }
        self.core
            .feed_container(containers, WATER_SLOT, &mut self.water, WATER_TANK, effects);
        if let Some(fluid) = self.cryofluid.fluid().cloned()
            && let Some(moved) =
                containers.fill_from(&mut self.core.inventory, CAPSULE_SLOT, &mut self.cryofluid)
        {
            effects.push(EffectKind::FluidChanged {
                tank: CRYO_TANK,
                fluid,
                delta: -i64::try_from(moved).unwrap_or(i64::MAX),
            });
        }
    }

    fn draw(&mut self, draw: &FluidDraw, effects: &mut Effects) {
        let (index, tank) = match draw.source {
            TankSource::Water => (WATER_TANK, &mut self.water),
            TankSource::Cryofluid => (CRYO_TANK, &mut self.cryofluid),
        };
        let moved = tank.consume(draw.amount);
        if moved > 0 {
            effects.push(EffectKind::FluidChanged {
                tank: index,
                fluid: draw.fluid.clone(),
                delta: -i64::try_from(moved).unwrap_or(i64::MAX),
            });
        }
    }

    fn single(cost: u64) -> Charge {
        Charge {
            cost,
            max_batches: 1,
            policy: ChargePolicy::SingleBatch,
        }
    }

    // -----------------------------------------------------------------------
    // Stabilizer
    // -----------------------------------------------------------------------

    fn stabilize(
        &mut self,
        recipes: &RecipeBook<ThermalRecipe>,
        effects: &mut Effects,
    ) -> ModuleReport {
        let (state, message) = self.stabilize_inner(recipes, effects);
        ModuleReport::new(CryoModule::Stabilizer, state, message)
    }

    fn stabilize_inner(
        &mut self,
        recipes: &RecipeBook<ThermalRecipe>,
        effects: &mut Effects,
    ) -> (ModuleState, String) {
        let core = &mut self.core;
        if core.energy.is_empty() {
            return stall(&mut core.progress, false, ModuleState::Waiting, "No Energy");
        }
        let Some(input) = core.inventory.slot(STABILIZER_INPUT_SLOT).cloned() else {
            return stall(&mut core.progress, true, ModuleState::Waiting, "Insert Item");
        };
        let Some((recipe, variant)) = find_variant(recipes, &input) else {
            return stall(&mut core.progress, true, ModuleState::Error, "Invalid Item");
        };
        let draw = match resolve_fluid(recipe, &self.water, &self.cryofluid, 1) {
            Ok(draw) => draw,
            Err(message) => {
                return stall(&mut core.progress, true, ModuleState::Waiting, message);
            }
        };
        let output = core.inventory.slot(STABILIZER_OUTPUT_SLOT);
        if output.is_some_and(|s| !s.is(&recipe.output.item)) {
            return stall(&mut core.progress, true, ModuleState::Error, "Output Blocked");
        }
        if free_space(output) < recipe.output.amount {
            return stall(&mut core.progress, true, ModuleState::Waiting, "Output Full");
        }

        let ctx = MessageContext::new(recipe, variant, draw.as_ref());
        let rate = core.settings.rate;
        let boosts = core.settings.boosts;
        let step = core
            .progress
            .advance(Self::single(recipe.energy_cost), &mut core.energy, rate, &boosts);
        match step {
            ProgressStep::Completed { .. } => {
                take(&mut core.inventory, STABILIZER_INPUT_SLOT, variant, effects);
                deposit(
                    &mut core.inventory,
                    STABILIZER_OUTPUT_SLOT,
                    &recipe.output.item,
                    recipe.output.amount,
                    effects,
                );
                if let Some(draw) = &draw {
                    self.draw(draw, effects);
                }
                crafted(&recipe.id, 1, effects);
                let fallback = format!(
                    "Output +{} {}",
                    recipe.output.amount,
                    recipe.output.item.display_name()
                );
                let message = message_or(recipe.ui.completion_message.as_ref(), &ctx, fallback);
                (ModuleState::Processing, message)
            }
            ProgressStep::Charged { spent } => {
                effects.push(EffectKind::EnergySpent { amount: spent });
                let fallback = format!("Processing {}", recipe.output.item.display_name());
                let message = message_or(recipe.ui.processing_message.as_ref(), &ctx, fallback);
                (ModuleState::Processing, message)
            }
            ProgressStep::Idle => (ModuleState::Waiting, "Need Energy".to_owned()),
        }
    }

    // -----------------------------------------------------------------------
    // Cooling grid
    // -----------------------------------------------------------------------

    fn cool(&mut self, recipes: &RecipeBook<ThermalRecipe>, effects: &mut Effects) -> ModuleReport {
        let slots: Vec<(ModuleState, String)> = (0..COOLING_GRID.len())
            .map(|index| {
                let (state, message) = self.cool_slot(recipes, index, effects);
                (state, format!("{}: {message}", cooling_tag(index)))
            })
            .collect();
        summarize(&slots)
    }

    fn cool_slot(
        &mut self,
        recipes: &RecipeBook<ThermalRecipe>,
        index: usize,
        effects: &mut Effects,
    ) -> (ModuleState, String) {
        let slot = COOLING_GRID[index];
        let progress = &mut self.cooling[index];
        if self.core.energy.is_empty() {
            return stall(progress, false, ModuleState::Waiting, "No Energy");
        }
        let Some(stack) = self.core.inventory.slot(slot).cloned() else {
            return stall(progress, true, ModuleState::Waiting, "Empty");
        };
        let Some((recipe, variant)) = find_variant(recipes, &stack) else {
            if recipes.iter().any(|r| r.produces(&stack.item)) {
                return stall(progress, true, ModuleState::Waiting, "Ready");
            }
            return stall(progress, true, ModuleState::Error, "Invalid Item");
        };

        let per_batch = variant.amount.max(1);
        let out_per_batch = recipe.output.amount.max(1);
        if stack.amount % per_batch != 0 {
            let message = format!("Need multiples of {per_batch}");
            return stall(progress, false, ModuleState::Error, message);
        }
        let batches = (stack.amount / per_batch).max(1);
        let batch_limit = (DEFAULT_MAX_STACK / out_per_batch).max(1);
        if batches > batch_limit {
            return stall(progress, false, ModuleState::Error, "Result stack too large");
        }
        let draw = match resolve_fluid(recipe, &self.water, &self.cryofluid, batches) {
            Ok(draw) => draw,
            Err(message) => return stall(progress, true, ModuleState::Waiting, message),
        };

        let cost = recipe.energy_cost.saturating_mul(u64::from(batches));
        let rate = self.core.settings.rate;
        let boosts = self.core.settings.boosts;
        let step = progress.advance(Self::single(cost), &mut self.core.energy, rate, &boosts);
        let ctx = MessageContext::new(recipe, variant, draw.as_ref());
        let name = recipe.output.item.display_name();
        match step {
            ProgressStep::Completed { .. } => {
                let produced = out_per_batch.saturating_mul(batches);
                self.core
                    .inventory
                    .set_slot(slot, Some(ItemStack::new(recipe.output.item.clone(), produced)));
                effects.push(EffectKind::Consumed {
                    item: stack.item.clone(),
                    amount: stack.amount,
                });
                effects.push(EffectKind::Produced {
                    item: recipe.output.item.clone(),
                    amount: produced,
                });
                if let Some(draw) = &draw {
                    self.draw(draw, effects);
                }
                crafted(&recipe.id, batches, effects);
                let message = message_or(recipe.ui.completion_message.as_ref(), &ctx, name);
                (ModuleState::Processing, message)
            }
            ProgressStep::Charged { spent } => {
                effects.push(EffectKind::EnergySpent { amount: spent });
                let message = message_or(recipe.ui.processing_message.as_ref(), &ctx, name);
                (ModuleState::Processing, message)
            }
            ProgressStep::Idle => (ModuleState::Waiting, "Need Energy".to_owned()),
        }
    }

    // -----------------------------------------------------------------------
    // Generator
    // -----------------------------------------------------------------------

    fn generate(&mut self, config: &GeneratorConfig, effects: &mut Effects) -> ModuleReport {
        let (state, message) = self.generate_inner(config, effects);
        ModuleReport::new(CryoModule::Generator, state, message)
    }

    fn generate_inner(
        &mut self,
        config: &GeneratorConfig,
        effects: &mut Effects,
    ) -> (ModuleState, String) {
        let progress = &mut self.generator;
        let waiting = ModuleState::Waiting;
        if self.core.energy.is_empty() {
            return stall(progress, false, waiting, "No Energy");
        }
        let water = self.water.volume();
        let min_input = config.min_input.max(1);
        if water < min_input {
            return stall(progress, true, waiting, "Need Water");
        }
        let space = self.cryofluid.free_space();
        if space < config.min_output.max(1) {
            return stall(progress, true, waiting, "Cryofluid Full");
        }

        let speed = self.core.settings.boosts.speed.max(Fixed64::ONE);
        let per_tick = fixed_from_u64(config.max_process_per_tick.max(1))
            .saturating_mul(speed)
            .to_num::<u64>();
        let mut process = per_tick.min(water);

        // (numerator, denominator) of cryofluid per unit of water.
        let mut ratio = (
            config
                .conversion_rate
                .max(Fixed64::ZERO)
                .saturating_mul_int(1000)
                .round()
                .to_num::<u64>(),
            1000,
        );
        let mut catalyst = None;
        if !config.catalysts.is_empty() {
            let stack = self.core.inventory.slot(CATALYST_SLOT);
            let insert = || format!("Insert {}", config.catalyst_labels());
            let Some(stack) = stack else {
                return stall(progress, true, waiting, insert());
            };
            let Some(entry) = config.catalyst_for(&stack.item) else {
                return stall(progress, true, waiting, insert());
            };
            let label = entry.label();
            let items_per = entry.items_per_process.max(1);
            let water_per = entry.water_per_item.max(1);
            let cryo_per = entry.cryo_per_item.unwrap_or_else(|| {
                fixed_from_u64(water_per)
                    .saturating_mul(config.conversion_rate.max(Fixed64::ZERO))
                    .to_num::<u64>()
            });
            let cycles = u64::from(stack.amount / items_per);
            if cycles == 0 {
                return stall(progress, true, waiting, format!("Need {label}"));
            }
            process = process.min(cycles.saturating_mul(water_per));
            if process < min_input {
                return stall(progress, true, waiting, format!("Need {label}"));
            }
            ratio = (cryo_per, water_per);
            catalyst = Some((stack.item.clone(), stack.amount, label, items_per, water_per));
        }

        let (num, den) = ratio;
        if num > 0 {
            process = process.min(space.saturating_mul(den) / num);
        }
        if process == 0 || num == 0 {
            return stall(progress, true, waiting, "Cryofluid Full");
        }

        let mut items = 0u32;
        if let Some((_, held, label, items_per, water_per)) = &catalyst {
            let cycles = u32::try_from(process.div_ceil(*water_per)).unwrap_or(u32::MAX);
            items = cycles.max(1).saturating_mul(*items_per).max(*items_per);
            if *held < items {
                return stall(progress, true, waiting, format!("Need {label}"));
            }
        }

        let output = (process.saturating_mul(num) / den).min(space);
        if output == 0 {
            return stall(progress, true, waiting, "Cryofluid Full");
        }
        let cost = (process.saturating_mul(config.energy_per_1000) / 1000).max(1);

        let rate = self.core.settings.rate;
        let boosts = self.core.settings.boosts;
        let step = progress.advance(Self::single(cost), &mut self.core.energy, rate, &boosts);
        let suffix = |sign: &str| match &catalyst {
            Some((_, _, label, _, _)) if items > 0 => format!(" ({label} {sign}{items})"),
            _ => String::new(),
        };
        match step {
            ProgressStep::Completed { .. } => {
                let drained = self.water.consume(process);
                let added = self.cryofluid.add(&config.output_fluid, output);
                effects.push(EffectKind::FluidChanged {
                    tank: WATER_TANK,
                    fluid: config.input_fluid.clone(),
                    delta: -i64::try_from(drained).unwrap_or(i64::MAX),
                });
                effects.push(EffectKind::FluidChanged {
                    tank: CRYO_TANK,
                    fluid: config.output_fluid.clone(),
                    delta: i64::try_from(added).unwrap_or(i64::MAX),
                });
                if let Some((item, ..)) = &catalyst {
                    let taken = self.core.inventory.take(CATALYST_SLOT, items);
                    effects.push(EffectKind::Consumed {
                        item: item.clone(),
                        amount: taken,
                    });
                }
                (ModuleState::Processing, format!("+{}{}", format_fluid(added), suffix("-")))
            }
            ProgressStep::Charged { spent } => {
                effects.push(EffectKind::EnergySpent { amount: spent });
                let message = format!("Converting {}{}", format_fluid(process), suffix(""));
                (ModuleState::Processing, message)
            }
            ProgressStep::Idle => (ModuleState::Waiting, "Need Energy".to_owned()),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn take(inv: &mut Inventory, slot: usize, variant: &Ingredient, effects: &mut Effects) {
    let taken = inv.take(slot, variant.amount);
    effects.push(EffectKind::Consumed {
        item: variant.item.clone(),
        amount: taken,
    });
}

fn deposit(inv: &mut Inventory, slot: usize, item: &ItemId, amount: u32, effects: &mut Effects) {
    let overflow = inv.put(slot, item, amount);
    if overflow < amount {
        effects.push(EffectKind::Produced {
            item: item.clone(),
            amount: amount - overflow,
        });
    }
    if overflow > 0 {
        effects.push(EffectKind::Dropped {
            stacks: vec![ItemStack::new(item.clone(), overflow)],
            fluids: Vec::new(),
        });
    }
}

fn crafted(recipe: &RecipeId, batches: u32, effects: &mut Effects) {
    log::trace!("{recipe}: {batches} batch(es)");
    effects.push(EffectKind::Crafted {
        recipe: recipe.clone(),
        batches,
    });
}

/// Fold the grid's slot results into one report.
fn summarize(slots: &[(ModuleState, String)]) -> ModuleReport {
    let count = |state| slots.iter().filter(|(s, _)| *s == state).count();
    let (active, idle, blocked) = (
        count(ModuleState::Processing),
        count(ModuleState::Waiting),
        count(ModuleState::Error),
    );
    let alerts: Vec<&str> = slots
        .iter()
        .filter(|(s, _)| *s == ModuleState::Error)
        .take(2)
        .map(|(_, m)| m.as_str())
        .collect();

    let mut parts = Vec::new();
    if active > 0 {
        parts.push(format!("{active} active"));
    }
    if idle > 0 {
        parts.push(format!("{idle} idle"));
    }
    if blocked > 0 {
        parts.push(format!("{blocked} blocked"));
    }
    if !alerts.is_empty() {
        parts.push(alerts.join(" | "));
    }
    let state = if active > 0 {
        ModuleState::Processing
    } else if blocked > 0 {
        ModuleState::Error
    } else {
        ModuleState::Waiting
    };
    let message = if parts.is_empty() {
        "Idle".to_owned()
    } else {
        parts.join(", ")
    };
    ModuleReport::new(CryoModule::Cooling, state, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alembic_core::fixed::Fixed128;
    use alembic_core::registry::{Catalog, MachineKind};
    use alembic_core::thermal::{FluidOption, RecipeUi};
    use alembic_core::test_utils::*;

    fn chamber(rate: u64) -> CryoChamber {
        let settings = MachineSettings::for_kind(MachineKind::CryoChamber).with_rate(rate);
        let mut machine = CryoChamber::new(settings);
        machine.core.energy.charge(256_000);
        machine
    }

    fn tick(machine: &mut CryoChamber, catalog: &Catalog, tick: u64) -> Vec<EffectKind> {
        let ctx = TickContext::new(SimClock::at(tick), catalog);
        let mut effects = Effects::new(tick);
        machine.tick(&ctx, &mut effects);
        effects.into_vec().into_iter().map(|e| e.kind).collect()
    }

    fn message(machine: &CryoChamber, module: CryoModule) -> &str {
        machine.report(module).map_or("", |r| r.message.as_str())
    }

    fn cooling_recipe(id: &str, input: (&str, u32), output: (&str, u32)) -> ThermalRecipe {
        ThermalRecipe {
            id: id.into(),
            category: ThermalCategory::Cooling,
            inputs: vec![Ingredient::new(input.0, input.1)],
            output: Ingredient::new(output.0, output.1),
            fluids: vec![FluidOption {
                fluid: CRYOFLUID.into(),
                amount: 50,
                source: TankSource::Cryofluid,
                label: None,
            }],
            energy_cost: 100,
            ticks: 20,
            ui: RecipeUi::default(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn templates_render() {
        let ctx = MessageContext {
            input: "Snow".to_owned(),
            output: "Ice".to_owned(),
            output_amount: 4,
            ..MessageContext::default()
        };
        assert_eq!(render_message("Freezing {{input}}", &ctx), "Freezing Snow");
        assert_eq!(render_message("{{ output }} x{{outputAmount}}", &ctx), "Ice x4");
        assert_eq!(render_message("{{mystery}}!", &ctx), "!");
        assert_eq!(render_message("{{input", &ctx), "{{input");
        assert_eq!(cooling_tag(0), "R1C1");
        assert_eq!(cooling_tag(5), "R2C3");
    }

    #[test]
    fn stabilizes_with_cryofluid() {
        let catalog = alembic_data::native_catalog().unwrap();
        let mut machine = chamber(8000);
        machine.cryofluid = FluidTank::filled(CRYOFLUID, 1000, 64_000);
        machine.core.inventory.set_slot(
            STABILIZER_INPUT_SLOT,
            Some(stack("utilitycraft:unstable_aetherium_ingot", 1)),
        );

        tick(&mut machine, &catalog, 0);
        assert_eq!(
            message(&machine, CryoModule::Stabilizer),
            "Stabilizing Unstable Aetherium Ingot"
        );
        assert_eq!(machine.core.status(), &MachineStatus::Running);

        let effects = tick(&mut machine, &catalog, 1);
        assert_eq!(
            message(&machine, CryoModule::Stabilizer),
            "Stable Aetherium Ingot secured"
        );
        let inv = &machine.core.inventory;
        assert!(inv.slot(STABILIZER_INPUT_SLOT).is_none());
        assert_eq!(inv.slot(STABILIZER_OUTPUT_SLOT).map(|s| s.amount), Some(1));
        assert_eq!(machine.cryofluid.volume(), 500);
        assert!(effects.contains(&EffectKind::FluidChanged {
            tank: 1,
            fluid: CRYOFLUID.into(),
            delta: -500,
        }));
    }

    #[test]
    fn stabilizer_stalls() {
        let catalog = alembic_data::native_catalog().unwrap();
        let mut machine = chamber(100);
        tick(&mut machine, &catalog, 0);
        assert_eq!(message(&machine, CryoModule::Stabilizer), "Insert Item");
        assert_eq!(machine.core.status(), &MachineStatus::Idle);

        machine.core.inventory.set_slot(
            STABILIZER_INPUT_SLOT,
            Some(stack("utilitycraft:unstable_aetherium_ingot", 1)),
        );
        tick(&mut machine, &catalog, 1);
        assert_eq!(message(&machine, CryoModule::Stabilizer), "Need Cryofluid");

        machine.cryofluid = FluidTank::filled(CRYOFLUID, 1000, 64_000);
        machine
            .core
            .inventory
            .set_slot(STABILIZER_OUTPUT_SLOT, Some(stack("minecraft:dirt", 1)));
        tick(&mut machine, &catalog, 2);
        let report = machine.report(CryoModule::Stabilizer).unwrap();
        assert_eq!(report.state, ModuleState::Error);
        assert_eq!(report.message, "Output Blocked");

        machine
            .core
            .inventory
            .set_slot(STABILIZER_INPUT_SLOT, Some(stack("minecraft:dirt", 1)));
        tick(&mut machine, &catalog, 3);
        assert_eq!(message(&machine, CryoModule::Stabilizer), "Invalid Item");
    }

    #[test]
    fn cooling_grid_converts_in_place() {
        let catalog = alembic_data::native_catalog().unwrap();
        let mut machine = chamber(8000);
        machine.water = FluidTank::filled(WATER, 1000, 64_000);
        let inv = &mut machine.core.inventory;
        inv.set_slot(COOLING_GRID[0], Some(stack("minecraft:snow", 4)));
        inv.set_slot(COOLING_GRID[1], Some(stack("minecraft:cooked_beef", 3)));
        inv.set_slot(COOLING_GRID[2], Some(stack("utilitycraft:frozen_beef", 2)));
        inv.set_slot(COOLING_GRID[3], Some(stack("minecraft:dirt", 1)));

        tick(&mut machine, &catalog, 0);
        let report = machine.report(CryoModule::Cooling).unwrap();
        assert_eq!(report.state, ModuleState::Processing);
        assert_eq!(
            report.message,
            "2 active, 6 idle, 1 blocked, R2C1: Invalid Item"
        );

        tick(&mut machine, &catalog, 1);
        let inv = &machine.core.inventory;
        assert_eq!(
            inv.slot(COOLING_GRID[0]).map(|s| (s.item.as_str(), s.amount)),
            Some(("minecraft:ice", 4))
        );
        assert_eq!(
            inv.slot(COOLING_GRID[1]).map(|s| (s.item.as_str(), s.amount)),
            Some(("utilitycraft:frozen_beef", 3))
        );
        // Four batches of 100 mB.
        assert_eq!(machine.water.volume(), 600);
    }

    #[test]
    fn cooling_rejects_bad_stacks_without_losing_progress() {
        let mut catalog = Catalog::new();
        let _ = catalog.recipes.cooling.upsert(cooling_recipe(
            "test:pairs",
            ("test:slush", 2),
            ("test:ice_cube", 1),
        ));
        let _ = catalog.recipes.cooling.upsert(cooling_recipe(
            "test:bulk",
            ("test:brine", 1),
            ("test:salt", 4),
        ));
        let mut machine = chamber(10);
        machine.cryofluid = FluidTank::filled(CRYOFLUID, 10_000, 64_000);
        machine
            .core
            .inventory
            .set_slot(COOLING_GRID[0], Some(stack("test:slush", 4)));

        tick(&mut machine, &catalog, 0);
        assert_eq!(machine.cooling_progress(0).map(|p| p.banked()), Some(Fixed128::from_num(10)));

        machine
            .core
            .inventory
            .set_slot(COOLING_GRID[0], Some(stack("test:slush", 3)));
        tick(&mut machine, &catalog, 1);
        assert_eq!(
            message(&machine, CryoModule::Cooling),
            "8 idle, 1 blocked, R1C1: Need multiples of 2"
        );
        assert_eq!(machine.cooling_progress(0).map(|p| p.banked()), Some(Fixed128::from_num(10)));

        // 20 batches of 4 overflow a 64 stack.
        machine
            .core
            .inventory
            .set_slot(COOLING_GRID[0], Some(stack("test:brine", 20)));
        tick(&mut machine, &catalog, 2);
        assert_eq!(
            message(&machine, CryoModule::Cooling),
            "8 idle, 1 blocked, R1C1: Result stack too large"
        );

        machine
            .core
            .inventory
            .set_slot(COOLING_GRID[0], Some(stack("test:salt", 20)));
        tick(&mut machine, &catalog, 3);
        assert_eq!(message(&machine, CryoModule::Cooling), "9 idle");
    }

    #[test]
    fn generator_converts_water_with_titanium() {
        let catalog = alembic_data::native_catalog().unwrap();
        let mut machine = chamber(100_000);
        machine.water = FluidTank::filled(WATER, 2000, 64_000);
        machine
            .core
            .inventory
            .set_slot(CATALYST_SLOT, Some(stack("utilitycraft:titanium", 3)));

        tick(&mut machine, &catalog, 0);
        assert_eq!(
            message(&machine, CryoModule::Generator),
            "Converting 1 B (Titanium 1)"
        );
        tick(&mut machine, &catalog, 1);
        assert_eq!(
            message(&machine, CryoModule::Generator),
            "+800 mB (Titanium -1)"
        );
        assert_eq!(machine.water.volume(), 1000);
        assert_eq!(machine.cryofluid.volume(), 800);
        assert_eq!(
            machine.core.inventory.slot(CATALYST_SLOT).map(|s| s.amount),
            Some(2)
        );
    }

    #[test]
    fn generator_stalls() {
        let catalog = alembic_data::native_catalog().unwrap();
        let mut machine = chamber(100);
        tick(&mut machine, &catalog, 0);
        assert_eq!(message(&machine, CryoModule::Generator), "Need Water");

        machine.water = FluidTank::filled(WATER, 2000, 64_000);
        tick(&mut machine, &catalog, 1);
        assert_eq!(
            message(&machine, CryoModule::Generator),
            "Insert Titanium / Raw Titanium"
        );

        machine.cryofluid = FluidTank::filled(CRYOFLUID, 63_980, 64_000);
        tick(&mut machine, &catalog, 2);
        assert_eq!(message(&machine, CryoModule::Generator), "Cryofluid Full");
    }

    #[test]
    fn transfers_run_on_the_gate() {
        let catalog = alembic_data::native_catalog().unwrap();
        let mut machine = chamber(100);
        machine.cryofluid = FluidTank::filled(CRYOFLUID, 9000, 64_000);
        let inv = &mut machine.core.inventory;
        inv.set_slot(WATER_SLOT, Some(stack("minecraft:water_bucket", 1)));
        inv.set_slot(CAPSULE_SLOT, Some(stack("utilitycraft:empty_liquid_capsule", 1)));

        tick(&mut machine, &catalog, 0);
        assert_eq!(machine.water.volume(), 1000);
        assert_eq!(machine.cryofluid.volume(), 1000);
        assert_eq!(
            machine
                .core
                .inventory
                .slot(CAPSULE_SLOT)
                .map(|s| s.item.as_str()),
            Some("utilitycraft:cryofluid_capsule_8")
        );

        machine
            .core
            .inventory
            .set_slot(WATER_SLOT, Some(stack("minecraft:water_bucket", 1)));
        tick(&mut machine, &catalog, 1);
        assert_eq!(machine.water.volume(), 1000);
        tick(&mut machine, &catalog, 4);
        assert_eq!(machine.water.volume(), 2000);
    }

    #[test]
    fn no_energy_reports_every_module_waiting() {
        let catalog = alembic_data::native_catalog().unwrap();
        let mut machine = CryoChamber::new(MachineSettings::for_kind(MachineKind::CryoChamber));
        tick(&mut machine, &catalog, 0);
        assert_eq!(machine.core.status(), &MachineStatus::NoEnergy);
        assert_eq!(message(&machine, CryoModule::Stabilizer), "No Energy");
        assert_eq!(message(&machine, CryoModule::Generator), "No Energy");
        assert_eq!(
            message(&machine, CryoModule::Cooling),
            "9 idle"
        );
    }
}

//! Recipe matching and batch arithmetic.
//!
//! Matching is all-or-nothing: a recipe matches only when its input,
//! its exact catalyst id set and its fluid type are satisfied together.
//! The batch count is the minimum of the independent per-resource ratios.

use crate::fluid::FluidTank;
use crate::id::ItemId;
use crate::item::{ItemStack, slot_capacity};
use crate::recipe::{FluidRole, FluidSpec, Ingredient, Recipe};
use std::collections::BTreeMap;

/// Quantities aggregated by item id.
pub type Totals = BTreeMap<ItemId, u32>;

/// Sum a requirement list by id. Zero amounts are ignored.
pub fn required_totals(required: &[Ingredient]) -> Totals {
    let mut totals = Totals::new();
    for ingredient in required.iter().filter(|i| i.amount > 0) {
        let entry = totals.entry(ingredient.item.clone()).or_insert(0);
        *entry = entry.saturating_add(ingredient.amount);
    }
    totals
}

/// Sum inserted stacks by id. Empty slots and zero stacks are ignored.
pub fn inserted_totals(stacks: &[Option<ItemStack>]) -> Totals {
    let mut totals = Totals::new();
    for stack in stacks.iter().flatten().filter(|s| s.amount > 0) {
        let entry = totals.entry(stack.item.clone()).or_insert(0);
        *entry = entry.saturating_add(stack.amount);
    }
    totals
}

// ---------------------------------------------------------------------------
// Catalysts
// ---------------------------------------------------------------------------

/// Why inserted catalysts do or don't satisfy a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalystStatus {
    Satisfied,
    /// Catalysts inserted for a recipe that takes none.
    Unexpected,
    /// An inserted type is not part of the requirement.
    Wrong,
    /// Nothing inserted.
    MissingAll,
    /// Some required types absent.
    MissingSome,
    /// Every type present, some short.
    Insufficient,
}

pub fn catalyst_status(required: &[Ingredient], stacks: &[Option<ItemStack>]) -> CatalystStatus {
    let need = required_totals(required);
    let have = inserted_totals(stacks);

    if need.is_empty() {
        return if have.is_empty() {
            CatalystStatus::Satisfied
        } else {
            CatalystStatus::Unexpected
        };
    }
    if have.keys().any(|id| !need.contains_key(id)) {
        return CatalystStatus::Wrong;
    }
    if have.is_empty() {
        return CatalystStatus::MissingAll;
    }
    if need.keys().any(|id| !have.contains_key(id)) {
        return CatalystStatus::MissingSome;
    }
    if need
        .iter()
        .any(|(id, n)| have.get(id).copied().unwrap_or(0) < *n)
    {
        return CatalystStatus::Insufficient;
    }
    CatalystStatus::Satisfied
}

/// Exact-set catalyst match with sufficient quantities.
pub fn catalysts_match(required: &[Ingredient], stacks: &[Option<ItemStack>]) -> bool {
    catalyst_status(required, stacks) == CatalystStatus::Satisfied
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

pub fn input_satisfied(required: &Ingredient, stack: Option<&ItemStack>) -> bool {
    stack.is_some_and(|s| s.is(&required.item) && s.amount >= required.amount)
}

/// Type compatibility only: an empty tank or one holding the same fluid.
/// Volume is a batch limit, not a match condition.
pub fn fluid_compatible(spec: &FluidSpec, tank: Option<&FluidTank>) -> bool {
    tank.is_some_and(|t| t.accepts(&spec.fluid))
}

/// First recipe, in declaration order, whose input and catalysts hold.
pub fn match_items<'a, I>(
    recipes: I,
    input: Option<&ItemStack>,
    catalysts: &[Option<ItemStack>],
) -> Option<&'a Recipe>
where
    I: IntoIterator<Item = &'a Recipe>,
{
    input?;
    recipes
        .into_iter()
        .find(|r| input_satisfied(&r.input, input) && catalysts_match(&r.catalysts, catalysts))
}

/// First recipe, in declaration order, whose input, catalysts and fluid
/// type all hold.
pub fn match_recipe<'a, I>(
    recipes: I,
    input: Option<&ItemStack>,
    catalysts: &[Option<ItemStack>],
    tank: Option<&FluidTank>,
) -> Option<&'a Recipe>
where
    I: IntoIterator<Item = &'a Recipe>,
{
    input?;
    recipes.into_iter().find(|r| {
        input_satisfied(&r.input, input)
            && catalysts_match(&r.catalysts, catalysts)
            && r.fluid.as_ref().is_none_or(|f| fluid_compatible(f, tank))
    })
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

/// Everything the batch calculator reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchInputs<'a> {
    pub input: Option<&'a ItemStack>,
    pub catalysts: &'a [Option<ItemStack>],
    pub tank: Option<&'a FluidTank>,
    pub output: Option<&'a ItemStack>,
    pub byproduct: Option<&'a ItemStack>,
}

/// The resource that caps the batch count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bottleneck {
    Input,
    Catalysts,
    Fluid,
    Output,
    Byproduct,
}

/// Per-resource batch ratios. `u32::MAX` means unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    pub input: u32,
    pub catalysts: u32,
    pub fluid: u32,
    pub output: u32,
    pub byproduct: u32,
}

impl BatchLimits {
    pub fn batches(&self) -> u32 {
        self.input
            .min(self.catalysts)
            .min(self.fluid)
            .min(self.output)
            .min(self.byproduct)
    }

    /// The first resource at zero, checked in input, catalyst, fluid,
    /// output, byproduct order. `None` while a batch can run.
    pub fn bottleneck(&self) -> Option<Bottleneck> {
        [
            (self.input, Bottleneck::Input),
            (self.catalysts, Bottleneck::Catalysts),
            (self.fluid, Bottleneck::Fluid),
            (self.output, Bottleneck::Output),
            (self.byproduct, Bottleneck::Byproduct),
        ]
        .into_iter()
        .find(|(limit, _)| *limit == 0)
        .map(|(_, which)| which)
    }
}

fn ratio(available: u64, per_batch: u64) -> u32 {
    if per_batch == 0 {
        return u32::MAX;
    }
    u32::try_from(available / per_batch).unwrap_or(u32::MAX)
}

pub fn batch_limits(recipe: &Recipe, inputs: &BatchInputs<'_>) -> BatchLimits {
    let input = match inputs.input {
        Some(stack) if stack.is(&recipe.input.item) => {
            ratio(u64::from(stack.amount), u64::from(recipe.input.amount))
        }
        _ => 0,
    };

    let have = inserted_totals(inputs.catalysts);
    let catalysts = required_totals(&recipe.catalysts)
        .iter()
        .map(|(id, n)| ratio(u64::from(have.get(id).copied().unwrap_or(0)), u64::from(*n)))
        .min()
        .unwrap_or(u32::MAX);

    let fluid = match (&recipe.fluid, inputs.tank) {
        (None, _) => u32::MAX,
        (Some(_), None) => 0,
        (Some(spec), Some(tank)) if !tank.accepts(&spec.fluid) => 0,
        (Some(spec), Some(tank)) => match spec.role {
            FluidRole::Consumed => ratio(tank.volume(), spec.amount),
            FluidRole::Produced => ratio(tank.free_space(), spec.amount),
        },
    };

    let output = recipe
        .output
        .as_ref()
        .map_or(u32::MAX, |out| slot_capacity(inputs.output, &out.item, out.amount));

    let byproduct = recipe.byproduct.as_ref().map_or(u32::MAX, |bp| {
        slot_capacity(inputs.byproduct, &bp.item, bp.amount.upper())
    });

    BatchLimits {
        input,
        catalysts,
        fluid,
        output,
        byproduct,
    }
}

/// Largest whole number of batches every resource can cover at once.
pub fn max_batches(recipe: &Recipe, inputs: &BatchInputs<'_>) -> u32 {
    batch_limits(recipe, inputs).batches()
}

// ===========================================================================
// Tests
// ===========================================================================

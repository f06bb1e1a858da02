//! Turns loose schema records into validated core recipes.
//!
//! Every machine has its own defaults; numbers that are missing,
//! non-finite or out of range fall back to them rather than failing.
//! Structural problems (no id to fall back on, unusable infuser key,
//! unknown category) are [`DefinitionError`]s.

use crate::schema::{
    AmountData, ByproductData, ClonerRecipeData, ContainerData, CryoRecipeData, FillableData,
    FluidData, InfuserRecipeData, ItemRecipeData, LiquifierRecipeData, StackData, WeaverRecipeData,
};
use alembic_core::cloning::{CloneRecipe, KDE, Rarity};
use alembic_core::fixed::{Fixed64, TICKS_PER_SECOND, Ticks, clamp_chance, f64_to_fixed64};
use alembic_core::fluid::{FillableContainer, FluidContainer, LIQUIFIED_AETHERIUM};
use alembic_core::id::{FluidType, ItemId, RecipeId};
use alembic_core::recipe::{Amount, Byproduct, FluidRole, FluidSpec, Ingredient, Recipe, RecipeError};
use alembic_core::thermal::{FluidOption, RecipeUi, TankSource, ThermalCategory, ThermalRecipe};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const WEAVER_DEFAULT_COST: u64 = 6400;
/// Weaver energy drawn per second of nominal processing time.
pub const WEAVER_ENERGY_PER_SECOND: u64 = 3600;
/// Infuser recipes run this much faster and cheaper on the weaver.
pub const INFUSER_SPEED_MULTIPLIER: f64 = 2.5;

pub const LIQUIFIER_DEFAULT_COST: u64 = 3600;
pub const LIQUIFIER_DEFAULT_FLUID_AMOUNT: u64 = 250;
pub const LIQUIFIER_DEFAULT_SECONDS: u32 = 6;

pub const ENERGIZER_DEFAULT_COST: u64 = 9600;
pub const ENERGIZER_DEFAULT_SECONDS: u32 = 5;

pub const RESIDUE_DEFAULT_COST: u64 = 5200;
pub const RESIDUE_DEFAULT_SECONDS: u32 = 5;

pub const CRYO_DEFAULT_COST: u64 = 1000;
pub const CRYO_DEFAULT_TICKS: Ticks = 20;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DefinitionError {
    #[error("definition has no id and nothing to derive one from")]
    MissingId,
    #[error("definition '{id}' is missing its {field}")]
    MissingField { id: String, field: &'static str },
    #[error("infuser key '{0}' is not of the form 'catalyst|input'")]
    InfuserKey(String),
    #[error("cryo recipe '{id}' has unknown category '{category}'")]
    UnknownCategory { id: String, category: String },
    #[error(transparent)]
    Invalid(#[from] RecipeError),
}

// ---------------------------------------------------------------------------
// Number helpers
// ---------------------------------------------------------------------------

/// Floor of a finite positive value, else `fallback`.
fn positive_u32(value: Option<f64>, fallback: u32) -> u32 {
    match value {
        Some(v) if v.is_finite() && v >= 1.0 => v.floor().min(f64::from(u32::MAX)) as u32,
        _ => fallback,
    }
}

fn positive_u64(value: Option<f64>, fallback: u64) -> u64 {
    match value {
        Some(v) if v.is_finite() && v >= 1.0 => v.floor().min(u64::MAX as f64) as u64,
        _ => fallback,
    }
}

/// Floor of a finite value clamped at zero.
fn non_negative_u32(value: f64) -> u32 {
    if value.is_finite() {
        value.max(0.0).floor().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

fn speed_modifier(value: Option<f64>) -> Fixed64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => f64_to_fixed64(v),
        _ => Fixed64::ONE,
    }
}

fn seconds_ticks(seconds: u32) -> Ticks {
    Ticks::from(seconds) * TICKS_PER_SECOND
}

fn amount(data: Option<AmountData>) -> Amount {
    let (min, max) = match data {
        None => return Amount::Exact(1),
        Some(AmountData::Exact(n)) => return Amount::Exact(non_negative_u32(n)),
        Some(AmountData::Pair([min, max]) | AmountData::Range { min, max }) => {
            (non_negative_u32(min), non_negative_u32(max))
        }
    };
    if min == max {
        Amount::Exact(min)
    } else {
        Amount::Range {
            min: min.min(max),
            max: min.max(max),
        }
    }
}

/// Missing chance means always; an invalid one clamps into `[0, 1]`.
fn byproduct(data: Option<ByproductData>) -> Option<Byproduct> {
    let data = data?;
    if data.id.trim().is_empty() {
        return None;
    }
    Some(Byproduct {
        item: ItemId::new(data.id),
        amount: amount(data.amount),
        chance: data.chance.map_or(Fixed64::ONE, clamp_chance),
    })
}

fn ingredient(stack: &StackData, amount_hint: Option<f64>) -> Ingredient {
    Ingredient::new(
        stack.id(),
        positive_u32(stack.amount().or(amount_hint), 1),
    )
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

fn pick_id(explicit: Option<String>, fallback: &str) -> Result<RecipeId, DefinitionError> {
    match non_blank(explicit) {
        Some(id) => Ok(RecipeId::new(id)),
        None if !fallback.trim().is_empty() => Ok(RecipeId::new(fallback)),
        None => Err(DefinitionError::MissingId),
    }
}

// ===========================================================================
// Catalyst weaver
// ===========================================================================

/// Nominal weaver time: `cost / 3600` seconds, at least one tick.
pub fn weaver_ticks(cost: u64) -> Ticks {
    (cost * TICKS_PER_SECOND / WEAVER_ENERGY_PER_SECOND).max(1)
}

/// Weaver fluids are drawn from the tank. A zero-volume fluid is no fluid.
fn weaver_fluid(data: Option<FluidData>, amount_hint: Option<f64>) -> Option<FluidSpec> {
    let data = data?;
    let amount = positive_u64(data.amount().or(amount_hint), 0);
    (amount > 0 && !data.fluid_type().trim().is_empty()).then(|| FluidSpec {
        fluid: FluidType::new(data.fluid_type()),
        amount,
        role: FluidRole::Consumed,
    })
}

/// `id` fills in a missing `data.id` (bus payloads key recipes by id).
pub fn weaver_recipe(id: Option<&str>, data: WeaverRecipeData) -> Result<Recipe, DefinitionError> {
    let id = pick_id(data.id.or_else(|| id.map(str::to_owned)), "")?;
    let cost = positive_u64(data.cost, WEAVER_DEFAULT_COST);
    let mut recipe = Recipe::new(id, ingredient(&data.input, None), cost)
        .speed_modifier(speed_modifier(data.speed_modifier))
        .ticks(weaver_ticks(cost));
    let output = ingredient(&data.output, None);
    recipe = recipe.output(output.item, output.amount);
    for catalyst in data.catalysts.iter().flatten() {
        recipe = recipe.catalyst(catalyst.id(), positive_u32(catalyst.amount(), 1));
    }
    recipe.fluid = weaver_fluid(data.fluid, None);
    recipe.byproduct = byproduct(data.byproduct);
    recipe.description = non_blank(data.description);
    Ok(recipe)
}

/// Translate a legacy infuser entry keyed `"catalyst|input"` into a weaver
/// recipe `infuser:<key>` that runs 2.5x faster for 1/2.5 of the energy.
pub fn infuser_recipe(key: &str, data: InfuserRecipeData) -> Result<Recipe, DefinitionError> {
    let (catalyst, input) = key
        .split_once('|')
        .filter(|(c, i)| !c.trim().is_empty() && !i.trim().is_empty())
        .ok_or_else(|| DefinitionError::InfuserKey(key.to_owned()))?;

    let base = data.cost.filter(|c| c.is_finite()).unwrap_or(WEAVER_DEFAULT_COST as f64);
    let cost = (base / INFUSER_SPEED_MULTIPLIER).round().max(1.0) as u64;
    let output = ingredient(&data.output, data.output_amount);

    let mut recipe = Recipe::new(
        format!("infuser:{key}"),
        Ingredient::new(input.trim(), positive_u32(data.input_amount, 1)),
        cost,
    )
    .catalyst(catalyst.trim(), positive_u32(data.required, 1))
    .output(output.item, output.amount)
    .speed_modifier(speed_modifier(
        data.speed_modifier.or(Some(INFUSER_SPEED_MULTIPLIER)),
    ))
    .ticks(weaver_ticks(cost));
    recipe.fluid = weaver_fluid(data.fluid, data.fluid_amount);
    recipe.byproduct = byproduct(data.byproduct);
    Ok(recipe)
}

// ===========================================================================
// Liquifier, energizer, residue processor
// ===========================================================================

pub fn liquifier_recipe(id: Option<&str>, data: LiquifierRecipeData) -> Result<Recipe, DefinitionError> {
    let id = pick_id(data.id.or_else(|| id.map(str::to_owned)), data.input.id())?;
    let (fluid, fluid_amount) = match &data.fluid {
        Some(fluid) if !fluid.fluid_type().trim().is_empty() => (
            fluid.fluid_type().to_owned(),
            positive_u64(fluid.amount(), LIQUIFIER_DEFAULT_FLUID_AMOUNT),
        ),
        _ => (LIQUIFIED_AETHERIUM.to_owned(), LIQUIFIER_DEFAULT_FLUID_AMOUNT),
    };
    let seconds = positive_u32(data.seconds, LIQUIFIER_DEFAULT_SECONDS);
    let mut recipe = Recipe::new(
        id,
        ingredient(&data.input, None),
        positive_u64(data.energy_cost, LIQUIFIER_DEFAULT_COST),
    )
    .produces_fluid(fluid, fluid_amount)
    .ticks(seconds_ticks(seconds));
    recipe.byproduct = byproduct(data.byproduct);
    recipe.description = non_blank(data.description);
    Ok(recipe)
}

fn item_recipe(
    id: Option<&str>,
    data: ItemRecipeData,
    default_cost: u64,
    default_seconds: u32,
) -> Result<Recipe, DefinitionError> {
    let id = pick_id(data.id.or_else(|| id.map(str::to_owned)), data.input.id())?;
    let output = ingredient(&data.output, None);
    let seconds = positive_u32(data.seconds, default_seconds);
    let mut recipe = Recipe::new(
        id,
        ingredient(&data.input, None),
        positive_u64(data.energy_cost, default_cost),
    )
    .output(output.item, output.amount)
    .ticks(seconds_ticks(seconds));
    recipe.byproduct = byproduct(data.byproduct);
    recipe.description = non_blank(data.description);
    Ok(recipe)
}

/// Energizer recipes carry no byproduct.
pub fn energizer_recipe(id: Option<&str>, mut data: ItemRecipeData) -> Result<Recipe, DefinitionError> {
    data.byproduct = None;
    item_recipe(id, data, ENERGIZER_DEFAULT_COST, ENERGIZER_DEFAULT_SECONDS)
}

pub fn residue_recipe(id: Option<&str>, data: ItemRecipeData) -> Result<Recipe, DefinitionError> {
    item_recipe(id, data, RESIDUE_DEFAULT_COST, RESIDUE_DEFAULT_SECONDS)
}

// ===========================================================================
// Cloner
// ===========================================================================

/// A clone recipe keyed by template. `fluid: null` clones dry, an absent
/// fluid drains liquified aetherium at the default rate. Without an id the
/// recipe is named `template->output`.
pub fn clone_recipe(id: Option<&str>, data: ClonerRecipeData) -> Result<CloneRecipe, DefinitionError> {
    let explicit = non_blank(data.id.or_else(|| id.map(str::to_owned)));
    let template = data
        .input
        .as_ref()
        .map(|s| s.id().trim().to_owned())
        .filter(|s| !s.is_empty());
    let Some(template) = template else {
        return Err(match explicit {
            Some(id) => DefinitionError::MissingField {
                id,
                field: "template",
            },
            None => DefinitionError::MissingId,
        });
    };
    let output = data
        .output
        .as_ref()
        .map(|s| s.id().trim().to_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| template.clone());
    let id = explicit.unwrap_or_else(|| format!("{template}->{output}"));

    let rarity = data.rarity.as_deref().map_or(Rarity::Common, Rarity::parse);
    let seconds = positive_u32(data.time, 1);
    let mut recipe = CloneRecipe::new(id, template, rarity, seconds);
    recipe.output = ItemId::new(output);
    let extra_kde = match data.cost {
        Some(c) if c.is_finite() && c > 0.0 => c,
        _ => 0.0,
    };
    let kde = rarity.rate_kde() as f64 * f64::from(recipe.seconds) + extra_kde;
    recipe.energy_cost = ((kde * KDE as f64).round() as u64).max(KDE);

    match data.fluid {
        None => {}
        Some(None) => recipe.fluid = None,
        Some(Some(fluid)) => {
            if let Some(spec) = recipe.fluid.as_mut() {
                if !fluid.fluid_type().trim().is_empty() {
                    spec.fluid = FluidType::new(fluid.fluid_type());
                }
                spec.amount = positive_u64(fluid.amount(), spec.amount);
            }
        }
    }
    Ok(recipe)
}

// ===========================================================================
// Cryo chamber
// ===========================================================================

fn category(id: &RecipeId, name: &str) -> Result<ThermalCategory, DefinitionError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "stabilization" | "stabilizer" => Ok(ThermalCategory::Stabilization),
        "cooling" | "cooler" => Ok(ThermalCategory::Cooling),
        _ => Err(DefinitionError::UnknownCategory {
            id: id.to_string(),
            category: name.to_owned(),
        }),
    }
}

fn fluid_option(data: FluidData) -> Option<FluidOption> {
    let fluid = data.fluid_type().trim();
    if fluid.is_empty() {
        return None;
    }
    let fluid = FluidType::new(fluid);
    let (amount, source, label) = match data {
        FluidData::Type(_) => (1, None, None),
        FluidData::Full {
            amount,
            source,
            label,
            ..
        } => (positive_u64(amount, 1), source, non_blank(label)),
    };
    let source = match source.as_deref().map(str::trim) {
        Some(s) if s.eq_ignore_ascii_case("water") => TankSource::Water,
        Some(s) if s.eq_ignore_ascii_case("cryofluid") || s.eq_ignore_ascii_case("cryo") => {
            TankSource::Cryofluid
        }
        _ => TankSource::for_fluid(&fluid),
    };
    Some(FluidOption {
        fluid,
        amount,
        source,
        label,
    })
}

/// Inputs from `input` and `inputs`, first occurrence of each item wins.
/// The id falls back to the output item.
pub fn thermal_recipe(id: Option<&str>, data: CryoRecipeData) -> Result<ThermalRecipe, DefinitionError> {
    let id = pick_id(data.id.or_else(|| id.map(str::to_owned)), data.output.id())?;
    let category = category(&id, &data.category)?;

    let mut inputs: Vec<Ingredient> = Vec::new();
    let declared = data.input.map(|i| i.into_vec()).unwrap_or_default();
    for stack in declared.iter().chain(&data.inputs) {
        if stack.id().trim().is_empty() || inputs.iter().any(|i| i.item.as_str() == stack.id()) {
            continue;
        }
        inputs.push(ingredient(stack, None));
    }

    let fluids = data
        .fluid
        .map(|f| f.into_vec())
        .unwrap_or_default()
        .into_iter()
        .chain(data.fluids)
        .filter_map(fluid_option)
        .collect();

    let mut tags: Vec<String> = Vec::new();
    for tag in data.tags.map(|t| t.into_vec()).unwrap_or_default() {
        let tag = tag.trim().to_owned();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    let ui = data.ui.unwrap_or_default();
    Ok(ThermalRecipe {
        id,
        category,
        inputs,
        output: ingredient(&data.output, None),
        fluids,
        energy_cost: positive_u64(data.energy_cost, CRYO_DEFAULT_COST),
        ticks: positive_u64(data.time, CRYO_DEFAULT_TICKS),
        ui: RecipeUi {
            name: non_blank(ui.name),
            description: non_blank(ui.description),
            indicator: non_blank(ui.indicator),
            processing_message: non_blank(ui.processing_message),
            completion_message: non_blank(ui.completion_message),
        },
        tags,
    })
}

// ===========================================================================
// Containers
// ===========================================================================

pub fn container(data: ContainerData) -> FluidContainer {
    FluidContainer {
        item: ItemId::new(data.id.trim()),
        fluid: FluidType::new(data.fluid_type.trim()),
        amount: positive_u64(Some(data.amount), 0),
        empty: non_blank(data.output).map(ItemId::new),
    }
}

pub fn fillable(data: FillableData) -> FillableContainer {
    let fills: BTreeMap<FluidType, ItemId> = data
        .fills
        .into_iter()
        .filter(|(fluid, item)| !fluid.trim().is_empty() && !item.trim().is_empty())
        .map(|(fluid, item)| (FluidType::new(fluid.trim()), ItemId::new(item.trim())))
        .collect();
    FillableContainer {
        item: ItemId::new(data.id.trim()),
        fills,
    }
}

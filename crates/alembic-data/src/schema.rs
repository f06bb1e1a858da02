//! Serde data structs for recipe and container definitions.
//!
//! These are the wire shapes accepted from native RON tables, data
//! directories (RON, JSON or TOML) and bus payloads. They are deliberately
//! loose: most fields are optional and numbers are read as `f64` so that
//! [`normalize`](crate::normalize) can apply per-machine defaults the same
//! way for every source.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

// ===========================================================================
// Shared parts
// ===========================================================================

/// An item reference: `"minecraft:coal"` or `{ id, amount }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StackData {
    Id(String),
    Full {
        id: String,
        #[serde(default)]
        amount: Option<f64>,
    },
}

impl StackData {
    pub fn id(&self) -> &str {
        match self {
            StackData::Id(id) | StackData::Full { id, .. } => id,
        }
    }

    pub fn amount(&self) -> Option<f64> {
        match self {
            StackData::Id(_) => None,
            StackData::Full { amount, .. } => *amount,
        }
    }
}

/// A quantity: `4`, `[1, 3]` or `{ min, max }`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountData {
    Exact(f64),
    Pair([f64; 2]),
    Range { min: f64, max: f64 },
}

/// A fluid reference: `"lava"` or `{ type, amount, source, label }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FluidData {
    Type(String),
    Full {
        #[serde(rename = "type", alias = "fluid")]
        fluid_type: String,
        #[serde(default)]
        amount: Option<f64>,
        #[serde(default)]
        source: Option<String>,
        #[serde(default)]
        label: Option<String>,
    },
}

impl FluidData {
    pub fn fluid_type(&self) -> &str {
        match self {
            FluidData::Type(fluid) | FluidData::Full { fluid_type: fluid, .. } => fluid,
        }
    }

    pub fn amount(&self) -> Option<f64> {
        match self {
            FluidData::Type(_) => None,
            FluidData::Full { amount, .. } => *amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ByproductData {
    pub id: String,
    #[serde(default)]
    pub amount: Option<AmountData>,
    #[serde(default, alias = "probability")]
    pub chance: Option<f64>,
}

/// One value or a list of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field
/// (`None`, via `#[serde(default)]`).
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ===========================================================================
// Item machines
// ===========================================================================

/// Catalyst weaver recipe. Catalyst entries may be `null` for empty slots.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WeaverRecipeData {
    #[serde(default)]
    pub id: Option<String>,
    pub input: StackData,
    #[serde(default)]
    pub catalysts: Vec<Option<StackData>>,
    #[serde(default)]
    pub fluid: Option<FluidData>,
    pub output: StackData,
    #[serde(default)]
    pub byproduct: Option<ByproductData>,
    #[serde(default, alias = "energyCost", alias = "energy_cost")]
    pub cost: Option<f64>,
    #[serde(default, alias = "speedModifier")]
    pub speed_modifier: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Legacy infuser recipe, keyed `"catalyst|input"`; becomes a weaver recipe.
#[derive(Debug, Clone, Deserialize)]
pub struct InfuserRecipeData {
    pub output: StackData,
    #[serde(default, alias = "outputAmount")]
    pub output_amount: Option<f64>,
    #[serde(default, alias = "catalystAmount")]
    pub required: Option<f64>,
    #[serde(default, alias = "inputAmount")]
    pub input_amount: Option<f64>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default, alias = "speedModifier")]
    pub speed_modifier: Option<f64>,
    #[serde(default)]
    pub fluid: Option<FluidData>,
    #[serde(default, alias = "fluidAmount")]
    pub fluid_amount: Option<f64>,
    #[serde(default)]
    pub byproduct: Option<ByproductData>,
}

/// Liquifier recipe: an item melted into a fluid.
#[derive(Debug, Clone, Deserialize)]
pub struct LiquifierRecipeData {
    #[serde(default)]
    pub id: Option<String>,
    pub input: StackData,
    #[serde(default)]
    pub fluid: Option<FluidData>,
    #[serde(default, alias = "energyCost")]
    pub energy_cost: Option<f64>,
    #[serde(default)]
    pub seconds: Option<f64>,
    #[serde(default)]
    pub byproduct: Option<ByproductData>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Energizer and residue processor recipe: one item into another, with an
/// optional byproduct (residue only).
#[derive(Debug, Clone, Deserialize)]
pub struct ItemRecipeData {
    #[serde(default)]
    pub id: Option<String>,
    pub input: StackData,
    pub output: StackData,
    #[serde(default)]
    pub byproduct: Option<ByproductData>,
    #[serde(default, alias = "energyCost")]
    pub energy_cost: Option<f64>,
    #[serde(default)]
    pub seconds: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClonerRecipeData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default, alias = "timeSeconds")]
    pub time: Option<f64>,
    #[serde(default, alias = "template", alias = "base")]
    pub input: Option<StackData>,
    #[serde(default)]
    pub output: Option<StackData>,
    /// Extra cost in kDE on top of the rarity rate.
    #[serde(default)]
    pub cost: Option<f64>,
    /// Absent: default drain. `null`: no fluid.
    #[serde(default, deserialize_with = "explicit_null")]
    pub fluid: Option<Option<FluidData>>,
}

// ===========================================================================
// Cryo chamber
// ===========================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeUiData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub indicator: Option<String>,
    #[serde(default, alias = "processingMessage")]
    pub processing_message: Option<String>,
    #[serde(default, alias = "completionMessage")]
    pub completion_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CryoRecipeData {
    #[serde(default)]
    pub id: Option<String>,
    /// `"stabilization"` or `"cooling"`.
    pub category: String,
    #[serde(default)]
    pub input: Option<OneOrMany<StackData>>,
    #[serde(default)]
    pub inputs: Vec<StackData>,
    pub output: StackData,
    #[serde(default)]
    pub fluid: Option<OneOrMany<FluidData>>,
    #[serde(default)]
    pub fluids: Vec<FluidData>,
    #[serde(default, alias = "energyCost")]
    pub energy_cost: Option<f64>,
    /// Processing time in ticks.
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub ui: Option<RecipeUiData>,
    #[serde(default)]
    pub tags: Option<OneOrMany<String>>,
}

// ===========================================================================
// Containers
// ===========================================================================

/// A filled container, e.g. `{ id, amount, type, output }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerData {
    pub id: String,
    pub amount: f64,
    #[serde(rename = "type", alias = "fluid")]
    pub fluid_type: String,
    /// Empty item left behind.
    #[serde(default, alias = "empty")]
    pub output: Option<String>,
}

/// An empty container and the filled item it becomes per fluid.
#[derive(Debug, Clone, Deserialize)]
pub struct FillableData {
    pub id: String,
    pub fills: BTreeMap<String, String>,
}

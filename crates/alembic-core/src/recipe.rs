//! Validated recipe records shared by the item machines.
//!
//! A [`Recipe`] is immutable once it enters a
//! [`RecipeBook`](crate::registry::RecipeBook); books call
//! [`RecipeEntry::validate`] on every upsert so consuming code never sees
//! a malformed record.

use crate::fixed::{Fixed64, Ticks};
use crate::id::{FluidType, ItemId, RecipeId};
use crate::rng::SimRng;
use serde::{Deserialize, Serialize};

/// Catalyst slots on a catalyst weaver.
pub const MAX_CATALYSTS: usize = 6;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Reasons a recipe (or container definition) is rejected at insertion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecipeError {
    #[error("recipe id is empty")]
    MissingId,
    #[error("recipe '{recipe}': {field} amount must be at least 1")]
    ZeroAmount {
        recipe: RecipeId,
        field: &'static str,
    },
    #[error("recipe '{recipe}': {field} item id is empty")]
    MissingItem {
        recipe: RecipeId,
        field: &'static str,
    },
    #[error("recipe '{recipe}': {count} catalysts exceed the limit of {MAX_CATALYSTS}")]
    TooManyCatalysts { recipe: RecipeId, count: usize },
    #[error("recipe '{recipe}': energy cost must be at least 1")]
    ZeroEnergyCost { recipe: RecipeId },
    #[error("recipe '{recipe}' produces neither an item nor a fluid")]
    NoProduct { recipe: RecipeId },
    #[error("recipe '{recipe}': byproduct range {min}..={max} is inverted")]
    InvalidRange { recipe: RecipeId, min: u32, max: u32 },
    #[error("recipe '{recipe}': chance {chance} is outside [0, 1]")]
    InvalidChance { recipe: RecipeId, chance: Fixed64 },
    #[error("recipe '{recipe}' has no input variants")]
    NoInputs { recipe: RecipeId },
    #[error("container '{item}': {reason}")]
    InvalidContainer { item: ItemId, reason: &'static str },
}

/// Anything a [`RecipeBook`](crate::registry::RecipeBook) can hold.
pub trait RecipeEntry {
    fn id(&self) -> &RecipeId;

    fn validate(&self) -> Result<(), RecipeError>;
}

// ---------------------------------------------------------------------------
// Parts
// ---------------------------------------------------------------------------

/// An item and a per-batch quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub item: ItemId,
    pub amount: u32,
}

impl Ingredient {
    pub fn new(item: impl Into<ItemId>, amount: u32) -> Self {
        Self {
            item: item.into(),
            amount,
        }
    }

    pub(crate) fn check(&self, recipe: &RecipeId, field: &'static str) -> Result<(), RecipeError> {
        if self.item.is_empty() {
            return Err(RecipeError::MissingItem {
                recipe: recipe.clone(),
                field,
            });
        }
        if self.amount == 0 {
            return Err(RecipeError::ZeroAmount {
                recipe: recipe.clone(),
                field,
            });
        }
        Ok(())
    }
}

/// A fixed quantity or an inclusive range drawn uniformly at craft time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Amount {
    Exact(u32),
    Range { min: u32, max: u32 },
}

impl Amount {
    /// Largest quantity a single draw can produce.
    pub fn upper(&self) -> u32 {
        match *self {
            Amount::Exact(n) => n,
            Amount::Range { min, max } => min.max(max),
        }
    }

    pub fn sample(&self, rng: &mut SimRng) -> u32 {
        match *self {
            Amount::Exact(n) => n,
            Amount::Range { min, max } => rng.range_inclusive(min, max),
        }
    }
}

/// Whether a recipe's fluid is drawn from the tank or pushed into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FluidRole {
    Consumed,
    Produced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluidSpec {
    pub fluid: FluidType,
    /// Millibuckets per batch.
    pub amount: u64,
    pub role: FluidRole,
}

/// A secondary output rolled once per batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Byproduct {
    pub item: ItemId,
    pub amount: Amount,
    pub chance: Fixed64,
}

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub input: Ingredient,
    pub catalysts: Vec<Ingredient>,
    pub fluid: Option<FluidSpec>,
    pub output: Option<Ingredient>,
    pub byproduct: Option<Byproduct>,
    pub energy_cost: u64,
    /// Nominal processing time, for display.
    pub ticks: Ticks,
    pub speed_modifier: Fixed64,
    pub description: Option<String>,
}

impl Recipe {
    /// A bare recipe: `input` in, nothing out yet. Chain the builder
    /// methods to fill in the rest.
    pub fn new(id: impl Into<RecipeId>, input: Ingredient, energy_cost: u64) -> Self {
        Self {
            id: id.into(),
            input,
            catalysts: Vec::new(),
            fluid: None,
            output: None,
            byproduct: None,
            energy_cost,
            ticks: 0,
            speed_modifier: Fixed64::ONE,
            description: None,
        }
    }

    pub fn catalyst(mut self, item: impl Into<ItemId>, amount: u32) -> Self {
        self.catalysts.push(Ingredient::new(item, amount));
        self
    }

    pub fn output(mut self, item: impl Into<ItemId>, amount: u32) -> Self {
        self.output = Some(Ingredient::new(item, amount));
        self
    }

    pub fn consumes_fluid(mut self, fluid: impl Into<FluidType>, amount: u64) -> Self {
        self.fluid = Some(FluidSpec {
            fluid: fluid.into(),
            amount,
            role: FluidRole::Consumed,
        });
        self
    }

    pub fn produces_fluid(mut self, fluid: impl Into<FluidType>, amount: u64) -> Self {
        self.fluid = Some(FluidSpec {
            fluid: fluid.into(),
            amount,
            role: FluidRole::Produced,
        });
        self
    }

    pub fn byproduct(mut self, item: impl Into<ItemId>, amount: Amount, chance: Fixed64) -> Self {
        self.byproduct = Some(Byproduct {
            item: item.into(),
            amount,
            chance,
        });
        self
    }

    pub fn ticks(mut self, ticks: Ticks) -> Self {
        self.ticks = ticks;
        self
    }

    pub fn speed_modifier(mut self, modifier: Fixed64) -> Self {
        self.speed_modifier = modifier;
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Fluid drawn per batch, if the recipe consumes any.
    pub fn consumed_fluid(&self) -> Option<&FluidSpec> {
        self.fluid.as_ref().filter(|f| f.role == FluidRole::Consumed)
    }

    /// Fluid pushed per batch, if the recipe produces any.
    pub fn produced_fluid(&self) -> Option<&FluidSpec> {
        self.fluid.as_ref().filter(|f| f.role == FluidRole::Produced)
    }
}

impl RecipeEntry for Recipe {
    fn id(&self) -> &RecipeId {
        &self.id
    }

    fn validate(&self) -> Result<(), RecipeError> {
        let id = &self.id;
        if id.is_empty() {
            return Err(RecipeError::MissingId);
        }
        self.input.check(id, "input")?;
        if self.catalysts.len() > MAX_CATALYSTS {
            return Err(RecipeError::TooManyCatalysts {
                recipe: id.clone(),
                count: self.catalysts.len(),
            });
        }
        for catalyst in &self.catalysts {
            catalyst.check(id, "catalyst")?;
        }
        if let Some(fluid) = &self.fluid {
            if fluid.fluid.is_empty() {
                return Err(RecipeError::MissingItem {
                    recipe: id.clone(),
                    field: "fluid",
                });
            }
            if fluid.amount == 0 {
                return Err(RecipeError::ZeroAmount {
                    recipe: id.clone(),
                    field: "fluid",
                });
            }
        }
        if let Some(output) = &self.output {
            output.check(id, "output")?;
        }
        if self.output.is_none() && self.produced_fluid().is_none() {
            return Err(RecipeError::NoProduct { recipe: id.clone() });
        }
        if let Some(byproduct) = &self.byproduct {
            if byproduct.item.is_empty() {
                return Err(RecipeError::MissingItem {
                    recipe: id.clone(),
                    field: "byproduct",
                });
            }
            if let Amount::Range { min, max } = byproduct.amount
                && min > max
            {
                return Err(RecipeError::InvalidRange {
                    recipe: id.clone(),
                    min,
                    max,
                });
            }
            if byproduct.chance < Fixed64::ZERO || byproduct.chance > Fixed64::ONE {
                return Err(RecipeError::InvalidChance {
                    recipe: id.clone(),
                    chance: byproduct.chance,
                });
            }
        }
        if self.energy_cost == 0 {
            return Err(RecipeError::ZeroEnergyCost { recipe: id.clone() });
        }
        Ok(())
    }
}

//! Rarity-priced clone recipes.
//!
//! Templates listed here are reserved for the singularity fabricator; the
//! generic cloner refuses them.

use crate::fixed::{Ticks, seconds_to_ticks};
use crate::fluid::LIQUIFIED_AETHERIUM;
use crate::id::{ItemId, RecipeId};
use crate::recipe::{FluidRole, FluidSpec, RecipeEntry, RecipeError};
use serde::{Deserialize, Serialize};

/// Energy units per kDE.
pub const KDE: u64 = 1000;

/// Fluid drain of a cloning run, per second of processing.
pub const FLUID_PER_SECOND: u64 = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    /// Base cost in kDE per second of cloning.
    pub fn rate_kde(self) -> u64 {
        match self {
            Rarity::Common => 10,
            Rarity::Uncommon => 48,
            Rarity::Rare => 240,
            Rarity::Epic => 1200,
            Rarity::Legendary => 6000,
            Rarity::Mythic => 30_000,
        }
    }

    /// Case-insensitive name lookup; unknown names are common.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "uncommon" => Rarity::Uncommon,
            "rare" => Rarity::Rare,
            "epic" => Rarity::Epic,
            "legendary" => Rarity::Legendary,
            "mythic" => Rarity::Mythic,
            _ => Rarity::Common,
        }
    }
}

/// `max(1000, (rate * seconds + extra) * 1000)`, saturating.
pub fn clone_energy_cost(rarity: Rarity, seconds: u32, extra_kde: u64) -> u64 {
    let kde = rarity
        .rate_kde()
        .saturating_mul(u64::from(seconds))
        .saturating_add(extra_kde);
    kde.saturating_mul(KDE).max(KDE)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneRecipe {
    pub id: RecipeId,
    pub rarity: Rarity,
    /// Template item; one is returned alongside each copy.
    pub template: ItemId,
    pub output: ItemId,
    pub seconds: u32,
    pub ticks: Ticks,
    pub energy_cost: u64,
    pub fluid: Option<FluidSpec>,
}

impl CloneRecipe {
    /// A clone of `template` into itself, priced by rarity, draining
    /// liquified aetherium for the whole run.
    pub fn new(id: impl Into<RecipeId>, template: impl Into<ItemId>, rarity: Rarity, seconds: u32) -> Self {
        let template = template.into();
        let seconds = seconds.max(1);
        Self {
            id: id.into(),
            rarity,
            output: template.clone(),
            template,
            seconds,
            ticks: seconds_to_ticks(seconds),
            energy_cost: clone_energy_cost(rarity, seconds, 0),
            fluid: Some(FluidSpec {
                fluid: LIQUIFIED_AETHERIUM.into(),
                amount: u64::from(seconds) * FLUID_PER_SECOND,
                role: FluidRole::Consumed,
            }),
        }
    }
}

impl RecipeEntry for CloneRecipe {
    fn id(&self) -> &RecipeId {
        &self.id
    }

    fn validate(&self) -> Result<(), RecipeError> {
        if self.id.is_empty() {
            return Err(RecipeError::MissingId);
        }
        if self.template.is_empty() {
            return Err(RecipeError::MissingItem {
                recipe: self.id.clone(),
                field: "template",
            });
        }
        if self.output.is_empty() {
            return Err(RecipeError::MissingItem {
                recipe: self.id.clone(),
                field: "output",
            });
        }
        if self.fluid.as_ref().is_some_and(|f| f.amount == 0) {
            return Err(RecipeError::ZeroAmount {
                recipe: self.id.clone(),
                field: "fluid",
            });
        }
        if self.energy_cost == 0 {
            return Err(RecipeError::ZeroEnergyCost {
                recipe: self.id.clone(),
            });
        }
        Ok(())
    }
}

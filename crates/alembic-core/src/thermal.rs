//! Cryo chamber recipes: multi-variant inputs, tank-routed fluid options,
//! and the water-to-cryofluid generator configuration.

use crate::fixed::{Fixed64, Ticks, f64_to_fixed64};
use crate::fluid::{CRYOFLUID, WATER};
use crate::id::{FluidType, ItemId, RecipeId};
use crate::item::ItemStack;
use crate::recipe::{Ingredient, RecipeEntry, RecipeError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThermalCategory {
    Stabilization,
    Cooling,
}

/// Which of the chamber's two tanks a fluid option draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TankSource {
    Water,
    Cryofluid,
}

impl TankSource {
    /// Water fluids default to the water tank, everything else to cryofluid.
    pub fn for_fluid(fluid: &FluidType) -> Self {
        if fluid.as_str() == WATER {
            TankSource::Water
        } else {
            TankSource::Cryofluid
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluidOption {
    pub fluid: FluidType,
    /// Millibuckets per batch.
    pub amount: u64,
    pub source: TankSource,
    pub label: Option<String>,
}

impl FluidOption {
    pub fn label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.fluid.display_name())
    }
}

/// On-machine strings. Messages may use `{{input}}`, `{{inputAmount}}`,
/// `{{output}}`, `{{outputAmount}}`, `{{energyCost}}`, `{{fluid}}`,
/// `{{fluidAmount}}` and `{{category}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeUi {
    pub name: Option<String>,
    pub description: Option<String>,
    pub indicator: Option<String>,
    pub processing_message: Option<String>,
    pub completion_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThermalRecipe {
    pub id: RecipeId,
    pub category: ThermalCategory,
    /// Accepted input variants, first match wins.
    pub inputs: Vec<Ingredient>,
    pub output: Ingredient,
    /// Fluid options, first one whose tank can pay wins.
    pub fluids: Vec<FluidOption>,
    pub energy_cost: u64,
    pub ticks: Ticks,
    pub ui: RecipeUi,
    pub tags: Vec<String>,
}

impl ThermalRecipe {
    /// The first input variant `stack` satisfies.
    pub fn variant_for(&self, stack: &ItemStack) -> Option<&Ingredient> {
        self.inputs
            .iter()
            .find(|v| stack.is(&v.item) && stack.amount >= v.amount)
    }

    pub fn produces(&self, item: &ItemId) -> bool {
        self.output.item == *item
    }
}

impl RecipeEntry for ThermalRecipe {
    fn id(&self) -> &RecipeId {
        &self.id
    }

    fn validate(&self) -> Result<(), RecipeError> {
        if self.id.is_empty() {
            return Err(RecipeError::MissingId);
        }
        if self.inputs.is_empty() {
            return Err(RecipeError::NoInputs {
                recipe: self.id.clone(),
            });
        }
        for input in &self.inputs {
            input.check(&self.id, "input")?;
        }
        self.output.check(&self.id, "output")?;
        for option in &self.fluids {
            if option.amount == 0 {
                return Err(RecipeError::ZeroAmount {
                    recipe: self.id.clone(),
                    field: "fluid",
                });
            }
        }
        if self.energy_cost == 0 {
            return Err(RecipeError::ZeroEnergyCost {
                recipe: self.id.clone(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// An item that licenses water-to-cryofluid conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorCatalyst {
    pub item: ItemId,
    pub label: Option<String>,
    /// Items consumed per cycle.
    pub items_per_process: u32,
    /// Millibuckets of water one cycle converts.
    pub water_per_item: u64,
    /// Cryofluid produced per cycle; defaults to the base conversion rate.
    pub cryo_per_item: Option<u64>,
}

impl GeneratorCatalyst {
    pub fn label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.item.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub input_fluid: FluidType,
    pub output_fluid: FluidType,
    /// Cryofluid per millibucket of water when no catalyst says otherwise.
    pub conversion_rate: Fixed64,
    pub energy_per_1000: u64,
    pub process_ticks: Ticks,
    pub min_input: u64,
    pub min_output: u64,
    pub max_process_per_tick: u64,
    /// Empty means the generator runs without a catalyst.
    pub catalysts: Vec<GeneratorCatalyst>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            input_fluid: FluidType::from(WATER),
            output_fluid: FluidType::from(CRYOFLUID),
            conversion_rate: f64_to_fixed64(0.8),
            energy_per_1000: 32_000,
            process_ticks: 80,
            min_input: 100,
            min_output: 50,
            max_process_per_tick: 1000,
            catalysts: vec![
                GeneratorCatalyst {
                    item: ItemId::from("utilitycraft:titanium"),
                    label: Some("Titanium".to_owned()),
                    items_per_process: 1,
                    water_per_item: 1000,
                    cryo_per_item: Some(800),
                },
                GeneratorCatalyst {
                    item: ItemId::from("utilitycraft:raw_titanium"),
                    label: Some("Raw Titanium".to_owned()),
                    items_per_process: 1,
                    water_per_item: 1000,
                    cryo_per_item: Some(1600),
                },
            ],
        }
    }
}

impl GeneratorConfig {
    pub fn catalyst_for(&self, item: &ItemId) -> Option<&GeneratorCatalyst> {
        self.catalysts.iter().find(|c| c.item == *item)
    }

    /// "Titanium / Raw Titanium"
    pub fn catalyst_labels(&self) -> String {
        if self.catalysts.is_empty() {
            return "Catalyst".to_owned();
        }
        self.catalysts
            .iter()
            .map(GeneratorCatalyst::label)
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

//! Machine status: the single diagnostic a stalled (or running) machine
//! reports for a tick.

use crate::id::FluidType;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineStatus {
    #[default]
    Idle,
    Running,
    NoEnergy,
    NoRecipes,
    NoInput,
    NoBaseItem,
    NoResidue,
    NoTemplate,
    InvalidInput,
    InvalidResidue,
    InvalidTemplate,
    /// A named energizer input slot holds something no recipe accepts.
    ChannelInvalid { channel: String },
    WrongCatalysts { potential: usize },
    MissingCatalysts { potential: usize },
    MissingSomeCatalysts { potential: usize },
    InsufficientCatalysts { potential: usize },
    InvalidRecipe { potential: usize },
    WrongFluid { needed: FluidType },
    InsufficientFluid { needed: FluidType, amount: u64 },
    TankFull,
    RecipeConflict,
    OutputConflict,
    OutputFull,
    ByproductSlotBusy,
    ByproductSlotFull,
    ResidueFull,
    MissingItems,
    MissingMaterials,
    MissingInput,
    ReservedTemplate,
    OriginalSlotBusy,
    OriginalSlotFull,
    CopySlotBusy,
    CopySlotFull,
}

impl MachineStatus {
    /// Whether entering this status discards banked progress. Stalls that
    /// clear on their own (power, full outputs) keep it.
    pub fn resets_progress(&self) -> bool {
        !matches!(
            self,
            MachineStatus::Idle
                | MachineStatus::Running
                | MachineStatus::NoEnergy
                | MachineStatus::OutputFull
                | MachineStatus::TankFull
                | MachineStatus::ByproductSlotFull
                | MachineStatus::ResidueFull
                | MachineStatus::OriginalSlotFull
                | MachineStatus::CopySlotFull
        )
    }

    pub fn is_running(&self) -> bool {
        matches!(self, MachineStatus::Running)
    }
}

fn potential(f: &mut fmt::Formatter<'_>, headline: &str, count: usize) -> fmt::Result {
    let plural = if count == 1 { "" } else { "s" };
    write!(f, "{headline}\n{count} potential recipe{plural}")
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineStatus::Idle => f.write_str("Idle"),
            MachineStatus::Running => f.write_str("Running"),
            MachineStatus::NoEnergy => f.write_str("No Energy"),
            MachineStatus::NoRecipes => f.write_str("No Recipes"),
            MachineStatus::NoInput => f.write_str("Insert Item"),
            MachineStatus::NoBaseItem => f.write_str("No Base Item"),
            MachineStatus::NoResidue => f.write_str("Insert Residue"),
            MachineStatus::NoTemplate => f.write_str("Insert Template"),
            MachineStatus::InvalidInput => f.write_str("Invalid Item"),
            MachineStatus::InvalidResidue => f.write_str("Invalid Input"),
            MachineStatus::InvalidTemplate => f.write_str("Invalid Template"),
            MachineStatus::ChannelInvalid { channel } => write!(f, "{channel} Input Invalid"),
            MachineStatus::WrongCatalysts { potential: n } => potential(f, "Wrong Catalysts", *n),
            MachineStatus::MissingCatalysts { potential: n } => potential(f, "Missing Catalysts", *n),
            MachineStatus::MissingSomeCatalysts { potential: n } => {
                potential(f, "Missing Some Catalysts", *n)
            }
            MachineStatus::InsufficientCatalysts { potential: n } => {
                potential(f, "Insufficient Catalysts", *n)
            }
            MachineStatus::InvalidRecipe { potential: n } => potential(f, "Invalid Recipe", *n),
            MachineStatus::WrongFluid { needed } => {
                write!(f, "Wrong Fluid\nNeed {}", needed.display_name())
            }
            MachineStatus::InsufficientFluid { needed, amount } => {
                write!(f, "Not Enough {}\nNeed {amount}mB", needed.display_name())
            }
            MachineStatus::TankFull => f.write_str("Tank Full"),
            MachineStatus::RecipeConflict => f.write_str("Recipe Conflict"),
            MachineStatus::OutputConflict => f.write_str("Output Conflict"),
            MachineStatus::OutputFull => f.write_str("Output Full"),
            MachineStatus::ByproductSlotBusy => f.write_str("Residue Slot Busy"),
            MachineStatus::ByproductSlotFull => f.write_str("Byproduct Slot Full"),
            MachineStatus::ResidueFull => f.write_str("Residue Full"),
            MachineStatus::MissingItems => f.write_str("Missing Items"),
            MachineStatus::MissingMaterials => f.write_str("Missing Materials"),
            MachineStatus::MissingInput => f.write_str("Missing Input"),
            MachineStatus::ReservedTemplate => f.write_str("Use Singularity Fabricator"),
            MachineStatus::OriginalSlotBusy => f.write_str("Original Slot Busy"),
            MachineStatus::OriginalSlotFull => f.write_str("Original Slot Full"),
            MachineStatus::CopySlotBusy => f.write_str("Copy Slot Busy"),
            MachineStatus::CopySlotFull => f.write_str("Copy Slot Full"),
        }
    }
}
